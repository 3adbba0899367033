// S3 Quota Harness
// Copyright 2025 The s3-quota-harness Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bytes::Bytes;
use harness_common::test_context::TestContext;
use s3_quota_harness::s3::response::a_response_traits::HasBucket;
use s3_quota_harness::s3::types::S3Api;

#[tokio::test]
async fn list_objects_pages_with_continuation_token() {
    let ctx = TestContext::new().await;
    let (bucket, guard) = ctx.create_bucket_helper().await;
    let client = ctx.client();
    for key in ["a1", "a2", "a3", "b1", "b2"] {
        client
            .put_object(&bucket, key, Bytes::from_static(b"data"))
            .build()
            .send()
            .await
            .unwrap();
    }

    let page = client
        .list_objects(&bucket)
        .max_keys(2u16)
        .build()
        .send()
        .await
        .unwrap();
    assert_eq!(page.bucket(), bucket);
    assert_eq!(page.contents.len(), 2);
    assert!(page.is_truncated);
    assert_eq!(page.key_count, Some(2));
    let token = page.next_continuation_token.clone().unwrap();

    let page = client
        .list_objects(&bucket)
        .max_keys(2u16)
        .continuation_token(token)
        .build()
        .send()
        .await
        .unwrap();
    let names: Vec<_> = page.contents.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a3", "b1"]);

    let all = client.list_all_objects(&bucket, None).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.iter().all(|e| e.size == Some(4)));

    let only_b = client
        .list_all_objects(&bucket, Some("b".to_string()))
        .await
        .unwrap();
    let names: Vec<_> = only_b.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["b1", "b2"]);

    guard.cleanup().await;
}

#[tokio::test]
async fn list_buckets_shows_own_buckets() {
    let ctx = TestContext::new().await;
    let (bucket, guard) = ctx.create_bucket_helper().await;
    let client = ctx.client();

    let resp = client.list_buckets().build().send().await.unwrap();
    assert!(resp.contains(&bucket));
    let listed = resp.buckets().iter().find(|b| b.name == bucket).unwrap();
    assert!(listed.creation_date <= chrono::Utc::now());

    guard.cleanup().await;
    let resp = client.list_buckets().build().send().await.unwrap();
    assert!(!resp.contains(&bucket));
}
