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
use harness_common::cleanup_guard::CleanupGuard;
use harness_common::test_context::TestContext;
use s3_quota_harness::s3::error_response::ErrorCode;
use s3_quota_harness::s3::response::a_response_traits::{
    HasBucket, HasEtagFromHeaders, HasIsDeleteMarker, HasObject, HasRegion, HasVersion,
};
use s3_quota_harness::s3::types::{S3Api, VersioningStatus};
use s3_quota_harness::versioning::Versioning;

async fn versioned_bucket(ctx: &TestContext) -> (Versioning, String, CleanupGuard) {
    let (bucket, guard) = ctx.create_bucket_helper().await;
    let v = Versioning::from_config(&ctx.config, &ctx.access_key, &ctx.secret_key).unwrap();
    v.put_bucket_versioning(&bucket, VersioningStatus::Enabled)
        .await
        .unwrap();
    (v, bucket, guard)
}

/// Uploads `data` under `key` and returns the new version ID.
async fn put_version(v: &Versioning, bucket: &str, key: &str, data: &'static str) -> String {
    let resp = v
        .client()
        .put_object(bucket, key, Bytes::from_static(data.as_bytes()))
        .build()
        .send()
        .await
        .unwrap();
    resp.version_id().unwrap().to_string()
}

#[tokio::test]
async fn versioning_status_transitions() {
    let ctx = TestContext::new().await;
    let (bucket, guard) = ctx.create_bucket_helper().await;
    let v = Versioning::from_config(&ctx.config, &ctx.access_key, &ctx.secret_key).unwrap();

    let resp = v.get_bucket_versioning(&bucket).await.unwrap();
    assert_eq!(resp.status().unwrap(), None);

    let resp = v
        .put_bucket_versioning(&bucket, VersioningStatus::Enabled)
        .await
        .unwrap();
    assert_eq!(resp.bucket(), bucket);
    assert_eq!(resp.region(), ctx.config.region);

    let resp = v.get_bucket_versioning(&bucket).await.unwrap();
    assert_eq!(resp.status().unwrap(), Some(VersioningStatus::Enabled));

    v.put_bucket_versioning(&bucket, VersioningStatus::Suspended)
        .await
        .unwrap();
    let resp = v.get_bucket_versioning(&bucket).await.unwrap();
    assert_eq!(resp.status().unwrap(), Some(VersioningStatus::Suspended));
    guard.cleanup().await;
}

#[tokio::test]
async fn every_put_keeps_a_version() {
    let ctx = TestContext::new().await;
    let (v, bucket, guard) = versioned_bucket(&ctx).await;

    let first = put_version(&v, &bucket, "doc.txt", "first").await;
    let second = put_version(&v, &bucket, "doc.txt", "second").await;
    assert_ne!(first, second);

    let resp = v.list_object_versions(&bucket).await.unwrap();
    assert_eq!(resp.versions.len(), 2);
    assert!(resp.delete_markers.is_empty());
    let latest: Vec<_> = resp.versions.iter().filter(|e| e.is_latest).collect();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].version_id.as_deref(), Some(second.as_str()));

    let resp = v.get_object_version(&bucket, "doc.txt", &first).await.unwrap();
    assert_eq!(resp.content().as_ref(), b"first");
    assert_eq!(resp.version_id(), Some(first.as_str()));
    assert_eq!(resp.object(), "doc.txt");

    let resp = v.head_object_version(&bucket, "doc.txt", &second).await.unwrap();
    assert_eq!(resp.version_id(), Some(second.as_str()));
    assert!(!resp.etag().unwrap().is_empty());
    assert!(!resp.is_delete_marker());
    guard.cleanup().await;
}

#[tokio::test]
async fn delete_without_version_adds_marker() {
    let ctx = TestContext::new().await;
    let (v, bucket, guard) = versioned_bucket(&ctx).await;
    let kept = put_version(&v, &bucket, "doc.txt", "kept").await;

    let resp = v
        .client()
        .delete_object(&bucket, "doc.txt")
        .build()
        .send()
        .await
        .unwrap();
    assert!(resp.is_delete_marker());
    let marker = resp.version_id().unwrap().to_string();

    let err = v
        .client()
        .get_object(&bucket, "doc.txt")
        .build()
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::NoSuchKey));

    let resp = v.list_object_versions(&bucket).await.unwrap();
    assert_eq!(resp.versions.len(), 1);
    assert_eq!(resp.delete_markers.len(), 1);
    assert!(resp.delete_markers[0].is_latest);
    assert!(resp.delete_markers[0].is_delete_marker);

    let err = v
        .get_object_version(&bucket, "doc.txt", &marker)
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::MethodNotAllowed));

    // removing the marker brings the object back
    let resp = v
        .delete_object_version(&bucket, "doc.txt", &marker)
        .await
        .unwrap();
    assert!(resp.is_delete_marker());
    let resp = v.get_object_version(&bucket, "doc.txt", &kept).await.unwrap();
    assert_eq!(resp.content().as_ref(), b"kept");
    let resp = v
        .client()
        .get_object(&bucket, "doc.txt")
        .build()
        .send()
        .await
        .unwrap();
    assert_eq!(resp.content().as_ref(), b"kept");
    guard.cleanup().await;
}

#[tokio::test]
async fn delete_version_removes_only_that_version() {
    let ctx = TestContext::new().await;
    let (v, bucket, guard) = versioned_bucket(&ctx).await;
    let first = put_version(&v, &bucket, "doc.txt", "first").await;
    let second = put_version(&v, &bucket, "doc.txt", "second").await;

    let resp = v
        .delete_object_version(&bucket, "doc.txt", &first)
        .await
        .unwrap();
    assert!(!resp.is_delete_marker());
    assert_eq!(resp.version_id(), Some(first.as_str()));
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.version_count(&bucket, "doc.txt"), 1);
    }

    let err = v
        .get_object_version(&bucket, "doc.txt", &first)
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::NoSuchVersion));

    // HEAD errors carry no body, so the code comes from the status
    let err = v
        .head_object_version(&bucket, "doc.txt", &first)
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::NoSuchKey));

    let resp = v.get_object_version(&bucket, "doc.txt", &second).await.unwrap();
    assert_eq!(resp.content().as_ref(), b"second");
    guard.cleanup().await;
}

#[tokio::test]
async fn suspended_bucket_overwrites_null_version() {
    let ctx = TestContext::new().await;
    let (v, bucket, guard) = versioned_bucket(&ctx).await;
    put_version(&v, &bucket, "doc.txt", "enabled").await;
    v.put_bucket_versioning(&bucket, VersioningStatus::Suspended)
        .await
        .unwrap();

    for data in ["null-1", "null-2"] {
        let resp = v
            .client()
            .put_object(&bucket, "doc.txt", Bytes::from_static(data.as_bytes()))
            .build()
            .send()
            .await
            .unwrap();
        assert_eq!(resp.version_id(), Some("null"));
    }

    let resp = v.list_object_versions(&bucket).await.unwrap();
    assert_eq!(resp.versions.len(), 2);
    let resp = v.get_object_version(&bucket, "doc.txt", "null").await.unwrap();
    assert_eq!(resp.content().as_ref(), b"null-2");
    guard.cleanup().await;
}
