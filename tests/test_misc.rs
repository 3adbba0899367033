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
use harness_common::utils::{rand_bucket_name, rand_user_name};
use s3_quota_harness::misc;
use s3_quota_harness::s3::error::{Error, ValidationErr};
use s3_quota_harness::s3::error_response::ErrorCode;
use s3_quota_harness::s3::types::{S3Api, VersioningStatus};

#[tokio::test]
async fn iam_user_lifecycle() {
    let ctx = TestContext::new().await;
    let user = rand_user_name();

    assert!(
        misc::create_iam_user(&ctx.config, &user, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    if let Some(mock) = ctx.mock_state() {
        assert!(mock.has_iam_user(&user));
    }

    assert!(
        misc::delete_iam_user(&ctx.config, &user, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    if let Some(mock) = ctx.mock_state() {
        assert!(!mock.has_iam_user(&user));
    }
}

#[tokio::test]
async fn duplicate_iam_user_is_rejected() {
    let ctx = TestContext::new().await;
    let user = rand_user_name();
    misc::create_iam_user(&ctx.config, &user, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();

    let err = misc::create_iam_user(&ctx.config, &user, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::EntityAlreadyExists));

    let err = misc::delete_iam_user(&ctx.config, "no-such-user", &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::NoSuchEntity));
}

#[tokio::test]
async fn bucket_lifecycle() {
    let ctx = TestContext::new().await;
    let bucket = rand_bucket_name();

    assert!(
        misc::create_bucket(&ctx.config, &bucket, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    for i in 0..3 {
        let object = format!("created_obj{i}");
        assert!(
            misc::create_put_objects(&ctx.config, &object, &bucket, &ctx.access_key, &ctx.secret_key, 64)
                .await
                .unwrap()
        );
    }
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.live_object_count(&bucket), 3);
    }

    assert!(
        misc::delete_objects_bucket(&ctx.config, &bucket, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    if let Some(mock) = ctx.mock_state() {
        assert!(!mock.has_bucket(&bucket));
    }
}

#[tokio::test]
async fn versioned_bucket_is_emptied_before_delete() {
    let ctx = TestContext::new().await;
    // the bucket is removed by the helper under test
    let (bucket, _) = ctx.create_bucket_helper().await;
    let client = ctx.client();
    client
        .put_bucket_versioning(&bucket)
        .versioning_status(VersioningStatus::Enabled)
        .build()
        .send()
        .await
        .unwrap();

    for body in ["v1", "v2"] {
        client
            .put_object(&bucket, "obj", Bytes::from(body))
            .build()
            .send()
            .await
            .unwrap();
    }
    client.delete_object(&bucket, "obj").build().send().await.unwrap();
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.version_count(&bucket, "obj"), 3);
    }

    assert!(
        misc::delete_objects_bucket(&ctx.config, &bucket, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    if let Some(mock) = ctx.mock_state() {
        assert!(!mock.has_bucket(&bucket));
    }
}

#[tokio::test]
async fn delete_object_removes_key() {
    let ctx = TestContext::new().await;
    let (bucket, guard) = ctx.create_bucket_helper().await;
    let object = misc::unique_object_name("created_obj");

    assert!(
        misc::create_put_objects(&ctx.config, &object, &bucket, &ctx.access_key, &ctx.secret_key, 10)
            .await
            .unwrap()
    );
    assert!(
        misc::delete_object(&ctx.config, &object, &bucket, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.live_object_count(&bucket), 0);
    }
    guard.cleanup().await;
}

#[tokio::test]
async fn staged_file_is_removed_after_upload() {
    let ctx = TestContext::new().await;
    let (bucket, guard) = ctx.create_bucket_helper().await;
    let object = misc::unique_object_name("created_obj");

    misc::create_put_objects(&ctx.config, &object, &bucket, &ctx.access_key, &ctx.secret_key, 2048)
        .await
        .unwrap();
    assert!(ctx.config.test_data_folder.is_dir());
    assert!(!ctx.config.test_data_folder.join(&object).exists());

    let resp = ctx
        .client()
        .get_object(&bucket, &object)
        .build()
        .send()
        .await
        .unwrap();
    assert_eq!(resp.content().len(), 2048);
    guard.cleanup().await;
}

#[tokio::test]
async fn invalid_bucket_name_never_reaches_the_server() {
    let ctx = TestContext::new().await;

    match misc::create_bucket(&ctx.config, "Not_A_Bucket", &ctx.access_key, &ctx.secret_key).await {
        Err(Error::Validation(ValidationErr::InvalidBucketName { name, .. })) => {
            assert_eq!(name, "Not_A_Bucket")
        }
        v => panic!("expected InvalidBucketName, got {v:?}"),
    }
    if let Some(mock) = ctx.mock_state() {
        assert!(!mock.has_bucket("Not_A_Bucket"));
    }
}

#[tokio::test]
async fn unknown_access_key_is_refused() {
    let ctx = TestContext::new().await;
    let bucket = rand_bucket_name();

    let err = misc::create_bucket(&ctx.config, &bucket, "unknown-key", "unknown-secret")
        .await
        .unwrap_err();
    assert_eq!(
        err.server_code(),
        Some(&ErrorCode::Other("InvalidAccessKeyId".into()))
    );
}

#[tokio::test]
async fn create_file_writes_requested_size() {
    let dir = std::env::temp_dir().join(misc::unique_object_name("create-file-"));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("payload");

    misc::create_file(&path, 4096).await.unwrap();
    assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 4096);

    misc::remove_file(&path).await;
    assert!(!path.exists());
    tokio::fs::remove_dir(&dir).await.unwrap();
}

#[tokio::test]
async fn context_defaults_to_the_mock_server() {
    if std::env::var("HARNESS_LIVE").is_ok_and(|v| v == "true") {
        println!("Skipping test because it is running against a live cluster");
        return;
    }
    let ctx = TestContext::new().await;
    let mock = ctx.mock.as_ref().unwrap();
    assert_eq!(ctx.config.s3_endpoint, mock.endpoint());
    assert_eq!(ctx.config.csm_endpoint, mock.endpoint());
    assert_ne!(log::max_level(), log::LevelFilter::Off);
}
