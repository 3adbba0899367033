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

use harness_common::test_context::TestContext;
use http::StatusCode;
use s3_quota_harness::config::{HarnessConfig, LoginAs};
use s3_quota_harness::csm::{GetSetQuota, QuotaType};
use s3_quota_harness::misc;
use s3_quota_harness::s3::error::{Error, ValidationErr};
use s3_quota_harness::s3::error_response::ErrorCode;

/// Sets a quota for `uid` and creates the bucket the limit checks write into.
async fn prepare(
    ctx: &TestContext,
    config: &HarnessConfig,
    uid: Option<&str>,
    quota_type: QuotaType,
    enabled: &str,
    max_size: u64,
    max_objects: u64,
) -> GetSetQuota {
    let gsq = GetSetQuota::new(config).unwrap();
    let uid = uid.unwrap_or(gsq.bucket.as_str()).to_string();
    let payload = gsq.iam_user_quota_payload(quota_type, enabled, max_size, max_objects);
    let (ok, _) = gsq
        .verify_get_set_user_quota(&uid, &payload, true, StatusCode::OK, LoginAs::CsmAdminUser)
        .await
        .unwrap();
    assert!(ok);
    assert!(
        misc::create_bucket(config, &gsq.bucket, &ctx.access_key, &ctx.secret_key)
            .await
            .unwrap()
    );
    gsq
}

#[tokio::test]
async fn max_size_blocks_the_next_write() {
    let ctx = TestContext::new().await;
    let gsq = prepare(&ctx, &ctx.config, Some(&ctx.access_key), QuotaType::User, "true", 1000, 100).await;

    let (ok, msg) = gsq
        .verify_max_size(1000, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(ok, "{msg}");
    assert_eq!(
        msg,
        "Message check verification failed for object size above max size"
    );
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.live_object_count(&gsq.bucket), 1);
    }
}

#[tokio::test]
async fn max_objects_blocks_the_next_write() {
    let ctx = TestContext::new().await;
    let gsq = prepare(&ctx, &ctx.config, Some(&ctx.access_key), QuotaType::User, "true", 1000, 4).await;

    let (ok, msg) = gsq
        .verify_max_objects(1000, 4, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(ok, "{msg}");
    assert_eq!(
        msg,
        "Message check verification failed for objects more than max objects"
    );
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.live_object_count(&gsq.bucket), 4);
    }
}

#[tokio::test]
async fn bucket_quota_is_enforced() {
    let ctx = TestContext::new().await;
    let gsq = prepare(&ctx, &ctx.config, None, QuotaType::Bucket, "true", 100, 2).await;

    let (ok, msg) = gsq
        .verify_max_objects(100, 2, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(ok, "{msg}");
}

#[tokio::test]
async fn disabled_quota_lets_the_write_through() {
    let ctx = TestContext::new().await;
    let gsq = prepare(&ctx, &ctx.config, Some(&ctx.access_key), QuotaType::User, "false", 1000, 100).await;

    let (ok, msg) = gsq
        .verify_max_size(1000, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(!ok);
    assert_eq!(msg, "Put operation passed for object size above max size");
}

#[tokio::test]
async fn unexpected_error_code_fails_the_check() {
    let ctx = TestContext::new().await;
    let mut config = ctx.config.clone();
    config.quota_exceeded_code = "XMinioAdminBucketQuotaExceeded".into();
    let gsq = prepare(&ctx, &config, Some(&ctx.access_key), QuotaType::User, "true", 500, 100).await;

    let (ok, msg) = gsq
        .verify_max_size(500, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(!ok);
    assert_eq!(
        msg,
        "Message check verification failed for object size above max size"
    );
}

#[tokio::test]
async fn staging_failure_reports_first_put() {
    let ctx = TestContext::new().await;
    let blocker = std::env::temp_dir().join(misc::unique_object_name("quota-blocker-"));
    tokio::fs::write(&blocker, b"not a directory").await.unwrap();

    let mut config = ctx.config.clone();
    config.test_data_folder = blocker.join("data");
    let gsq = prepare(&ctx, &config, Some(&ctx.access_key), QuotaType::User, "true", 10, 10).await;

    let (ok, msg) = gsq
        .verify_max_size(10, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(!ok);
    assert_eq!(msg, "Put operation failed for less than max size");

    let (ok, msg) = gsq
        .verify_max_objects(10, 2, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap();
    assert!(!ok);
    assert_eq!(msg, "Put operation failed for less than max objects");

    tokio::fs::remove_file(&blocker).await.unwrap();
}

#[tokio::test]
async fn missing_bucket_is_an_error() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();

    let err = gsq
        .verify_max_size(10, &ctx.access_key, &ctx.secret_key)
        .await
        .unwrap_err();
    assert_eq!(err.server_code(), Some(&ErrorCode::NoSuchBucket));
}

#[tokio::test]
async fn zero_max_objects_is_rejected() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();

    match gsq
        .verify_max_objects(10, 0, &ctx.access_key, &ctx.secret_key)
        .await
    {
        Err(Error::Validation(ValidationErr::InvalidQuotaLimit(_))) => {}
        v => panic!("expected InvalidQuotaLimit, got {v:?}"),
    }
}

#[test]
fn limit_check_names_follow_the_documented_shape() {
    let gsq = GetSetQuota::new(&HarnessConfig::default()).unwrap();
    assert!(gsq.bucket.starts_with("iam-user-bucket-"));
    assert!(gsq.object_name.starts_with("created_obj"));
    assert!(s3_quota_harness::s3::utils::check_bucket_name(&gsq.bucket).is_ok());
}
