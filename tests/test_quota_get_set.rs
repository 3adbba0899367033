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
use http::{HeaderMap, StatusCode};
use s3_quota_harness::config::{CsmUser, LoginAs};
use s3_quota_harness::csm::{GetSetQuota, QuotaCheck, QuotaType};
use s3_quota_harness::s3::error::{CsmError, Error};

#[tokio::test]
async fn set_and_get_user_quota_as_admin() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();
    let payload = gsq.iam_user_quota_payload(QuotaType::User, "true", 10_000, 10);

    let (ok, check) = gsq
        .verify_get_set_user_quota("quota-uid-1", &payload, true, StatusCode::OK, LoginAs::CsmAdminUser)
        .await
        .unwrap();
    assert!(ok);
    match check {
        QuotaCheck::Fetched(body) => {
            assert_eq!(body["quota_type"], "user");
            assert_eq!(body["max_size"], 10_000);
            assert_eq!(body["max_objects"], 10);
            assert_eq!(body["max_size_kb"], 10.0);
        }
        v => panic!("expected fetched quota, got {v:?}"),
    }
    if let Some(mock) = ctx.mock_state() {
        assert_eq!(mock.quota_enabled("quota-uid-1"), Some(true));
    }
}

#[tokio::test]
async fn get_returns_what_was_set() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();
    let payload = gsq.iam_user_quota_payload(QuotaType::Bucket, "false", 2048, 3);

    let resp = gsq
        .set_user_quota("quota-uid-2", &payload, LoginAs::CsmAdminUser)
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::OK);

    let resp = gsq
        .get_user_quota("quota-uid-2", LoginAs::CsmAdminUser)
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::OK);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["quota_type"], "bucket");
    assert_eq!(body["enabled"], false);
    assert_eq!(body["max_objects"], 3);
}

#[tokio::test]
async fn monitor_role_cannot_set_quota() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();
    let payload = gsq.iam_user_quota_payload(QuotaType::User, "true", 1000, 1);

    let (ok, check) = gsq
        .verify_get_set_user_quota("quota-uid-3", &payload, true, StatusCode::OK, LoginAs::CsmUserMonitor)
        .await
        .unwrap();
    assert!(!ok);
    match check {
        QuotaCheck::SetFailed(resp) => assert_eq!(resp.status, StatusCode::FORBIDDEN),
        v => panic!("expected SET failure, got {v:?}"),
    }
}

#[tokio::test]
async fn unexpected_status_fails_the_set_step() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();
    let payload = gsq.iam_user_quota_payload(QuotaType::User, "true", 1000, 1);

    let (ok, check) = gsq
        .verify_get_set_user_quota(
            "quota-uid-4",
            &payload,
            false,
            StatusCode::CREATED,
            LoginAs::CsmAdminUser,
        )
        .await
        .unwrap();
    assert!(!ok);
    assert!(matches!(check, QuotaCheck::SetFailed(r) if r.status == StatusCode::OK));
}

#[tokio::test]
async fn missing_quota_is_not_found() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();

    let resp = gsq
        .get_user_quota("nobody", LoginAs::CsmAdminUser)
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn caller_headers_skip_login() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();

    let resp = gsq
        .get_user_quota_with_headers("quota-uid-5", HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let headers = gsq.csm.auth_headers(LoginAs::CsmAdminUser).await.unwrap();
    let payload = gsq.iam_user_quota_payload(QuotaType::User, "true", 5, 5);
    let resp = gsq
        .set_user_quota_with_headers("quota-uid-5", &payload, headers)
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_fails_login() {
    let mut ctx = TestContext::new().await;
    ctx.config.csm_admin = CsmUser::new("admin", "not-the-password");
    let gsq = GetSetQuota::new(&ctx.config).unwrap();

    match gsq.get_user_quota("quota-uid-6", LoginAs::CsmAdminUser).await {
        Err(Error::Csm(CsmError::LoginFailed { status, .. })) => assert_eq!(status, 401),
        v => panic!("expected login failure, got {v:?}"),
    }
}

#[tokio::test]
async fn unconfigured_role_is_an_error() {
    let ctx = TestContext::new().await;
    let gsq = GetSetQuota::new(&ctx.config).unwrap();

    match gsq.get_user_quota("quota-uid-7", LoginAs::CsmUserManage).await {
        Err(Error::Csm(CsmError::UnknownRole(role))) => assert_eq!(role, "csm_user_manage"),
        v => panic!("expected unknown role, got {v:?}"),
    }
}
