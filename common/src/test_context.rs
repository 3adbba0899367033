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

use crate::cleanup_guard::CleanupGuard;
use crate::mock_server::{
    CSM_ADMIN_PASSWORD, CSM_ADMIN_USER, CSM_MONITOR_PASSWORD, CSM_MONITOR_USER, MockServer,
    MockState, ROOT_ACCESS_KEY, ROOT_SECRET_KEY,
};
use crate::utils::rand_bucket_name;
use s3_quota_harness::config::{CsmUser, HarnessConfig};
use s3_quota_harness::s3::S3Client;
use s3_quota_harness::s3::types::S3Api;
use std::time::Duration;

/// Endpoints and credentials for one test.
///
/// By default every endpoint points at a fresh [`MockServer`]. With
/// `HARNESS_LIVE=true` the configuration comes from the environment (see
/// [`HarnessConfig::from_env`]) and `ACCESS_KEY`/`SECRET_KEY` hold the S3
/// credentials.
pub struct TestContext {
    pub config: HarnessConfig,
    pub access_key: String,
    pub secret_key: String,
    pub mock: Option<MockServer>,
}

impl TestContext {
    pub async fn new() -> Self {
        let live: bool = std::env::var("HARNESS_LIVE")
            .unwrap_or("false".into())
            .parse()
            .unwrap_or(false);
        if live {
            Self::new_from_env()
        } else {
            Self::start_mock().await
        }
    }

    pub fn new_from_env() -> Self {
        let _ = env_logger_init();
        let config = HarnessConfig::from_env().unwrap();
        let access_key = std::env::var("ACCESS_KEY").unwrap();
        log::debug!("ACCESS_KEY={access_key}");
        let secret_key = std::env::var("SECRET_KEY").unwrap();
        log::debug!("SECRET_KEY=*****");
        Self {
            config,
            access_key,
            secret_key,
            mock: None,
        }
    }

    pub async fn start_mock() -> Self {
        let _ = env_logger_init();
        let mock = MockServer::start().await;
        let endpoint = mock.endpoint();
        let test_data_folder =
            std::env::temp_dir().join(format!("s3-quota-harness-{}", uuid::Uuid::new_v4().simple()));

        let config = HarnessConfig::builder()
            .s3_endpoint(endpoint.clone())
            .iam_endpoint(endpoint.clone())
            .csm_endpoint(endpoint)
            .csm_admin(CsmUser::new(CSM_ADMIN_USER, CSM_ADMIN_PASSWORD))
            .csm_monitor(CsmUser::new(CSM_MONITOR_USER, CSM_MONITOR_PASSWORD))
            .test_data_folder(test_data_folder)
            .delete_account_delay(Duration::ZERO)
            .build();

        Self {
            config,
            access_key: ROOT_ACCESS_KEY.to_string(),
            secret_key: ROOT_SECRET_KEY.to_string(),
            mock: Some(mock),
        }
    }

    /// State of the mock server, or `None` when running against a live cluster.
    pub fn mock_state(&self) -> Option<&MockState> {
        self.mock.as_ref().map(|m| &m.state)
    }

    pub fn client(&self) -> S3Client {
        S3Client::from_config(&self.config, &self.access_key, &self.secret_key).unwrap()
    }

    /// Creates a bucket with a random name and a guard that removes it.
    pub async fn create_bucket_helper(&self) -> (String, CleanupGuard) {
        let bucket_name = rand_bucket_name();
        self.client()
            .create_bucket(&bucket_name)
            .build()
            .send()
            .await
            .unwrap();
        let guard = CleanupGuard::new(&self.config, &bucket_name, &self.access_key, &self.secret_key);
        (bucket_name, guard)
    }
}

fn env_logger_init() -> Result<(), log::SetLoggerError> {
    env_logger::builder().is_test(true).try_init()
}
