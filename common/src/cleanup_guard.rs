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

use s3_quota_harness::config::HarnessConfig;
use s3_quota_harness::misc::delete_objects_bucket;

/// Removes a bucket, with every object version in it, on [`CleanupGuard::cleanup`].
pub struct CleanupGuard {
    config: HarnessConfig,
    bucket_name: String,
    access_key: String,
    secret_key: String,
}

impl CleanupGuard {
    pub fn new<S: Into<String>>(
        config: &HarnessConfig,
        bucket_name: S,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        Self {
            config: config.clone(),
            bucket_name: bucket_name.into(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    pub async fn cleanup(&self) {
        tokio::select!(
            _ = tokio::time::sleep(std::time::Duration::from_secs(60)) => {
                eprintln!("Cleanup timeout after 60s while removing bucket {}", self.bucket_name);
            },
            outcome = delete_objects_bucket(&self.config, &self.bucket_name, &self.access_key, &self.secret_key) => {
                if let Err(e) = outcome {
                    eprintln!("Error removing bucket '{}':\n{e}", self.bucket_name);
                }
            }
        );
    }
}
