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

//! IAM query API client
//!
//! IAM calls are form-encoded `POST /` requests carrying an `Action` and
//! the API `Version`, signed with SigV4 for the `iam` service. They share
//! the transport of [`S3Client`], pointed at the IAM endpoint.

use crate::config::HarnessConfig;
use crate::s3::client::S3Client;
use crate::s3::error::Error;

mod client;
pub mod response;
pub mod types;

pub use client::*;
pub use types::{FromIamResponse, IamApi, IamRequest, IamUser, ToIamRequest};

/// IAM API client for user management.
#[derive(Clone, Debug)]
pub struct IamClient {
    base_client: S3Client,
}

impl IamClient {
    /// Creates a new IAM client from an [`S3Client`] whose base URL is the IAM endpoint.
    pub fn new(client: S3Client) -> Self {
        Self {
            base_client: client,
        }
    }

    /// Returns a client for the configured IAM endpoint signing with the given key pair.
    pub fn from_config(
        config: &HarnessConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, Error> {
        let client = S3Client::for_endpoint(config, &config.iam_endpoint, access_key, secret_key)?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying client.
    pub fn base_client(&self) -> &S3Client {
        &self.base_client
    }
}
