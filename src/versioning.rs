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

//! Object versioning operations
//!
//! Thin wrappers over the versioning related S3 calls. Each call logs the
//! response at debug level and returns it unchanged, so tests can assert on
//! the typed response or on the error code.

use crate::config::HarnessConfig;
use crate::s3::S3Client;
use crate::s3::error::Error;
use crate::s3::response::a_response_traits::HasS3Fields;
use crate::s3::response::{
    DeleteObjectResponse, GetBucketVersioningResponse, GetObjectResponse, HeadObjectResponse,
    ListObjectVersionsResponse, PutBucketVersioningResponse,
};
use crate::s3::types::{S3Api, VersioningStatus};

#[derive(Clone, Debug)]
pub struct Versioning {
    client: S3Client,
}

impl Versioning {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Returns a wrapper over a client for the configured S3 endpoint.
    pub fn from_config(
        config: &HarnessConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, Error> {
        Ok(Self::new(S3Client::from_config(
            config, access_key, secret_key,
        )?))
    }

    pub fn client(&self) -> &S3Client {
        &self.client
    }

    /// Sets the versioning status of `bucket` to `Enabled` or `Suspended`.
    pub async fn put_bucket_versioning(
        &self,
        bucket: &str,
        status: VersioningStatus,
    ) -> Result<PutBucketVersioningResponse, Error> {
        let resp = self
            .client
            .put_bucket_versioning(bucket)
            .versioning_status(status)
            .build()
            .send()
            .await?;
        log::debug!("{resp:?}");
        Ok(resp)
    }

    /// Reads the versioning status of `bucket`.
    pub async fn get_bucket_versioning(
        &self,
        bucket: &str,
    ) -> Result<GetBucketVersioningResponse, Error> {
        let resp = self.client.get_bucket_versioning(bucket).build().send().await?;
        log::debug!("{resp:?}");
        Ok(resp)
    }

    /// Lists the versions and delete markers of `bucket` (first page).
    pub async fn list_object_versions(
        &self,
        bucket: &str,
    ) -> Result<ListObjectVersionsResponse, Error> {
        let resp = self.client.list_object_versions(bucket).build().send().await?;
        log::debug!("{resp:?}");
        Ok(resp)
    }

    pub async fn get_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<GetObjectResponse, Error> {
        let resp = self
            .client
            .get_object(bucket, key)
            .version_id(version_id.to_string())
            .build()
            .send()
            .await?;
        log::debug!("GET {bucket}/{key}?versionId={version_id}: {:?}", resp.headers());
        Ok(resp)
    }

    pub async fn head_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<HeadObjectResponse, Error> {
        let resp = self
            .client
            .head_object(bucket, key)
            .version_id(version_id.to_string())
            .build()
            .send()
            .await?;
        log::debug!("{resp:?}");
        Ok(resp)
    }

    /// Permanently removes one version (or delete marker) of `key`.
    pub async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<DeleteObjectResponse, Error> {
        let resp = self
            .client
            .delete_object(bucket, key)
            .version_id(version_id.to_string())
            .build()
            .send()
            .await?;
        log::debug!("{resp:?}");
        Ok(resp)
    }
}
