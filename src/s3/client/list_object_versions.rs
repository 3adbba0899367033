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

use super::S3Client;
use crate::s3::builders::{ListObjectVersions, ListObjectVersionsBldr};
use crate::s3::error::Error;
use crate::s3::types::{ListEntry, S3Api};

impl S3Client {
    /// Creates a [`ListObjectVersions`] request builder for one page of versions and delete markers.
    pub fn list_object_versions<S: Into<String>>(&self, bucket: S) -> ListObjectVersionsBldr {
        ListObjectVersions::builder()
            .client(self.clone())
            .bucket(bucket)
    }

    /// Lists every version and delete marker of `bucket`, following key and
    /// version-id markers across pages. Delete markers have
    /// [`ListEntry::is_delete_marker`] set.
    pub async fn list_all_object_versions(&self, bucket: &str) -> Result<Vec<ListEntry>, Error> {
        let mut entries: Vec<ListEntry> = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;
        loop {
            let resp = self
                .list_object_versions(bucket)
                .key_marker(key_marker.take())
                .version_id_marker(version_id_marker.take())
                .build()
                .send()
                .await?;
            entries.extend(resp.versions);
            entries.extend(resp.delete_markers);
            if !resp.is_truncated || resp.next_key_marker.is_none() {
                return Ok(entries);
            }
            key_marker = resp.next_key_marker;
            version_id_marker = resp.next_version_id_marker;
        }
    }
}
