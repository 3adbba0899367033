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
use crate::s3::builders::{ListObjects, ListObjectsBldr};
use crate::s3::error::Error;
use crate::s3::types::{ListEntry, S3Api};

impl S3Client {
    /// Creates a [`ListObjects`] request builder for one page of a ListObjectsV2 listing.
    pub fn list_objects<S: Into<String>>(&self, bucket: S) -> ListObjectsBldr {
        ListObjects::builder().client(self.clone()).bucket(bucket)
    }

    /// Lists every object of `bucket` under `prefix`, following continuation
    /// tokens until the server reports the listing complete.
    pub async fn list_all_objects(
        &self,
        bucket: &str,
        prefix: Option<String>,
    ) -> Result<Vec<ListEntry>, Error> {
        let mut entries: Vec<ListEntry> = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .list_objects(bucket)
                .prefix(prefix.clone())
                .continuation_token(token.take())
                .build()
                .send()
                .await?;
            entries.extend(resp.contents);
            token = resp.next_continuation_token;
            if !resp.is_truncated || token.is_none() {
                return Ok(entries);
            }
        }
    }
}
