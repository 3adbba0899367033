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

use crate::impl_has_s3fields;
use crate::s3::error::Error;
use crate::s3::response::a_response_traits::{HasBucket, HasRegion};
use crate::s3::types::{FromS3Response, ListEntry, S3Request};
use crate::s3::utils::{children_named, get_flag, get_text_option};
use async_trait::async_trait;
use bytes::{Buf, Bytes};
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of a single [list_objects()](crate::s3::client::S3Client::list_objects) page
#[derive(Clone, Debug)]
pub struct ListObjectsResponse {
    request: S3Request,
    headers: HeaderMap,
    body: Bytes,

    pub contents: Vec<ListEntry>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
    pub key_count: Option<u64>,
}

impl_has_s3fields!(ListObjectsResponse);

impl HasBucket for ListObjectsResponse {}
impl HasRegion for ListObjectsResponse {}

#[async_trait]
impl FromS3Response for ListObjectsResponse {
    async fn from_s3response(
        request: S3Request,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp: reqwest::Response = response?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body: Bytes = resp.bytes().await?;

        let root = Element::parse(body.clone().reader())?;
        let contents = children_named(&root, "Contents")
            .map(|c| ListEntry::from_xml(c, false))
            .collect::<Result<Vec<ListEntry>, Error>>()?;
        let key_count = match get_text_option(&root, "KeyCount") {
            Some(v) if !v.is_empty() => Some(v.parse::<u64>()?),
            _ => None,
        };

        Ok(Self {
            request,
            headers,
            body,
            contents,
            is_truncated: get_flag(&root, "IsTruncated"),
            next_continuation_token: get_text_option(&root, "NextContinuationToken")
                .filter(|v| !v.is_empty()),
            key_count,
        })
    }
}
