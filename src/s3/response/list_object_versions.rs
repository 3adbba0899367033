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
use crate::s3::utils::{get_flag, get_text_option};
use async_trait::async_trait;
use bytes::{Buf, Bytes};
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of a single [list_object_versions()](crate::s3::client::S3Client::list_object_versions) page.
///
/// Versions and delete markers are kept apart, each in server order.
#[derive(Clone, Debug)]
pub struct ListObjectVersionsResponse {
    request: S3Request,
    headers: HeaderMap,
    body: Bytes,

    pub versions: Vec<ListEntry>,
    pub delete_markers: Vec<ListEntry>,
    pub is_truncated: bool,
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

impl_has_s3fields!(ListObjectVersionsResponse);

impl HasBucket for ListObjectVersionsResponse {}
impl HasRegion for ListObjectVersionsResponse {}

#[async_trait]
impl FromS3Response for ListObjectVersionsResponse {
    async fn from_s3response(
        request: S3Request,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp: reqwest::Response = response?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body: Bytes = resp.bytes().await?;

        let root = Element::parse(body.clone().reader())?;
        let mut versions: Vec<ListEntry> = Vec::new();
        let mut delete_markers: Vec<ListEntry> = Vec::new();
        for el in root.children.iter().filter_map(|n| n.as_element()) {
            match el.name.as_str() {
                "Version" => versions.push(ListEntry::from_xml(el, false)?),
                "DeleteMarker" => delete_markers.push(ListEntry::from_xml(el, true)?),
                _ => {}
            }
        }

        Ok(Self {
            request,
            headers,
            body,
            versions,
            delete_markers,
            is_truncated: get_flag(&root, "IsTruncated"),
            next_key_marker: get_text_option(&root, "NextKeyMarker").filter(|v| !v.is_empty()),
            next_version_id_marker: get_text_option(&root, "NextVersionIdMarker")
                .filter(|v| !v.is_empty()),
        })
    }
}
