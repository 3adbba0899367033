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

use crate::s3::error::Error;
use crate::s3::response::a_response_traits::{HasBucket, HasRegion};
use crate::s3::types::{S3Request, VersioningStatus};
use crate::s3::utils::get_text_option;
use crate::{impl_from_s3response, impl_has_s3fields};
use bytes::{Buf, Bytes};
use http::HeaderMap;
use xmltree::Element;

/// Response of [get_bucket_versioning()](crate::s3::client::S3Client::get_bucket_versioning) API
#[derive(Clone, Debug)]
pub struct GetBucketVersioningResponse {
    request: S3Request,
    headers: HeaderMap,
    body: Bytes,
}

impl_from_s3response!(GetBucketVersioningResponse);
impl_has_s3fields!(GetBucketVersioningResponse);

impl HasBucket for GetBucketVersioningResponse {}
impl HasRegion for GetBucketVersioningResponse {}

impl GetBucketVersioningResponse {
    /// Returns the versioning status of the bucket.
    ///
    /// `None` means versioning was never configured on the bucket.
    pub fn status(&self) -> Result<Option<VersioningStatus>, Error> {
        let root = Element::parse(self.body.clone().reader())?;
        get_text_option(&root, "Status")
            .filter(|v| !v.is_empty())
            .map(|v| v.parse::<VersioningStatus>())
            .transpose()
    }
}
