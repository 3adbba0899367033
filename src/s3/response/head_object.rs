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
use crate::s3::header_constants::{CONTENT_LENGTH, LAST_MODIFIED};
use crate::s3::response::a_response_traits::{
    HasBucket, HasEtagFromHeaders, HasIsDeleteMarker, HasObject, HasRegion, HasVersion,
};
use crate::s3::types::S3Request;
use crate::s3::utils::{UtcTime, from_http_header_value};
use crate::{impl_from_s3response, impl_has_s3fields};
use bytes::Bytes;
use http::HeaderMap;

/// Response of [head_object()](crate::s3::client::S3Client::head_object) API
#[derive(Clone, Debug)]
pub struct HeadObjectResponse {
    request: S3Request,
    headers: HeaderMap,
    body: Bytes,
}

impl_from_s3response!(HeadObjectResponse);
impl_has_s3fields!(HeadObjectResponse);

impl HasBucket for HeadObjectResponse {}
impl HasEtagFromHeaders for HeadObjectResponse {}
impl HasIsDeleteMarker for HeadObjectResponse {}
impl HasObject for HeadObjectResponse {}
impl HasRegion for HeadObjectResponse {}
impl HasVersion for HeadObjectResponse {}

impl HeadObjectResponse {
    /// Size of the object in bytes.
    pub fn size(&self) -> Result<u64, Error> {
        match self.headers.get(CONTENT_LENGTH) {
            Some(v) => Ok(v.to_str()?.parse::<u64>()?),
            None => Ok(0),
        }
    }

    pub fn last_modified(&self) -> Result<Option<UtcTime>, Error> {
        match self.headers.get(LAST_MODIFIED) {
            Some(v) => Ok(Some(from_http_header_value(v.to_str()?)?)),
            None => Ok(None),
        }
    }
}
