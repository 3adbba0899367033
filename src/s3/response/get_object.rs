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
use crate::s3::header_constants::CONTENT_LENGTH;
use crate::s3::response::a_response_traits::{
    HasBucket, HasEtagFromHeaders, HasObject, HasRegion, HasVersion,
};
use crate::s3::types::S3Request;
use crate::{impl_from_s3response, impl_has_s3fields};
use bytes::Bytes;
use http::HeaderMap;

/// Response of [get_object()](crate::s3::client::S3Client::get_object) API.
///
/// The object content is read fully into memory.
#[derive(Clone, Debug)]
pub struct GetObjectResponse {
    request: S3Request,
    headers: HeaderMap,
    body: Bytes,
}

impl_from_s3response!(GetObjectResponse);
impl_has_s3fields!(GetObjectResponse);

impl HasBucket for GetObjectResponse {}
impl HasEtagFromHeaders for GetObjectResponse {}
impl HasObject for GetObjectResponse {}
impl HasRegion for GetObjectResponse {}
impl HasVersion for GetObjectResponse {}

impl GetObjectResponse {
    /// Content of the object.
    pub fn content(&self) -> &Bytes {
        &self.body
    }

    /// Value of the `Content-Length` header, falling back to the size of the received content.
    pub fn content_length(&self) -> Result<u64, Error> {
        match self.headers.get(CONTENT_LENGTH) {
            Some(v) => Ok(v.to_str()?.parse::<u64>()?),
            None => Ok(self.body.len() as u64),
        }
    }
}
