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

//! Accessor traits shared by S3 responses

use crate::s3::error::Error;
use crate::s3::header_constants::{ETAG, X_AMZ_DELETE_MARKER, X_AMZ_VERSION_ID};
use crate::s3::types::S3Request;
use bytes::Bytes;
use http::HeaderMap;

#[macro_export]
/// Implements the `FromS3Response` trait for responses that only keep the
/// request, headers and body.
macro_rules! impl_from_s3response {
    ($($ty:ty),* $(,)?) => {
        $(
            #[async_trait::async_trait]
            impl $crate::s3::types::FromS3Response for $ty {
                async fn from_s3response(
                    request: $crate::s3::types::S3Request,
                    response: std::result::Result<reqwest::Response, $crate::s3::error::Error>,
                ) -> std::result::Result<Self, $crate::s3::error::Error> {
                    let mut resp: reqwest::Response = response?;
                    Ok(Self {
                        request,
                        headers: std::mem::take(resp.headers_mut()),
                        body: resp.bytes().await?,
                    })
                }
            }
        )*
    };
}

#[macro_export]
/// Implements the `HasS3Fields` trait for the specified types.
macro_rules! impl_has_s3fields {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::s3::response::a_response_traits::HasS3Fields for $ty {
                /// The request that was sent to the S3 API.
                fn request(&self) -> &$crate::s3::types::S3Request {
                    &self.request
                }

                /// HTTP headers of the response.
                fn headers(&self) -> &http::HeaderMap {
                    &self.headers
                }

                /// The response body.
                fn body(&self) -> &bytes::Bytes {
                    &self.body
                }
            }
        )*
    };
}

pub trait HasS3Fields {
    /// The request that was sent to the S3 API.
    fn request(&self) -> &S3Request;
    /// HTTP headers returned by the server, containing metadata such as `Content-Type`, `ETag`, etc.
    fn headers(&self) -> &HeaderMap;
    /// The response body returned by the server.
    fn body(&self) -> &Bytes;
}

/// Returns the name of the S3 bucket.
pub trait HasBucket: HasS3Fields {
    #[inline]
    fn bucket(&self) -> &str {
        self.request().bucket.as_deref().unwrap_or_default()
    }
}

/// Returns the object key (name) of the S3 object.
pub trait HasObject: HasS3Fields {
    #[inline]
    fn object(&self) -> &str {
        self.request().object.as_deref().unwrap_or_default()
    }
}

/// Returns the region the request was signed for.
pub trait HasRegion: HasS3Fields {
    #[inline]
    fn region(&self) -> &str {
        self.request().region()
    }
}

/// Returns the version ID of the object (`x-amz-version-id`), if versioning is enabled for the bucket.
pub trait HasVersion: HasS3Fields {
    #[inline]
    fn version_id(&self) -> Option<&str> {
        self.headers()
            .get(X_AMZ_VERSION_ID)
            .and_then(|v| v.to_str().ok())
    }
}

/// Returns the value of the `ETag` header without the surrounding quotes.
pub trait HasEtagFromHeaders: HasS3Fields {
    #[inline]
    fn etag(&self) -> Result<String, Error> {
        let etag = self
            .headers()
            .get(ETAG)
            .map(|v| v.to_str())
            .transpose()?
            .map(|s| s.trim_matches('"'))
            .unwrap_or_default()
            .to_string();
        Ok(etag)
    }
}

/// Value of the `x-amz-delete-marker` header.
///
/// On a simple DELETE this tells whether a delete marker was created; on a
/// versioned DELETE, whether the removed version was a delete marker.
pub trait HasIsDeleteMarker: HasS3Fields {
    #[inline]
    fn is_delete_marker(&self) -> bool {
        self.headers()
            .get(X_AMZ_DELETE_MARKER)
            .map(|v| v == "true")
            .unwrap_or(false)
    }
}
