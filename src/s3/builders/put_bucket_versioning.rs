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

use crate::s3::client::S3Client;
use crate::s3::error::ValidationErr;
use crate::s3::multimap::Multimap;
use crate::s3::response::PutBucketVersioningResponse;
use crate::s3::types::{S3Api, S3Request, ToS3Request, VersioningStatus};
use crate::s3::utils::{check_bucket_name, insert};
use bytes::Bytes;
use http::Method;
use typed_builder::TypedBuilder;

/// Argument builder for the [`PutBucketVersioning`](https://docs.aws.amazon.com/AmazonS3/latest/API/API_PutBucketVersioning.html) S3 API operation.
///
/// This struct constructs the parameters required for the [`S3Client::put_bucket_versioning`](crate::s3::client::S3Client::put_bucket_versioning) method.
#[derive(Clone, Debug, TypedBuilder)]
pub struct PutBucketVersioning {
    /// The S3 client instance used to send the request.
    #[builder(!default)] // force required
    client: S3Client,
    /// Optional additional HTTP headers to include in the request.
    #[builder(default, setter(into))]
    extra_headers: Option<Multimap>,
    /// Optional additional query parameters to include in the request URL.
    #[builder(default, setter(into))]
    extra_query_params: Option<Multimap>,
    /// The name of the bucket for which to configure versioning.
    #[builder(setter(into))] // force required + accept Into<String>
    bucket: String,
    /// Desired versioning status for the bucket. Sending the request
    /// without one is a validation error.
    #[builder(default, setter(into))]
    versioning_status: Option<VersioningStatus>,
}

pub type PutBucketVersioningBldr =
    PutBucketVersioningBuilder<((S3Client,), (), (), (String,), ())>;

impl S3Api for PutBucketVersioning {
    type S3Response = PutBucketVersioningResponse;
}

impl ToS3Request for PutBucketVersioning {
    fn to_s3request(self) -> Result<S3Request, ValidationErr> {
        check_bucket_name(&self.bucket)?;

        let status = self
            .versioning_status
            .ok_or(ValidationErr::MissingVersioningStatus)?;
        let data = format!(
            "<VersioningConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><Status>{status}</Status></VersioningConfiguration>"
        );

        Ok(S3Request::builder()
            .client(self.client)
            .method(Method::PUT)
            .bucket(self.bucket)
            .query_params(insert(self.extra_query_params, "versioning"))
            .headers(self.extra_headers.unwrap_or_default())
            .body(Bytes::from(data))
            .build())
    }
}
