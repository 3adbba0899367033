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
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::ListObjectVersionsResponse;
use crate::s3::types::{S3Api, S3Request, ToS3Request};
use crate::s3::utils::{check_bucket_name, insert};
use http::Method;
use typed_builder::TypedBuilder;

/// Argument builder for the [`ListObjectVersions`](https://docs.aws.amazon.com/AmazonS3/latest/API/API_ListObjectVersions.html) S3 API operation.
///
/// Lists every version and delete marker in a bucket, one page at a time.
/// A truncated page is continued by passing `next_key_marker` and
/// `next_version_id_marker` back as `key_marker` and `version_id_marker`.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ListObjectVersions {
    #[builder(!default)] // force required
    client: S3Client,
    #[builder(default, setter(into))]
    extra_headers: Option<Multimap>,
    #[builder(default, setter(into))]
    extra_query_params: Option<Multimap>,
    #[builder(setter(into))] // force required + accept Into<String>
    bucket: String,
    #[builder(default, setter(into))]
    prefix: Option<String>,
    #[builder(default, setter(into))]
    key_marker: Option<String>,
    #[builder(default, setter(into))]
    version_id_marker: Option<String>,
    #[builder(default, setter(into))]
    max_keys: Option<u16>,
}

pub type ListObjectVersionsBldr =
    ListObjectVersionsBuilder<((S3Client,), (), (), (String,), (), (), (), ())>;

impl S3Api for ListObjectVersions {
    type S3Response = ListObjectVersionsResponse;
}

impl ToS3Request for ListObjectVersions {
    fn to_s3request(self) -> Result<S3Request, ValidationErr> {
        check_bucket_name(&self.bucket)?;

        let mut query_params: Multimap = insert(self.extra_query_params, "versions");
        query_params.add_opt("prefix", self.prefix);
        query_params.add_opt("key-marker", self.key_marker);
        query_params.add_opt("version-id-marker", self.version_id_marker);
        query_params.add_opt("max-keys", self.max_keys.map(|v| v.to_string()));

        Ok(S3Request::builder()
            .client(self.client)
            .method(Method::GET)
            .bucket(self.bucket)
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default())
            .build())
    }
}
