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
use crate::s3::response::ListObjectsResponse;
use crate::s3::types::{S3Api, S3Request, ToS3Request};
use crate::s3::utils::check_bucket_name;
use http::Method;
use typed_builder::TypedBuilder;

/// Argument builder for the [`ListObjectsV2`](https://docs.aws.amazon.com/AmazonS3/latest/API/API_ListObjectsV2.html) S3 API operation.
///
/// Returns one page of results. Use
/// [`S3Client::list_all_objects`](crate::s3::client::S3Client::list_all_objects)
/// to follow continuation tokens until the listing is complete.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ListObjects {
    #[builder(!default)] // force required
    client: S3Client,
    #[builder(default, setter(into))]
    extra_headers: Option<Multimap>,
    #[builder(default, setter(into))]
    extra_query_params: Option<Multimap>,
    #[builder(setter(into))] // force required + accept Into<String>
    bucket: String,
    /// Only keys starting with this prefix are returned.
    #[builder(default, setter(into))]
    prefix: Option<String>,
    /// Token returned as `next_continuation_token` by the previous page.
    #[builder(default, setter(into))]
    continuation_token: Option<String>,
    /// Maximum number of keys in one page; the server default is 1000.
    #[builder(default, setter(into))]
    max_keys: Option<u16>,
}

pub type ListObjectsBldr =
    ListObjectsBuilder<((S3Client,), (), (), (String,), (), (), ())>;

impl S3Api for ListObjects {
    type S3Response = ListObjectsResponse;
}

impl ToS3Request for ListObjects {
    fn to_s3request(self) -> Result<S3Request, ValidationErr> {
        check_bucket_name(&self.bucket)?;

        let mut query_params: Multimap = self.extra_query_params.unwrap_or_default();
        query_params.add("list-type", "2");
        query_params.add_opt("prefix", self.prefix);
        query_params.add_opt("continuation-token", self.continuation_token);
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
