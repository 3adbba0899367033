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
use crate::s3::types::{Bucket, FromS3Response, S3Request};
use crate::s3::utils::{children_named, from_iso8601utc, get_text};
use async_trait::async_trait;
use bytes::{Buf, Bytes};
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of [list_buckets()](crate::s3::client::S3Client::list_buckets) API
#[derive(Clone, Debug)]
pub struct ListBucketsResponse {
    request: S3Request,
    headers: HeaderMap,
    body: Bytes,

    buckets: Vec<Bucket>,
}

impl_has_s3fields!(ListBucketsResponse);

impl ListBucketsResponse {
    /// Buckets owned by the requesting credentials.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Returns true when a bucket called `name` is in the listing.
    pub fn contains(&self, name: &str) -> bool {
        self.buckets.iter().any(|b| b.name == name)
    }
}

#[async_trait]
impl FromS3Response for ListBucketsResponse {
    async fn from_s3response(
        request: S3Request,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp: reqwest::Response = response?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body: Bytes = resp.bytes().await?;

        let root = Element::parse(body.clone().reader())?;
        let buckets = root
            .get_child("Buckets")
            .ok_or(Error::Xml(String::from("<Buckets> tag not found")))?;

        let buckets = children_named(buckets, "Bucket")
            .map(|b| -> Result<Bucket, Error> {
                Ok(Bucket {
                    name: get_text(b, "Name")?,
                    creation_date: from_iso8601utc(&get_text(b, "CreationDate")?)?,
                })
            })
            .collect::<Result<Vec<Bucket>, Error>>()?;

        Ok(Self {
            request,
            headers,
            body,
            buckets,
        })
    }
}
