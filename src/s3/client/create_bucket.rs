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

use super::S3Client;
use crate::s3::builders::{CreateBucket, CreateBucketBldr};

impl S3Client {
    /// Creates a [`CreateBucket`] request builder.
    ///
    /// To execute the request, call [`CreateBucket::send()`](crate::s3::types::S3Api::send),
    /// which returns a [`Result`] containing a [`CreateBucketResponse`](crate::s3::response::CreateBucketResponse).
    ///
    /// A `LocationConstraint` is sent when the client region is not `us-east-1`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use s3_quota_harness::s3::S3Client;
    /// use s3_quota_harness::s3::creds::StaticProvider;
    /// use s3_quota_harness::s3::types::S3Api;
    /// use s3_quota_harness::s3::response::a_response_traits::HasBucket;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let base_url = "http://127.0.0.1:9000".parse().unwrap();
    ///     let provider = StaticProvider::new("access", "secret", None);
    ///     let client = S3Client::new(base_url, Some(provider), None).unwrap();
    ///     let resp = client.create_bucket("bucket-name").build().send().await.unwrap();
    ///     println!("made bucket '{}'", resp.bucket());
    /// }
    /// ```
    pub fn create_bucket<S: Into<String>>(&self, bucket: S) -> CreateBucketBldr {
        CreateBucket::builder()
            .client(self.clone())
            .bucket(bucket)
    }
}
