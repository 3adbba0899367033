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
use crate::s3::builders::{GetBucketVersioning, GetBucketVersioningBldr};

impl S3Client {
    /// Creates a [`GetBucketVersioning`] request builder.
    ///
    /// To execute the request, call [`GetBucketVersioning::send()`](crate::s3::types::S3Api::send),
    /// which returns a [`Result`] containing a [`GetBucketVersioningResponse`](crate::s3::response::GetBucketVersioningResponse).
    pub fn get_bucket_versioning<S: Into<String>>(&self, bucket: S) -> GetBucketVersioningBldr {
        GetBucketVersioning::builder()
            .client(self.clone())
            .bucket(bucket)
    }
}
