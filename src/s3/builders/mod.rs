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

//! Argument builders for S3 API operations

mod bucket_common;
mod create_bucket;
mod delete_bucket;
mod delete_object;
mod get_bucket_versioning;
mod get_object;
mod head_object;
mod list_buckets;
mod list_object_versions;
mod list_objects;
mod put_bucket_versioning;
mod put_object;

pub use bucket_common::*;
pub use create_bucket::*;
pub use delete_bucket::*;
pub use delete_object::*;
pub use get_bucket_versioning::*;
pub use get_object::*;
pub use head_object::*;
pub use list_buckets::*;
pub use list_object_versions::*;
pub use list_objects::*;
pub use put_bucket_versioning::*;
pub use put_object::*;
