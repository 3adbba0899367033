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

//! # S3 quota harness
//!
//! Helpers for validating the quota and versioning behaviour of an
//! S3-compatible object store. Three surfaces are covered:
//!
//! - the CSM administrative REST API, used to get and set user or bucket
//!   quotas ([`csm`]),
//! - the IAM query API, used to create and delete users ([`iam`]),
//! - the S3 data plane, used to create buckets and objects and to exercise
//!   object versioning ([`s3`], [`misc`], [`versioning`]).
//!
//! Every S3 and IAM call is a request builder that is executed with
//! `send().await` and yields a typed response:
//!
//! ```no_run
//! use s3_quota_harness::config::HarnessConfig;
//! use s3_quota_harness::s3::S3Client;
//! use s3_quota_harness::s3::types::S3Api;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HarnessConfig::from_env().unwrap();
//!     let client = S3Client::from_config(&config, "access", "secret").unwrap();
//!     let resp = client.list_buckets().build().send().await.unwrap();
//!     for bucket in resp.buckets() {
//!         println!("{}", bucket.name);
//!     }
//! }
//! ```
//!
//! The quota verification flow lives in [`csm::GetSetQuota`]: set a quota
//! through CSM, read it back, then check that S3 writes past the limit are
//! rejected.

#![allow(clippy::result_large_err)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod csm;
pub mod iam;
pub mod misc;
pub mod s3;
pub mod versioning;

pub use s3::error::{Error, Result};

#[cfg(test)]
#[macro_use]
extern crate quickcheck;
