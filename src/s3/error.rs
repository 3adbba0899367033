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

//! Error definitions for harness operations

use crate::s3::error_response::{ErrorCode, S3ServerError};
use thiserror::Error;

/// Errors raised before a request leaves the process.
#[derive(Debug, Error)]
pub enum ValidationErr {
    #[error("invalid bucket name '{name}': {reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("invalid object name: {0}")]
    InvalidObjectName(String),

    #[error("invalid user name: {0}")]
    InvalidUserName(String),

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error("unable to build url: {0}")]
    UrlBuildError(String),

    #[error("versioning status must be set")]
    MissingVersioningStatus,

    #[error("invalid quota limit: {0}")]
    InvalidQuotaLimit(String),
}

/// Errors raised while talking to the CSM REST API.
#[derive(Debug, Error)]
pub enum CsmError {
    #[error("login as {role} failed with HTTP status {status}")]
    LoginFailed { role: String, status: u16 },

    #[error("login as {role} returned no Authorization header")]
    MissingToken { role: String },

    #[error("no credentials configured for role {0}")]
    UnknownRole(String),

    #[error("response body is not a JSON object: {0}")]
    UnexpectedBody(String),
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationErr),

    #[error(transparent)]
    S3Server(#[from] S3ServerError),

    #[error(transparent)]
    Csm(#[from] CsmError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml parse error: {0}")]
    XmlParse(#[from] xmltree::ParseError),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    HeaderToStr(#[from] reqwest::header::ToStrError),

    #[error("invalid integer: {0}")]
    Int(#[from] std::num::ParseIntError),

    #[error("time parse error: {0}")]
    TimeParse(#[from] chrono::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the server error code when this error came back from the
    /// S3 or IAM endpoint.
    pub fn server_code(&self) -> Option<&ErrorCode> {
        match self {
            Error::S3Server(e) => Some(e.code()),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
