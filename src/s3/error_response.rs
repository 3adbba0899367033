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

use crate::s3::utils::{get_text_default, get_text_option};
use bytes::{Buf, Bytes};
use http::{HeaderMap, Method, StatusCode};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use xmltree::Element;

/// Error codes returned by the S3 and IAM endpoints.
///
/// Codes the harness reasons about have their own variant; anything else is
/// kept verbatim in [`ErrorCode::Other`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorCode {
    #[default]
    NoError,
    AccessDenied,
    BucketAlreadyExists,
    BucketAlreadyOwnedByYou,
    BucketNotEmpty,
    EntityAlreadyExists,
    EntityTooLarge,
    MethodNotAllowed,
    NoSuchBucket,
    NoSuchEntity,
    NoSuchKey,
    NoSuchVersion,
    QuotaExceeded,
    ResourceConflict,
    ResourceNotFound,
    Other(String),
}

impl FromStr for ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(match s.to_lowercase().as_str() {
            "" | "noerror" => ErrorCode::NoError,
            "accessdenied" => ErrorCode::AccessDenied,
            "bucketalreadyexists" => ErrorCode::BucketAlreadyExists,
            "bucketalreadyownedbyyou" => ErrorCode::BucketAlreadyOwnedByYou,
            "bucketnotempty" => ErrorCode::BucketNotEmpty,
            "entityalreadyexists" => ErrorCode::EntityAlreadyExists,
            "entitytoolarge" => ErrorCode::EntityTooLarge,
            "methodnotallowed" => ErrorCode::MethodNotAllowed,
            "nosuchbucket" => ErrorCode::NoSuchBucket,
            "nosuchentity" => ErrorCode::NoSuchEntity,
            "nosuchkey" => ErrorCode::NoSuchKey,
            "nosuchversion" => ErrorCode::NoSuchVersion,
            "quotaexceeded" => ErrorCode::QuotaExceeded,
            "resourceconflict" => ErrorCode::ResourceConflict,
            "resourcenotfound" => ErrorCode::ResourceNotFound,
            _ => ErrorCode::Other(s.to_owned()),
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NoError => "NoError",
            ErrorCode::AccessDenied => "AccessDenied",
            ErrorCode::BucketAlreadyExists => "BucketAlreadyExists",
            ErrorCode::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            ErrorCode::BucketNotEmpty => "BucketNotEmpty",
            ErrorCode::EntityAlreadyExists => "EntityAlreadyExists",
            ErrorCode::EntityTooLarge => "EntityTooLarge",
            ErrorCode::MethodNotAllowed => "MethodNotAllowed",
            ErrorCode::NoSuchBucket => "NoSuchBucket",
            ErrorCode::NoSuchEntity => "NoSuchEntity",
            ErrorCode::NoSuchKey => "NoSuchKey",
            ErrorCode::NoSuchVersion => "NoSuchVersion",
            ErrorCode::QuotaExceeded => "QuotaExceeded",
            ErrorCode::ResourceConflict => "ResourceConflict",
            ErrorCode::ResourceNotFound => "ResourceNotFound",
            ErrorCode::Other(v) => v,
        };
        f.write_str(s)
    }
}

/// Error document returned by the server for a failed S3 or IAM call.
#[derive(Clone, Debug)]
pub struct S3ServerError {
    status: StatusCode,
    code: ErrorCode,
    message: Option<String>,
    headers: HeaderMap,
    resource: String,
    request_id: String,
    host_id: String,
    bucket_name: Option<String>,
    object_name: Option<String>,
}

impl S3ServerError {
    /// Builds the error for a non-success response.
    ///
    /// XML bodies are parsed in both the S3 form (`<Error>` at the root) and
    /// the IAM form (`<ErrorResponse><Error>`). When the body is empty, as
    /// for HEAD requests, the code is derived from the status.
    pub fn from_response(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        method: &Method,
        resource: &str,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
    ) -> Self {
        if !body.is_empty() {
            if let Ok(root) = Element::parse(body.clone().reader()) {
                return Self::from_xml(status, headers, &root, resource, bucket_name, object_name);
            }
            log::debug!(
                "unparsable error body for {method} {resource}: {}",
                String::from_utf8_lossy(&body)
            );
        }

        let (code, message) = match status {
            StatusCode::FORBIDDEN => (ErrorCode::AccessDenied, "Access denied"),
            StatusCode::NOT_FOUND => match (object_name, bucket_name) {
                (Some(_), _) => (ErrorCode::NoSuchKey, "Object does not exist"),
                (None, Some(_)) => (ErrorCode::NoSuchBucket, "Bucket does not exist"),
                (None, None) => (ErrorCode::ResourceNotFound, "Request resource not found"),
            },
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => (
                ErrorCode::MethodNotAllowed,
                "The specified method is not allowed against this resource",
            ),
            StatusCode::CONFLICT => (ErrorCode::ResourceConflict, "Request resource conflicts"),
            _ => (
                ErrorCode::Other(status.as_u16().to_string()),
                status.canonical_reason().unwrap_or("Unknown status"),
            ),
        };

        let header_text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let request_id = header_text("x-amz-request-id");
        let host_id = header_text("x-amz-id-2");

        Self {
            status,
            code,
            message: Some(message.to_string()),
            headers,
            resource: resource.to_string(),
            request_id,
            host_id,
            bucket_name: bucket_name.map(String::from),
            object_name: object_name.map(String::from),
        }
    }

    fn from_xml(
        status: StatusCode,
        headers: HeaderMap,
        root: &Element,
        resource: &str,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
    ) -> Self {
        // IAM wraps the error one level deeper and keeps RequestId outside it.
        let (error, request_id) = match root.name.as_str() {
            "ErrorResponse" => (
                root.get_child("Error").unwrap_or(root),
                get_text_default(root, "RequestId"),
            ),
            _ => (root, get_text_default(root, "RequestId")),
        };

        let code = get_text_default(error, "Code")
            .parse::<ErrorCode>()
            .unwrap_or_default();
        let resource = get_text_option(error, "Resource").unwrap_or_else(|| resource.to_string());

        Self {
            status,
            code,
            message: get_text_option(error, "Message"),
            headers,
            resource,
            request_id,
            host_id: get_text_default(error, "HostId"),
            bucket_name: get_text_option(error, "BucketName").or(bucket_name.map(String::from)),
            object_name: get_text_option(error, "Key").or(object_name.map(String::from)),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
    pub fn code(&self) -> &ErrorCode {
        &self.code
    }
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
    pub fn resource(&self) -> &str {
        &self.resource
    }
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
    pub fn host_id(&self) -> &str {
        &self.host_id
    }
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }
    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }
}

impl fmt::Display for S3ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "server returned {}: code: {}, message: {:?}, resource: {}, request_id: {}, bucket_name: {:?}, object_name: {:?}",
            self.status,
            self.code,
            self.message,
            self.resource,
            self.request_id,
            self.bucket_name,
            self.object_name,
        )
    }
}

impl std::error::Error for S3ServerError {}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ERROR_CODES: &[ErrorCode] = &[
        ErrorCode::NoError,
        ErrorCode::AccessDenied,
        ErrorCode::BucketAlreadyExists,
        ErrorCode::BucketAlreadyOwnedByYou,
        ErrorCode::BucketNotEmpty,
        ErrorCode::EntityAlreadyExists,
        ErrorCode::EntityTooLarge,
        ErrorCode::MethodNotAllowed,
        ErrorCode::NoSuchBucket,
        ErrorCode::NoSuchEntity,
        ErrorCode::NoSuchKey,
        ErrorCode::NoSuchVersion,
        ErrorCode::QuotaExceeded,
        ErrorCode::ResourceConflict,
        ErrorCode::ResourceNotFound,
    ];

    #[test]
    fn error_code_roundtrip() {
        for code in ALL_ERROR_CODES {
            let s = code.to_string();
            let parsed: ErrorCode = s.parse().unwrap();
            assert_eq!(parsed, *code, "code {code} -> '{s}' -> {parsed}");
        }
    }

    #[test]
    fn unknown_code_is_kept_verbatim() {
        let code: ErrorCode = "XMinioStorageFull".parse().unwrap();
        assert_eq!(code, ErrorCode::Other("XMinioStorageFull".into()));
        assert_eq!(code.to_string(), "XMinioStorageFull");
    }

    #[test]
    fn parses_s3_error_document() {
        let body = Bytes::from_static(
            b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
              <Error><Code>QuotaExceeded</Code><Message>Quota exceeded</Message>\
              <Resource>/bkt/obj</Resource><RequestId>r-1</RequestId>\
              <BucketName>bkt</BucketName><Key>obj</Key></Error>",
        );
        let err = S3ServerError::from_response(
            StatusCode::FORBIDDEN,
            HeaderMap::new(),
            body,
            &Method::PUT,
            "/bkt/obj",
            Some("bkt"),
            Some("obj"),
        );
        assert_eq!(err.code(), &ErrorCode::QuotaExceeded);
        assert_eq!(err.message(), Some("Quota exceeded"));
        assert_eq!(err.request_id(), "r-1");
        assert_eq!(err.bucket_name(), Some("bkt"));
        assert_eq!(err.object_name(), Some("obj"));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn parses_iam_error_document() {
        let body = Bytes::from_static(
            b"<ErrorResponse><Error><Type>Sender</Type><Code>EntityAlreadyExists</Code>\
              <Message>User already exists</Message></Error><RequestId>iam-7</RequestId></ErrorResponse>",
        );
        let err = S3ServerError::from_response(
            StatusCode::CONFLICT,
            HeaderMap::new(),
            body,
            &Method::POST,
            "/",
            None,
            None,
        );
        assert_eq!(err.code(), &ErrorCode::EntityAlreadyExists);
        assert_eq!(err.request_id(), "iam-7");
        assert_eq!(err.resource(), "/");
    }

    #[test]
    fn head_not_found_without_body() {
        let err = S3ServerError::from_response(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            Bytes::new(),
            &Method::HEAD,
            "/bkt/obj",
            Some("bkt"),
            Some("obj"),
        );
        assert_eq!(err.code(), &ErrorCode::NoSuchKey);

        let err = S3ServerError::from_response(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            Bytes::new(),
            &Method::HEAD,
            "/bkt",
            Some("bkt"),
            None,
        );
        assert_eq!(err.code(), &ErrorCode::NoSuchBucket);
    }

    #[test]
    fn unexpected_status_keeps_number() {
        let err = S3ServerError::from_response(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderMap::new(),
            Bytes::new(),
            &Method::GET,
            "/",
            None,
            None,
        );
        assert_eq!(err.code(), &ErrorCode::Other("503".into()));
    }
}
