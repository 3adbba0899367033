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

//! Tests for the Signature V4 implementation, using the published AWS
//! test vectors where they exist.

use super::header_constants::{HOST, X_AMZ_CONTENT_SHA256, X_AMZ_DATE};
use super::multimap::{Multimap, MultimapExt};
use super::signer::{
    get_canonical_request_hash, get_scope, get_signature, get_signing_key, get_string_to_sign,
    sign_v4_iam, sign_v4_s3,
};
use super::utils::EMPTY_SHA256;
use chrono::{TimeZone, Utc};
use http::Method;

const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

fn vanilla_date() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
}

#[test]
fn test_signing_key_matches_aws_example() {
    let date = Utc.with_ymd_and_hms(2012, 2, 15, 0, 0, 0).unwrap();
    let key = get_signing_key(EXAMPLE_SECRET, date, "us-east-1", "iam");
    assert_eq!(
        hex::encode(key),
        "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
    );
}

#[test]
fn test_get_vanilla_signature() {
    let date = vanilla_date();
    let mut headers = Multimap::new();
    headers.add(HOST, "example.amazonaws.com");
    headers.add(X_AMZ_DATE, "20150830T123600Z");

    let (signed_headers, canonical_headers) = headers.get_canonical_headers();
    assert_eq!(signed_headers, "host;x-amz-date");

    let hash = get_canonical_request_hash(
        &Method::GET,
        "/",
        "",
        &canonical_headers,
        &signed_headers,
        EMPTY_SHA256,
    );
    let scope = get_scope(date, "us-east-1", "service");
    assert_eq!(scope, "20150830/us-east-1/service/aws4_request");

    let string_to_sign = get_string_to_sign(date, &scope, &hash);
    let key = get_signing_key(EXAMPLE_SECRET, date, "us-east-1", "service");
    assert_eq!(
        get_signature(&key, string_to_sign.as_bytes()),
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
    );
}

fn signed_headers(sign_iam: bool) -> Multimap {
    let mut headers = Multimap::new();
    headers.add(HOST, "127.0.0.1:9000");
    headers.add(X_AMZ_CONTENT_SHA256, EMPTY_SHA256);
    headers.add(X_AMZ_DATE, "20150830T123600Z");
    let query = Multimap::new();
    if sign_iam {
        sign_v4_iam(
            &Method::POST,
            "/",
            "us-east-1",
            &mut headers,
            &query,
            "AKIDEXAMPLE",
            EXAMPLE_SECRET,
            EMPTY_SHA256,
            vanilla_date(),
        );
    } else {
        sign_v4_s3(
            &Method::POST,
            "/",
            "us-east-1",
            &mut headers,
            &query,
            "AKIDEXAMPLE",
            EXAMPLE_SECRET,
            EMPTY_SHA256,
            vanilla_date(),
        );
    }
    headers
}

#[test]
fn test_sign_v4_s3_adds_authorization_header() {
    let headers = signed_headers(false);
    let auth = headers.get("Authorization").unwrap();
    assert!(auth.starts_with(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/s3/aws4_request, "
    ));
    assert!(auth.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date, "));
    let signature = auth.rsplit("Signature=").next().unwrap();
    assert_eq!(signature.len(), 64);
}

#[test]
fn test_sign_v4_service_changes_scope_and_signature() {
    let s3 = signed_headers(false).get("Authorization").unwrap().clone();
    let iam = signed_headers(true).get("Authorization").unwrap().clone();
    assert!(iam.contains("/us-east-1/iam/aws4_request"));
    assert_ne!(s3, iam);
}

#[test]
fn test_sign_v4_is_deterministic() {
    assert_eq!(
        signed_headers(false).get("Authorization"),
        signed_headers(false).get("Authorization")
    );
}
