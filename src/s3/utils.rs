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

//! Various utility and helper functions

use crate::s3::error::{Error, ValidationErr};
use crate::s3::multimap::Multimap;
use chrono::{DateTime, NaiveDateTime, ParseError, Utc};
use lazy_static::lazy_static;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use sha2::{Digest, Sha256};
use xmltree::Element;

/// Date and time with UTC timezone
pub type UtcTime = DateTime<Utc>;

/// SHA256 of an empty payload
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Gets hex encoded SHA256 hash of given data
pub fn sha256_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Gets current UTC time
pub fn utc_now() -> UtcTime {
    Utc::now()
}

/// Gets signer date value of given time
pub fn to_signer_date(time: UtcTime) -> String {
    time.format("%Y%m%d").to_string()
}

/// Gets AMZ date value of given time
pub fn to_amz_date(time: UtcTime) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parses ISO8601 UTC formatted value to time
pub fn from_iso8601utc(s: &str) -> Result<UtcTime, ParseError> {
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(
        match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S.%3fZ") {
            Ok(d) => d,
            _ => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")?,
        },
        Utc,
    ))
}

/// Parses HTTP header value to time
pub fn from_http_header_value(s: &str) -> Result<UtcTime, ParseError> {
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(
        NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT")?,
        Utc,
    ))
}

const OBJECT_KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encodes an object key for use in a URL path, keeping `/` intact.
pub fn urlencode_object_key(key: &str) -> String {
    utf8_percent_encode(key, OBJECT_KEY_ENCODE_SET).collect()
}

/// Strips the surrounding quotes S3 puts around ETag values.
pub fn trim_quotes(mut s: String) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s.drain(0..1);
        s.pop();
    }
    s
}

/// Returns `data` (or an empty map) with `key` added as a value-less query parameter,
/// as used by sub-resource requests such as `?versioning`.
pub fn insert(data: Option<Multimap>, key: impl Into<String>) -> Multimap {
    let mut result: Multimap = data.unwrap_or_default();
    result.insert(key.into(), String::new());
    result
}

/// Validates given bucket name against the strict S3 naming rules
pub fn check_bucket_name(bucket_name: &str) -> Result<(), ValidationErr> {
    lazy_static! {
        static ref IPV4_REGEX: Regex = Regex::new(
            r"^((25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])$"
        )
        .unwrap();
        static ref VALID_BUCKET_NAME_STRICT_REGEX: Regex =
            Regex::new("^[a-z0-9][a-z0-9\\.\\-]{1,61}[a-z0-9]$").unwrap();
    }

    let invalid = |reason: &str| ValidationErr::InvalidBucketName {
        name: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.trim().is_empty() {
        return Err(invalid("bucket name cannot be empty"));
    }
    if bucket_name.len() < 3 {
        return Err(invalid("bucket name cannot be less than 3 characters"));
    }
    if bucket_name.len() > 63 {
        return Err(invalid("bucket name cannot be greater than 63 characters"));
    }
    if IPV4_REGEX.is_match(bucket_name) {
        return Err(invalid("bucket name cannot be an IP address"));
    }
    if bucket_name.contains("..") || bucket_name.contains(".-") || bucket_name.contains("-.") {
        return Err(invalid(
            "bucket name contains invalid successive characters '..', '.-' or '-.'",
        ));
    }
    if !VALID_BUCKET_NAME_STRICT_REGEX.is_match(bucket_name) {
        return Err(invalid("bucket name does not follow S3 standards strictly"));
    }

    Ok(())
}

/// Validates given object name
pub fn check_object_name(object_name: &str) -> Result<(), ValidationErr> {
    if object_name.is_empty() {
        return Err(ValidationErr::InvalidObjectName(
            "object name cannot be empty".into(),
        ));
    }
    if object_name.len() > 1024 {
        return Err(ValidationErr::InvalidObjectName(format!(
            "object name '{object_name}' is longer than 1024 bytes"
        )));
    }
    Ok(())
}

/// Gets text value of given XML element for given tag.
pub fn get_text(element: &Element, tag: &str) -> Result<String, Error> {
    Ok(element
        .get_child(tag)
        .ok_or(Error::Xml(format!("<{tag}> tag not found")))?
        .get_text()
        .ok_or(Error::Xml(format!("text of <{tag}> tag not found")))?
        .to_string())
}

/// Gets optional text value of given XML element for given tag.
pub fn get_text_option(element: &Element, tag: &str) -> Option<String> {
    element
        .get_child(tag)
        .map(|v| v.get_text().unwrap_or_default().to_string())
}

/// Gets default text value of given XML element for given tag.
pub fn get_text_default(element: &Element, tag: &str) -> String {
    get_text_option(element, tag).unwrap_or_default()
}

/// Gets a `true`/`false` flag of given XML element for given tag, defaulting to false.
pub fn get_flag(element: &Element, tag: &str) -> bool {
    get_text_default(element, tag).eq_ignore_ascii_case("true")
}

/// Returns an iterator over the direct children of `element` named `tag`.
pub fn children_named<'a>(element: &'a Element, tag: &'a str) -> impl Iterator<Item = &'a Element> {
    element
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(move |e| e.name == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use quickcheck::TestResult;

    #[test]
    fn sha256_of_empty_payload() {
        assert_eq!(sha256_hash(b""), EMPTY_SHA256);
    }

    #[test]
    fn amz_and_signer_dates() {
        let t = from_iso8601utc("2015-08-30T12:36:00Z").unwrap();
        assert_eq!(to_amz_date(t), "20150830T123600Z");
        assert_eq!(to_signer_date(t), "20150830");
    }

    #[test]
    fn parses_iso8601_with_millis() {
        let t = from_iso8601utc("2024-02-03T04:05:06.789Z").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 2, 3));
        assert_eq!((t.hour(), t.minute(), t.second()), (4, 5, 6));
    }

    #[test]
    fn parses_http_date() {
        let t = from_http_header_value("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(to_amz_date(t), "20151021T072800Z");
    }

    #[test]
    fn object_keys_keep_slashes() {
        assert_eq!(urlencode_object_key("dir/a b+c.txt"), "dir/a%20b%2Bc.txt");
    }

    #[test]
    fn etag_quotes_are_trimmed() {
        assert_eq!(trim_quotes("\"abc\"".into()), "abc");
        assert_eq!(trim_quotes("abc".into()), "abc");
        assert_eq!(trim_quotes("\"".into()), "\"");
    }

    #[test]
    fn bucket_name_rules() {
        assert!(check_bucket_name("iam-user-bucket-1700000000").is_ok());
        assert!(check_bucket_name("ab").is_err());
        assert!(check_bucket_name("Upper").is_err());
        assert!(check_bucket_name("192.168.1.1").is_err());
        assert!(check_bucket_name("a..b").is_err());
        assert!(check_bucket_name("-abc").is_err());
        assert!(check_bucket_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn object_name_rules() {
        assert!(check_object_name("created_obj1").is_ok());
        assert!(check_object_name("").is_err());
        assert!(check_object_name(&"k".repeat(1025)).is_err());
    }

    quickcheck! {
        fn lowercase_alnum_names_are_valid(name: String) -> TestResult {
            let name: String = name
                .chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                .take(63)
                .collect();
            if name.len() < 3 {
                return TestResult::discard();
            }
            TestResult::from_bool(check_bucket_name(&name).is_ok())
        }

        fn names_with_uppercase_are_rejected(prefix: String) -> bool {
            let prefix: String = prefix.chars().filter(|c| c.is_ascii_lowercase()).collect();
            let name = format!("{prefix}Bucket");
            check_bucket_name(&name).is_err()
        }
    }

    #[test]
    fn xml_helpers() {
        let root = Element::parse(
            "<R><A>1</A><B></B><C>true</C><I>x</I><I>y</I></R>".as_bytes(),
        )
        .unwrap();
        assert_eq!(get_text(&root, "A").unwrap(), "1");
        assert!(get_text(&root, "Z").is_err());
        assert_eq!(get_text_option(&root, "B"), Some(String::new()));
        assert_eq!(get_text_default(&root, "Z"), "");
        assert!(get_flag(&root, "C"));
        assert!(!get_flag(&root, "A"));
        let items: Vec<_> = children_named(&root, "I")
            .map(|e| e.get_text().unwrap().to_string())
            .collect();
        assert_eq!(items, vec!["x", "y"]);
    }
}
