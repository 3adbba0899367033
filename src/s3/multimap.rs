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

use crate::s3::header_constants::VERSION_ID;
use lazy_static::lazy_static;
use multimap::MultiMap;
use regex::Regex;
use std::collections::BTreeMap;
use urlencoding::encode as urlencode;

/// Multimap for string key and string value, used for headers and query parameters
pub type Multimap = MultiMap<String, String>;

pub trait MultimapExt {
    /// Adds a key-value pair to the multimap
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V);

    /// Adds a key-value pair when the value is present
    fn add_opt<K: Into<String>>(&mut self, key: K, value: Option<String>);

    /// Adds the `versionId` query parameter when a version is given
    fn add_version(&mut self, version: Option<String>);

    /// Converts multimap to HTTP query string
    fn to_query_string(&self) -> String;

    /// Converts multimap to canonical query string
    fn get_canonical_query_string(&self) -> String;

    /// Converts multimap to signed headers and canonical headers
    fn get_canonical_headers(&self) -> (String, String);
}

impl MultimapExt for Multimap {
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.insert(key.into(), value.into());
    }

    fn add_opt<K: Into<String>>(&mut self, key: K, value: Option<String>) {
        if let Some(v) = value {
            self.insert(key.into(), v);
        }
    }

    fn add_version(&mut self, version: Option<String>) {
        self.add_opt(VERSION_ID, version);
    }

    fn to_query_string(&self) -> String {
        let mut query = String::new();
        for (key, values) in self.iter_all() {
            for value in values {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&urlencode(key));
                query.push('=');
                query.push_str(&urlencode(value));
            }
        }
        query
    }

    fn get_canonical_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = self
            .iter_all()
            .flat_map(|(k, vs)| {
                vs.iter()
                    .map(move |v| (urlencode(k).into_owned(), urlencode(v).into_owned()))
            })
            .collect();
        pairs.sort();

        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn get_canonical_headers(&self) -> (String, String) {
        lazy_static! {
            static ref MULTI_SPACE_REGEX: Regex = Regex::new("( +)").unwrap();
        }
        let mut btmap: BTreeMap<String, String> = BTreeMap::new();

        for (k, values) in self.iter_all() {
            let key = k.to_lowercase();
            if "authorization" == key || "user-agent" == key {
                continue;
            }

            let mut vs = values.clone();
            vs.sort();

            let value = vs
                .iter()
                .map(|v| MULTI_SPACE_REGEX.replace_all(v, " ").trim().to_string())
                .collect::<Vec<_>>()
                .join(",");
            btmap.insert(key, value);
        }

        let signed_headers = btmap.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical_headers = btmap
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join("\n");

        (signed_headers, canonical_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_query_is_sorted_and_encoded() {
        let mut q = Multimap::new();
        q.add("prefix", "a b/");
        q.add("list-type", "2");
        q.add("versions", "");
        assert_eq!(
            q.get_canonical_query_string(),
            "list-type=2&prefix=a%20b%2F&versions="
        );
    }

    #[test]
    fn canonical_headers_skip_authorization_and_collapse_spaces() {
        let mut h = Multimap::new();
        h.add("Host", "127.0.0.1:9000");
        h.add("X-Amz-Date", "20250101T000000Z");
        h.add("Authorization", "ignored");
        h.add("User-Agent", "ignored");
        h.add("X-Custom", "  a   b ");
        let (signed, canonical) = h.get_canonical_headers();
        assert_eq!(signed, "host;x-amz-date;x-custom");
        assert_eq!(
            canonical,
            "host:127.0.0.1:9000\nx-amz-date:20250101T000000Z\nx-custom:a b"
        );
    }

    #[test]
    fn add_version_is_noop_for_none() {
        let mut q = Multimap::new();
        q.add_version(None);
        assert!(q.is_empty());
        q.add_version(Some("v1".into()));
        assert_eq!(q.get("versionId").map(String::as_str), Some("v1"));
    }
}
