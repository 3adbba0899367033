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

use super::http::{BaseUrl, DEFAULT_REGION, Url};
use super::multimap::{Multimap, MultimapExt};

// ===========================
// Url Tests
// ===========================

#[test]
fn test_url_host_header_value() {
    let mut url = Url {
        https: true,
        host: "example.com".to_string(),
        port: 9000,
        path: "/".to_string(),
        query: Multimap::default(),
    };
    assert_eq!(url.host_header_value(), "example.com:9000");
    url.port = 0;
    assert_eq!(url.host_header_value(), "example.com");
}

#[test]
fn test_url_display_http_with_query() {
    let mut query = Multimap::default();
    query.add("versions", "");
    let url = Url {
        https: false,
        host: "localhost".to_string(),
        port: 9000,
        path: "/bucket".to_string(),
        query,
    };
    assert_eq!(url.to_string(), "http://localhost:9000/bucket?versions=");
}

#[test]
fn test_url_display_empty_host() {
    let url = Url {
        path: "test".to_string(),
        ..Default::default()
    };
    assert_eq!(url.to_string(), "https://<invalid-host>/test");
}

// ===========================
// BaseUrl Tests
// ===========================

#[test]
fn test_base_url_parse_http_with_port() {
    let base: BaseUrl = "http://127.0.0.1:9000".parse().unwrap();
    assert!(!base.https);
    assert_eq!(base.host(), "127.0.0.1");
    assert_eq!(base.port(), 9000);
    assert_eq!(base.region, DEFAULT_REGION);
}

#[test]
fn test_base_url_default_ports_are_dropped() {
    let base: BaseUrl = "https://s3.example.com:443/".parse().unwrap();
    assert!(base.https);
    assert_eq!(base.port(), 0);

    let base: BaseUrl = "http://s3.example.com:80".parse().unwrap();
    assert_eq!(base.port(), 0);
}

#[test]
fn test_base_url_without_scheme_is_https() {
    let base: BaseUrl = "s3.example.com:9443".parse().unwrap();
    assert!(base.https);
    assert_eq!(base.port(), 9443);
}

#[test]
fn test_base_url_rejects_path_query_and_scheme() {
    assert!("http://host:9000/some/path".parse::<BaseUrl>().is_err());
    assert!("http://host:9000/?a=b".parse::<BaseUrl>().is_err());
    assert!("ftp://host".parse::<BaseUrl>().is_err());
}

#[test]
fn test_base_url_with_region() {
    let base: BaseUrl = "http://host".parse().unwrap();
    assert_eq!(base.clone().with_region("").region, DEFAULT_REGION);
    assert_eq!(base.with_region("eu-west-1").region, "eu-west-1");
}

#[test]
fn test_build_url_paths() {
    let base: BaseUrl = "http://host:9000".parse().unwrap();
    let q = Multimap::new();

    assert_eq!(base.build_url(&q, None, None).unwrap().path, "/");
    assert_eq!(base.build_url(&q, Some("bkt"), None).unwrap().path, "/bkt");
    let url = base
        .build_url(&q, Some("bkt"), Some("dir/created obj"))
        .unwrap();
    assert_eq!(url.path, "/bkt/dir/created%20obj");
    assert_eq!(url.to_string(), "http://host:9000/bkt/dir/created%20obj");
    assert!(base.build_url(&q, None, Some("orphan")).is_err());
}
