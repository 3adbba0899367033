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

//! Endpoint and request URL handling

use crate::s3::error::ValidationErr;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::utils::urlencode_object_key;
use http::Uri;
use std::fmt;
use std::str::FromStr;

/// Region used when neither the endpoint nor the configuration names one.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone, Debug)]
/// Represents HTTP URL
pub struct Url {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Multimap,
}

impl Url {
    pub fn host_header_value(&self) -> String {
        if self.port > 0 {
            return format!("{}:{}", self.host, self.port);
        }
        self.host.clone()
    }
}

impl Default for Url {
    fn default() -> Self {
        Self {
            https: true,
            host: String::default(),
            port: u16::default(),
            path: String::default(),
            query: Multimap::default(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(if self.https { "https://" } else { "http://" })?;

        if self.host.is_empty() {
            f.write_str("<invalid-host>")?;
        } else {
            f.write_str(&self.host_header_value())?;
        }

        if !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;

        if !self.query.is_empty() {
            f.write_str("?")?;
            f.write_str(&self.query.to_query_string())?;
        }

        Ok(())
    }
}

/// Base URL of an S3 or IAM endpoint.
///
/// Requests are always built path-style (`/bucket/key`), which is what
/// self-hosted S3-compatible services expect.
#[derive(Clone, Debug)]
pub struct BaseUrl {
    pub https: bool,
    host: String,
    port: u16,
    pub region: String,
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self {
            https: true,
            host: "127.0.0.1".to_string(),
            port: 9000,
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl FromStr for BaseUrl {
    type Err = ValidationErr;

    /// Parses `http(s)://host[:port][/]`. A missing scheme means HTTPS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = s
            .parse::<Uri>()
            .map_err(|e| ValidationErr::InvalidBaseUrl(format!("{s}: {e}")))?;

        let https = match url.scheme_str() {
            None | Some("https") => true,
            Some("http") => false,
            Some(v) => {
                return Err(ValidationErr::InvalidBaseUrl(format!(
                    "scheme {v} is not supported in {s}"
                )));
            }
        };

        let host = url
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ValidationErr::InvalidBaseUrl(format!("missing host in {s}")))?
            .to_string();

        let mut port = url.port_u16().unwrap_or(0);
        if (https && port == 443) || (!https && port == 80) {
            port = 0;
        }

        if !url.path().is_empty() && url.path() != "/" {
            return Err(ValidationErr::InvalidBaseUrl(format!(
                "path in endpoint is not supported: {s}"
            )));
        }
        if url.query().is_some() {
            return Err(ValidationErr::InvalidBaseUrl(format!(
                "query in endpoint is not supported: {s}"
            )));
        }

        Ok(BaseUrl {
            https,
            host,
            port,
            region: DEFAULT_REGION.to_string(),
        })
    }
}

impl BaseUrl {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Sets the signing region, keeping the default when `region` is empty.
    pub fn with_region(mut self, region: &str) -> Self {
        if !region.is_empty() {
            self.region = region.to_string();
        }
        self
    }

    /// Builds the URL of a bucket or object request.
    pub fn build_url(
        &self,
        query: &Multimap,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
    ) -> Result<Url, ValidationErr> {
        let mut path = String::from("/");
        match (bucket_name, object_name) {
            (None, Some(o)) => {
                return Err(ValidationErr::UrlBuildError(format!(
                    "object {o} given without a bucket"
                )));
            }
            (Some(b), None) => path.push_str(b),
            (Some(b), Some(o)) => {
                path.push_str(b);
                path.push('/');
                path.push_str(&urlencode_object_key(o));
            }
            (None, None) => {}
        }

        Ok(Url {
            https: self.https,
            host: self.host.clone(),
            port: self.port,
            path,
            query: query.clone(),
        })
    }
}
