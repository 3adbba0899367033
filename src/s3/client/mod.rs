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

//! S3 client to perform bucket and object operations

use crate::config::HarnessConfig;
use crate::s3::creds::{Provider, StaticProvider};
use crate::s3::error::Error;
use crate::s3::error_response::S3ServerError;
use crate::s3::header_constants::*;
use crate::s3::http::BaseUrl;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::signer::{SigningService, sign_v4};
use crate::s3::utils::{EMPTY_SHA256, sha256_hash, to_amz_date, utc_now};
use bytes::Bytes;
use http::{HeaderMap, Method};
use std::mem;
use std::sync::Arc;

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

/// Builder for [`S3Client`].
#[derive(Debug)]
pub struct S3ClientBuilder {
    base_url: BaseUrl,
    provider: Option<Arc<dyn Provider + Send + Sync + 'static>>,
    ignore_cert_check: Option<bool>,
    app_info: Option<(String, String)>,
}

impl S3ClientBuilder {
    /// Creates a builder given a base URL for the endpoint.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            provider: None,
            ignore_cert_check: None,
            app_info: None,
        }
    }

    /// Set the credential provider. If not set anonymous requests are made.
    pub fn provider<P: Provider + Send + Sync + 'static>(mut self, provider: Option<P>) -> Self {
        self.provider = provider.map(|p| Arc::new(p) as Arc<dyn Provider + Send + Sync + 'static>);
        self
    }

    /// Skip TLS certificate verification, as needed for self-signed test clusters.
    pub fn ignore_cert_check(mut self, ignore_cert_check: Option<bool>) -> Self {
        self.ignore_cert_check = ignore_cert_check;
        self
    }

    /// Set the app info as an Option of (app_name, app_version) pair. This will
    /// show up in the client's user-agent.
    pub fn app_info(mut self, app_info: Option<(String, String)>) -> Self {
        self.app_info = app_info;
        self
    }

    /// Build the Client.
    pub fn build(self) -> Result<S3Client, Error> {
        let mut builder = reqwest::Client::builder().no_gzip();

        let mut user_agent = String::from("s3-quota-harness (")
            + std::env::consts::OS
            + "; "
            + std::env::consts::ARCH
            + ") s3-quota-harness/"
            + env!("CARGO_PKG_VERSION");

        if let Some((app_name, app_version)) = self.app_info {
            user_agent.push_str(format!(" {app_name}/{app_version}").as_str());
        }
        builder = builder.user_agent(user_agent);

        #[cfg(any(
            feature = "default-tls",
            feature = "native-tls",
            feature = "rustls-tls"
        ))]
        if let Some(v) = self.ignore_cert_check {
            builder = builder.danger_accept_invalid_certs(v);
        }

        Ok(S3Client {
            http_client: builder.build()?,
            shared: Arc::new(SharedClientItems {
                base_url: self.base_url,
                provider: self.provider,
            }),
        })
    }
}

/// Simple Storage Service (aka S3) client to perform bucket and object operations.
///
/// If credential provider is passed, all requests are signed using AWS
/// Signature Version 4; else they are performed anonymously. The same
/// transport is reused by the IAM client, which signs for the `iam` service.
#[derive(Clone, Debug)]
pub struct S3Client {
    http_client: reqwest::Client,
    pub(crate) shared: Arc<SharedClientItems>,
}

impl S3Client {
    /// Returns a S3 client with given base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use s3_quota_harness::s3::S3Client;
    /// use s3_quota_harness::s3::creds::StaticProvider;
    /// use s3_quota_harness::s3::http::BaseUrl;
    ///
    /// let base_url: BaseUrl = "http://127.0.0.1:9000".parse().unwrap();
    /// let static_provider = StaticProvider::new("AKIAEXAMPLE", "secret", None);
    /// let client = S3Client::new(base_url, Some(static_provider), None).unwrap();
    /// ```
    pub fn new<P: Provider + Send + Sync + 'static>(
        base_url: BaseUrl,
        provider: Option<P>,
        ignore_cert_check: Option<bool>,
    ) -> Result<Self, Error> {
        S3ClientBuilder::new(base_url)
            .provider(provider)
            .ignore_cert_check(ignore_cert_check)
            .build()
    }

    /// Returns a client for the configured S3 endpoint signing with the given key pair.
    pub fn from_config(
        config: &HarnessConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, Error> {
        Self::for_endpoint(config, &config.s3_endpoint, access_key, secret_key)
    }

    /// Returns a client for an arbitrary endpoint, taking region and TLS
    /// settings from `config`.
    pub(crate) fn for_endpoint(
        config: &HarnessConfig,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, Error> {
        let base_url = endpoint.parse::<BaseUrl>()?.with_region(&config.region);
        Self::new(
            base_url,
            Some(StaticProvider::new(access_key, secret_key, None)),
            Some(config.ignore_cert_check),
        )
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.shared.base_url
    }

    /// Returns whether this client talks HTTPS.
    pub fn is_secure(&self) -> bool {
        self.shared.base_url.https
    }

    /// Signs and sends a request for `service`, turning any non-success
    /// status into [`Error::S3Server`].
    pub(crate) async fn execute_signed(
        &self,
        service: SigningService,
        method: &Method,
        headers: &mut Multimap,
        query_params: &Multimap,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, Error> {
        let url = self
            .shared
            .base_url
            .build_url(query_params, bucket_name, object_name)?;

        headers.add(HOST, url.host_header_value());

        let sha256: String = match *method {
            Method::PUT | Method::POST => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.add(CONTENT_TYPE, APPLICATION_OCTET_STREAM);
                }
                headers.add(
                    CONTENT_LENGTH,
                    body.as_ref().map_or(0, |b| b.len()).to_string(),
                );
                match body {
                    None => EMPTY_SHA256.into(),
                    Some(ref v) => sha256_hash(v),
                }
            }
            _ => EMPTY_SHA256.into(),
        };
        headers.add(X_AMZ_CONTENT_SHA256, sha256.clone());

        let date = utc_now();
        headers.add(X_AMZ_DATE, to_amz_date(date));

        if let Some(p) = &self.shared.provider {
            let creds = p.fetch();
            if let Some(token) = creds.session_token {
                headers.add(X_AMZ_SECURITY_TOKEN, token);
            }
            sign_v4(
                service,
                method,
                &url.path,
                &self.shared.base_url.region,
                headers,
                query_params,
                &creds.access_key,
                &creds.secret_key,
                &sha256,
                date,
            );
        }

        log::debug!("{method} {url}");
        let mut req = self.http_client.request(method.clone(), url.to_string());

        for (key, values) in headers.iter_all() {
            for value in values {
                req = req.header(key, value);
            }
        }

        if (*method == Method::PUT) || (*method == Method::POST) {
            req = req.body(body.unwrap_or_default());
        }

        let mut resp = req.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body: Bytes = resp.bytes().await?;

        let e = S3ServerError::from_response(
            status,
            headers,
            body,
            method,
            &url.path,
            bucket_name,
            object_name,
        );
        log::debug!("{method} {url} failed: {e}");
        Err(Error::S3Server(e))
    }

    pub(crate) async fn execute(
        &self,
        method: Method,
        headers: &mut Multimap,
        query_params: &Multimap,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, Error> {
        self.execute_signed(
            SigningService::S3,
            &method,
            headers,
            query_params,
            bucket_name,
            object_name,
            body,
        )
        .await
    }
}

#[derive(Debug)]
pub(crate) struct SharedClientItems {
    pub(crate) base_url: BaseUrl,
    pub(crate) provider: Option<Arc<dyn Provider + Send + Sync + 'static>>,
}
