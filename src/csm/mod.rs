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

//! CSM (Cluster Storage Management) REST client
//!
//! Every call logs in as the requested [`LoginAs`] role first and sends the
//! returned `Authorization` token with the request. Responses are handed back
//! as [`RestResponse`] whatever their status, since the quota checks assert
//! on the status themselves.

use crate::config::HarnessConfig;
use crate::s3::error::{CsmError, Error};
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::mem;

mod limits;
mod quota;

pub use crate::config::LoginAs;
pub use quota::*;

/// Status, headers and raw body of a CSM REST call.
#[derive(Clone, Debug)]
pub struct RestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RestResponse {
    async fn read(mut resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status();
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body: Bytes = resp.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns the body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client of the CSM REST API.
#[derive(Clone, Debug)]
pub struct CsmRestClient {
    http_client: reqwest::Client,
    config: HarnessConfig,
}

impl CsmRestClient {
    /// Creates a client for `config.csm_endpoint`.
    pub fn new(config: &HarnessConfig) -> Result<Self, Error> {
        #[allow(unused_mut)]
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("s3-quota-harness/", env!("CARGO_PKG_VERSION")));

        #[cfg(any(
            feature = "default-tls",
            feature = "native-tls",
            feature = "rustls-tls"
        ))]
        {
            builder = builder.danger_accept_invalid_certs(config.ignore_cert_check);
        }

        Ok(Self {
            http_client: builder.build()?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.csm_endpoint.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Logs in as `role` and returns the bearer token to send as `Authorization`.
    pub async fn login(&self, role: LoginAs) -> Result<String, Error> {
        let user = self.config.csm_user(role)?;
        log::debug!("CSM login as {role} ({})", user.username);

        let resp = self
            .http_client
            .post(self.url(&self.config.login_path))
            .json(&LoginBody {
                username: &user.username,
                password: &user.password,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            log::error!("CSM login as {role} failed with {status}");
            return Err(CsmError::LoginFailed {
                role: role.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        match resp.headers().get(AUTHORIZATION) {
            Some(v) => Ok(v.to_str()?.to_string()),
            None => Err(CsmError::MissingToken {
                role: role.to_string(),
            }
            .into()),
        }
    }

    /// Returns headers carrying a fresh token of `role`.
    pub async fn auth_headers(&self, role: LoginAs) -> Result<HeaderMap, Error> {
        let token = self.login(role).await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            token
                .parse()
                .map_err(|_| CsmError::MissingToken {
                    role: role.to_string(),
                })?,
        );
        Ok(headers)
    }

    /// Sends `method` to `endpoint` with `headers` and an optional JSON body.
    pub async fn rest_call<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        headers: HeaderMap,
        json: Option<&T>,
    ) -> Result<RestResponse, Error> {
        let url = self.url(endpoint);
        log::debug!("{method} {url}");

        let mut req = self.http_client.request(method.clone(), url).headers(headers);
        if let Some(body) = json {
            req = req.json(body);
        }

        let resp = RestResponse::read(req.send().await?).await?;
        log::debug!("{method} {endpoint} returned {}", resp.status);
        Ok(resp)
    }
}
