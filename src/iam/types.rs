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

//! Request plumbing and shared types of the IAM client

use crate::iam::IamClient;
use crate::s3::error::{Error, ValidationErr};
use crate::s3::header_constants::{APPLICATION_FORM_URLENCODED, CONTENT_TYPE};
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::signer::SigningService;
use crate::s3::utils::{UtcTime, from_iso8601utc, get_text, get_text_default, get_text_option};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use lazy_static::lazy_static;
use regex::Regex;
use xmltree::Element;

/// IAM API version sent with every action.
pub const IAM_API_VERSION: &str = "2010-05-08";

/// A single IAM action with its parameters.
#[derive(Clone, Debug)]
pub struct IamRequest {
    pub(crate) client: IamClient,
    action: String,
    params: Vec<(String, String)>,
}

impl IamRequest {
    pub fn new(client: IamClient, action: impl Into<String>) -> Self {
        Self {
            client,
            action: action.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter to the request form.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Adds a parameter when a value is present.
    pub fn param_opt(self, key: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the `application/x-www-form-urlencoded` body of this request.
    pub fn form_body(&self) -> String {
        let mut body = format!("Action={}", urlencoding::encode(&self.action));
        for (k, v) in &self.params {
            body.push('&');
            body.push_str(&urlencoding::encode(k));
            body.push('=');
            body.push_str(&urlencoding::encode(v));
        }
        body.push_str("&Version=");
        body.push_str(IAM_API_VERSION);
        body
    }

    /// Execute the request, returning the response. Only used in [`IamApi::send()`]
    pub async fn execute(&self) -> Result<reqwest::Response, Error> {
        let mut headers = Multimap::new();
        headers.add(CONTENT_TYPE, APPLICATION_FORM_URLENCODED);
        log::debug!("IAM {}", self.action);
        self.client
            .base_client()
            .execute_signed(
                SigningService::Iam,
                &Method::POST,
                &mut headers,
                &Multimap::new(),
                None,
                None,
                Some(Bytes::from(self.form_body())),
            )
            .await
    }
}

/// Trait for converting a request builder into an [`IamRequest`].
pub trait ToIamRequest: Sized {
    fn to_iam_request(self) -> Result<IamRequest, ValidationErr>;
}

/// Trait for converting IAM HTTP responses into typed responses.
#[async_trait]
pub trait FromIamResponse: Sized {
    async fn from_iam_response(
        request: IamRequest,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error>;
}

/// Common interface of all IAM request builders.
#[async_trait]
pub trait IamApi: ToIamRequest {
    type Response: FromIamResponse;

    /// Sends the IAM request and returns the corresponding typed response.
    async fn send(self) -> Result<Self::Response, Error> {
        let req: IamRequest = self.to_iam_request()?;
        let resp: Result<reqwest::Response, Error> = req.execute().await;
        Self::Response::from_iam_response(req, resp).await
    }
}

/// An IAM user as returned by `CreateUser` and `ListUsers`.
#[derive(Clone, Debug, PartialEq)]
pub struct IamUser {
    pub user_name: String,
    pub user_id: String,
    pub arn: String,
    pub path: String,
    pub create_date: Option<UtcTime>,
}

impl IamUser {
    pub(crate) fn from_xml(element: &Element) -> Result<Self, Error> {
        let create_date = match get_text_option(element, "CreateDate") {
            Some(v) if !v.is_empty() => Some(from_iso8601utc(&v)?),
            _ => None,
        };
        Ok(IamUser {
            user_name: get_text(element, "UserName")?,
            user_id: get_text_default(element, "UserId"),
            arn: get_text_default(element, "Arn"),
            path: get_text_default(element, "Path"),
            create_date,
        })
    }
}

/// Validates an IAM user name: 1 to 64 characters out of `[A-Za-z0-9+=,.@_-]`.
pub fn check_user_name(user_name: &str) -> Result<(), ValidationErr> {
    lazy_static! {
        static ref USER_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_+=,.@-]{1,64}$").unwrap();
    }
    if !USER_NAME_REGEX.is_match(user_name) {
        return Err(ValidationErr::InvalidUserName(format!(
            "'{user_name}' must be 1 to 64 characters of letters, digits or +=,.@_-"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::S3Client;
    use crate::s3::creds::StaticProvider;
    use crate::s3::http::BaseUrl;

    fn client() -> IamClient {
        let base_url: BaseUrl = "http://127.0.0.1:9080".parse().unwrap();
        let provider = StaticProvider::new("access", "secret", None);
        IamClient::new(S3Client::new(base_url, Some(provider), None).unwrap())
    }

    #[test]
    fn form_body_encodes_parameters() {
        let req = IamRequest::new(client(), "CreateUser").param("UserName", "user a+b");
        assert_eq!(
            req.form_body(),
            "Action=CreateUser&UserName=user%20a%2Bb&Version=2010-05-08"
        );
    }

    #[test]
    fn optional_parameters_are_skipped() {
        let req = IamRequest::new(client(), "ListUsers").param_opt("Marker", None);
        assert_eq!(req.form_body(), "Action=ListUsers&Version=2010-05-08");
    }

    #[test]
    fn user_name_rules() {
        assert!(check_user_name("iam-user_1@test.com").is_ok());
        assert!(check_user_name("").is_err());
        assert!(check_user_name("has space").is_err());
        assert!(check_user_name(&"u".repeat(65)).is_err());
    }

    #[test]
    fn parses_user_element() {
        let el = Element::parse(
            "<User><Path>/</Path><UserName>bob</UserName><UserId>AIDA1</UserId>             <Arn>arn:aws:iam::123:user/bob</Arn><CreateDate>2024-05-06T07:08:09Z</CreateDate></User>"
                .as_bytes(),
        )
        .unwrap();
        let user = IamUser::from_xml(&el).unwrap();
        assert_eq!(user.user_name, "bob");
        assert_eq!(user.user_id, "AIDA1");
        assert_eq!(user.path, "/");
        assert!(user.create_date.is_some());
    }
}
