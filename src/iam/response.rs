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

//! Typed responses of IAM actions

use crate::iam::types::{FromIamResponse, IamRequest, IamUser};
use crate::s3::error::Error;
use crate::s3::utils::{children_named, get_flag, get_text_default, get_text_option};
use async_trait::async_trait;
use bytes::{Buf, Bytes};
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Reads the response and parses its XML document.
async fn read_xml(response: Result<reqwest::Response, Error>) -> Result<(HeaderMap, Element), Error> {
    let mut resp: reqwest::Response = response?;
    let headers: HeaderMap = mem::take(resp.headers_mut());
    let body: Bytes = resp.bytes().await?;
    Ok((headers, Element::parse(body.reader())?))
}

/// Returns the `<{action}Result>` element, or the root when the server omits it.
fn result_element<'a>(root: &'a Element, action: &str) -> &'a Element {
    root.get_child(format!("{action}Result").as_str())
        .unwrap_or(root)
}

fn request_id(root: &Element) -> String {
    root.get_child("ResponseMetadata")
        .map(|m| get_text_default(m, "RequestId"))
        .unwrap_or_default()
}

/// Response of [create_user()](crate::iam::IamClient::create_user)
#[derive(Clone, Debug)]
pub struct CreateUserResponse {
    pub headers: HeaderMap,
    pub request_id: String,
    pub user: IamUser,
}

#[async_trait]
impl FromIamResponse for CreateUserResponse {
    async fn from_iam_response(
        request: IamRequest,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let (headers, root) = read_xml(response).await?;
        let user = result_element(&root, request.action())
            .get_child("User")
            .ok_or(Error::Xml(String::from("<User> tag not found")))?;

        Ok(Self {
            headers,
            request_id: request_id(&root),
            user: IamUser::from_xml(user)?,
        })
    }
}

/// Response of [delete_user()](crate::iam::IamClient::delete_user)
#[derive(Clone, Debug)]
pub struct DeleteUserResponse {
    pub headers: HeaderMap,
    pub request_id: String,
}

#[async_trait]
impl FromIamResponse for DeleteUserResponse {
    async fn from_iam_response(
        _request: IamRequest,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let (headers, root) = read_xml(response).await?;
        Ok(Self {
            headers,
            request_id: request_id(&root),
        })
    }
}

/// Response of a single [list_users()](crate::iam::IamClient::list_users) page
#[derive(Clone, Debug)]
pub struct ListUsersResponse {
    pub headers: HeaderMap,
    pub request_id: String,
    pub users: Vec<IamUser>,
    pub is_truncated: bool,
    pub marker: Option<String>,
}

#[async_trait]
impl FromIamResponse for ListUsersResponse {
    async fn from_iam_response(
        request: IamRequest,
        response: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let (headers, root) = read_xml(response).await?;
        let result = result_element(&root, request.action());

        let users = match result.get_child("Users") {
            Some(users) => children_named(users, "member")
                .map(IamUser::from_xml)
                .collect::<Result<Vec<IamUser>, Error>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            headers,
            request_id: request_id(&root),
            users,
            is_truncated: get_flag(result, "IsTruncated"),
            marker: get_text_option(result, "Marker").filter(|v| !v.is_empty()),
        })
    }
}
