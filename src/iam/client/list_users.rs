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

use crate::iam::IamClient;
use crate::iam::response::ListUsersResponse;
use crate::iam::types::{IamApi, IamRequest, IamUser, ToIamRequest};
use crate::s3::error::{Error, ValidationErr};
use typed_builder::TypedBuilder;

/// Argument builder for the IAM `ListUsers` action.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ListUsers {
    #[builder(!default)]
    iam_client: IamClient,
    #[builder(default, setter(into))]
    marker: Option<String>,
    #[builder(default, setter(into))]
    max_items: Option<u32>,
}

/// Builder type for [`ListUsers`].
pub type ListUsersBldr = ListUsersBuilder<((IamClient,), (), ())>;

impl IamApi for ListUsers {
    type Response = ListUsersResponse;
}

impl ToIamRequest for ListUsers {
    fn to_iam_request(self) -> Result<IamRequest, ValidationErr> {
        Ok(IamRequest::new(self.iam_client, "ListUsers")
            .param_opt("Marker", self.marker)
            .param_opt("MaxItems", self.max_items.map(|v| v.to_string())))
    }
}

impl IamClient {
    /// Creates a [`ListUsers`] request builder for one page of users.
    pub fn list_users(&self) -> ListUsersBldr {
        ListUsers::builder().iam_client(self.clone())
    }

    /// Lists every IAM user, following markers across pages.
    pub async fn list_all_users(&self) -> Result<Vec<IamUser>, Error> {
        let mut users: Vec<IamUser> = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self.list_users().marker(marker.take()).build().send().await?;
            users.extend(resp.users);
            if !resp.is_truncated || resp.marker.is_none() {
                return Ok(users);
            }
            marker = resp.marker;
        }
    }

    /// Returns true when `user_name` is among the listed users.
    pub async fn user_exists(&self, user_name: &str) -> Result<bool, Error> {
        Ok(self
            .list_all_users()
            .await?
            .iter()
            .any(|u| u.user_name == user_name))
    }
}
