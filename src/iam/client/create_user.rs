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
use crate::iam::response::CreateUserResponse;
use crate::iam::types::{IamApi, IamRequest, ToIamRequest, check_user_name};
use crate::s3::error::ValidationErr;
use typed_builder::TypedBuilder;

/// Argument builder for the IAM `CreateUser` action.
#[derive(Clone, Debug, TypedBuilder)]
pub struct CreateUser {
    #[builder(!default)]
    iam_client: IamClient,
    #[builder(setter(into))]
    user_name: String,
    #[builder(default, setter(into))]
    path: Option<String>,
}

/// Builder type for [`CreateUser`].
pub type CreateUserBldr = CreateUserBuilder<((IamClient,), (String,), ())>;

impl IamApi for CreateUser {
    type Response = CreateUserResponse;
}

impl ToIamRequest for CreateUser {
    fn to_iam_request(self) -> Result<IamRequest, ValidationErr> {
        check_user_name(&self.user_name)?;

        Ok(IamRequest::new(self.iam_client, "CreateUser")
            .param("UserName", self.user_name)
            .param_opt("Path", self.path))
    }
}

impl IamClient {
    /// Creates a [`CreateUser`] request builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use s3_quota_harness::config::HarnessConfig;
    /// use s3_quota_harness::iam::{IamApi, IamClient};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = HarnessConfig::default();
    ///     let iam = IamClient::from_config(&config, "access", "secret").unwrap();
    ///     let resp = iam.create_user("iam-user-1").build().send().await.unwrap();
    ///     println!("created {}", resp.user.arn);
    /// }
    /// ```
    pub fn create_user<S: Into<String>>(&self, user_name: S) -> CreateUserBldr {
        CreateUser::builder()
            .iam_client(self.clone())
            .user_name(user_name)
    }
}
