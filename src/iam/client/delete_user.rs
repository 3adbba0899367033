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
use crate::iam::response::DeleteUserResponse;
use crate::iam::types::{IamApi, IamRequest, ToIamRequest, check_user_name};
use crate::s3::error::ValidationErr;
use typed_builder::TypedBuilder;

/// Argument builder for the IAM `DeleteUser` action.
#[derive(Clone, Debug, TypedBuilder)]
pub struct DeleteUser {
    #[builder(!default)]
    iam_client: IamClient,
    #[builder(setter(into))]
    user_name: String,
}

/// Builder type for [`DeleteUser`].
pub type DeleteUserBldr = DeleteUserBuilder<((IamClient,), (String,))>;

impl IamApi for DeleteUser {
    type Response = DeleteUserResponse;
}

impl ToIamRequest for DeleteUser {
    fn to_iam_request(self) -> Result<IamRequest, ValidationErr> {
        check_user_name(&self.user_name)?;

        Ok(IamRequest::new(self.iam_client, "DeleteUser").param("UserName", self.user_name))
    }
}

impl IamClient {
    /// Creates a [`DeleteUser`] request builder.
    pub fn delete_user<S: Into<String>>(&self, user_name: S) -> DeleteUserBldr {
        DeleteUser::builder()
            .iam_client(self.clone())
            .user_name(user_name)
    }
}
