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

//! Harness configuration
//!
//! Every setting can be overridden through an environment variable; the
//! defaults describe a single-node test cluster on localhost.
//!
//! | variable | default |
//! |----------|---------|
//! | `S3_ENDPOINT` | `http://127.0.0.1:9000` |
//! | `IAM_ENDPOINT` | `http://127.0.0.1:9080` |
//! | `CSM_ENDPOINT` | `https://127.0.0.1:8081` |
//! | `S3_REGION` | `us-east-1` |
//! | `IGNORE_CERT_CHECK` | `true` |
//! | `CSM_ADMIN_USER` / `CSM_ADMIN_PASSWORD` | `admin` / `Seagate@1` |
//! | `CSM_MANAGE_USER` / `CSM_MANAGE_PASSWORD` | unset |
//! | `CSM_MONITOR_USER` / `CSM_MONITOR_PASSWORD` | unset |
//! | `CSM_LOGIN_PATH` | `/api/v2/login` |
//! | `CSM_QUOTA_PATH` | `/api/v2/s3/iam/users/{}/quota` |
//! | `TEST_DATA_FOLDER` | `<tmp>/s3-quota-harness` |
//! | `DELETE_ACCOUNT_DELAY_SECS` | `0` |
//! | `QUOTA_EXCEEDED_CODE` | `QuotaExceeded` |

use crate::s3::error::{CsmError, Error};
use crate::s3::http::DEFAULT_REGION;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use typed_builder::TypedBuilder;

const DEFAULT_S3_ENDPOINT: &str = "http://127.0.0.1:9000";
const DEFAULT_IAM_ENDPOINT: &str = "http://127.0.0.1:9080";
const DEFAULT_CSM_ENDPOINT: &str = "https://127.0.0.1:8081";
const DEFAULT_CSM_ADMIN_USER: &str = "admin";
const DEFAULT_CSM_ADMIN_PASSWORD: &str = "Seagate@1";
const DEFAULT_LOGIN_PATH: &str = "/api/v2/login";
const DEFAULT_QUOTA_PATH: &str = "/api/v2/s3/iam/users/{}/quota";
const DEFAULT_QUOTA_EXCEEDED_CODE: &str = "QuotaExceeded";

/// CSM role a request is authenticated as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoginAs {
    #[default]
    CsmAdminUser,
    CsmUserManage,
    CsmUserMonitor,
}

impl fmt::Display for LoginAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoginAs::CsmAdminUser => "csm_admin_user",
            LoginAs::CsmUserManage => "csm_user_manage",
            LoginAs::CsmUserMonitor => "csm_user_monitor",
        })
    }
}

impl FromStr for LoginAs {
    type Err = CsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csm_admin_user" => Ok(LoginAs::CsmAdminUser),
            "csm_user_manage" => Ok(LoginAs::CsmUserManage),
            "csm_user_monitor" => Ok(LoginAs::CsmUserMonitor),
            v => Err(CsmError::UnknownRole(v.to_string())),
        }
    }
}

/// Username and password of a CSM account.
#[derive(Clone, PartialEq, Eq)]
pub struct CsmUser {
    pub username: String,
    pub password: String,
}

impl CsmUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for CsmUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsmUser")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

/// Endpoints, accounts and tunables used by every helper in this crate.
#[derive(Clone, Debug, TypedBuilder)]
pub struct HarnessConfig {
    #[builder(default = DEFAULT_S3_ENDPOINT.to_string(), setter(into))]
    pub s3_endpoint: String,
    #[builder(default = DEFAULT_IAM_ENDPOINT.to_string(), setter(into))]
    pub iam_endpoint: String,
    #[builder(default = DEFAULT_CSM_ENDPOINT.to_string(), setter(into))]
    pub csm_endpoint: String,
    #[builder(default = DEFAULT_REGION.to_string(), setter(into))]
    pub region: String,
    #[builder(default = true)]
    pub ignore_cert_check: bool,
    #[builder(default = CsmUser::new(DEFAULT_CSM_ADMIN_USER, DEFAULT_CSM_ADMIN_PASSWORD))]
    pub csm_admin: CsmUser,
    #[builder(default, setter(into))]
    pub csm_manage: Option<CsmUser>,
    #[builder(default, setter(into))]
    pub csm_monitor: Option<CsmUser>,
    #[builder(default = DEFAULT_LOGIN_PATH.to_string(), setter(into))]
    pub login_path: String,
    #[builder(default = DEFAULT_QUOTA_PATH.to_string(), setter(into))]
    pub quota_path: String,
    #[builder(default = std::env::temp_dir().join("s3-quota-harness"), setter(into))]
    pub test_data_folder: PathBuf,
    #[builder(default = Duration::ZERO)]
    pub delete_account_delay: Duration,
    #[builder(default = DEFAULT_QUOTA_EXCEEDED_CODE.to_string(), setter(into))]
    pub quota_exceeded_code: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig::builder().build()
    }
}

impl HarnessConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            let value = lookup(key).unwrap_or_else(|| default.to_string());
            log::debug!("{key}={value}");
            value
        };
        let user = |user_key: &str, password_key: &str| -> Option<CsmUser> {
            let username = lookup(user_key)?;
            let password = lookup(password_key).unwrap_or_default();
            log::debug!("{user_key}={username}");
            Some(CsmUser { username, password })
        };

        let ignore_cert_check =
            parse_bool("IGNORE_CERT_CHECK", &var("IGNORE_CERT_CHECK", "true"))?;
        let delay = var("DELETE_ACCOUNT_DELAY_SECS", "0");
        let delete_account_delay = delay.parse::<u64>().map(Duration::from_secs).map_err(|e| {
            Error::Config(format!("DELETE_ACCOUNT_DELAY_SECS={delay}: {e}"))
        })?;

        let test_data_folder = match lookup("TEST_DATA_FOLDER") {
            Some(v) => PathBuf::from(v),
            None => std::env::temp_dir().join("s3-quota-harness"),
        };
        log::debug!("TEST_DATA_FOLDER={}", test_data_folder.display());

        let csm_admin = CsmUser::new(
            var("CSM_ADMIN_USER", DEFAULT_CSM_ADMIN_USER),
            lookup("CSM_ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_CSM_ADMIN_PASSWORD.to_string()),
        );
        log::debug!("CSM_ADMIN_PASSWORD=*****");

        let quota_path = var("CSM_QUOTA_PATH", DEFAULT_QUOTA_PATH);
        if !quota_path.contains("{}") {
            return Err(Error::Config(format!(
                "CSM_QUOTA_PATH={quota_path} has no {{}} placeholder for the user id"
            )));
        }

        Ok(HarnessConfig {
            s3_endpoint: var("S3_ENDPOINT", DEFAULT_S3_ENDPOINT),
            iam_endpoint: var("IAM_ENDPOINT", DEFAULT_IAM_ENDPOINT),
            csm_endpoint: var("CSM_ENDPOINT", DEFAULT_CSM_ENDPOINT),
            region: var("S3_REGION", DEFAULT_REGION),
            ignore_cert_check,
            csm_admin,
            csm_manage: user("CSM_MANAGE_USER", "CSM_MANAGE_PASSWORD"),
            csm_monitor: user("CSM_MONITOR_USER", "CSM_MONITOR_PASSWORD"),
            login_path: var("CSM_LOGIN_PATH", DEFAULT_LOGIN_PATH),
            quota_path,
            test_data_folder,
            delete_account_delay,
            quota_exceeded_code: var("QUOTA_EXCEEDED_CODE", DEFAULT_QUOTA_EXCEEDED_CODE),
        })
    }

    /// Path of the quota resource of user `uid`.
    pub fn quota_endpoint(&self, uid: &str) -> String {
        self.quota_path.replacen("{}", uid, 1)
    }

    /// Credentials of the CSM account for `role`.
    pub fn csm_user(&self, role: LoginAs) -> Result<&CsmUser, Error> {
        match role {
            LoginAs::CsmAdminUser => Some(&self.csm_admin),
            LoginAs::CsmUserManage => self.csm_manage.as_ref(),
            LoginAs::CsmUserMonitor => self.csm_monitor.as_ref(),
        }
        .ok_or_else(|| CsmError::UnknownRole(role.to_string()).into())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key}={value} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = HarnessConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.s3_endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.iam_endpoint, "http://127.0.0.1:9080");
        assert_eq!(config.csm_endpoint, "https://127.0.0.1:8081");
        assert_eq!(config.region, "us-east-1");
        assert!(config.ignore_cert_check);
        assert_eq!(config.csm_admin, CsmUser::new("admin", "Seagate@1"));
        assert!(config.csm_manage.is_none());
        assert_eq!(config.delete_account_delay, Duration::ZERO);
        assert_eq!(config.quota_exceeded_code, "QuotaExceeded");
        assert!(config.test_data_folder.ends_with("s3-quota-harness"));
    }

    #[test]
    fn builder_defaults_match_environment_defaults() {
        let built = HarnessConfig::default();
        let read = HarnessConfig::from_lookup(|_| None).unwrap();
        assert_eq!(built.s3_endpoint, read.s3_endpoint);
        assert_eq!(built.quota_path, read.quota_path);
        assert_eq!(built.login_path, read.login_path);
        assert_eq!(built.test_data_folder, read.test_data_folder);
    }

    #[test]
    fn overrides_are_applied() {
        let config = HarnessConfig::from_lookup(lookup_in(&[
            ("S3_ENDPOINT", "http://s3.test:80"),
            ("IGNORE_CERT_CHECK", "false"),
            ("DELETE_ACCOUNT_DELAY_SECS", "3"),
            ("CSM_MANAGE_USER", "manager"),
            ("CSM_MANAGE_PASSWORD", "pw"),
            ("QUOTA_EXCEEDED_CODE", "QuotaExceededError"),
        ]))
        .unwrap();
        assert_eq!(config.s3_endpoint, "http://s3.test:80");
        assert!(!config.ignore_cert_check);
        assert_eq!(config.delete_account_delay, Duration::from_secs(3));
        assert_eq!(config.csm_manage, Some(CsmUser::new("manager", "pw")));
        assert_eq!(config.quota_exceeded_code, "QuotaExceededError");
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        for vars in [
            [("IGNORE_CERT_CHECK", "maybe")],
            [("DELETE_ACCOUNT_DELAY_SECS", "-1")],
            [("CSM_QUOTA_PATH", "/api/v2/quota")],
        ] {
            let err = HarnessConfig::from_lookup(lookup_in(&vars)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{err:?}");
        }
    }

    #[test]
    fn quota_endpoint_substitutes_uid() {
        let config = HarnessConfig::default();
        assert_eq!(
            config.quota_endpoint("iam-user-1"),
            "/api/v2/s3/iam/users/iam-user-1/quota"
        );
    }

    #[test]
    fn csm_user_per_role() {
        let config = HarnessConfig::builder()
            .csm_monitor(CsmUser::new("monitor", "pw"))
            .build();
        assert_eq!(
            config.csm_user(LoginAs::CsmAdminUser).unwrap().username,
            "admin"
        );
        assert_eq!(
            config.csm_user(LoginAs::CsmUserMonitor).unwrap().username,
            "monitor"
        );
        assert!(matches!(
            config.csm_user(LoginAs::CsmUserManage),
            Err(Error::Csm(CsmError::UnknownRole(_)))
        ));
    }

    #[test]
    fn login_as_names() {
        for role in [
            LoginAs::CsmAdminUser,
            LoginAs::CsmUserManage,
            LoginAs::CsmUserMonitor,
        ] {
            assert_eq!(role.to_string().parse::<LoginAs>().unwrap(), role);
        }
        assert!("root".parse::<LoginAs>().is_err());
    }

    #[test]
    fn password_is_masked_in_debug() {
        let text = format!("{:?}", CsmUser::new("admin", "Seagate@1"));
        assert!(!text.contains("Seagate@1"));
    }
}
