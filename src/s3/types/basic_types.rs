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

use crate::s3::error::Error;
use crate::s3::utils::{
    UtcTime, from_iso8601utc, get_flag, get_text, get_text_option, trim_quotes,
};
use std::fmt;
use std::str::FromStr;
use xmltree::Element;

#[derive(Clone, Debug, Default)]
/// Contains information of an item of object listing or object version listing
pub struct ListEntry {
    pub name: String,
    pub last_modified: Option<UtcTime>,
    pub etag: Option<String>, // except DeleteMarker
    pub size: Option<u64>,    // except DeleteMarker
    pub storage_class: Option<String>,
    pub is_latest: bool,            // except ListObjectsV2
    pub version_id: Option<String>, // except ListObjectsV2
    pub is_delete_marker: bool,
}

impl ListEntry {
    /// Parses a `<Contents>`, `<Version>` or `<DeleteMarker>` element.
    pub(crate) fn from_xml(element: &Element, is_delete_marker: bool) -> Result<Self, Error> {
        let last_modified = match get_text_option(element, "LastModified") {
            Some(v) if !v.is_empty() => Some(from_iso8601utc(&v)?),
            _ => None,
        };
        let size = match get_text_option(element, "Size") {
            Some(v) if !v.is_empty() => Some(v.parse::<u64>()?),
            _ => None,
        };

        Ok(ListEntry {
            name: get_text(element, "Key")?,
            last_modified,
            etag: get_text_option(element, "ETag").map(trim_quotes),
            size,
            storage_class: get_text_option(element, "StorageClass"),
            is_latest: get_flag(element, "IsLatest"),
            version_id: get_text_option(element, "VersionId").filter(|v| !v.is_empty()),
            is_delete_marker,
        })
    }
}

#[derive(Clone, Debug)]
/// Contains the bucket name and creation date
pub struct Bucket {
    pub name: String,
    pub creation_date: UtcTime,
}

/// Represents the versioning state of an S3 bucket.
///
/// A bucket that never had versioning configured reports no status at all,
/// which is why readers get an `Option<VersioningStatus>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersioningStatus {
    /// Object versioning is enabled for the bucket.
    Enabled,
    /// Object versioning is suspended for the bucket.
    Suspended,
}

impl fmt::Display for VersioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersioningStatus::Enabled => write!(f, "Enabled"),
            VersioningStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

impl FromStr for VersioningStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enabled" => Ok(VersioningStatus::Enabled),
            "Suspended" => Ok(VersioningStatus::Suspended),
            v => Err(Error::Xml(format!("unknown versioning status '{v}'"))),
        }
    }
}
