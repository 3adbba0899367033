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

//! Lifecycle helpers for IAM users, buckets and objects
//!
//! Each helper builds its own client from the given key pair, performs one
//! operation and then lists the resource to confirm the outcome. Failures of
//! the operation itself are returned as errors; the boolean only reports the
//! listing check.

use crate::config::HarnessConfig;
use crate::iam::{IamApi, IamClient};
use crate::s3::S3Client;
use crate::s3::error::Error;
use crate::s3::types::S3Api;
use chrono::Utc;
use rand::RngCore;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

const WRITE_CHUNK: usize = 1024 * 1024;

static LAST_NANOS: AtomicU64 = AtomicU64::new(0);

/// Strictly increasing nanoseconds since the Unix epoch; also increases
/// across runs as long as the wall clock does.
fn monotonic_nanos() -> u64 {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or_default().max(0) as u64;
    let mut last = LAST_NANOS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_NANOS.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(v) => last = v,
        }
    }
}

/// Returns `prefix` followed by a monotonic epoch nanosecond stamp. Never
/// repeats within a process and does not restart from zero between runs.
pub fn unique_object_name(prefix: &str) -> String {
    format!("{prefix}{}", monotonic_nanos())
}

fn log_keys(config: &HarnessConfig, endpoint: &str, access_key: &str) {
    log::debug!("Access Key : {access_key}");
    log::debug!("Secret Key : *****");
    log::debug!("Endpoint : {endpoint}");
    log::debug!("Region : {}", config.region);
}

/// Creates IAM user `user_name` and returns whether it is then listed.
pub async fn create_iam_user(
    config: &HarnessConfig,
    user_name: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<bool, Error> {
    log_keys(config, &config.iam_endpoint, access_key);
    let iam = IamClient::from_config(config, access_key, secret_key)?;

    iam.create_user(user_name).build().send().await?;
    log::debug!("Create IAM user command success");

    let found = iam.user_exists(user_name).await?;
    if found {
        log::debug!("IAM user {user_name} found");
    }
    Ok(found)
}

/// Deletes IAM user `user_name`, waits `delete_account_delay` and returns
/// whether it is gone from the listing.
pub async fn delete_iam_user(
    config: &HarnessConfig,
    user_name: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<bool, Error> {
    log_keys(config, &config.iam_endpoint, access_key);
    let iam = IamClient::from_config(config, access_key, secret_key)?;

    iam.delete_user(user_name).build().send().await?;
    log::debug!("Delete IAM user command success");
    tokio::time::sleep(config.delete_account_delay).await;

    let gone = !iam.user_exists(user_name).await?;
    log::debug!("Deleted IAM user {user_name} absent from listing: {gone}");
    Ok(gone)
}

/// Creates `bucket` and returns whether it is then listed.
pub async fn create_bucket(
    config: &HarnessConfig,
    bucket: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<bool, Error> {
    log_keys(config, &config.s3_endpoint, access_key);
    let client = S3Client::from_config(config, access_key, secret_key)?;

    client.create_bucket(bucket).build().send().await?;
    log::debug!("S3 bucket {bucket} created");

    let listed = client.list_buckets().build().send().await?.contains(bucket);
    log::debug!("Created bucket {bucket} listed: {listed}");
    Ok(listed)
}

/// Empties `bucket` of all versions, delete markers and objects, deletes it
/// and returns whether it is gone from the listing.
pub async fn delete_objects_bucket(
    config: &HarnessConfig,
    bucket: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<bool, Error> {
    log_keys(config, &config.s3_endpoint, access_key);
    let client = S3Client::from_config(config, access_key, secret_key)?;

    log::debug!("Delete all associated objects of {bucket}");
    for entry in client.list_all_object_versions(bucket).await? {
        client
            .delete_object(bucket, &entry.name)
            .version_id(entry.version_id)
            .build()
            .send()
            .await?;
    }
    for entry in client.list_all_objects(bucket, None).await? {
        client.delete_object(bucket, entry.name).build().send().await?;
    }

    log::debug!("Delete bucket : {bucket}");
    client.delete_bucket(bucket).build().send().await?;

    let gone = !client.list_buckets().build().send().await?.contains(bucket);
    log::debug!("Deleted bucket {bucket} absent from listing: {gone}");
    Ok(gone)
}

/// Deletes `object` from `bucket`.
///
/// Whether the key is still listed afterwards is only logged, since on a
/// versioned bucket the delete leaves a marker and that is not an error.
pub async fn delete_object(
    config: &HarnessConfig,
    object: &str,
    bucket: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<bool, Error> {
    log_keys(config, &config.s3_endpoint, access_key);
    let client = S3Client::from_config(config, access_key, secret_key)?;

    log::debug!("Delete object : {object} in bucket: {bucket}");
    client.delete_object(bucket, object).build().send().await?;

    let listed = client
        .list_all_objects(bucket, Some(object.to_string()))
        .await?
        .iter()
        .any(|e| e.name == object);
    if listed {
        log::debug!("Object {object} is not deleted");
    } else {
        log::debug!("Verified that Object: {object} is deleted");
    }
    Ok(true)
}

/// Uploads a new object of `object_size` random bytes and returns whether it
/// is then listed.
///
/// The data is staged as a file in `test_data_folder`, which is removed once
/// the upload finishes. When the file cannot be written the result is
/// `Ok(false)` and nothing is uploaded.
pub async fn create_put_objects(
    config: &HarnessConfig,
    object: &str,
    bucket: &str,
    access_key: &str,
    secret_key: &str,
    object_size: u64,
) -> Result<bool, Error> {
    log::debug!("S3 Endpoint : {}", config.s3_endpoint);
    let client = S3Client::from_config(config, access_key, secret_key)?;

    let file_path = config.test_data_folder.join(object);
    if let Err(e) = tokio::fs::create_dir_all(&config.test_data_folder).await {
        log::error!(
            "Unable to create test data folder {}: {e}",
            config.test_data_folder.display()
        );
        return Ok(false);
    }
    if let Err(e) = create_file(&file_path, object_size).await {
        log::error!("Unable to create object file {}: {e}", file_path.display());
        return Ok(false);
    }

    let uploaded = upload_file(&client, bucket, object, &file_path).await;
    remove_file(&file_path).await;
    uploaded?;

    let listed = client
        .list_all_objects(bucket, Some(object.to_string()))
        .await?
        .iter()
        .any(|e| e.name == object);
    log::debug!("Object: {object} present in bucket {bucket}: {listed}");
    Ok(listed)
}

async fn upload_file(client: &S3Client, bucket: &str, object: &str, path: &Path) -> Result<(), Error> {
    let data = tokio::fs::read(path).await?;
    log::debug!("Put object: {object} ({} bytes) in the bucket: {bucket}", data.len());
    client.put_object(bucket, object, data).build().send().await?;
    Ok(())
}

/// Writes `size` random bytes to `path`, replacing any existing file.
pub async fn create_file(path: &Path, size: u64) -> Result<(), Error> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut buf = vec![0u8; WRITE_CHUNK];
    let mut remaining = size;
    while remaining > 0 {
        let n = remaining.min(WRITE_CHUNK as u64) as usize;
        rand::rng().fill_bytes(&mut buf[..n]);
        file.write_all(&buf[..n]).await?;
        remaining -= n as u64;
    }
    file.flush().await?;
    Ok(())
}

/// Removes `path`, logging instead of failing when it cannot be removed.
pub async fn remove_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        log::warn!("Unable to remove {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn object_names_never_repeat() {
        let names: Vec<String> = (0..1000).map(|_| unique_object_name("created_obj")).collect();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| n.starts_with("created_obj")));
    }

    #[test]
    fn stamps_are_epoch_based() {
        // 2024-01-01T00:00:00Z
        const LOWER_BOUND: u64 = 1_704_067_200_000_000_000;
        let name = unique_object_name("created_obj");
        let stamp: u64 = name["created_obj".len()..].parse().unwrap();
        assert!(stamp > LOWER_BOUND, "stamp {stamp} is not epoch based");

        let now = Utc::now().timestamp_nanos_opt().unwrap() as u64;
        assert!(monotonic_nanos() >= now);
    }

    #[test]
    fn stamps_increase() {
        let a = monotonic_nanos();
        let b = monotonic_nanos();
        assert!(b > a);
    }

    #[tokio::test]
    async fn create_and_remove_file() {
        let dir = std::env::temp_dir().join(unique_object_name("misc-test-"));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("obj");

        create_file(&path, 3 * 1024 * 1024 + 7).await.unwrap();
        let meta = tokio::fs::metadata(&path).await.unwrap();
        assert_eq!(meta.len(), 3 * 1024 * 1024 + 7);

        create_file(&path, 0).await.unwrap();
        assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 0);

        remove_file(&path).await;
        assert!(tokio::fs::metadata(&path).await.is_err());
        remove_file(&path).await;
        tokio::fs::remove_dir(&dir).await.unwrap();
    }
}
