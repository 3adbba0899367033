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

use crate::csm::{GetSetQuota, OBJECT_NAME_PREFIX};
use crate::misc::{create_put_objects, unique_object_name};
use crate::s3::error::{Error, ValidationErr};
use rand::Rng;

/// Random size in `[1, max_size)`, or 1 when that range is empty.
fn random_size(max_size: u64) -> u64 {
    if max_size < 2 {
        return 1;
    }
    rand::rng().random_range(1..max_size)
}

impl GetSetQuota {
    /// Writes one more object of random size and checks the write is refused
    /// with the configured quota error code.
    async fn put_over_limit(
        &self,
        max_size: u64,
        akey: &str,
        skey: &str,
        passed_msg: &str,
        refused_msg: &str,
    ) -> Result<(bool, String), Error> {
        log::info!("Perform Put operation of Random size and 1 object");
        let size = random_size(max_size);
        let object = unique_object_name(OBJECT_NAME_PREFIX);
        match create_put_objects(&self.config, &object, &self.bucket, akey, skey, size).await {
            Ok(_) => Ok((false, passed_msg.to_string())),
            Err(Error::S3Server(e)) => {
                log::info!("Expected exception received {e}");
                let matched = e.code().to_string() == self.config.quota_exceeded_code;
                Ok((matched, refused_msg.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Checks that a user can write exactly `max_size` bytes and no more.
    ///
    /// The bucket [`GetSetQuota::bucket`] must exist. Returns whether the
    /// check passed together with the message describing the failing step.
    pub async fn verify_max_size(
        &self,
        max_size: u64,
        akey: &str,
        skey: &str,
    ) -> Result<(bool, String), Error> {
        log::info!("Perform Put operation for 1 object of max size");
        let put = create_put_objects(
            &self.config,
            &self.object_name,
            &self.bucket,
            akey,
            skey,
            max_size,
        )
        .await?;
        if !put {
            return Ok((false, "Put operation failed for less than max size".into()));
        }

        self.put_over_limit(
            max_size,
            akey,
            skey,
            "Put operation passed for object size above max size",
            "Message check verification failed for object size above max size",
        )
        .await
    }

    /// Checks that a user can write `max_objects` objects and no more.
    ///
    /// Every object is `max_size / max_objects` bytes. All of them must be
    /// written before the over-limit write is attempted.
    pub async fn verify_max_objects(
        &self,
        max_size: u64,
        max_objects: u64,
        akey: &str,
        skey: &str,
    ) -> Result<(bool, String), Error> {
        if max_objects == 0 {
            return Err(ValidationErr::InvalidQuotaLimit("max_objects must be positive".into()).into());
        }

        log::info!("Perform Put operation of small size and {max_objects} objects");
        let small_size = max_size / max_objects;
        for _ in 0..max_objects {
            let object = unique_object_name(OBJECT_NAME_PREFIX);
            let put = create_put_objects(&self.config, &object, &self.bucket, akey, skey, small_size)
                .await?;
            if !put {
                return Ok((false, "Put operation failed for less than max objects".into()));
            }
        }

        self.put_over_limit(
            max_size,
            akey,
            skey,
            "Put operation passed for object size above random size",
            "Message check verification failed for objects more than max objects",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_size_stays_below_max() {
        for max in [2u64, 3, 10, 1024] {
            for _ in 0..100 {
                let s = random_size(max);
                assert!((1..max).contains(&s), "{s} not in [1, {max})");
            }
        }
    }

    #[test]
    fn random_size_of_tiny_limits() {
        assert_eq!(random_size(0), 1);
        assert_eq!(random_size(1), 1);
    }
}
