// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Object key naming.
//!
//! Keys look like `{prefix}/{year}/{month}/{day}/{hour}/{name}.{gz|log}` where
//! the name is `[{tag}-]{year}-{month}-{day}-{hour}-{minute}-{uuid}`. Date
//! components are not zero-padded and always taken in UTC.
//!
//! If the random source fails, callers fall back to
//! [`KeyNamer::timestamp_key`], which names the object after the Unix
//! timestamp in seconds; two flushes in the same second can collide then.

use crate::constants::{GZIP_EXTENSION, PLAIN_EXTENSION};
use crate::error::KeyError;
use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Source of the random suffix that keeps concurrent flushes apart
pub trait UuidSource: Send + Sync {
    fn generate(&self) -> Result<Uuid, KeyError>;
}

/// Version 4 UUIDs read from the operating system's random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsUuidSource;

impl UuidSource for OsUuidSource {
    fn generate(&self) -> Result<Uuid, KeyError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| KeyError(e.to_string()))?;
        // Sets the version (4) and RFC 4122 variant bits
        Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

/// Storage key of one flushed object, split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub directory: String,
    pub object_name: String,
    pub extension: &'static str,
}

impl ObjectKey {
    /// Name embedded in the gzip header of compressed objects.
    #[must_use]
    pub fn log_file_name(&self) -> String {
        format!("{}.{PLAIN_EXTENSION}", self.object_name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}.{}",
            self.directory, self.object_name, self.extension
        )
    }
}

#[derive(Clone)]
pub struct KeyNamer {
    prefix: String,
    gzip: bool,
    uuid_source: Arc<dyn UuidSource>,
}

impl KeyNamer {
    #[must_use]
    pub fn new(prefix: impl Into<String>, gzip: bool) -> Self {
        Self::with_uuid_source(prefix, gzip, Arc::new(OsUuidSource))
    }

    #[must_use]
    pub fn with_uuid_source(
        prefix: impl Into<String>,
        gzip: bool,
        uuid_source: Arc<dyn UuidSource>,
    ) -> Self {
        KeyNamer {
            prefix: prefix.into(),
            gzip,
            uuid_source,
        }
    }

    /// Builds the key for an object flushed at `now` for `tag`.
    pub fn name(&self, now: DateTime<Utc>, tag: &str) -> Result<ObjectKey, KeyError> {
        let uuid = self.uuid_source.generate()?;
        let (year, month, day) = (now.year(), now.month(), now.day());
        let (hour, minute) = (now.hour(), now.minute());

        let object_name = if tag.is_empty() {
            format!("{year}-{month}-{day}-{hour}-{minute}-{uuid}")
        } else {
            format!("{tag}-{year}-{month}-{day}-{hour}-{minute}-{uuid}")
        };
        Ok(self.key(now, object_name))
    }

    /// Key named after the Unix timestamp of `now`, for when no random
    /// suffix is available.
    #[must_use]
    pub fn timestamp_key(&self, now: DateTime<Utc>) -> ObjectKey {
        self.key(now, now.timestamp().to_string())
    }

    fn key(&self, now: DateTime<Utc>, object_name: String) -> ObjectKey {
        ObjectKey {
            directory: format!(
                "{}/{}/{}/{}/{}",
                self.prefix,
                now.year(),
                now.month(),
                now.day(),
                now.hour()
            ),
            object_name,
            extension: if self.gzip {
                GZIP_EXTENSION
            } else {
                PLAIN_EXTENSION
            },
        }
    }
}

impl fmt::Debug for KeyNamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyNamer")
            .field("prefix", &self.prefix)
            .field("gzip", &self.gzip)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) struct FailingUuidSource;

    impl UuidSource for FailingUuidSource {
        fn generate(&self) -> Result<Uuid, KeyError> {
            Err(KeyError("entropy source unavailable".to_string()))
        }
    }

    struct FixedUuidSource(Uuid);

    impl UuidSource for FixedUuidSource {
        fn generate(&self) -> Result<Uuid, KeyError> {
            Ok(self.0)
        }
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 30)
            .unwrap()
    }

    fn fixed_namer(prefix: &str, gzip: bool) -> KeyNamer {
        let uuid = Uuid::parse_str("0a1b2c3d-4e5f-4a6b-8c7d-8e9f0a1b2c3d").unwrap();
        KeyNamer::with_uuid_source(prefix, gzip, Arc::new(FixedUuidSource(uuid)))
    }

    #[test]
    fn test_name_with_tag() {
        let key = fixed_namer("logs", true).name(at(2020, 2, 16, 6, 5), "app").unwrap();

        assert_eq!(key.directory, "logs/2020/2/16/6");
        assert_eq!(
            key.object_name,
            "app-2020-2-16-6-5-0a1b2c3d-4e5f-4a6b-8c7d-8e9f0a1b2c3d"
        );
        assert_eq!(
            key.to_string(),
            "logs/2020/2/16/6/app-2020-2-16-6-5-0a1b2c3d-4e5f-4a6b-8c7d-8e9f0a1b2c3d.gz"
        );
    }

    #[test]
    fn test_name_without_tag() {
        let key = fixed_namer("logs", false).name(at(2024, 12, 1, 23, 59), "").unwrap();

        assert_eq!(
            key.to_string(),
            "logs/2024/12/1/23/2024-12-1-23-59-0a1b2c3d-4e5f-4a6b-8c7d-8e9f0a1b2c3d.log"
        );
    }

    #[test]
    fn test_name_empty_prefix_keeps_separator() {
        let key = fixed_namer("", false).name(at(2024, 1, 2, 3, 4), "app").unwrap();
        assert!(key.to_string().starts_with("/2024/1/2/3/app-2024-1-2-3-4-"));
    }

    #[test]
    fn test_log_file_name() {
        let key = fixed_namer("logs", true).name(at(2024, 1, 2, 3, 4), "app").unwrap();
        assert_eq!(
            key.log_file_name(),
            "app-2024-1-2-3-4-0a1b2c3d-4e5f-4a6b-8c7d-8e9f0a1b2c3d.log"
        );
    }

    #[test]
    fn test_name_fails_without_random_source() {
        let namer = KeyNamer::with_uuid_source("logs", true, Arc::new(FailingUuidSource));

        let result = namer.name(at(2024, 1, 15, 14, 30), "app");

        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to generate UUID: entropy source unavailable"
        );
    }

    #[test]
    fn test_timestamp_key() {
        let namer = KeyNamer::with_uuid_source("logs", true, Arc::new(FailingUuidSource));
        let now = at(2024, 1, 15, 14, 30);

        let key = namer.timestamp_key(now);

        assert_eq!(key.object_name, now.timestamp().to_string());
        assert_eq!(
            key.to_string(),
            format!("logs/2024/1/15/14/{}.gz", now.timestamp())
        );
    }

    #[test]
    fn test_os_uuid_source_is_v4() {
        let uuid = OsUuidSource.generate().unwrap();

        assert_eq!(uuid.get_version_num(), 4);
        assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122);
        let text = uuid.to_string();
        let groups: Vec<usize> = text.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn test_names_in_same_minute_are_distinct() {
        let namer = KeyNamer::new("logs", true);
        let now = at(2024, 1, 15, 14, 30);

        let first = namer.name(now, "app").unwrap();
        let second = namer.name(now, "app").unwrap();

        assert_eq!(first.directory, second.directory);
        assert_ne!(first.object_name, second.object_name);
    }
}
