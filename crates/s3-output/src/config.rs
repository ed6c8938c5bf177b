// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use tracing::info;

/// Configuration of one output instance, fixed for its whole lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// AWS region of the destination bucket
    pub region: String,
    /// Destination bucket name
    pub bucket: String,
    /// Key path prefix, may be empty
    pub prefix: String,
    /// Whether objects are gzip-compressed before upload
    pub gzip: bool,
}

impl OutputConfig {
    /// Reads the configuration through `lookup`, which returns the raw value the
    /// host holds for a key (or `None` when the key is not set).
    pub fn from_lookup<F>(plugin_id: u64, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = lookup("region").unwrap_or_default();
        info!("S3 | {plugin_id} | plugin parameter region = '{region}'");
        let bucket = lookup("bucket").unwrap_or_default();
        info!("S3 | {plugin_id} | plugin parameter bucket = '{bucket}'");
        let prefix = lookup("prefix").unwrap_or_default();
        info!("S3 | {plugin_id} | plugin parameter prefix = '{prefix}'");
        let gzip = parse_bool_param(lookup("gzip").as_deref(), true);
        info!("S3 | {plugin_id} | plugin parameter gzip = '{gzip}'");

        let config = Self {
            region,
            bucket,
            prefix,
            gzip,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::MissingParameter("region"));
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::MissingParameter("bucket"));
        }
        Ok(())
    }
}

/// Parses `"true"`/`"false"` case-insensitively; anything else yields `default`.
#[must_use]
pub fn parse_bool_param(value: Option<&str>, default: bool) -> bool {
    match value.map(str::to_lowercase).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_all_keys() {
        let config = OutputConfig::from_lookup(
            0,
            lookup_from(&[
                ("region", "eu-west-1"),
                ("bucket", "my-logs"),
                ("prefix", "fluent"),
                ("gzip", "FALSE"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config,
            OutputConfig {
                region: "eu-west-1".to_string(),
                bucket: "my-logs".to_string(),
                prefix: "fluent".to_string(),
                gzip: false,
            }
        );
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = OutputConfig::from_lookup(
            3,
            lookup_from(&[("region", "us-east-1"), ("bucket", "my-logs")]),
        )
        .unwrap();

        assert_eq!(config.prefix, "");
        assert!(config.gzip);
    }

    #[test]
    fn test_from_lookup_missing_region() {
        let result = OutputConfig::from_lookup(0, lookup_from(&[("bucket", "my-logs")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingParameter("region"))
        ));
    }

    #[test]
    fn test_from_lookup_missing_bucket() {
        let result = OutputConfig::from_lookup(
            0,
            lookup_from(&[("region", "us-east-1"), ("bucket", "")]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingParameter("bucket"))
        ));
    }

    #[test]
    fn test_parse_bool_param() {
        assert!(parse_bool_param(Some("true"), false));
        assert!(parse_bool_param(Some("True"), false));
        assert!(!parse_bool_param(Some("false"), true));
        assert!(!parse_bool_param(Some("FaLsE"), true));
        // Anything else keeps the default
        assert!(parse_bool_param(Some("yes"), true));
        assert!(!parse_bool_param(Some("1"), false));
        assert!(parse_bool_param(Some(""), true));
        assert!(parse_bool_param(None, true));
    }
}
