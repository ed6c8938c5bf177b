// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Limits, names and host status codes shared across the plugin.

/// Buffered bytes allowed before a flush is forced (5 MiB).
///
/// The check happens before an encoded record is appended, so a single record
/// larger than this still produces one object above the limit.
pub const MAX_OBJECT_SIZE_BYTES: usize = 5 * 1_024 * 1_024;

/// Canned ACL applied to every uploaded object.
pub const OBJECT_ACL: &str = "bucket-owner-full-control";

/// Name the plugin registers under with the host.
pub const PLUGIN_NAME: &str = "s3";

/// Human readable description reported at registration.
pub const PLUGIN_DESCRIPTION: &str = "Amazon S3 Fluent Bit Plugin.";

/// Host status: the call failed and must not be retried.
pub const FLB_ERROR: i32 = 0;

/// Host status: the call succeeded.
pub const FLB_OK: i32 = 1;

/// Host status: the batch should be redelivered later.
pub const FLB_RETRY: i32 = 2;

/// Environment variable holding the plugin log level.
pub const LOG_LEVEL_ENV: &str = "FLB_LOG_LEVEL";

pub(crate) const GZIP_EXTENSION: &str = "gz";
pub(crate) const PLAIN_EXTENSION: &str = "log";
