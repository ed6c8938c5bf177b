// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process-wide log setup.
//!
//! Lines are prefixed with `S3_OUTPUT` so they stand out among the host's own
//! output:
//!
//! ```text
//! S3_OUTPUT | ERROR | S3 | 0 | Failed to upload object logs/2024/1/15/14/app-....gz: ...
//! ```

use crate::constants::LOG_LEVEL_ENV;
use std::fmt;
use std::sync::Once;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

static INIT_TRACING: Once = Once::new();

/// Formats events as `S3_OUTPUT | LEVEL | [span{fields}: ]message fields`.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(&mut writer, "S3_OUTPUT | {} | ", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Normalizes a configured level, falling back to `info` for unknown values.
#[must_use]
pub fn parse_log_level(value: Option<&str>) -> &'static str {
    let value = value.map(|v| v.trim().to_lowercase()).unwrap_or_default();
    VALID_LOG_LEVELS
        .iter()
        .find(|level| **level == value)
        .copied()
        .unwrap_or("info")
}

/// Installs the global subscriber, once per process.
///
/// The level comes from `FLB_LOG_LEVEL`. Later calls, including from other
/// plugin instances, are no-ops; a subscriber installed by someone else is
/// left in place.
pub fn init() {
    INIT_TRACING.call_once(|| {
        let level = parse_log_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
        let filter = EnvFilter::new(format!("h2=off,hyper=off,rustls=off,aws=warn,{level}"));

        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(filter)
            .event_format(Formatter)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("S3 | Global subscriber already installed, keeping it");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level(Some("debug")), "debug");
        assert_eq!(parse_log_level(Some("WARN")), "warn");
        assert_eq!(parse_log_level(Some(" error ")), "error");
        assert_eq!(parse_log_level(Some("verbose")), "info");
        assert_eq!(parse_log_level(None), "info");
    }
}
