// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Host-facing adapter.
//!
//! The host drives each instance strictly sequentially: records of one batch
//! are added one at a time, then `flush` runs exactly once. Every call blocks
//! until it is done, including the upload. Instances never share state; a
//! [`Registry`] maps opaque handles to the instances created by the host.

use crate::config::OutputConfig;
use crate::constants::{FLB_OK, FLB_RETRY};
use crate::decoder::RecordDecoder;
use crate::error::{DecodeError, PluginError};
use crate::output::OutputTarget;
use crate::record::Record;
use crate::s3::S3ObjectStore;
use crate::store::ObjectStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error, warn};

/// Outcome reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Accepted or delivered
    Ok,
    /// The host should redeliver the batch later
    Retry,
}

impl Status {
    /// Host status code for this outcome
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => FLB_OK,
            Status::Retry => FLB_RETRY,
        }
    }
}

/// Opaque identifier of a registered instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginHandle(u64);

impl PluginHandle {
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        PluginHandle(raw)
    }

    #[must_use]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// One output instance plus the runtime its uploads block on
pub struct OutputPlugin {
    target: OutputTarget,
    runtime: Runtime,
}

impl OutputPlugin {
    /// Reads the configuration through `lookup` and connects to S3.
    pub fn init<F>(plugin_id: u64, lookup: F) -> Result<Self, PluginError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = OutputConfig::from_lookup(plugin_id, lookup)?;
        let runtime = build_runtime()?;
        let store = runtime.block_on(S3ObjectStore::new(&config.region));
        Ok(OutputPlugin {
            target: OutputTarget::new(plugin_id, config, Arc::new(store)),
            runtime,
        })
    }

    /// Builds an instance uploading through `store` instead of S3.
    pub fn with_store(
        plugin_id: u64,
        config: OutputConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, PluginError> {
        config.validate()?;
        Ok(OutputPlugin {
            target: OutputTarget::new(plugin_id, config, store),
            runtime: build_runtime()?,
        })
    }

    #[must_use]
    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Buffers one record. Always [`Status::Ok`], even when the record is
    /// discarded because it cannot be encoded.
    pub fn add_record(&mut self, record: &Record, tag: &str, timestamp: DateTime<Utc>) -> Status {
        let Self { target, runtime } = self;
        runtime.block_on(target.add_record(record, tag, timestamp))
    }

    /// Uploads everything buffered so far; [`Status::Retry`] when the upload
    /// failed and the data is still buffered.
    pub fn flush(&mut self, tag: &str) -> Status {
        let Self { target, runtime } = self;
        match runtime.block_on(target.flush(tag)) {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(
                    "S3 | {} | Failed to flush logs with tag {}: {}",
                    target.plugin_id(),
                    tag,
                    e
                );
                Status::Retry
            }
        }
    }

    /// Adds every event of an encoded batch, then flushes once.
    ///
    /// An event with an unexpected shape is skipped. Malformed MessagePack
    /// ends the batch early; the events decoded before it are kept and
    /// flushed like any other.
    pub fn process_batch(&mut self, data: &[u8], tag: &str) -> Status {
        let plugin_id = self.target.plugin_id();
        debug!("S3 | {plugin_id} | Found logs with tag: {tag}");

        let mut count = 0usize;
        for event in RecordDecoder::new(data) {
            match event {
                Ok(event) => {
                    self.add_record(&event.record, tag, event.timestamp);
                    count += 1;
                }
                Err(e @ DecodeError::UnexpectedShape(_)) => {
                    warn!("S3 | {plugin_id} | Discarding event with tag {tag}: {e}");
                }
                Err(e @ DecodeError::MessagePack(_)) => {
                    warn!(
                        "S3 | {plugin_id} | Failed to decode event with tag {tag}, \
                         dropping the rest of the batch: {e}"
                    );
                    break;
                }
            }
        }

        let status = self.flush(tag);
        if status == Status::Ok {
            debug!("S3 | {plugin_id} | Processed {count} events with tag {tag}");
        }
        status
    }
}

impl std::fmt::Debug for OutputPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPlugin")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

fn build_runtime() -> Result<Runtime, PluginError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(PluginError::Runtime)
}

/// Shared handle to a registered instance.
///
/// The host never drives one instance from two threads at once, so the lock
/// is uncontended; it only lets different instances run their blocking calls
/// without holding the registry.
pub type SharedPlugin = Arc<Mutex<OutputPlugin>>;

/// Instances created by the host, keyed by handle.
///
/// Handles are assigned in increasing order and never reused, even when
/// construction fails or the instance is removed.
#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    plugins: HashMap<PluginHandle, SharedPlugin>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an instance with the next identifier and stores it.
    pub fn register<F>(&mut self, build: F) -> Result<PluginHandle, PluginError>
    where
        F: FnOnce(u64) -> Result<OutputPlugin, PluginError>,
    {
        let handle = PluginHandle(self.next_id);
        self.next_id += 1;
        let plugin = build(handle.as_raw())?;
        self.plugins.insert(handle, Arc::new(Mutex::new(plugin)));
        Ok(handle)
    }

    pub fn get(&self, handle: PluginHandle) -> Result<SharedPlugin, PluginError> {
        self.plugins
            .get(&handle)
            .cloned()
            .ok_or(PluginError::UnknownHandle(handle.as_raw()))
    }

    pub fn remove(&mut self, handle: PluginHandle) -> Result<SharedPlugin, PluginError> {
        self.plugins
            .remove(&handle)
            .ok_or(PluginError::UnknownHandle(handle.as_raw()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
