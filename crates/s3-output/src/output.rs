// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Buffering and flushing of encoded records.
//!
//! ```text
//!   add_record ──> encode ──> threshold check ──> append
//!                                   │
//!                                   v (would exceed)
//!                                 flush ──> name ──> gzip? ──> put_object ──> reset
//! ```
//!
//! The buffer is reset only after the object store confirmed the upload. A
//! failed flush leaves every buffered byte in place so the next flush sends it
//! again.

use crate::buffer::LogBuffer;
use crate::config::OutputConfig;
use crate::constants::{MAX_OBJECT_SIZE_BYTES, OBJECT_ACL};
use crate::encoder::encode_record;
use crate::error::FlushError;
use crate::key::{KeyNamer, ObjectKey};
use crate::plugin::Status;
use crate::record::Record;
use crate::store::{ObjectStore, PutObjectRequest};
use chrono::{DateTime, Utc};
use flate2::{Compression, GzBuilder};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// One object about to be uploaded. Lives for a single flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingObject {
    pub key: ObjectKey,
    pub payload: Vec<u8>,
    pub content_length: i64,
}

impl PendingObject {
    #[must_use]
    pub fn new(key: ObjectKey, payload: Vec<u8>) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let content_length = payload.len() as i64;
        PendingObject {
            key,
            payload,
            content_length,
        }
    }

    #[must_use]
    pub fn into_request(self, bucket: &str) -> PutObjectRequest {
        PutObjectRequest {
            bucket: bucket.to_string(),
            key: self.key.to_string(),
            acl: OBJECT_ACL,
            body: self.payload,
            content_length: self.content_length,
        }
    }
}

/// Compresses `data` as a single gzip member whose header names `file_name`.
pub fn gzip_compress(data: &[u8], file_name: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .filename(file_name)
        .write(Vec::with_capacity(data.len() / 4), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// A configured destination bucket together with its pending logs
pub struct OutputTarget {
    plugin_id: u64,
    config: OutputConfig,
    key_namer: KeyNamer,
    store: Arc<dyn ObjectStore>,
    buffer: LogBuffer,
    max_object_size: usize,
}

impl OutputTarget {
    #[must_use]
    pub fn new(plugin_id: u64, config: OutputConfig, store: Arc<dyn ObjectStore>) -> Self {
        let key_namer = KeyNamer::new(config.prefix.clone(), config.gzip);
        OutputTarget {
            plugin_id,
            config,
            key_namer,
            store,
            buffer: LogBuffer::new(),
            max_object_size: MAX_OBJECT_SIZE_BYTES,
        }
    }

    #[must_use]
    pub fn with_key_namer(mut self, key_namer: KeyNamer) -> Self {
        self.key_namer = key_namer;
        self
    }

    /// Overrides the flush threshold. Only meant for tests and tuning.
    #[must_use]
    pub fn with_max_object_size(mut self, max_object_size: usize) -> Self {
        self.max_object_size = max_object_size;
        self
    }

    #[must_use]
    pub fn plugin_id(&self) -> u64 {
        self.plugin_id
    }

    #[must_use]
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    #[must_use]
    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// Encodes `record` and appends it to the buffer, flushing the current
    /// contents first if the record would take the buffer past the threshold.
    ///
    /// Always returns [`Status::Ok`]: a record that fails to encode is logged
    /// and discarded, and a failed threshold flush is logged and retried by
    /// the next flush since the buffer keeps its data.
    pub async fn add_record(
        &mut self,
        record: &Record,
        tag: &str,
        timestamp: DateTime<Utc>,
    ) -> Status {
        let data = match encode_record(record) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    "S3 | {} | Failed to encode record with tag {}, discarding it: {}",
                    self.plugin_id, tag, e
                );
                return Status::Ok;
            }
        };

        // An empty buffer has nothing to flush ahead of an oversized record
        if !self.buffer.is_empty()
            && self.buffer.would_exceed(data.len(), self.max_object_size)
        {
            debug!(
                "S3 | {} | Buffer at {} bytes cannot take {} more, flushing",
                self.plugin_id,
                self.buffer.size(),
                data.len()
            );
            if let Err(e) = self.flush(tag).await {
                error!(
                    "S3 | {} | Failed to flush logs with tag {} at size threshold: {}",
                    self.plugin_id, tag, e
                );
            }
        }

        self.buffer.append(&data);
        trace!(
            "S3 | {} | Buffered {} bytes for event at {}",
            self.plugin_id,
            data.len(),
            timestamp
        );
        Status::Ok
    }

    /// Uploads the buffered logs as one object and empties the buffer.
    ///
    /// Every call produces exactly one object, an empty one when nothing is
    /// buffered. On error the buffer is left exactly as it was.
    pub async fn flush(&mut self, tag: &str) -> Result<(), FlushError> {
        let pending = self.prepare(tag, Utc::now())?;
        let key = pending.key.to_string();
        debug!(
            "S3 | {} | Flush putobject to s3://{}/{}",
            self.plugin_id, self.config.bucket, key
        );

        let request = pending.into_request(&self.config.bucket);
        if let Err(source) = self.store.put_object(request).await {
            return Err(FlushError::Upload { key, source });
        }

        debug!(
            "S3 | {} | Uploaded {} buffered bytes to {}",
            self.plugin_id,
            self.buffer.size(),
            key
        );
        self.buffer.reset();
        Ok(())
    }

    /// Builds the object for the current buffer contents without touching them.
    pub fn prepare(&self, tag: &str, now: DateTime<Utc>) -> Result<PendingObject, FlushError> {
        let key = self.key_namer.name(now, tag).unwrap_or_else(|e| {
            warn!(
                "S3 | {} | {} for tag {}, falling back to timestamp object name",
                self.plugin_id, e, tag
            );
            self.key_namer.timestamp_key(now)
        });
        let payload = if self.config.gzip {
            gzip_compress(self.buffer.as_bytes(), &key.log_file_name())?
        } else {
            self.buffer.as_bytes().to_vec()
        };
        Ok(PendingObject::new(key, payload))
    }
}

impl std::fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputTarget")
            .field("plugin_id", &self.plugin_id)
            .field("config", &self.config)
            .field("buffered_bytes", &self.buffer.size())
            .finish_non_exhaustive()
    }
}
