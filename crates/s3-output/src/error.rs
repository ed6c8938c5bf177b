// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while reading the plugin configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Errors that make a single record impossible to serialize.
///
/// These never abort a batch: the record is logged and discarded.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Unsupported map key type: {0}")]
    UnsupportedKey(&'static str),

    #[error("Unsupported float value: {0}")]
    NonFiniteFloat(f64),

    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The random source could not produce a unique object name.
#[derive(Debug, thiserror::Error)]
#[error("Failed to generate UUID: {0}")]
pub struct KeyError(pub String);

/// Failure reported by the object-storage capability.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct UploadError {
    /// HTTP status returned by the service, if the request got that far.
    pub status: Option<u16>,
    pub message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        UploadError {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Why a flush did not complete. The buffer is untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    #[error("Failed to compress payload: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Failed to upload object {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: UploadError,
    },
}

/// Errors raised while decoding the host's event stream
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed MessagePack data: {0}")]
    MessagePack(#[from] rmpv::decode::Error),

    #[error("Unexpected event shape: {0}")]
    UnexpectedShape(&'static str),
}

/// Errors surfaced by the host adapter
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Unknown plugin handle: {0}")]
    UnknownHandle(u64),
}
