// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # S3 Output
//!
//! Log output plugin that buffers structured records delivered by a log-shipping
//! host and uploads them as (optionally gzip-compressed) objects to Amazon S3.
//!
//! ## Pipeline
//!
//! ```text
//!   host batch ──> decoder ──> encoder ──> buffer ──(threshold)──> flush ──> S3
//! ```
//!
//! - [`decoder`]: turns the host's MessagePack event stream into [`record::Record`]s
//! - [`encoder`]: serializes one record into a newline-terminated JSON line
//! - [`buffer`]: append-only accumulator of encoded lines not yet stored
//! - [`key`]: derives object keys from time, tag and a random UUID
//! - [`output`]: the flush engine, compression and the size threshold policy
//! - [`plugin`]: host-facing adapter, instance registry and status codes
//! - [`ffi`]: C-ABI entry points for hosts loading the library dynamically

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod ffi;
pub mod key;
pub mod logger;
pub mod output;
pub mod plugin;
pub mod record;
pub mod s3;
pub mod store;
