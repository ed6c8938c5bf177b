// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of the host's event stream.
//!
//! A batch is a sequence of concatenated MessagePack values, one per event,
//! shaped either `[timestamp, record]` or `[[timestamp, metadata], record]`.
//!
//! Timestamps are converted as follows:
//! - ext type 0 with 8 bytes: big-endian `u32` seconds then `u32` nanoseconds
//! - integer: seconds since the Unix epoch
//! - float: fractional seconds since the Unix epoch
//! - anything else: the current time

use crate::error::DecodeError;
use crate::record::{Record, Value};
use chrono::{DateTime, Utc};

/// One decoded event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub record: Record,
}

/// Iterator over the events of one batch.
///
/// An event with an unexpected shape is reported and skipped; the values
/// after it are still read. Malformed MessagePack ends the iteration since the
/// stream cannot be resynchronized past it.
#[derive(Debug)]
pub struct RecordDecoder<'a> {
    remaining: &'a [u8],
    failed: bool,
}

impl<'a> RecordDecoder<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        RecordDecoder {
            remaining: data,
            failed: false,
        }
    }

    fn decode_next(&mut self) -> Result<Event, DecodeError> {
        let value = rmpv::decode::read_value(&mut self.remaining)?;
        let rmpv::Value::Array(mut parts) = value else {
            return Err(DecodeError::UnexpectedShape("event is not an array"));
        };
        if parts.len() < 2 {
            return Err(DecodeError::UnexpectedShape("event has fewer than 2 elements"));
        }

        let record = match parts.swap_remove(1) {
            rmpv::Value::Map(pairs) => pairs
                .into_iter()
                .map(|(k, v)| (from_msgpack(k), from_msgpack(v)))
                .collect(),
            _ => return Err(DecodeError::UnexpectedShape("record is not a map")),
        };

        Ok(Event {
            timestamp: to_timestamp(&parts[0]),
            record,
        })
    }
}

impl Iterator for RecordDecoder<'_> {
    type Item = Result<Event, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }
        let result = self.decode_next();
        self.failed = matches!(result, Err(DecodeError::MessagePack(_)));
        Some(result)
    }
}

fn to_timestamp(value: &rmpv::Value) -> DateTime<Utc> {
    let timestamp = match value {
        rmpv::Value::Ext(0, data) if data.len() == 8 => {
            let seconds = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
            let nanos = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
            DateTime::from_timestamp(i64::from(seconds), nanos)
        }
        rmpv::Value::Integer(seconds) => seconds
            .as_i64()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
        rmpv::Value::F32(seconds) => from_float_seconds(f64::from(*seconds)),
        rmpv::Value::F64(seconds) => from_float_seconds(*seconds),
        // [timestamp, metadata]
        rmpv::Value::Array(inner) => inner.first().map(to_timestamp),
        _ => None,
    };
    timestamp.unwrap_or_else(Utc::now)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_float_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn from_msgpack(value: rmpv::Value) -> Value {
    match value {
        rmpv::Value::Nil => Value::Null,
        rmpv::Value::Boolean(b) => Value::Bool(b),
        rmpv::Value::Integer(i) => match (i.as_i64(), i.as_u64()) {
            (Some(signed), _) => Value::Int(signed),
            (None, Some(unsigned)) => Value::UInt(unsigned),
            (None, None) => Value::Null,
        },
        rmpv::Value::F32(f) => Value::Float(f64::from(f)),
        rmpv::Value::F64(f) => Value::Float(f),
        rmpv::Value::String(s) => {
            if s.is_str() {
                Value::String(s.into_str().unwrap_or_default())
            } else {
                Value::Bytes(s.into_bytes())
            }
        }
        rmpv::Value::Binary(b) => Value::Bytes(b),
        rmpv::Value::Array(items) => Value::Array(items.into_iter().map(from_msgpack).collect()),
        rmpv::Value::Map(pairs) => Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (from_msgpack(k), from_msgpack(v)))
                .collect(),
        ),
        rmpv::Value::Ext(_, data) => Value::Bytes(data),
    }
}
