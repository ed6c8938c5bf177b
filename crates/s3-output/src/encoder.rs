// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Record serialization.
//!
//! Each record becomes one JSON object followed by a single `\n`. Byte strings
//! are converted to text (invalid UTF-8 sequences are replaced with U+FFFD)
//! before serialization, both as keys and as values. Map keys must be scalar:
//! strings, byte strings or integers.
//!
//! Output is compact, with object keys sorted. `<`, `>`, `&`, U+2028 and
//! U+2029 are written as `\uXXXX` escapes so a line can be embedded in HTML
//! or JavaScript unchanged.

use crate::error::EncodeError;
use crate::record::{Record, Value};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Number};
use std::io;

/// Serializes `record` into a newline-terminated JSON line.
pub fn encode_record(record: &Record) -> Result<Vec<u8>, EncodeError> {
    let object = to_json_object(record.fields())?;
    let mut data = Vec::with_capacity(128);
    object.serialize(&mut Serializer::with_formatter(&mut data, HtmlSafeFormatter))?;
    data.push(b'\n');
    Ok(data)
}

/// Compact formatter escaping HTML-significant characters and line separators
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

fn to_json_object(pairs: &[(Value, Value)]) -> Result<serde_json::Value, EncodeError> {
    let mut map = Map::with_capacity(pairs.len());
    for (key, value) in pairs {
        map.insert(to_json_key(key)?, to_json(value)?);
    }
    Ok(serde_json::Value::Object(map))
}

fn to_json_key(key: &Value) -> Result<String, EncodeError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
        Value::Int(i) => Ok(i.to_string()),
        Value::UInt(u) => Ok(u.to_string()),
        other => Err(EncodeError::UnsupportedKey(other.kind())),
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value, EncodeError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::UInt(u) => serde_json::Value::Number((*u).into()),
        Value::Float(f) => {
            serde_json::Value::Number(Number::from_f64(*f).ok_or(EncodeError::NonFiniteFloat(*f))?)
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
        Value::Array(items) => serde_json::Value::Array(
            items.iter().map(to_json).collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(pairs) => to_json_object(pairs)?,
    })
}
