// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoded log records.
//!
//! Hosts deliver records whose keys and values may be of any type, including
//! raw byte strings that are not valid UTF-8. [`Value`] models every shape a
//! record can take so the encoder can match on it exhaustively.

/// A single record value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// Raw bytes, not guaranteed to be valid UTF-8.
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    /// Key/value pairs in delivery order. Keys may be any value.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Name of the variant, used in error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Map(value.fields)
    }
}

/// Top level mapping of one log event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(Value, Value)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, keeping delivery order.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Builder-style variant of [`Record::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[(Value, Value)] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<(Value, Value)>> for Record {
    fn from(fields: Vec<(Value, Value)>) -> Self {
        Record { fields }
    }
}

impl FromIterator<(Value, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}
