// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Encoded records that have not been durably stored yet.
///
/// Append-only between flushes. The buffer itself enforces no limit; the
/// caller checks [`LogBuffer::would_exceed`] before appending and flushes
/// first when needed.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    data: Vec<u8>,
}

impl LogBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// True when appending `incoming` bytes would take the buffer past `limit`.
    #[must_use]
    pub fn would_exceed(&self, incoming: usize, limit: usize) -> bool {
        self.data.len() + incoming > limit
    }

    /// Empties the buffer. Only called once an upload is confirmed.
    pub fn reset(&mut self) {
        self.data.clear();
    }
}
