// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The object-storage capability the flush engine uploads through.

use crate::constants::OBJECT_ACL;
use crate::error::UploadError;
use async_trait::async_trait;

/// Everything needed for one put-object call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    /// Canned ACL, always [`OBJECT_ACL`].
    pub acl: &'static str,
    pub body: Vec<u8>,
    /// Exact byte length of `body`.
    pub content_length: i64,
}

impl PutObjectRequest {
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, body: Vec<u8>) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let content_length = body.len() as i64;
        PutObjectRequest {
            bucket: bucket.into(),
            key: key.into(),
            acl: OBJECT_ACL,
            body,
            content_length,
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores one object. Returns only once the service confirmed the write
    /// or the attempt failed.
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), UploadError>;
}
