// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::UploadError;
use crate::store::{ObjectStore, PutObjectRequest};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::debug;

/// [`ObjectStore`] backed by Amazon S3.
///
/// Credentials come from the default AWS provider chain (environment, profile,
/// web identity, container or instance metadata).
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub async fn new(region: &str) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        S3ObjectStore {
            client: Client::new(&aws_config),
        }
    }

    /// Builds the store from an explicit client configuration, e.g. to target
    /// an S3-compatible endpoint.
    #[must_use]
    pub fn from_conf(conf: aws_sdk_s3::Config) -> Self {
        S3ObjectStore {
            client: Client::from_conf(conf),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), UploadError> {
        debug!(
            "S3 | PutObject s3://{}/{} ({} bytes)",
            request.bucket, request.key, request.content_length
        );

        self.client
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .acl(ObjectCannedAcl::from(request.acl))
            .content_length(request.content_length)
            .body(ByteStream::from(request.body))
            .send()
            .await
            .map_err(|e| {
                let status = e.raw_response().map(|resp| resp.status().as_u16());
                let error = UploadError::new(DisplayErrorContext(&e).to_string());
                match status {
                    Some(status) => error.with_status(status),
                    None => error,
                }
            })?;

        Ok(())
    }
}
