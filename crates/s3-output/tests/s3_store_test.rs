// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use mockito::{Matcher, Server};
use s3_output::config::OutputConfig;
use s3_output::output::OutputTarget;
use s3_output::record::Record;
use s3_output::s3::S3ObjectStore;
use s3_output::store::{ObjectStore, PutObjectRequest};
use std::sync::Arc;

fn store_for(server: &Server) -> S3ObjectStore {
    let conf = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
        .endpoint_url(server.url())
        .force_path_style(true)
        .retry_config(RetryConfig::disabled())
        .build();
    S3ObjectStore::from_conf(conf)
}

#[tokio::test]
async fn s3_store_puts_object_with_owner_acl() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Regex("^/test-bucket/logs/".to_string()))
        .match_header("x-amz-acl", "bucket-owner-full-control")
        .with_status(200)
        .create_async()
        .await;

    let store = store_for(&server);
    let request = PutObjectRequest::new(
        "test-bucket",
        "logs/2024/1/15/14/2024-1-15-14-30-abc.log",
        b"{\"k\":\"v\"}\n".to_vec(),
    );

    let result = store.put_object(request).await;

    assert!(result.is_ok(), "{result:?}");
    mock.assert_async().await;
}

#[tokio::test]
async fn s3_store_reports_server_error_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Regex("^/test-bucket/".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let store = store_for(&server);
    let request = PutObjectRequest::new("test-bucket", "logs/object.log", b"x\n".to_vec());

    let error = store.put_object(request).await.unwrap_err();

    assert_eq!(error.status, Some(500));
    mock.assert_async().await;
}

#[tokio::test]
async fn output_target_flushes_through_s3_store() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Regex(r"^/test-bucket/fluent/\d+/\d+/\d+/\d+/app-.*\.gz$".to_string()))
        .with_status(200)
        .create_async()
        .await;

    let config = OutputConfig {
        region: "us-east-1".to_string(),
        bucket: "test-bucket".to_string(),
        prefix: "fluent".to_string(),
        gzip: true,
    };
    let mut target = OutputTarget::new(7, config, Arc::new(store_for(&server)));

    target
        .add_record(&Record::new().with("log", "hello"), "app", chrono::Utc::now())
        .await;
    target.flush("app").await.unwrap();

    assert!(target.buffer().is_empty());
    mock.assert_async().await;
}
