//! Bucket lifecycle over the wire.

use crate::{put_object, send, service, xml_text};

#[tokio::test]
async fn test_should_create_head_and_delete_bucket() {
    let svc = service();

    let resp = send(&svc, "PUT", "/my-bucket").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.header("location"), "/my-bucket");

    let resp = send(&svc, "HEAD", "/my-bucket").await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = send(&svc, "DELETE", "/my-bucket").await;
    assert_eq!(resp.status, http::StatusCode::NO_CONTENT);

    let resp = send(&svc, "HEAD", "/my-bucket").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_should_reject_duplicate_bucket() {
    let svc = service();
    send(&svc, "PUT", "/dup").await;

    let resp = send(&svc, "PUT", "/dup").await;
    assert_eq!(resp.status, http::StatusCode::CONFLICT);
    assert_eq!(xml_text(resp.text(), "Code"), Some("BucketAlreadyExists"));
}

#[tokio::test]
async fn test_should_reject_invalid_bucket_name() {
    let svc = service();

    let resp = send(&svc, "PUT", "/UPPER").await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("InvalidBucketName"));
}

#[tokio::test]
async fn test_should_keep_non_empty_bucket() {
    let svc = service();
    send(&svc, "PUT", "/full").await;
    let resp = put_object(&svc, "/full/an-object", "contents").await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = send(&svc, "DELETE", "/full").await;
    assert_eq!(resp.status, http::StatusCode::CONFLICT);
    assert_eq!(xml_text(resp.text(), "Code"), Some("BucketNotEmpty"));

    // The bucket and its object survive the failed delete.
    let resp = send(&svc, "HEAD", "/full").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    let resp = send(&svc, "GET", "/full/an-object").await;
    assert_eq!(resp.status, http::StatusCode::OK);
}

#[tokio::test]
async fn test_should_delete_bucket_after_emptying() {
    let svc = service();
    send(&svc, "PUT", "/emptied").await;
    put_object(&svc, "/emptied/one", "1").await;

    send(&svc, "DELETE", "/emptied/one").await;
    let resp = send(&svc, "DELETE", "/emptied").await;
    assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_should_reject_unsupported_bucket_subresource() {
    let svc = service();
    send(&svc, "PUT", "/plain").await;

    let resp = send(&svc, "GET", "/plain?versioning").await;
    assert_eq!(resp.status, http::StatusCode::NOT_IMPLEMENTED);
    assert_eq!(xml_text(resp.text(), "Code"), Some("NotImplemented"));
}

#[tokio::test]
async fn test_should_serve_virtual_host_addressing() {
    use std::sync::Arc;

    use mocks3_core::{FakeS3, InMemoryBackend, S3Config};
    use mocks3_http::S3HttpConfig;
    use mocks3_model::clock::SystemClock;

    crate::init_tracing();
    let s3 = FakeS3::with_options(
        Arc::new(InMemoryBackend::new()),
        S3Config::default(),
        Arc::new(SystemClock),
    );
    let svc = s3.into_service(S3HttpConfig {
        virtual_hosting: true,
        ..S3HttpConfig::default()
    });

    // Bucket from the Host header, path carries only the key.
    let resp = crate::send_with(
        &svc,
        "PUT",
        "/",
        &[("host", "vhosted.s3.localhost:4566")],
        bytes::Bytes::new(),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = crate::send_with(
        &svc,
        "PUT",
        "/a/key",
        &[("host", "vhosted.s3.localhost:4566"), ("content-length", "5")],
        "hello",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = crate::send_with(
        &svc,
        "GET",
        "/a/key",
        &[("host", "vhosted.s3.localhost:4566")],
        bytes::Bytes::new(),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.body.as_ref(), b"hello");

    // Path style still resolves the same object.
    let resp = send(&svc, "GET", "/vhosted/a/key").await;
    assert_eq!(resp.status, http::StatusCode::OK);
}
