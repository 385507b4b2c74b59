//! Error document shape, HEAD error behavior, and the time-skew guard.

use std::sync::Arc;

use chrono::TimeZone;
use mocks3_model::clock::ManualClock;

use crate::{send, send_with, service, service_with_clock, xml_text};

#[tokio::test]
async fn test_should_render_error_document() {
    let svc = service();

    let resp = send(&svc, "GET", "/missing-bucket/some-key").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert_eq!(resp.header("content-type"), "application/xml");

    let text = resp.text();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert_eq!(xml_text(text, "Code"), Some("NoSuchBucket"));
    assert!(xml_text(text, "Message").is_some());
    assert!(xml_text(text, "RequestId").is_some());
}

#[tokio::test]
async fn test_should_match_request_id_header_and_body() {
    let svc = service();
    let resp = send(&svc, "GET", "/missing-bucket/k").await;
    let body_id = xml_text(resp.text(), "RequestId").expect("request id in body");
    assert_eq!(resp.header("x-amz-request-id"), body_id);
}

#[tokio::test]
async fn test_should_reply_head_errors_without_body() {
    let svc = service();

    let resp = send(&svc, "HEAD", "/missing-bucket").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert!(resp.body.is_empty());

    let resp = send(&svc, "HEAD", "/missing-bucket/k").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_should_reject_unroutable_post() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = send(&svc, "POST", "/b/k").await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("InvalidRequest"));
}

#[tokio::test]
async fn test_should_stub_select_object_content() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = send_with(
        &svc,
        "POST",
        "/b/k?select&select-type=2",
        &[],
        "SELECT * FROM S3Object",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::NOT_IMPLEMENTED);
    assert_eq!(xml_text(resp.text(), "Code"), Some("NotImplemented"));
}

#[tokio::test]
async fn test_should_reject_unknown_method() {
    let svc = service();
    let resp = send(&svc, "PATCH", "/b").await;
    assert_eq!(resp.status, http::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(xml_text(resp.text(), "Code"), Some("MethodNotAllowed"));
}

#[tokio::test]
async fn test_should_reject_skewed_request_time() {
    let clock = Arc::new(ManualClock::new(
        chrono::Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap(),
    ));
    let svc = service_with_clock(clock);

    // 16 minutes behind the server clock: outside the 15-minute limit.
    let resp = send_with(
        &svc,
        "GET",
        "/",
        &[("x-amz-date", "20240517T114400Z")],
        bytes::Bytes::new(),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::FORBIDDEN);
    assert_eq!(xml_text(resp.text(), "Code"), Some("RequestTimeTooSkewed"));
}

#[tokio::test]
async fn test_should_accept_request_within_skew() {
    let clock = Arc::new(ManualClock::new(
        chrono::Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap(),
    ));
    let svc = service_with_clock(clock);

    let resp = send_with(
        &svc,
        "GET",
        "/",
        &[("x-amz-date", "20240517T115500Z")],
        bytes::Bytes::new(),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);
}

#[tokio::test]
async fn test_should_tolerate_unparseable_amz_date() {
    let svc = service();
    let resp = send_with(
        &svc,
        "GET",
        "/",
        &[("x-amz-date", "yesterday-ish")],
        bytes::Bytes::new(),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);
}
