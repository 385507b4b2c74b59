//! CORS headers and common response headers.

use crate::{send, service};

#[tokio::test]
async fn test_should_answer_preflight() {
    let svc = service();

    let resp = send(&svc, "OPTIONS", "/any/path").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert!(resp.body.is_empty());
    assert_eq!(resp.header("access-control-allow-origin"), "*");
    assert_eq!(
        resp.header("access-control-allow-methods"),
        "GET, PUT, POST, DELETE, HEAD"
    );
    assert!(resp.header("access-control-allow-headers").contains("Authorization"));
}

#[tokio::test]
async fn test_should_carry_cors_headers_on_every_response() {
    let svc = service();

    // Success and error responses alike.
    let success = send(&svc, "GET", "/").await;
    let error = send(&svc, "GET", "/missing-bucket").await;

    for resp in [&success, &error] {
        assert_eq!(resp.header("access-control-allow-origin"), "*");
        assert_eq!(
            resp.header("access-control-expose-headers"),
            "Last-Modified, Content-Length, ETag"
        );
    }
}

#[tokio::test]
async fn test_should_identify_as_amazon_s3() {
    let svc = service();
    let resp = send(&svc, "GET", "/").await;

    assert_eq!(resp.header("server"), "AmazonS3");
    assert!(!resp.header("x-amz-request-id").is_empty());
    assert!(!resp.header("x-amz-id-2").is_empty());
}
