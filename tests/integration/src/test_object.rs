//! Object CRUD, ranges, metadata, and integrity over the wire.

use crate::{put_object, send, send_with, service, xml_text};

#[tokio::test]
async fn test_should_put_then_get_object() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = put_object(&svc, "/b/k", "hello").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.header("etag"), "\"5d41402abc4b2a76b9719d911017c592\"");

    let resp = send(&svc, "GET", "/b/k").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.body.as_ref(), b"hello");
    assert_eq!(resp.header("etag"), "\"5d41402abc4b2a76b9719d911017c592\"");
    assert_eq!(resp.header("accept-ranges"), "bytes");
    assert_eq!(resp.header("content-length"), "5");
    assert!(resp.header("last-modified").ends_with("GMT"));
}

#[tokio::test]
async fn test_should_404_on_missing_object() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = send(&svc, "GET", "/b/nothing").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert_eq!(xml_text(resp.text(), "Code"), Some("NoSuchKey"));
}

#[tokio::test]
async fn test_should_serve_bounded_range() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    put_object(&svc, "/b/k", "0123456789").await;

    let resp = send_with(&svc, "GET", "/b/k", &[("range", "bytes=2-4")], bytes::Bytes::new()).await;
    assert_eq!(resp.status, http::StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.body.as_ref(), b"234");
    assert_eq!(resp.header("content-range"), "bytes 2-4/10");
    assert_eq!(resp.header("content-length"), "3");
}

#[tokio::test]
async fn test_should_serve_whole_object_for_suffix_overshoot() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    let payload: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
    put_object(&svc, "/b/blob", payload.clone()).await;

    let resp =
        send_with(&svc, "GET", "/b/blob", &[("range", "bytes=-1025")], bytes::Bytes::new()).await;
    assert_eq!(resp.status, http::StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.header("content-length"), "1024");
    assert_eq!(resp.body.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_should_reject_multi_range_request() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    put_object(&svc, "/b/k", "0123456789").await;

    let resp = send_with(
        &svc,
        "GET",
        "/b/k",
        &[("range", "bytes=0-1,4-5")],
        bytes::Bytes::new(),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(xml_text(resp.text(), "Code"), Some("InvalidRange"));
}

#[tokio::test]
async fn test_should_fail_put_on_md5_mismatch() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    // "bnVwCg==" decodes fine but is not the MD5 of the body.
    let resp = send_with(
        &svc,
        "PUT",
        "/b/k",
        &[("content-length", "5"), ("content-md5", "bnVwCg==")],
        "hello",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("BadDigest"));

    // The failed put left nothing behind.
    let resp = send(&svc, "GET", "/b/k").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_should_accept_put_with_matching_md5() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    // base64(md5("hello"))
    let resp = send_with(
        &svc,
        "PUT",
        "/b/k",
        &[
            ("content-length", "5"),
            ("content-md5", "XUFAKrxLKna5cZ2REBfFkg=="),
        ],
        "hello",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);
}

#[tokio::test]
async fn test_should_require_content_length_on_put() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = send_with(&svc, "PUT", "/b/k", &[], "hello").await;
    assert_eq!(resp.status, http::StatusCode::LENGTH_REQUIRED);
    assert_eq!(xml_text(resp.text(), "Code"), Some("MissingContentLength"));
}

#[tokio::test]
async fn test_should_round_trip_metadata_headers() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = send_with(
        &svc,
        "PUT",
        "/b/k",
        &[
            ("content-length", "1"),
            ("x-amz-meta-color", "orange"),
            ("x-amz-acl", "private"),
        ],
        "x",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = send(&svc, "HEAD", "/b/k").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.header("x-amz-meta-color"), "orange");
    assert_eq!(resp.header("x-amz-acl"), "private");
    assert_eq!(resp.header("content-length"), "1");
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_should_reject_oversized_metadata() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let big = "v".repeat(2001);
    let resp = send_with(
        &svc,
        "PUT",
        "/b/k",
        &[("content-length", "1"), ("x-amz-meta-big", &big)],
        "x",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("MetadataTooLarge"));
}

#[tokio::test]
async fn test_should_reject_oversized_key() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let uri = format!("/b/{}", "k".repeat(1025));
    let resp = put_object(&svc, &uri, "x").await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("KeyTooLong"));
}

#[tokio::test]
async fn test_should_delete_object_idempotently() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    put_object(&svc, "/b/k", "x").await;

    let resp = send(&svc, "DELETE", "/b/k").await;
    assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
    assert_eq!(resp.header("x-amz-delete-marker"), "false");

    // Deleting a now-missing key still succeeds.
    let resp = send(&svc, "DELETE", "/b/k").await;
    assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_should_overwrite_object_on_second_put() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    put_object(&svc, "/b/k", "first").await;
    put_object(&svc, "/b/k", "second!").await;

    let resp = send(&svc, "GET", "/b/k").await;
    assert_eq!(resp.body.as_ref(), b"second!");
}

#[tokio::test]
async fn test_should_store_browser_form_upload() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let body = "--formbound\r\n\
         Content-Disposition: form-data; name=\"key\"\r\n\
         \r\n\
         from-form.txt\r\n\
         --formbound\r\n\
         Content-Disposition: form-data; name=\"X-Amz-Meta-Via\"\r\n\
         \r\n\
         post\r\n\
         --formbound\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"f.txt\"\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         uploaded by form\r\n\
         --formbound--\r\n";

    let resp = send_with(
        &svc,
        "POST",
        "/b",
        &[("content-type", "multipart/form-data; boundary=formbound")],
        body,
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = send(&svc, "GET", "/b/from-form.txt").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.body.as_ref(), b"uploaded by form");
    assert_eq!(resp.header("x-amz-meta-via"), "post");
}

#[tokio::test]
async fn test_should_reject_form_upload_with_two_files() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let body = "--bb\r\n\
         Content-Disposition: form-data; name=\"key\"\r\n\
         \r\n\
         k\r\n\
         --bb\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"a\"\r\n\
         \r\n\
         one\r\n\
         --bb\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"b\"\r\n\
         \r\n\
         two\r\n\
         --bb--\r\n";

    let resp = send_with(
        &svc,
        "POST",
        "/b",
        &[("content-type", "multipart/form-data; boundary=bb")],
        body,
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(
        xml_text(resp.text(), "Code"),
        Some("IncorrectNumberOfFilesInPostRequest")
    );
}
