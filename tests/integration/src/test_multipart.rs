//! Multipart upload flows over the wire.

use crate::{send, send_with, service, xml_text};

/// Initiate an upload and return its id.
async fn initiate(svc: &mocks3_http::S3HttpService<mocks3_core::FakeS3>, uri: &str) -> String {
    let resp = send(svc, "POST", &format!("{uri}?uploads")).await;
    assert_eq!(resp.status, http::StatusCode::OK);
    xml_text(resp.text(), "UploadId")
        .expect("initiate response should carry an UploadId")
        .to_owned()
}

/// Upload a part and return its ETag header.
async fn put_part(
    svc: &mocks3_http::S3HttpService<mocks3_core::FakeS3>,
    uri: &str,
    upload_id: &str,
    number: u32,
    body: Vec<u8>,
) -> String {
    let len = body.len().to_string();
    let resp = send_with(
        svc,
        "PUT",
        &format!("{uri}?partNumber={number}&uploadId={upload_id}"),
        &[("content-length", &len)],
        body,
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);
    resp.header("etag").to_owned()
}

fn complete_xml(parts: &[(u32, &str)]) -> String {
    let mut xml = String::from("<CompleteMultipartUpload>");
    for (number, etag) in parts {
        xml.push_str(&format!(
            "<Part><PartNumber>{number}</PartNumber><ETag>{etag}</ETag></Part>"
        ));
    }
    xml.push_str("</CompleteMultipartUpload>");
    xml
}

#[tokio::test]
async fn test_should_complete_multipart_upload() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/assembled").await;

    let part1 = vec![42u8; 6 * 1024 * 1024];
    let part2 = vec![7u8; 100];
    let etag1 = put_part(&svc, "/b/assembled", &upload_id, 1, part1).await;
    let etag2 = put_part(&svc, "/b/assembled", &upload_id, 2, part2).await;

    let body = complete_xml(&[(1, &etag1), (2, &etag2)]);
    let resp = send_with(
        &svc,
        "POST",
        &format!("/b/assembled?uploadId={upload_id}"),
        &[],
        body,
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let etag = xml_text(resp.text(), "ETag").expect("completion carries an ETag");
    assert!(etag.ends_with("-2\""), "composite etag, got {etag}");
    assert_eq!(xml_text(resp.text(), "Bucket"), Some("b"));
    assert_eq!(xml_text(resp.text(), "Key"), Some("assembled"));

    let resp = send(&svc, "HEAD", "/b/assembled").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(
        resp.header("content-length"),
        (6 * 1024 * 1024 + 100).to_string()
    );
}

#[tokio::test]
async fn test_should_overwrite_part_and_use_latest_bytes() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/k").await;
    put_part(&svc, "/b/k", &upload_id, 1, b"old".to_vec()).await;
    let etag = put_part(&svc, "/b/k", &upload_id, 1, b"new".to_vec()).await;

    let resp = send_with(
        &svc,
        "POST",
        &format!("/b/k?uploadId={upload_id}"),
        &[],
        complete_xml(&[(1, &etag)]),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = send(&svc, "GET", "/b/k").await;
    assert_eq!(resp.body.as_ref(), b"new");
}

#[tokio::test]
async fn test_should_abort_upload() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/k").await;

    let resp = send(&svc, "DELETE", &format!("/b/k?uploadId={upload_id}")).await;
    assert_eq!(resp.status, http::StatusCode::NO_CONTENT);

    // The id is gone for every subsequent operation.
    let resp = send_with(
        &svc,
        "PUT",
        &format!("/b/k?partNumber=1&uploadId={upload_id}"),
        &[("content-length", "1")],
        "x",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert_eq!(xml_text(resp.text(), "Code"), Some("NoSuchUpload"));

    let resp = send(&svc, "DELETE", &format!("/b/k?uploadId={upload_id}")).await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_should_reject_completion_with_wrong_etag() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/k").await;
    put_part(&svc, "/b/k", &upload_id, 1, b"data".to_vec()).await;

    let resp = send_with(
        &svc,
        "POST",
        &format!("/b/k?uploadId={upload_id}"),
        &[],
        complete_xml(&[(1, "\"00000000000000000000000000000000\"")]),
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("InvalidPart"));
}

#[tokio::test]
async fn test_should_reject_malformed_completion_body() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/k").await;
    let resp = send_with(
        &svc,
        "POST",
        &format!("/b/k?uploadId={upload_id}"),
        &[],
        "<CompleteMultipartUpload><Part>",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("MalformedXML"));
}

#[tokio::test]
async fn test_should_reject_out_of_range_part_number() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    let upload_id = initiate(&svc, "/b/k").await;

    let resp = send_with(
        &svc,
        "PUT",
        &format!("/b/k?partNumber=10001&uploadId={upload_id}"),
        &[("content-length", "1")],
        "x",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("InvalidPart"));
}

#[tokio::test]
async fn test_should_list_parts_over_the_wire() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/k").await;
    put_part(&svc, "/b/k", &upload_id, 1, b"first".to_vec()).await;
    put_part(&svc, "/b/k", &upload_id, 3, b"third".to_vec()).await;

    let resp = send(&svc, "GET", &format!("/b/k?uploadId={upload_id}")).await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let text = resp.text();
    assert!(text.contains("<ListPartsResult"));
    assert!(text.contains("<PartNumber>1</PartNumber>"));
    assert!(text.contains("<PartNumber>3</PartNumber>"));
    assert_eq!(xml_text(text, "IsTruncated"), Some("false"));
}

#[tokio::test]
async fn test_should_list_in_progress_uploads() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/pending").await;

    let resp = send(&svc, "GET", "/b?uploads").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert!(resp.text().contains("<ListMultipartUploadsResult"));
    assert!(resp.text().contains(&format!("<UploadId>{upload_id}</UploadId>")));
    assert!(resp.text().contains("<Key>pending</Key>"));

    // Abort removes it from the listing.
    send(&svc, "DELETE", &format!("/b/pending?uploadId={upload_id}")).await;
    let resp = send(&svc, "GET", "/b?uploads").await;
    assert!(!resp.text().contains("<Key>pending</Key>"));
}

#[tokio::test]
async fn test_should_filter_upload_listing_by_prefix() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    initiate(&svc, "/b/photos/x").await;
    initiate(&svc, "/b/docs/y").await;

    let resp = send(&svc, "GET", "/b?uploads&prefix=photos%2F").await;
    assert!(resp.text().contains("<Key>photos/x</Key>"));
    assert!(!resp.text().contains("<Key>docs/y</Key>"));
}

#[tokio::test]
async fn test_should_complete_empty_upload_as_zero_byte_object() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let upload_id = initiate(&svc, "/b/empty").await;
    let resp = send_with(
        &svc,
        "POST",
        &format!("/b/empty?uploadId={upload_id}"),
        &[],
        "<CompleteMultipartUpload></CompleteMultipartUpload>",
    )
    .await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let resp = send(&svc, "HEAD", "/b/empty").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.header("content-length"), "0");
}
