//! Listing and multi-delete over the wire.

use crate::{put_object, send, send_with, service, xml_text};

#[tokio::test]
async fn test_should_list_buckets_as_xml() {
    let svc = service();
    send(&svc, "PUT", "/alpha").await;
    send(&svc, "PUT", "/beta").await;

    let resp = send(&svc, "GET", "/").await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert_eq!(resp.header("content-type"), "application/xml");

    let text = resp.text();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(text.contains(
        "<ListAllMyBucketsResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"
    ));
    assert!(text.contains("<Owner>"));
    assert!(text.contains("<Name>alpha</Name>"));
    assert!(text.contains("<Name>beta</Name>"));
    // Sorted: alpha before beta.
    assert!(text.find("alpha").unwrap() < text.find("beta").unwrap());
}

#[tokio::test]
async fn test_should_list_objects_with_prefix() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    put_object(&svc, "/b/photos/cat.jpg", "cat").await;
    put_object(&svc, "/b/photos/dog.jpg", "dog").await;
    put_object(&svc, "/b/docs/readme.md", "text").await;

    let resp = send(&svc, "GET", "/b?prefix=photos%2F").await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let text = resp.text();
    assert_eq!(xml_text(text, "Name"), Some("b"));
    assert_eq!(xml_text(text, "Prefix"), Some("photos/"));
    assert!(text.contains("<Key>photos/cat.jpg</Key>"));
    assert!(text.contains("<Key>photos/dog.jpg</Key>"));
    assert!(!text.contains("readme.md"));
    assert!(text.contains("<StorageClass>STANDARD</StorageClass>"));
    assert!(text.contains("<Size>3</Size>"));
}

#[tokio::test]
async fn test_should_list_missing_bucket_as_404() {
    let svc = service();
    let resp = send(&svc, "GET", "/never-created").await;
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert_eq!(xml_text(resp.text(), "Code"), Some("NoSuchBucket"));
}

#[tokio::test]
async fn test_should_multi_delete_quietly() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    for key in ["foo", "bar", "baz"] {
        put_object(&svc, &format!("/b/{key}"), "x").await;
    }

    let body = "<Delete>\
        <Quiet>true</Quiet>\
        <Object><Key>foo</Key></Object>\
        <Object><Key>bar</Key></Object>\
        </Delete>";
    let resp = send_with(&svc, "POST", "/b?delete", &[], body).await;
    assert_eq!(resp.status, http::StatusCode::OK);

    let text = resp.text();
    assert!(text.contains("<DeleteResult"));
    assert!(!text.contains("<Deleted>"));
    assert!(!text.contains("<Error>"));

    let resp = send(&svc, "GET", "/b").await;
    let text = resp.text();
    assert!(text.contains("<Key>baz</Key>"));
    assert!(!text.contains("<Key>foo</Key>"));
    assert!(!text.contains("<Key>bar</Key>"));
}

#[tokio::test]
async fn test_should_multi_delete_loudly_by_default() {
    let svc = service();
    send(&svc, "PUT", "/b").await;
    put_object(&svc, "/b/foo", "x").await;

    let body = "<Delete><Object><Key>foo</Key></Object></Delete>";
    let resp = send_with(&svc, "POST", "/b?delete", &[], body).await;
    assert_eq!(resp.status, http::StatusCode::OK);
    assert!(resp.text().contains("<Deleted><Key>foo</Key></Deleted>"));
}

#[tokio::test]
async fn test_should_reject_malformed_multi_delete() {
    let svc = service();
    send(&svc, "PUT", "/b").await;

    let resp = send_with(&svc, "POST", "/b?delete", &[], "<Delete><Object>").await;
    assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(xml_text(resp.text(), "Code"), Some("MalformedXML"));
}
