//! End-to-end wire tests for the mocks3 emulator.
//!
//! These tests drive the full pipeline in-process: a raw `http::Request`
//! goes through the middleware, router, dispatch, and handlers, and the
//! assertions run against the wire response (status, headers, XML body). No
//! network involved, so `cargo test` is hermetic.

use std::sync::{Arc, Once};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use mocks3_core::FakeS3;
use mocks3_http::{S3HttpConfig, S3HttpService};
use mocks3_model::clock::Clock;

#[cfg(test)]
mod test_bucket;
#[cfg(test)]
mod test_cors;
#[cfg(test)]
mod test_error;
#[cfg(test)]
mod test_list;
#[cfg(test)]
mod test_multipart;
#[cfg(test)]
mod test_object;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A collected wire response.
#[derive(Debug)]
pub struct WireResponse {
    /// Response status.
    pub status: http::StatusCode,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Collected response body.
    pub body: Bytes,
}

impl WireResponse {
    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body should be UTF-8")
    }

    /// A response header as text, or empty when absent.
    #[must_use]
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// A fresh in-memory emulator service with default configuration.
#[must_use]
pub fn service() -> S3HttpService<FakeS3> {
    init_tracing();
    FakeS3::in_memory().into_service(S3HttpConfig::default())
}

/// A fresh emulator service sharing the given clock.
#[must_use]
pub fn service_with_clock(clock: Arc<dyn Clock>) -> S3HttpService<FakeS3> {
    init_tracing();
    let s3 = FakeS3::with_options(
        Arc::new(mocks3_core::InMemoryBackend::new()),
        mocks3_core::S3Config::default(),
        clock,
    );
    s3.into_service(S3HttpConfig::default())
}

/// Send a bodyless request through the service.
pub async fn send(
    svc: &S3HttpService<FakeS3>,
    method: &str,
    uri: &str,
) -> WireResponse {
    send_with(svc, method, uri, &[], Bytes::new()).await
}

/// Send a request with headers and body through the service.
pub async fn send_with(
    svc: &S3HttpService<FakeS3>,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: impl Into<Bytes>,
) -> WireResponse {
    let mut builder = http::Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder
        .body(Full::new(body.into()))
        .expect("test request should be valid");

    let response = svc.process(request).await;
    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .expect("response body should collect")
        .to_bytes();

    WireResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    }
}

/// Send a `PUT` with a body, declaring its `Content-Length`.
pub async fn put_object(
    svc: &S3HttpService<FakeS3>,
    uri: &str,
    body: impl Into<Bytes>,
) -> WireResponse {
    let body = body.into();
    let len = body.len().to_string();
    send_with(svc, "PUT", uri, &[("content-length", &len)], body).await
}

/// Extract the text of the first `<tag>...</tag>` element in an XML body.
#[must_use]
pub fn xml_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(&xml[start..end])
}
