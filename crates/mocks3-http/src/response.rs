//! Typed outputs to HTTP responses.
//!
//! Provides the [`IntoS3Response`] trait and implementations for converting
//! each operation output into an HTTP response with the right status code,
//! S3 headers, and XML body. The error-to-response shim lives here too:
//! handlers return `Result<_, S3Error>` and [`error_to_response`] is the
//! single place an error becomes wire bytes.

use http::header::HeaderValue;

use mocks3_model::error::{S3Error, S3ErrorCode};
use mocks3_model::output::{
    CompleteMultipartUploadOutput, CreateMultipartUploadOutput, DeleteObjectsOutput,
    GetObjectOutput, HeadObjectOutput, ListBucketsOutput, ListMultipartUploadsOutput,
    ListObjectsOutput, ListPartsOutput, PutObjectOutput, UploadPartOutput,
};

use crate::body::S3ResponseBody;

/// Trait for converting an operation output into an HTTP response.
pub trait IntoS3Response {
    /// Convert this output into an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns an [`S3Error`] if the response cannot be constructed.
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error>;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format a timestamp as an HTTP date (`Mon, 02 Jan 2006 15:04:05 GMT`).
#[must_use]
pub fn format_http_date(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build a response from a builder, converting build errors to [`S3Error`].
fn build_response(
    builder: http::response::Builder,
    body: S3ResponseBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    builder
        .body(body)
        .map_err(|e| S3Error::internal_error(format!("failed to build HTTP response: {e}")))
}

/// Build an empty response with the given status.
///
/// # Errors
///
/// Returns an [`S3Error`] if the response cannot be constructed.
pub fn empty_response(status: http::StatusCode) -> Result<http::Response<S3ResponseBody>, S3Error> {
    build_response(http::Response::builder().status(status), S3ResponseBody::empty())
}

/// Build a 200 response carrying an XML document.
fn xml_response(
    root: &str,
    value: &impl mocks3_xml::S3Serialize,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let xml = mocks3_xml::to_xml(root, value)
        .map_err(|e| S3Error::internal_error("failed to serialize response XML").with_source(e))?;

    let builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/xml");
    build_response(builder, S3ResponseBody::from_xml(xml))
}

/// Apply stored object metadata verbatim as response headers.
///
/// The stored `last-modified` entry is skipped; the response carries the
/// object record's timestamp in the real `Last-Modified` header instead.
fn set_metadata_headers(
    mut builder: http::response::Builder,
    metadata: &std::collections::BTreeMap<String, String>,
) -> http::response::Builder {
    for (key, value) in metadata {
        if key == "last-modified" {
            continue;
        }
        if let (Ok(name), Ok(hv)) = (
            http::header::HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, hv);
        }
    }
    builder
}

/// Apply the headers shared by `GetObject` and `HeadObject` responses.
fn set_object_headers(
    builder: http::response::Builder,
    etag: &str,
    last_modified: &chrono::DateTime<chrono::Utc>,
    metadata: &std::collections::BTreeMap<String, String>,
) -> http::response::Builder {
    let builder = set_metadata_headers(builder, metadata);
    builder
        .header(http::header::ETAG, etag)
        .header(http::header::LAST_MODIFIED, format_http_date(last_modified))
        .header(http::header::ACCEPT_RANGES, "bytes")
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

impl IntoS3Response for ListBucketsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListAllMyBucketsResult", &self)
    }
}

impl IntoS3Response for ListObjectsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListBucketResult", &self)
    }
}

impl IntoS3Response for DeleteObjectsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("DeleteResult", &self)
    }
}

impl IntoS3Response for GetObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let (status, served_length) = match self.range {
            Some(range) => (http::StatusCode::PARTIAL_CONTENT, range.length),
            None => (http::StatusCode::OK, self.size),
        };

        let mut builder = http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_LENGTH, served_length);

        if let Some(range) = self.range {
            builder = builder.header(http::header::CONTENT_RANGE, range.content_range(self.size));
        }

        let builder = set_object_headers(builder, &self.etag, &self.last_modified, &self.metadata);
        build_response(builder, S3ResponseBody::from_bytes(self.body))
    }
}

impl IntoS3Response for HeadObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::CONTENT_LENGTH, self.size);
        let builder = set_object_headers(builder, &self.etag, &self.last_modified, &self.metadata);
        build_response(builder, S3ResponseBody::empty())
    }
}

impl IntoS3Response for PutObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::ETAG, self.etag);
        build_response(builder, S3ResponseBody::empty())
    }
}

impl IntoS3Response for UploadPartOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::ETAG, self.etag);
        build_response(builder, S3ResponseBody::empty())
    }
}

impl IntoS3Response for CreateMultipartUploadOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("InitiateMultipartUploadResult", &self)
    }
}

impl IntoS3Response for CompleteMultipartUploadOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("CompleteMultipartUploadResult", &self)
    }
}

impl IntoS3Response for ListMultipartUploadsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListMultipartUploadsResult", &self)
    }
}

impl IntoS3Response for ListPartsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListPartsResult", &self)
    }
}

// ---------------------------------------------------------------------------
// Purpose-built responses without output structs
// ---------------------------------------------------------------------------

/// Response for a successful `CreateBucket`.
///
/// # Errors
///
/// Returns an [`S3Error`] if the response cannot be constructed.
pub fn create_bucket_response(bucket: &str) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::LOCATION, format!("/{bucket}"));
    build_response(builder, S3ResponseBody::empty())
}

/// Response for a successful `DeleteObject`: 204 with the delete-marker flag.
///
/// # Errors
///
/// Returns an [`S3Error`] if the response cannot be constructed.
pub fn delete_object_response() -> Result<http::Response<S3ResponseBody>, S3Error> {
    let builder = http::Response::builder()
        .status(http::StatusCode::NO_CONTENT)
        .header("x-amz-delete-marker", "false");
    build_response(builder, S3ResponseBody::empty())
}

// ---------------------------------------------------------------------------
// Error shim
// ---------------------------------------------------------------------------

/// Render an [`S3Error`] as an HTTP response with the XML error document.
///
/// Internal errors are logged with their cause; the wire response never
/// carries the underlying message.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    if err.code == S3ErrorCode::InternalError {
        tracing::error!(
            error = %err,
            source = ?err.source,
            request_id,
            "internal error while serving S3 request"
        );
    }

    let message = if err.code == S3ErrorCode::InternalError {
        err.code.default_message().to_owned()
    } else {
        err.message.clone()
    };

    let body = mocks3_xml::error_to_xml(
        err.code.as_str(),
        &message,
        err.resource.as_deref(),
        request_id,
    );

    http::Response::builder()
        .status(err.status_code)
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(S3ResponseBody::from_xml(body))
        .unwrap_or_else(|_| {
            let mut resp = http::Response::new(S3ResponseBody::empty());
            *resp.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}
