//! Typed extraction from raw HTTP requests.
//!
//! Converts routing output and request headers into the typed inputs the
//! operation handlers consume: range headers, list-query bundles with
//! clamped limits, declared content lengths, and the XML request documents.

use http::HeaderMap;

use mocks3_model::error::S3Error;
use mocks3_model::input::{ListMultipartUploadsInput, ListObjectsInput, ListPartsInput};
use mocks3_model::types::{CompletedMultipartUpload, Delete, ObjectRangeRequest};
use mocks3_model::s3_error;
use mocks3_xml::from_xml;

use crate::router::{RoutingContext, query_value};

/// Default and maximum number of entries in an upload listing.
pub const MAX_UPLOADS_LIMIT: u64 = 1000;

/// Default and maximum number of entries in a part listing.
pub const MAX_UPLOAD_PARTS_LIMIT: u64 = 1000;

/// Largest part number accepted for a multipart upload.
pub const MAX_UPLOAD_PART_NUMBER: u32 = 10_000;

// ---------------------------------------------------------------------------
// Range header
// ---------------------------------------------------------------------------

/// Parse the `Range` header of a request, if present.
///
/// Only the `bytes=` unit is accepted, and only a single range; S3 does not
/// support multi-range GETs.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidRange` for any other unit, multiple
/// ranges, or an unparseable range.
pub fn parse_range_header(headers: &HeaderMap) -> Result<Option<ObjectRangeRequest>, S3Error> {
    let Some(raw) = headers.get(http::header::RANGE) else {
        return Ok(None);
    };
    let raw = raw
        .to_str()
        .map_err(|_| s3_error!(InvalidRange, "Range header is not valid UTF-8"))?;

    parse_range_value(raw).map(Some)
}

/// Parse a `Range` header value into an [`ObjectRangeRequest`].
fn parse_range_value(raw: &str) -> Result<ObjectRangeRequest, S3Error> {
    let spec = raw
        .strip_prefix("bytes=")
        .ok_or_else(|| S3Error::invalid_range(raw))?;

    let ranges: Vec<&str> = spec.split(',').collect();
    if ranges.len() > 1 {
        return Err(s3_error!(InvalidRange, "multiple ranges not supported"));
    }

    let range = ranges[0].trim();
    if range.is_empty() {
        return Err(S3Error::invalid_range(raw));
    }

    let dash = range.find('-').ok_or_else(|| S3Error::invalid_range(raw))?;
    let (start, end) = (range[..dash].trim(), range[dash + 1..].trim());

    if start.is_empty() {
        // bytes=-N: suffix of the last N bytes.
        let len: u64 = end.parse().map_err(|_| S3Error::invalid_range(raw))?;
        if len == 0 {
            return Err(S3Error::invalid_range(raw));
        }
        return Ok(ObjectRangeRequest::Suffix { len });
    }

    let start: u64 = start.parse().map_err(|_| S3Error::invalid_range(raw))?;
    let end = if end.is_empty() {
        None
    } else {
        let end: u64 = end.parse().map_err(|_| S3Error::invalid_range(raw))?;
        if start > end {
            return Err(S3Error::invalid_range(raw));
        }
        Some(end)
    };

    Ok(ObjectRangeRequest::FromStart { start, end })
}

// ---------------------------------------------------------------------------
// Header access
// ---------------------------------------------------------------------------

/// Read the declared `Content-Length` of an upload request.
///
/// # Errors
///
/// Returns [`S3Error`] with `MissingContentLength` when the header is
/// absent, unparseable, or not positive.
pub fn content_length(headers: &HeaderMap) -> Result<u64, S3Error> {
    let size = headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    if size == 0 {
        return Err(s3_error!(MissingContentLength));
    }
    Ok(size)
}

/// Read the `Content-MD5` header value, if present.
#[must_use]
pub fn content_md5(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("content-md5")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Parse an integer query parameter, clamped to `[0, max]`, defaulting when
/// absent or zero.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidRequest` when the value does not parse.
fn parse_clamped(value: Option<&str>, default: u64, max: u64) -> Result<u64, S3Error> {
    let Some(value) = value else {
        return Ok(default);
    };
    let parsed: u64 = value
        .parse()
        .map_err(|_| S3Error::invalid_request(format!("invalid integer parameter: {value}")))?;
    let clamped = parsed.min(max);
    Ok(if clamped == 0 { default } else { clamped })
}

/// The `uploadId` query parameter.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidRequest` when absent; the router only
/// selects upload operations when the parameter is present.
pub fn upload_id(ctx: &RoutingContext) -> Result<String, S3Error> {
    query_value(&ctx.query_params, "uploadId")
        .map(ToOwned::to_owned)
        .ok_or_else(|| S3Error::invalid_request("missing uploadId"))
}

/// The `partNumber` query parameter.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidPart` when the value is missing,
/// unparseable, or outside `1..=10000`.
pub fn part_number(ctx: &RoutingContext) -> Result<u32, S3Error> {
    let raw = query_value(&ctx.query_params, "partNumber")
        .ok_or_else(|| s3_error!(InvalidPart))?;
    let number: u32 = raw.parse().map_err(|_| s3_error!(InvalidPart))?;
    if number == 0 || number > MAX_UPLOAD_PART_NUMBER {
        return Err(s3_error!(InvalidPart));
    }
    Ok(number)
}

/// Build the `ListObjects` input from the routing context.
#[must_use]
pub fn list_objects_input(bucket: &str, ctx: &RoutingContext) -> ListObjectsInput {
    ListObjectsInput {
        bucket: bucket.to_owned(),
        prefix: query_value(&ctx.query_params, "prefix")
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Build the `ListMultipartUploads` input from the routing context.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidRequest` when `max-uploads` is not an
/// integer.
pub fn list_multipart_uploads_input(
    bucket: &str,
    ctx: &RoutingContext,
) -> Result<ListMultipartUploadsInput, S3Error> {
    Ok(ListMultipartUploadsInput {
        bucket: bucket.to_owned(),
        prefix: query_value(&ctx.query_params, "prefix")
            .unwrap_or_default()
            .to_owned(),
        key_marker: query_value(&ctx.query_params, "key-marker")
            .unwrap_or_default()
            .to_owned(),
        upload_id_marker: query_value(&ctx.query_params, "upload-id-marker")
            .unwrap_or_default()
            .to_owned(),
        max_uploads: parse_clamped(
            query_value(&ctx.query_params, "max-uploads"),
            MAX_UPLOADS_LIMIT,
            MAX_UPLOADS_LIMIT,
        )?,
    })
}

/// Build the `ListParts` input from the routing context.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidRequest` when a marker or limit does not
/// parse.
pub fn list_parts_input(
    bucket: &str,
    key: &str,
    ctx: &RoutingContext,
) -> Result<ListPartsInput, S3Error> {
    let part_number_marker = match query_value(&ctx.query_params, "part-number-marker") {
        None | Some("") => 0,
        Some(raw) => raw.parse().map_err(|_| {
            S3Error::invalid_request(format!("invalid part-number-marker: {raw}"))
        })?,
    };

    Ok(ListPartsInput {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
        upload_id: upload_id(ctx)?,
        part_number_marker,
        max_parts: parse_clamped(
            query_value(&ctx.query_params, "max-parts"),
            MAX_UPLOAD_PARTS_LIMIT,
            MAX_UPLOAD_PARTS_LIMIT,
        )?,
    })
}

// ---------------------------------------------------------------------------
// XML request bodies
// ---------------------------------------------------------------------------

/// Parse the multi-delete request document.
///
/// # Errors
///
/// Returns [`S3Error`] with `MalformedXML` when the body does not parse.
pub fn parse_delete_body(body: &[u8]) -> Result<Delete, S3Error> {
    from_xml(body).map_err(|e| s3_error!(MalformedXML).with_source(e))
}

/// Parse the complete-multipart-upload request document.
///
/// # Errors
///
/// Returns [`S3Error`] with `MalformedXML` when the body does not parse.
pub fn parse_complete_body(body: &[u8]) -> Result<CompletedMultipartUpload, S3Error> {
    from_xml(body).map_err(|e| s3_error!(MalformedXML).with_source(e))
}
