//! Metadata extraction from request headers and form fields.
//!
//! Keys with the `x-amz-` prefix become object metadata, first value only.
//! Keys are stored lowercase: the `http` crate normalizes header names, and
//! lowercase is the canonical form on the wire. A `last-modified` entry is
//! always injected from the clock; it counts toward the size limit.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::HeaderMap;

use mocks3_model::error::S3Error;
use mocks3_model::s3_error;

/// Stored object metadata.
pub type Metadata = BTreeMap<String, String>;

/// The metadata key prefix selected from headers and form fields.
const AMZ_PREFIX: &str = "x-amz-";

/// Format a timestamp the way S3 writes header dates
/// (`Mon, 02 Jan 2006 15:04:05 GMT`).
#[must_use]
pub fn format_header_time(t: &DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Extract metadata from request headers.
///
/// Selects `x-amz-*` headers (first value only), injects `last-modified`
/// with the current time, and enforces the aggregate size limit.
///
/// # Errors
///
/// Returns [`S3Error`] with `MetadataTooLarge` when the sum of key and value
/// byte lengths exceeds `size_limit`.
pub fn metadata_from_headers(
    headers: &HeaderMap,
    at: DateTime<Utc>,
    size_limit: usize,
) -> Result<Metadata, S3Error> {
    let mut meta = Metadata::new();
    for name in headers.keys() {
        if !name.as_str().starts_with(AMZ_PREFIX) {
            continue;
        }
        // `get` returns the first value of a repeated header.
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            meta.insert(name.as_str().to_owned(), value.to_owned());
        }
    }

    finish(meta, at, size_limit)
}

/// Extract metadata from multipart form fields.
///
/// Field names are lowercased and filtered like headers; the first
/// occurrence of a repeated field wins.
///
/// # Errors
///
/// Returns [`S3Error`] with `MetadataTooLarge` when over the limit.
pub fn metadata_from_form(
    fields: &[(String, String)],
    at: DateTime<Utc>,
    size_limit: usize,
) -> Result<Metadata, S3Error> {
    let mut meta = Metadata::new();
    for (name, value) in fields {
        let name = name.to_ascii_lowercase();
        if !name.starts_with(AMZ_PREFIX) {
            continue;
        }
        meta.entry(name).or_insert_with(|| value.clone());
    }

    finish(meta, at, size_limit)
}

/// Inject the timestamp entry and enforce the size limit.
fn finish(mut meta: Metadata, at: DateTime<Utc>, size_limit: usize) -> Result<Metadata, S3Error> {
    meta.insert("last-modified".to_owned(), format_header_time(&at));

    if size_limit > 0 && metadata_size(&meta) > size_limit {
        return Err(s3_error!(MetadataTooLarge));
    }
    Ok(meta)
}

/// Aggregate metadata size: the sum of key and value byte lengths.
fn metadata_size(meta: &Metadata) -> usize {
    meta.iter().map(|(k, v)| k.len() + v.len()).sum()
}
