//! MD5 checksums: ETags, composite multipart ETags, and the `Content-MD5`
//! integrity check.
//!
//! The check runs against the collected body before anything reaches the
//! backend, so a failed digest never leaves a partial object behind.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use digest::Digest;
use md5::Md5;

use mocks3_model::error::S3Error;
use mocks3_model::s3_error;

/// Compute the raw 16-byte MD5 digest of `data`.
#[must_use]
pub fn md5_digest(data: &[u8]) -> [u8; 16] {
    Md5::digest(data).into()
}

/// Compute the hex-encoded MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use mocks3_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(md5_digest(data))
}

/// Compute the quoted hex MD5 of `data`, the S3 ETag form.
///
/// # Examples
///
/// ```
/// use mocks3_core::checksums::compute_etag;
///
/// assert_eq!(compute_etag(b"hello"), "\"5d41402abc4b2a76b9719d911017c592\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Compute the composite multipart ETag from the part digests.
///
/// Per the S3 convention, the result is the hex MD5 of the concatenated raw
/// part digests, suffixed with the part count:
/// `"<hex(md5(d1‖…‖dn))>-<n>"`.
#[must_use]
pub fn multipart_etag(part_digests: &[[u8; 16]]) -> String {
    let mut hasher = Md5::new();
    for digest in part_digests {
        hasher.update(digest);
    }
    let combined: [u8; 16] = hasher.finalize().into();
    format!("\"{}-{}\"", hex::encode(combined), part_digests.len())
}

/// Decode a base64 `Content-MD5` header value.
///
/// The decoded length is not checked here: a digest of the wrong length can
/// never match and fails the comparison as `BadDigest`, which is how the
/// request with a well-formed but wrong header should fail.
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidDigest` when the value is not base64.
pub fn decode_content_md5(header: &str) -> Result<Vec<u8>, S3Error> {
    BASE64_STANDARD
        .decode(header)
        .map_err(|_| s3_error!(InvalidDigest).with_resource(header))
}

/// Verify a collected body against a decoded `Content-MD5` digest.
///
/// # Errors
///
/// Returns [`S3Error`] with `BadDigest` on mismatch.
pub fn verify_content_md5(expected: &[u8], body: &[u8]) -> Result<(), S3Error> {
    if md5_digest(body) != expected {
        return Err(s3_error!(BadDigest));
    }
    Ok(())
}
