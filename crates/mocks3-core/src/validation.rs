//! Validation of bucket names and object keys.
//!
//! Bucket names follow the DNS-like rules from the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).

use std::net::Ipv4Addr;

use mocks3_model::error::S3Error;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Maximum object key length in bytes of its UTF-8 encoding.
pub const KEY_SIZE_LIMIT: usize = 1024;

/// Validate an S3 bucket name.
///
/// Rules:
/// - 3-63 characters long
/// - only lowercase letters, digits, hyphens, and dots
/// - must start and end with a letter or digit
/// - no consecutive dots (`..`)
/// - not formatted as an IPv4 address
///
/// # Errors
///
/// Returns [`S3Error`] with `InvalidBucketName` if any rule is violated.
///
/// # Examples
///
/// ```
/// use mocks3_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-valid-bucket").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), S3Error> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(invalid_name(
            name,
            format!(
                "bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        ));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid_name(
            name,
            "bucket name must only contain lowercase letters, digits, hyphens, and dots",
        ));
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(invalid_name(
            name,
            "bucket name must start and end with a letter or digit",
        ));
    }

    if name.contains("..") {
        return Err(invalid_name(
            name,
            "bucket name must not contain consecutive dots",
        ));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid_name(
            name,
            "bucket name must not be formatted as an IP address",
        ));
    }

    Ok(())
}

fn invalid_name(name: &str, reason: impl Into<String>) -> S3Error {
    S3Error::with_message(mocks3_model::error::S3ErrorCode::InvalidBucketName, reason)
        .with_resource(name)
}

/// Validate an S3 object key.
///
/// Keys are arbitrary UTF-8 of at most [`KEY_SIZE_LIMIT`] bytes.
///
/// # Errors
///
/// Returns [`S3Error`] with `KeyTooLong` when the key exceeds the limit, or
/// `InvalidRequest` for an empty key.
pub fn validate_object_key(key: &str) -> Result<(), S3Error> {
    if key.is_empty() {
        return Err(S3Error::invalid_request("object key must not be empty"));
    }
    if key.len() > KEY_SIZE_LIMIT {
        return Err(S3Error::key_too_long(key));
    }
    Ok(())
}
