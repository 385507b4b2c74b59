//! S3 request routing: virtual hosting resolution and operation
//! identification.
//!
//! The [`S3Router`] maps incoming HTTP requests to S3 operations by
//! examining:
//!
//! - The HTTP method (GET, PUT, DELETE, POST, HEAD)
//! - Whether a bucket name is present (from the Host header or path)
//! - Whether an object key is present (from the URI path)
//! - Query parameters that identify sub-resources (`?uploads`, `?uploadId`,
//!   `?delete`, ...)
//!
//! Virtual hosting is supported: when enabled, a `Host` header of the form
//! `{bucket}.{domain}` contributes the bucket name and the whole path is the
//! key.

use http::Method;
use percent_encoding::percent_decode_str;

use mocks3_model::S3Operation;
use mocks3_model::error::S3Error;

/// Configuration for S3 request routing.
#[derive(Debug, Clone)]
pub struct S3Router {
    /// The base domain for virtual-hosted-style requests (e.g. `s3.localhost`).
    pub domain: String,
    /// Whether to enable virtual-hosted-style bucket addressing.
    pub virtual_hosting: bool,
}

/// The result of routing an HTTP request to an S3 operation.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The resolved bucket name, if any.
    pub bucket: Option<String>,
    /// The resolved object key, if any.
    pub key: Option<String>,
    /// The identified S3 operation.
    pub operation: S3Operation,
    /// Parsed query parameters from the request URI.
    pub query_params: Vec<(String, String)>,
}

/// Bucket sub-resources with no counterpart in the emulator.
const UNSUPPORTED_BUCKET_OPS: &[&str] = &[
    "accelerate",
    "acl",
    "analytics",
    "cors",
    "encryption",
    "intelligent-tiering",
    "inventory",
    "lifecycle",
    "location",
    "logging",
    "metrics",
    "notification",
    "object-lock",
    "policy",
    "publicAccessBlock",
    "replication",
    "requestPayment",
    "tagging",
    "versioning",
    "versions",
    "website",
];

/// Object sub-resources with no counterpart in the emulator.
const UNSUPPORTED_OBJECT_OPS: &[&str] = &[
    "acl",
    "attributes",
    "legal-hold",
    "retention",
    "tagging",
    "torrent",
];

impl S3Router {
    /// Create a new router with the given domain and virtual hosting setting.
    #[must_use]
    pub fn new(domain: impl Into<String>, virtual_hosting: bool) -> Self {
        Self {
            domain: domain.into(),
            virtual_hosting,
        }
    }

    /// Resolve an HTTP request to a routing context.
    ///
    /// This performs:
    /// 1. Virtual hosting resolution (bucket from the Host header)
    /// 2. Path parsing (bucket and key from the URI path)
    /// 3. Query parameter parsing
    /// 4. Operation identification
    ///
    /// # Errors
    ///
    /// Returns an [`S3Error`] if the request cannot be routed to a supported
    /// operation.
    pub fn resolve<B>(&self, req: &http::Request<B>) -> Result<RoutingContext, S3Error> {
        let method = req.method();
        let uri = req.uri();
        let headers = req.headers();

        let query_params = parse_query_params(uri.query().unwrap_or(""));

        let virtual_bucket = if self.virtual_hosting {
            extract_virtual_host_bucket(headers, &self.domain)
        } else {
            None
        };

        let path = uri.path();
        let (path_bucket, path_key) = parse_path(path);

        // Virtual hosting: bucket comes from Host, the entire path is the key.
        let (bucket, key) = if let Some(vhost_bucket) = virtual_bucket {
            let raw_key = path.strip_prefix('/').unwrap_or(path);
            let key = if raw_key.is_empty() {
                None
            } else {
                Some(decode_uri_component(raw_key))
            };
            (Some(vhost_bucket), key)
        } else {
            (path_bucket, path_key)
        };

        let operation = identify_operation(method, bucket.as_ref(), key.as_ref(), &query_params)?;

        Ok(RoutingContext {
            bucket,
            key,
            operation,
            query_params,
        })
    }
}

/// Extract the bucket name from a virtual-hosted-style Host header.
///
/// For a domain of `s3.localhost`, a Host header of
/// `mybucket.s3.localhost:4566` yields `Some("mybucket")`.
fn extract_virtual_host_bucket(headers: &http::HeaderMap, domain: &str) -> Option<String> {
    let host = headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())?;

    let host_without_port = host.split(':').next().unwrap_or(host);

    let suffix = format!(".{domain}");
    if host_without_port.ends_with(&suffix) && host_without_port.len() > suffix.len() {
        let bucket = &host_without_port[..host_without_port.len() - suffix.len()];
        if !bucket.is_empty() {
            return Some(bucket.to_owned());
        }
    }

    None
}

/// Parse the URI path into an optional bucket and optional key.
///
/// Path format: `/{bucket}` or `/{bucket}/{key...}`.
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    if let Some(pos) = trimmed.find('/') {
        let bucket = decode_uri_component(&trimmed[..pos]);
        let key_raw = &trimmed[pos + 1..];
        let key = if key_raw.is_empty() {
            None
        } else {
            Some(decode_uri_component(key_raw))
        };
        (Some(bucket), key)
    } else {
        (Some(decode_uri_component(trimmed)), None)
    }
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into key-value pairs.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }

    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| {
            if let Some(pos) = pair.find('=') {
                let key = decode_uri_component(&pair[..pos]);
                let value = decode_uri_component(&pair[pos + 1..]);
                (key, value)
            } else {
                (decode_uri_component(pair), String::new())
            }
        })
        .collect()
}

/// Check whether a query parameter is present.
pub(crate) fn query_has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

/// Get the value of a query parameter by name.
pub(crate) fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Identify the S3 operation from the method, path structure, and query.
fn identify_operation(
    method: &Method,
    bucket: Option<&String>,
    key: Option<&String>,
    query_params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    let has_bucket = bucket.is_some();
    let has_key = key.is_some();

    match (method, has_bucket, has_key) {
        // No bucket: only ListBuckets is valid.
        (&Method::GET, false, false) => Ok(S3Operation::ListBuckets),

        // Bucket-level operations (no key).
        (method, true, false) => identify_bucket_operation(method, query_params),

        // Object-level operations (bucket + key).
        (method, true, true) => identify_object_operation(method, query_params),

        // A key cannot occur without a bucket.
        (_, false, true) => Err(S3Error::invalid_request(
            "Object key specified without bucket",
        )),

        (_, false, false) => Err(S3Error::method_not_allowed(method.as_str())),
    }
}

/// Reject query parameters naming a sub-resource the emulator does not have.
fn reject_unsupported(
    params: &[(String, String)],
    unsupported: &[&str],
) -> Result<(), S3Error> {
    for &op in unsupported {
        if query_has_key(params, op) {
            return Err(S3Error::not_implemented(op));
        }
    }
    Ok(())
}

/// Identify a bucket-level operation.
fn identify_bucket_operation(
    method: &Method,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match *method {
        Method::GET => {
            // The uploads flag takes precedence over everything else.
            if query_has_key(params, "uploads") {
                return Ok(S3Operation::ListMultipartUploads);
            }
            reject_unsupported(params, UNSUPPORTED_BUCKET_OPS)?;
            Ok(S3Operation::ListObjects)
        }
        Method::PUT => {
            reject_unsupported(params, UNSUPPORTED_BUCKET_OPS)?;
            Ok(S3Operation::CreateBucket)
        }
        Method::DELETE => {
            reject_unsupported(params, UNSUPPORTED_BUCKET_OPS)?;
            Ok(S3Operation::DeleteBucket)
        }
        Method::HEAD => Ok(S3Operation::HeadBucket),
        Method::POST => {
            if query_has_key(params, "delete") {
                return Ok(S3Operation::DeleteObjects);
            }
            // POST to a bucket without ?delete is a browser-based upload.
            Ok(S3Operation::PostObject)
        }
        _ => Err(S3Error::method_not_allowed(method.as_str())),
    }
}

/// Identify an object-level operation.
fn identify_object_operation(
    method: &Method,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match *method {
        Method::GET => {
            if query_has_key(params, "uploadId") {
                return Ok(S3Operation::ListParts);
            }
            reject_unsupported(params, UNSUPPORTED_OBJECT_OPS)?;
            Ok(S3Operation::GetObject)
        }
        Method::HEAD => Ok(S3Operation::HeadObject),
        Method::PUT => {
            if query_has_key(params, "partNumber") && query_has_key(params, "uploadId") {
                return Ok(S3Operation::UploadPart);
            }
            reject_unsupported(params, UNSUPPORTED_OBJECT_OPS)?;
            Ok(S3Operation::PutObject)
        }
        Method::DELETE => {
            if query_has_key(params, "uploadId") {
                return Ok(S3Operation::AbortMultipartUpload);
            }
            reject_unsupported(params, UNSUPPORTED_OBJECT_OPS)?;
            Ok(S3Operation::DeleteObject)
        }
        Method::POST => {
            if query_has_key(params, "uploads") {
                return Ok(S3Operation::CreateMultipartUpload);
            }
            if query_has_key(params, "uploadId") {
                return Ok(S3Operation::CompleteMultipartUpload);
            }
            if query_has_key(params, "select") && query_value(params, "select-type") == Some("2") {
                return Ok(S3Operation::SelectObjectContent);
            }
            Err(S3Error::invalid_request("unsupported POST operation"))
        }
        _ => Err(S3Error::method_not_allowed(method.as_str())),
    }
}
