//! The S3 error taxonomy.
//!
//! Errors are a closed enumeration: every failure the emulator can put on
//! the wire is an [`S3ErrorCode`] carrying its HTTP status and default
//! message. Handlers produce [`S3Error`] values; the response shim in the
//! HTTP layer turns them into the XML error document at serialization time,
//! so no stringly-typed codes travel through the request path.

use std::fmt;

/// Well-known S3 error codes emitted by the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// The Content-MD5 did not match the received body.
    BadDigest,
    /// The requested bucket name is already taken.
    BucketAlreadyExists,
    /// The bucket is not empty and cannot be deleted.
    BucketNotEmpty,
    /// A multipart part (other than the last) is below the minimum size.
    EntityTooSmall,
    /// The request body was shorter or longer than the declared length.
    IncompleteBody,
    /// A browser POST upload did not carry exactly one key and one file.
    IncorrectNumberOfFilesInPostRequest,
    /// Unexpected server-side failure.
    InternalError,
    /// The bucket name violates the naming rules.
    InvalidBucketName,
    /// The Content-MD5 header could not be decoded.
    InvalidDigest,
    /// A referenced multipart part does not exist or its ETag mismatched.
    InvalidPart,
    /// The completed part list was not in ascending order.
    InvalidPartOrder,
    /// The Range header is malformed or unsatisfiable.
    InvalidRange,
    /// Catch-all for malformed or unsupported requests.
    InvalidRequest,
    /// The object key exceeds the maximum length.
    KeyTooLong,
    /// The request XML body was not well-formed.
    MalformedXML,
    /// The browser POST body was not parseable multipart/form-data.
    MalformedPOSTRequest,
    /// User metadata exceeds the configured size limit.
    MetadataTooLarge,
    /// The HTTP method is not allowed against this resource.
    MethodNotAllowed,
    /// The Content-Length header is missing or unusable.
    MissingContentLength,
    /// The requested bucket does not exist.
    NoSuchBucket,
    /// The requested key does not exist.
    NoSuchKey,
    /// The requested multipart upload does not exist.
    NoSuchUpload,
    /// The requested functionality is not implemented.
    NotImplemented,
    /// The request time is too far from the server time.
    RequestTimeTooSkewed,
    /// A SELECT expression used syntax the emulator does not support.
    UnsupportedSyntax,
}

impl S3ErrorCode {
    /// Returns the wire representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadDigest => "BadDigest",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::EntityTooSmall => "EntityTooSmall",
            Self::IncompleteBody => "IncompleteBody",
            Self::IncorrectNumberOfFilesInPostRequest => "IncorrectNumberOfFilesInPostRequest",
            Self::InternalError => "InternalError",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidDigest => "InvalidDigest",
            Self::InvalidPart => "InvalidPart",
            Self::InvalidPartOrder => "InvalidPartOrder",
            Self::InvalidRange => "InvalidRange",
            Self::InvalidRequest => "InvalidRequest",
            Self::KeyTooLong => "KeyTooLong",
            Self::MalformedXML => "MalformedXML",
            Self::MalformedPOSTRequest => "MalformedPOSTRequest",
            Self::MetadataTooLarge => "MetadataTooLarge",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::MissingContentLength => "MissingContentLength",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::NotImplemented => "NotImplemented",
            Self::RequestTimeTooSkewed => "RequestTimeTooSkewed",
            Self::UnsupportedSyntax => "UnsupportedSyntax",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::BadDigest
            | Self::EntityTooSmall
            | Self::IncompleteBody
            | Self::IncorrectNumberOfFilesInPostRequest
            | Self::InvalidBucketName
            | Self::InvalidDigest
            | Self::InvalidPart
            | Self::InvalidPartOrder
            | Self::InvalidRequest
            | Self::KeyTooLong
            | Self::MalformedXML
            | Self::MalformedPOSTRequest
            | Self::MetadataTooLarge
            | Self::UnsupportedSyntax => http::StatusCode::BAD_REQUEST,
            Self::RequestTimeTooSkewed => http::StatusCode::FORBIDDEN,
            Self::NoSuchBucket | Self::NoSuchKey | Self::NoSuchUpload => {
                http::StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::BucketAlreadyExists | Self::BucketNotEmpty => http::StatusCode::CONFLICT,
            Self::MissingContentLength => http::StatusCode::LENGTH_REQUIRED,
            Self::InvalidRange => http::StatusCode::RANGE_NOT_SATISFIABLE,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => http::StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadDigest => "The Content-MD5 you specified did not match what we received",
            Self::BucketAlreadyExists => "The requested bucket name is not available",
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty",
            Self::EntityTooSmall => {
                "Your proposed upload is smaller than the minimum allowed object size"
            }
            Self::IncompleteBody => {
                "You did not provide the number of bytes specified by the Content-Length HTTP header"
            }
            Self::IncorrectNumberOfFilesInPostRequest => {
                "POST requires exactly one file upload per request"
            }
            Self::InternalError => "We encountered an internal error. Please try again.",
            Self::InvalidBucketName => "The specified bucket is not valid",
            Self::InvalidDigest => "The Content-MD5 you specified is not valid",
            Self::InvalidPart => {
                "One or more of the specified parts could not be found. The part might not have \
                 been uploaded, or the specified entity tag might not have matched the part's \
                 entity tag."
            }
            Self::InvalidPartOrder => {
                "The list of parts was not in ascending order. Parts list must be specified in \
                 order by part number."
            }
            Self::InvalidRange => "The requested range is not satisfiable",
            Self::InvalidRequest => "Invalid Request",
            Self::KeyTooLong => "Your key is too long",
            Self::MalformedXML => {
                "The XML you provided was not well-formed or did not validate against our \
                 published schema"
            }
            Self::MalformedPOSTRequest => {
                "The body of your POST request is not well-formed multipart/form-data"
            }
            Self::MetadataTooLarge => "Your metadata headers exceed the maximum allowed metadata size",
            Self::MethodNotAllowed => "The specified method is not allowed against this resource",
            Self::MissingContentLength => "You must provide the Content-Length HTTP header",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::NoSuchKey => "The specified key does not exist",
            Self::NoSuchUpload => {
                "The specified multipart upload does not exist. The upload ID might be invalid, \
                 or the multipart upload might have been aborted or completed."
            }
            Self::NotImplemented => "A header you provided implies functionality that is not implemented",
            Self::RequestTimeTooSkewed => {
                "The difference between the request time and the server's time is too large"
            }
            Self::UnsupportedSyntax => "Encountered an unsupported syntax",
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response value.
///
/// Carries everything the error document needs: the code, a message, the
/// resource that caused the error, the request id (filled in by the service
/// layer), the HTTP status, and an optional wrapped cause that never reaches
/// the wire.
#[derive(Debug)]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The resource that caused the error.
    pub resource: Option<String>,
    /// The request ID.
    pub request_id: Option<String>,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for S3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S3Error({}): {}", self.code, self.message)
    }
}

impl std::error::Error for S3Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl S3Error {
    /// Create a new error from a code, with the code's default message.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self {
            status_code: code.status_code(),
            message: code.default_message().to_owned(),
            code,
            resource: None,
            request_id: None,
            source: None,
        }
    }

    /// Create a new error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.status_code(),
            message: message.into(),
            code,
            resource: None,
            request_id: None,
            source: None,
        }
    }

    /// Set the resource that caused this error.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a `NoSuchBucket` error.
    #[must_use]
    pub fn no_such_bucket(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucket).with_resource(bucket)
    }

    /// Create a `NoSuchKey` error.
    #[must_use]
    pub fn no_such_key(key: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchKey).with_resource(key)
    }

    /// Create a `NoSuchUpload` error.
    #[must_use]
    pub fn no_such_upload(upload_id: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchUpload).with_resource(upload_id)
    }

    /// Create a `BucketAlreadyExists` error.
    #[must_use]
    pub fn bucket_already_exists(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketAlreadyExists).with_resource(bucket)
    }

    /// Create a `BucketNotEmpty` error.
    #[must_use]
    pub fn bucket_not_empty(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketNotEmpty).with_resource(bucket)
    }

    /// Create an `InvalidBucketName` error.
    #[must_use]
    pub fn invalid_bucket_name(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::InvalidBucketName).with_resource(bucket)
    }

    /// Create an `InvalidRange` error.
    #[must_use]
    pub fn invalid_range(range: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::InvalidRange).with_resource(range)
    }

    /// Create a `KeyTooLong` error.
    #[must_use]
    pub fn key_too_long(key: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::KeyTooLong).with_resource(key)
    }

    /// Create a `MalformedXML` error with a detail message.
    #[must_use]
    pub fn malformed_xml(detail: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::MalformedXML, detail)
    }

    /// Create a `MethodNotAllowed` error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::MethodNotAllowed).with_resource(method)
    }

    /// Create a `NotImplemented` error.
    #[must_use]
    pub fn not_implemented(detail: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NotImplemented).with_resource(detail)
    }

    /// Create an `InvalidRequest` error with a detail message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InvalidRequest, message)
    }

    /// Create an `InternalError`, keeping the cause off the wire.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }
}

/// Create an [`S3Error`] from an error code, optionally with a message.
///
/// # Examples
///
/// ```
/// use mocks3_model::s3_error;
/// use mocks3_model::error::S3ErrorCode;
///
/// let err = s3_error!(NoSuchBucket);
/// assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
///
/// let err = s3_error!(InvalidRequest, "odd query combination");
/// assert_eq!(err.message, "odd query combination");
/// ```
#[macro_export]
macro_rules! s3_error {
    ($code:ident) => {
        $crate::error::S3Error::new($crate::error::S3ErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::S3Error::with_message($crate::error::S3ErrorCode::$code, $msg)
    };
}
