//! Shared wire-level types.
//!
//! These structs mirror the subset of the S3 XML vocabulary the emulator
//! speaks: bucket and object listings, the multi-delete document, multipart
//! bookkeeping entries, and the byte-range request/resolution pair.

use chrono::{DateTime, Utc};

use crate::error::S3Error;

/// The owner reported in `ListAllMyBucketsResult`.
///
/// The emulator has no accounts; a fixed synthetic owner is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// Owner ID.
    pub id: String,
    /// Display name.
    pub display_name: String,
}

impl Default for Owner {
    fn default() -> Self {
        Self {
            id: "fe7272ea58be830e56fe1663b10fafef".to_owned(),
            display_name: "mocks3".to_owned(),
        }
    }
}

/// A bucket entry in a `ListAllMyBucketsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// A single object entry in a `ListBucketResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Quoted hex MD5 of the payload.
    pub etag: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Storage class (always `STANDARD` here).
    pub storage_class: String,
}

// ---------------------------------------------------------------------------
// Byte ranges
// ---------------------------------------------------------------------------

/// A byte range as requested by the client, before resolution against an
/// object size.
///
/// Three request forms exist: `start..=end`, `start..` (open end), and a
/// suffix of the last `n` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRangeRequest {
    /// `bytes=start-end` or `bytes=start-`; `end` is `None` when open.
    FromStart {
        /// First byte offset (inclusive).
        start: u64,
        /// Last byte offset (inclusive), or `None` to read to the end.
        end: Option<u64>,
    },
    /// `bytes=-n`: the last `n` bytes of the object.
    Suffix {
        /// Number of trailing bytes requested.
        len: u64,
    },
}

/// A byte range resolved against a concrete object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRange {
    /// First byte offset served.
    pub start: u64,
    /// Number of bytes served.
    pub length: u64,
}

impl ObjectRangeRequest {
    /// Resolve the request against an object of `size` bytes.
    ///
    /// The end offset is clamped to the object size. A suffix request longer
    /// than the object yields the whole object.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `InvalidRange` when the start offset lies at
    /// or beyond the end of the object.
    pub fn resolve(&self, size: u64) -> Result<ObjectRange, S3Error> {
        match *self {
            Self::Suffix { len } => {
                let len = len.min(size);
                Ok(ObjectRange {
                    start: size - len,
                    length: len,
                })
            }
            Self::FromStart { start, end } => {
                if start >= size {
                    return Err(S3Error::invalid_range(format!("bytes={start}-")));
                }
                let length = match end {
                    None => size - start,
                    Some(end) => end.min(size - 1) - start + 1,
                };
                Ok(ObjectRange { start, length })
            }
        }
    }
}

impl ObjectRange {
    /// Render the `Content-Range` header value for an object of `size` bytes.
    #[must_use]
    pub fn content_range(&self, size: u64) -> String {
        let end = (self.start + self.length).saturating_sub(1);
        format!("bytes {}-{}/{}", self.start, end, size)
    }
}

// ---------------------------------------------------------------------------
// Multi-delete
// ---------------------------------------------------------------------------

/// A key reference inside a multi-delete request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectIdentifier {
    /// The key to delete.
    pub key: String,
}

/// The parsed `<Delete>` request document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delete {
    /// Suppress per-key success entries in the response.
    pub quiet: bool,
    /// The keys to delete.
    pub objects: Vec<ObjectIdentifier>,
}

/// A successfully deleted key in a `DeleteResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedObject {
    /// The deleted key.
    pub key: String,
}

/// A per-key failure in a `DeleteResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteError {
    /// The key that failed.
    pub key: String,
    /// The S3 error code string.
    pub code: String,
    /// The error message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

/// A part reference inside a `<CompleteMultipartUpload>` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedPart {
    /// The part number.
    pub part_number: u32,
    /// The ETag returned when the part was uploaded.
    pub etag: String,
}

/// The parsed `<CompleteMultipartUpload>` request document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedMultipartUpload {
    /// The parts, in the order the client listed them.
    pub parts: Vec<CompletedPart>,
}

/// An in-progress upload entry in a `ListMultipartUploadsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInfo {
    /// The object key the upload targets.
    pub key: String,
    /// The upload identifier.
    pub upload_id: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
}

/// A part entry in a `ListPartsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartInfo {
    /// The part number.
    pub part_number: u32,
    /// When the part was uploaded.
    pub last_modified: DateTime<Utc>,
    /// Quoted hex MD5 of the part payload.
    pub etag: String,
    /// Part size in bytes.
    pub size: u64,
}
