//! Typed outputs for each operation.
//!
//! Each struct carries exactly what its wire response needs; the HTTP layer
//! owns the translation into headers, status codes, and XML bodies.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::types::{
    BucketInfo, DeleteError, DeletedObject, ObjectInfo, ObjectRange, Owner, PartInfo, UploadInfo,
};

/// Output of `ListBuckets`.
#[derive(Debug, Clone)]
pub struct ListBucketsOutput {
    /// The synthetic owner.
    pub owner: Owner,
    /// All buckets, ordered by name.
    pub buckets: Vec<BucketInfo>,
}

/// Output of `ListObjects`.
#[derive(Debug, Clone)]
pub struct ListObjectsOutput {
    /// The bucket that was listed.
    pub name: String,
    /// The prefix filter that was applied.
    pub prefix: String,
    /// Matching objects, ordered by key.
    pub contents: Vec<ObjectInfo>,
}

/// Output of `DeleteObjects` (multi-delete).
///
/// When the request was quiet, `deleted` has already been cleared.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectsOutput {
    /// Per-key successes.
    pub deleted: Vec<DeletedObject>,
    /// Per-key failures.
    pub errors: Vec<DeleteError>,
}

/// Output of `GetObject`.
#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    /// The payload slice being served.
    pub body: Bytes,
    /// Total object size in bytes (not the slice length).
    pub size: u64,
    /// Quoted hex MD5 of the full payload.
    pub etag: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Stored metadata, emitted verbatim as response headers.
    pub metadata: BTreeMap<String, String>,
    /// The served slice, when the request carried a range.
    pub range: Option<ObjectRange>,
}

/// Output of `HeadObject`.
#[derive(Debug, Clone)]
pub struct HeadObjectOutput {
    /// Total object size in bytes.
    pub size: u64,
    /// Quoted hex MD5 of the payload.
    pub etag: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Stored metadata, emitted verbatim as response headers.
    pub metadata: BTreeMap<String, String>,
}

/// Output of `PutObject` and `PostObject`.
#[derive(Debug, Clone)]
pub struct PutObjectOutput {
    /// Quoted hex MD5 of the stored payload.
    pub etag: String,
}

/// Output of `CreateMultipartUpload`.
#[derive(Debug, Clone)]
pub struct CreateMultipartUploadOutput {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// The allocated upload id.
    pub upload_id: String,
}

/// Output of `UploadPart`.
#[derive(Debug, Clone)]
pub struct UploadPartOutput {
    /// Quoted hex MD5 of the part payload.
    pub etag: String,
}

/// Output of `CompleteMultipartUpload`.
#[derive(Debug, Clone)]
pub struct CompleteMultipartUploadOutput {
    /// Location of the assembled object.
    pub location: Option<String>,
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Composite ETag (`"<hex>-<count>"`).
    pub etag: String,
}

/// Output of `ListMultipartUploads`.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsOutput {
    /// The bucket that was listed.
    pub bucket: String,
    /// The prefix filter that was applied.
    pub prefix: String,
    /// The key marker from the request.
    pub key_marker: String,
    /// The upload-id marker from the request.
    pub upload_id_marker: String,
    /// Marker to resume from, when truncated.
    pub next_key_marker: Option<String>,
    /// Upload-id marker to resume from, when truncated.
    pub next_upload_id_marker: Option<String>,
    /// The effective maximum applied.
    pub max_uploads: u64,
    /// Whether the listing was cut short.
    pub is_truncated: bool,
    /// The uploads, ordered by `(key, upload_id)`.
    pub uploads: Vec<UploadInfo>,
}

/// Output of `ListParts`.
#[derive(Debug, Clone, Default)]
pub struct ListPartsOutput {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// The upload that was listed.
    pub upload_id: String,
    /// The part-number marker from the request.
    pub part_number_marker: u32,
    /// Marker to resume from, when truncated.
    pub next_part_number_marker: Option<u32>,
    /// The effective maximum applied.
    pub max_parts: u64,
    /// Whether the listing was cut short.
    pub is_truncated: bool,
    /// The parts, ordered by part number.
    pub parts: Vec<PartInfo>,
}
