//! The storage backend contract.
//!
//! A backend is anything implementing [`Backend`]. The protocol layer holds
//! one as `Arc<dyn Backend>` and never sees past this seam, so identical
//! wire behavior emerges whether data lives in memory, on disk, or in an
//! embedded key-value store.
//!
//! Backends must be safe for concurrent use; each operation returns a
//! coherent view, and ordering between concurrent writers is the backend's
//! own business. Timestamps are passed in by the caller so they all flow
//! from the one injectable clock.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use mocks3_model::error::S3Error;
use mocks3_model::types::{
    BucketInfo, DeleteError, DeletedObject, ObjectInfo, ObjectRange, ObjectRangeRequest,
};

use crate::metadata::Metadata;

/// An object served by a backend.
///
/// For `get_object`, `contents` holds the payload slice being served and
/// `range` describes it when a range was requested. For `head_object`,
/// `contents` is empty.
#[derive(Debug, Clone)]
pub struct Object {
    /// Stored metadata.
    pub metadata: Metadata,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Total object size in bytes.
    pub size: u64,
    /// Raw MD5 digest of the full payload.
    pub hash: [u8; 16],
    /// The payload slice being served.
    pub contents: Bytes,
    /// The served slice, when the request carried a range.
    pub range: Option<ObjectRange>,
}

impl Object {
    /// The wire ETag: quoted lowercase hex of the hash.
    #[must_use]
    pub fn etag(&self) -> String {
        format!("\"{}\"", hex::encode(self.hash))
    }
}

/// A bucket listing.
#[derive(Debug, Clone)]
pub struct ObjectList {
    /// The bucket that was listed.
    pub name: String,
    /// The prefix filter that was applied.
    pub prefix: String,
    /// Matching objects, ordered by key.
    pub contents: Vec<ObjectInfo>,
}

/// The result of a multi-delete.
#[derive(Debug, Clone, Default)]
pub struct MultiDeleteResult {
    /// Keys that were deleted (or did not exist; deletes are idempotent).
    pub deleted: Vec<DeletedObject>,
    /// Keys the backend failed to delete.
    pub errors: Vec<DeleteError>,
}

/// The operation set a storage engine must implement.
pub trait Backend: Send + Sync + 'static {
    /// List all buckets, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] on storage failure.
    fn list_buckets(&self) -> Result<Vec<BucketInfo>, S3Error>;

    /// Whether a bucket exists.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] on storage failure.
    fn bucket_exists(&self, name: &str) -> Result<bool, S3Error>;

    /// Create a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `BucketAlreadyExists` when the name is taken.
    fn create_bucket(&self, name: &str, at: DateTime<Utc>) -> Result<(), S3Error>;

    /// Delete a bucket, which must be empty.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket` or `BucketNotEmpty`.
    fn delete_bucket(&self, name: &str) -> Result<(), S3Error>;

    /// List the objects of a bucket whose keys start with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket`.
    fn get_bucket(&self, name: &str, prefix: &str) -> Result<ObjectList, S3Error>;

    /// Fetch an object's descriptor without its payload.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket` or `NoSuchKey`.
    fn head_object(&self, bucket: &str, key: &str) -> Result<Object, S3Error>;

    /// Fetch an object, honoring an optional byte range.
    ///
    /// The backend resolves the range against the stored size and reports
    /// the served slice in the returned [`Object::range`].
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket`, `NoSuchKey`, or
    /// `InvalidRange`.
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&ObjectRangeRequest>,
    ) -> Result<Object, S3Error>;

    /// Store an object, replacing any previous payload at the key.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket`.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        metadata: Metadata,
        data: Bytes,
        at: DateTime<Utc>,
    ) -> Result<(), S3Error>;

    /// Delete an object. Deleting a missing key is silently successful.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket`.
    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3Error>;

    /// Delete several keys, reporting per-key outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchBucket`.
    fn delete_multi(&self, bucket: &str, keys: &[String]) -> Result<MultiDeleteResult, S3Error>;
}
