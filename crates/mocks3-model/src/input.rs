//! Typed inputs for the listing operations.
//!
//! Only the operations with real query-parameter bundles get input structs;
//! the single-resource operations take their bucket/key arguments directly.

/// Query parameters for `ListObjects`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsInput {
    /// Target bucket.
    pub bucket: String,
    /// Key prefix filter.
    pub prefix: String,
}

/// Query parameters for `ListMultipartUploads`.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsInput {
    /// Target bucket.
    pub bucket: String,
    /// Key prefix filter.
    pub prefix: String,
    /// Resume listing strictly after this key.
    pub key_marker: String,
    /// Resume listing strictly after this upload id (within `key_marker`).
    pub upload_id_marker: String,
    /// Maximum entries to return.
    pub max_uploads: u64,
}

/// Query parameters for `ListParts`.
#[derive(Debug, Clone, Default)]
pub struct ListPartsInput {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// The upload to list.
    pub upload_id: String,
    /// Resume listing strictly after this part number.
    pub part_number_marker: u32,
    /// Maximum entries to return.
    pub max_parts: u64,
}
