//! Engine configuration.

/// Maximum total size in bytes of stored metadata, summing the UTF-8
/// lengths of each key and value.
///
/// The S3 documentation says "2 KB" without specifying KB or KiB; the
/// smaller decimal reading is used so tests that pass here also pass against
/// the real service.
pub const DEFAULT_METADATA_SIZE_LIMIT: usize = 2000;

/// Minimum size in bytes of every multipart part except the last.
///
/// The S3 documentation says "5 MB" without specifying MB or MiB; the
/// liberal decimal reading is accepted here.
pub const DEFAULT_MIN_PART_SIZE: u64 = 5 * 1000 * 1000;

/// Engine tunables.
///
/// The HTTP-level settings (virtual hosting, time-skew limit) live in
/// `mocks3_http::S3HttpConfig`; this struct covers the storage-facing knobs.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Maximum aggregate metadata size in bytes.
    pub metadata_size_limit: usize,
    /// Whether to verify `Content-MD5` headers against uploaded bodies.
    pub integrity_check: bool,
    /// Minimum size of non-final multipart parts.
    pub min_part_size: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            metadata_size_limit: DEFAULT_METADATA_SIZE_LIMIT,
            integrity_check: true,
            min_part_size: DEFAULT_MIN_PART_SIZE,
        }
    }
}
