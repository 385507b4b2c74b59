//! The multipart upload engine.
//!
//! [`Uploader`] keeps the process-wide registry of in-progress uploads.
//! Each [`Upload`] guards its parts table with its own lock, acquired only
//! while the upload is still registered; `complete` and `abort` detach the
//! upload from the registry atomically, so a concurrent abort or a
//! double-complete observes `NoSuchUpload`.
//!
//! Uploads are orthogonal to the backend until completion: `reassemble`
//! hands back the concatenated payload and the composite ETag, and the
//! caller stores the result as a single object.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use mocks3_model::error::S3Error;
use mocks3_model::input::{ListMultipartUploadsInput, ListPartsInput};
use mocks3_model::output::{ListMultipartUploadsOutput, ListPartsOutput};
use mocks3_model::s3_error;
use mocks3_model::types::{CompletedMultipartUpload, PartInfo, UploadInfo};

use crate::checksums::{md5_digest, multipart_etag};
use crate::metadata::Metadata;

/// Largest part number accepted for a multipart upload.
pub const MAX_UPLOAD_PART_NUMBER: u32 = 10_000;

/// Generate a random upload ID: 64 hex characters.
///
/// Opaque and process-unique; not cryptographically meaningful, which is
/// fine for a testing double.
#[must_use]
pub fn generate_upload_id() -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; 32];
    rng.fill(&mut buf);
    hex::encode(buf)
}

/// A single uploaded part.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Quoted hex MD5 of the part payload.
    pub etag: String,
    /// When the part was uploaded.
    pub last_modified: DateTime<Utc>,
    /// The part payload.
    body: Bytes,
    /// Raw MD5 digest of the payload, kept for the composite ETag.
    digest: [u8; 16],
}

impl UploadPart {
    /// Part size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }
}

/// An in-progress multipart upload.
#[derive(Debug)]
pub struct Upload {
    /// The upload identifier.
    pub id: String,
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Metadata snapshot captured at initiation.
    pub metadata: Metadata,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
    /// Parts keyed by part number.
    parts: Mutex<BTreeMap<u32, UploadPart>>,
}

impl Upload {
    /// Store a part, replacing any previous part at the same number.
    ///
    /// Returns the part's ETag (quoted hex MD5).
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `InvalidPart` when the part number is
    /// outside `1..=10000`.
    pub fn add_part(
        &self,
        part_number: u32,
        at: DateTime<Utc>,
        body: Bytes,
    ) -> Result<String, S3Error> {
        if part_number == 0 || part_number > MAX_UPLOAD_PART_NUMBER {
            return Err(s3_error!(InvalidPart));
        }

        let digest = md5_digest(&body);
        let etag = format!("\"{}\"", hex::encode(digest));

        let part = UploadPart {
            etag: etag.clone(),
            last_modified: at,
            body,
            digest,
        };
        self.parts.lock().insert(part_number, part);

        Ok(etag)
    }

    /// Assemble the payload from the client's part list.
    ///
    /// Validates that part numbers are strictly ascending, that every
    /// referenced part exists with a matching ETag, and that every part
    /// except the last is at least `min_part_size` bytes. Returns the
    /// concatenated payload and the composite ETag
    /// (`"<hex(md5(d1‖…‖dn))>-<n>"`).
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `InvalidPartOrder`, `InvalidPart`, or
    /// `EntityTooSmall`.
    pub fn reassemble(
        &self,
        requested: &CompletedMultipartUpload,
        min_part_size: u64,
    ) -> Result<(Bytes, String), S3Error> {
        let parts = self.parts.lock();

        let mut last_number = 0u32;
        let mut total_size = 0usize;
        let mut selected: Vec<&UploadPart> = Vec::with_capacity(requested.parts.len());

        for (index, requested_part) in requested.parts.iter().enumerate() {
            if requested_part.part_number <= last_number {
                return Err(s3_error!(InvalidPartOrder)
                    .with_resource(requested_part.part_number.to_string()));
            }
            last_number = requested_part.part_number;

            let part = parts.get(&requested_part.part_number).ok_or_else(|| {
                s3_error!(InvalidPart).with_resource(requested_part.part_number.to_string())
            })?;

            if trim_etag(&part.etag) != trim_etag(&requested_part.etag) {
                return Err(s3_error!(InvalidPart)
                    .with_resource(requested_part.part_number.to_string()));
            }

            let is_last = index == requested.parts.len() - 1;
            if !is_last && part.size() < min_part_size {
                return Err(s3_error!(EntityTooSmall)
                    .with_resource(requested_part.part_number.to_string()));
            }

            total_size += part.body.len();
            selected.push(part);
        }

        let mut body = BytesMut::with_capacity(total_size);
        let mut digests = Vec::with_capacity(selected.len());
        for part in selected {
            body.extend_from_slice(&part.body);
            digests.push(part.digest);
        }

        Ok((body.freeze(), multipart_etag(&digests)))
    }

    /// Snapshot the parts table as listing entries, ordered by part number.
    fn part_infos(&self) -> Vec<(u32, PartInfo)> {
        self.parts
            .lock()
            .iter()
            .map(|(number, part)| {
                (
                    *number,
                    PartInfo {
                        part_number: *number,
                        last_modified: part.last_modified,
                        etag: part.etag.clone(),
                        size: part.size(),
                    },
                )
            })
            .collect()
    }
}

/// Strip surrounding quotes from an ETag for comparison.
fn trim_etag(etag: &str) -> &str {
    etag.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(etag)
}

/// The process-wide registry of in-progress uploads.
#[derive(Debug, Default)]
pub struct Uploader {
    uploads: DashMap<String, Arc<Upload>>,
}

impl Uploader {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new upload, capturing the metadata snapshot and start time.
    pub fn begin(
        &self,
        bucket: &str,
        key: &str,
        metadata: Metadata,
        at: DateTime<Utc>,
    ) -> Arc<Upload> {
        let id = generate_upload_id();
        let upload = Arc::new(Upload {
            id: id.clone(),
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            metadata,
            initiated: at,
            parts: Mutex::new(BTreeMap::new()),
        });

        self.uploads.insert(id.clone(), Arc::clone(&upload));
        debug!(bucket, key, upload_id = %id, "multipart upload initiated");
        upload
    }

    /// Look up a registered upload by id, checking its bucket/key binding.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchUpload` when the id is unknown or
    /// registered against a different bucket or key.
    pub fn get(&self, bucket: &str, key: &str, upload_id: &str) -> Result<Arc<Upload>, S3Error> {
        let upload = self
            .uploads
            .get(upload_id)
            .ok_or_else(|| S3Error::no_such_upload(upload_id))?;

        if upload.bucket != bucket || upload.key != key {
            return Err(S3Error::no_such_upload(upload_id));
        }
        Ok(Arc::clone(&upload))
    }

    /// Detach an upload from the registry.
    ///
    /// The removal is atomic: of two racing completes (or a complete and an
    /// abort), exactly one gets the upload and the other observes
    /// `NoSuchUpload`. Abort is this operation with the result dropped.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchUpload` when the id is unknown or
    /// bound to a different bucket or key.
    pub fn complete(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<Arc<Upload>, S3Error> {
        self.uploads
            .remove_if(upload_id, |_, upload| {
                upload.bucket == bucket && upload.key == key
            })
            .map(|(_, upload)| upload)
            .ok_or_else(|| S3Error::no_such_upload(upload_id))
    }

    /// List in-progress uploads for a bucket.
    ///
    /// Entries are ordered by `(key, upload_id)`, filtered by prefix, and
    /// resume strictly after the `(key-marker, upload-id-marker)` tuple. A
    /// key marker without an id marker skips the entire marked key.
    #[must_use]
    pub fn list(&self, input: &ListMultipartUploadsInput) -> ListMultipartUploadsOutput {
        let mut entries: Vec<(String, String, DateTime<Utc>)> = self
            .uploads
            .iter()
            .filter(|entry| {
                let upload = entry.value();
                upload.bucket == input.bucket && upload.key.starts_with(&input.prefix)
            })
            .map(|entry| {
                let upload = entry.value();
                (upload.key.clone(), upload.id.clone(), upload.initiated)
            })
            .collect();

        entries.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

        let after_marker = |key: &str, id: &str| {
            if input.key_marker.is_empty() {
                true
            } else if input.upload_id_marker.is_empty() {
                key > input.key_marker.as_str()
            } else {
                (key, id) > (input.key_marker.as_str(), input.upload_id_marker.as_str())
            }
        };

        let mut uploads: Vec<UploadInfo> = Vec::new();
        let mut is_truncated = false;
        for (key, id, initiated) in entries {
            if !after_marker(&key, &id) {
                continue;
            }
            if uploads.len() as u64 >= input.max_uploads {
                is_truncated = true;
                break;
            }
            uploads.push(UploadInfo {
                key,
                upload_id: id,
                initiated,
            });
        }

        let (next_key_marker, next_upload_id_marker) = if is_truncated {
            uploads
                .last()
                .map(|u| (Some(u.key.clone()), Some(u.upload_id.clone())))
                .unwrap_or((None, None))
        } else {
            (None, None)
        };

        ListMultipartUploadsOutput {
            bucket: input.bucket.clone(),
            prefix: input.prefix.clone(),
            key_marker: input.key_marker.clone(),
            upload_id_marker: input.upload_id_marker.clone(),
            next_key_marker,
            next_upload_id_marker,
            max_uploads: input.max_uploads,
            is_truncated,
            uploads,
        }
    }

    /// List the parts of a registered upload.
    ///
    /// Parts are ordered by number, resume strictly after
    /// `part-number-marker`, and are capped at `max_parts`.
    ///
    /// # Errors
    ///
    /// Returns [`S3Error`] with `NoSuchUpload`.
    pub fn list_parts(&self, input: &ListPartsInput) -> Result<ListPartsOutput, S3Error> {
        let upload = self.get(&input.bucket, &input.key, &input.upload_id)?;

        let mut parts: Vec<PartInfo> = Vec::new();
        let mut is_truncated = false;
        for (number, info) in upload.part_infos() {
            if number <= input.part_number_marker {
                continue;
            }
            if parts.len() as u64 >= input.max_parts {
                is_truncated = true;
                break;
            }
            parts.push(info);
        }

        let next_part_number_marker = if is_truncated {
            parts.last().map(|p| p.part_number)
        } else {
            None
        };

        Ok(ListPartsOutput {
            bucket: input.bucket.clone(),
            key: input.key.clone(),
            upload_id: input.upload_id.clone(),
            part_number_marker: input.part_number_marker,
            next_part_number_marker,
            max_parts: input.max_parts,
            is_truncated,
            parts,
        })
    }
}
