//! The in-memory backend.
//!
//! Buckets live in a [`DashMap`]; each bucket guards its object table with a
//! `parking_lot::RwLock`. Payloads are kept whole as [`Bytes`], which is the
//! point of a testing double: simple, fast, and gone when the process exits.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use tracing::{debug, trace};

use mocks3_model::error::S3Error;
use mocks3_model::types::{BucketInfo, DeletedObject, ObjectInfo, ObjectRangeRequest};

use crate::backend::{Backend, MultiDeleteResult, Object, ObjectList};
use crate::checksums::md5_digest;
use crate::metadata::Metadata;

/// A stored object payload with its bookkeeping.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    hash: [u8; 16],
    metadata: Metadata,
    last_modified: DateTime<Utc>,
}

/// A bucket: creation time plus the object table.
#[derive(Debug)]
struct BucketEntry {
    created: DateTime<Utc>,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

/// In-memory storage backend.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use chrono::Utc;
/// use mocks3_core::{Backend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.create_bucket("my-bucket", Utc::now()).unwrap();
/// backend
///     .put_object(
///         "my-bucket",
///         "hello.txt",
///         Default::default(),
///         Bytes::from("hello"),
///         Utc::now(),
///     )
///     .unwrap();
///
/// let obj = backend.get_object("my-bucket", "hello.txt", None).unwrap();
/// assert_eq!(obj.contents.as_ref(), b"hello");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    buckets: DashMap<String, BucketEntry>,
}

impl InMemoryBackend {
    /// Create a new, empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored object, cloned out of the table.
    fn stored(&self, bucket: &str, key: &str) -> Result<StoredObject, S3Error> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        let objects = entry.objects.read();
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| S3Error::no_such_key(key))
    }
}

impl Backend for InMemoryBackend {
    fn list_buckets(&self) -> Result<Vec<BucketInfo>, S3Error> {
        let mut buckets: Vec<BucketInfo> = self
            .buckets
            .iter()
            .map(|entry| BucketInfo {
                name: entry.key().clone(),
                creation_date: entry.value().created,
            })
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    fn bucket_exists(&self, name: &str) -> Result<bool, S3Error> {
        Ok(self.buckets.contains_key(name))
    }

    fn create_bucket(&self, name: &str, at: DateTime<Utc>) -> Result<(), S3Error> {
        match self.buckets.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(S3Error::bucket_already_exists(name)),
            Entry::Vacant(slot) => {
                slot.insert(BucketEntry {
                    created: at,
                    objects: RwLock::new(BTreeMap::new()),
                });
                debug!(bucket = %name, "bucket created");
                Ok(())
            }
        }
    }

    fn delete_bucket(&self, name: &str) -> Result<(), S3Error> {
        let entry = self
            .buckets
            .get(name)
            .ok_or_else(|| S3Error::no_such_bucket(name))?;

        if !entry.objects.read().is_empty() {
            return Err(S3Error::bucket_not_empty(name));
        }

        // Drop the read reference before removing.
        drop(entry);
        self.buckets.remove(name);
        debug!(bucket = %name, "bucket deleted");
        Ok(())
    }

    fn get_bucket(&self, name: &str, prefix: &str) -> Result<ObjectList, S3Error> {
        let entry = self
            .buckets
            .get(name)
            .ok_or_else(|| S3Error::no_such_bucket(name))?;

        let objects = entry.objects.read();
        let contents = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| ObjectInfo {
                key: key.clone(),
                last_modified: stored.last_modified,
                etag: format!("\"{}\"", hex::encode(stored.hash)),
                size: stored.data.len() as u64,
                storage_class: "STANDARD".to_owned(),
            })
            .collect();

        Ok(ObjectList {
            name: name.to_owned(),
            prefix: prefix.to_owned(),
            contents,
        })
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<Object, S3Error> {
        let stored = self.stored(bucket, key)?;
        Ok(Object {
            metadata: stored.metadata,
            last_modified: stored.last_modified,
            size: stored.data.len() as u64,
            hash: stored.hash,
            contents: Bytes::new(),
            range: None,
        })
    }

    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&ObjectRangeRequest>,
    ) -> Result<Object, S3Error> {
        let stored = self.stored(bucket, key)?;
        let size = stored.data.len() as u64;

        let (contents, range) = match range {
            None => (stored.data, None),
            Some(request) => {
                let resolved = request.resolve(size)?;
                let start = usize::try_from(resolved.start)
                    .map_err(|_| S3Error::invalid_range("range start overflows"))?;
                let length = usize::try_from(resolved.length)
                    .map_err(|_| S3Error::invalid_range("range length overflows"))?;
                (stored.data.slice(start..start + length), Some(resolved))
            }
        };

        Ok(Object {
            metadata: stored.metadata,
            last_modified: stored.last_modified,
            size,
            hash: stored.hash,
            contents,
            range,
        })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        metadata: Metadata,
        data: Bytes,
        at: DateTime<Utc>,
    ) -> Result<(), S3Error> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;

        let hash = md5_digest(&data);
        trace!(bucket, key, size = data.len(), "stored object");

        let mut objects = entry.objects.write();
        objects.insert(
            key.to_owned(),
            StoredObject {
                data,
                hash,
                metadata,
                last_modified: at,
            },
        );
        Ok(())
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3Error> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;

        // Missing keys are silently successful; deletes are idempotent.
        if entry.objects.write().remove(key).is_some() {
            trace!(bucket, key, "deleted object");
        }
        Ok(())
    }

    fn delete_multi(&self, bucket: &str, keys: &[String]) -> Result<MultiDeleteResult, S3Error> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;

        let mut result = MultiDeleteResult::default();
        let mut objects = entry.objects.write();
        for key in keys {
            objects.remove(key);
            result.deleted.push(DeletedObject { key: key.clone() });
        }
        Ok(result)
    }
}
