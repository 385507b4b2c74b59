//! Object operation handlers.

use bytes::Bytes;
use http::HeaderMap;
use tracing::debug;

use mocks3_http::multipart::{extract_boundary, parse_multipart};
use mocks3_http::request::{content_length, content_md5, parse_range_header};
use mocks3_model::error::S3Error;
use mocks3_model::output::{DeleteObjectsOutput, GetObjectOutput, HeadObjectOutput, PutObjectOutput};
use mocks3_model::s3_error;
use mocks3_model::types::Delete;

use crate::checksums::{compute_etag, decode_content_md5, verify_content_md5};
use crate::metadata::{Metadata, metadata_from_form, metadata_from_headers};
use crate::provider::FakeS3;
use crate::validation::validate_object_key;

#[allow(clippy::unused_async)]
impl FakeS3 {
    /// Fetch an object, honoring an optional `Range` header.
    pub async fn handle_get_object(
        &self,
        bucket: &str,
        key: &str,
        headers: &HeaderMap,
    ) -> Result<GetObjectOutput, S3Error> {
        let range = parse_range_header(headers)?;
        let object = self.backend().get_object(bucket, key, range.as_ref())?;

        debug!(bucket, key, size = object.size, range = ?object.range, "get_object completed");

        Ok(GetObjectOutput {
            etag: object.etag(),
            body: object.contents,
            size: object.size,
            last_modified: object.last_modified,
            metadata: object.metadata,
            range: object.range,
        })
    }

    /// Fetch an object's metadata.
    pub async fn handle_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HeadObjectOutput, S3Error> {
        let object = self.backend().head_object(bucket, key)?;
        Ok(HeadObjectOutput {
            etag: object.etag(),
            size: object.size,
            last_modified: object.last_modified,
            metadata: object.metadata,
        })
    }

    /// Store an object from a `PUT` request.
    pub async fn handle_put_object(
        &self,
        bucket: &str,
        key: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<PutObjectOutput, S3Error> {
        let metadata =
            metadata_from_headers(headers, self.now(), self.config().metadata_size_limit)?;

        let declared = content_length(headers)?;
        if declared != body.len() as u64 {
            return Err(s3_error!(IncompleteBody));
        }

        validate_object_key(key)?;

        self.verify_integrity(headers, &body)?;

        self.store_object(bucket, key, metadata, body).await
    }

    /// Store an object from a browser `POST` form upload.
    pub async fn handle_post_object(
        &self,
        bucket: &str,
        headers: &HeaderMap,
        body: &Bytes,
    ) -> Result<PutObjectOutput, S3Error> {
        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| s3_error!(MalformedPOSTRequest, "missing Content-Type"))?;

        let boundary = extract_boundary(content_type)?;
        let form = parse_multipart(body, &boundary)?;

        let keys = form.field_values("key");
        if keys.len() != 1 {
            return Err(s3_error!(IncorrectNumberOfFilesInPostRequest));
        }
        let key = keys[0].to_owned();

        if form.files.len() != 1 {
            return Err(s3_error!(IncorrectNumberOfFilesInPostRequest));
        }
        let file_data = form.files[0].clone();

        let metadata =
            metadata_from_form(&form.fields, self.now(), self.config().metadata_size_limit)?;

        validate_object_key(&key)?;

        debug!(bucket, key = %key, size = file_data.len(), "post_object parsed form");
        self.store_object(bucket, &key, metadata, file_data).await
    }

    /// Delete a single object. Missing keys are silently successful.
    pub async fn handle_delete_object(&self, bucket: &str, key: &str) -> Result<(), S3Error> {
        self.backend().delete_object(bucket, key)?;
        debug!(bucket, key, "delete_object completed");
        Ok(())
    }

    /// Delete several objects from one XML request.
    pub async fn handle_delete_objects(
        &self,
        bucket: &str,
        request: Delete,
    ) -> Result<DeleteObjectsOutput, S3Error> {
        let keys: Vec<String> = request.objects.into_iter().map(|o| o.key).collect();
        let result = self.backend().delete_multi(bucket, &keys)?;

        debug!(
            bucket,
            requested = keys.len(),
            errors = result.errors.len(),
            quiet = request.quiet,
            "delete_objects completed"
        );

        // Quiet mode suppresses the per-key success list.
        let deleted = if request.quiet { Vec::new() } else { result.deleted };

        Ok(DeleteObjectsOutput {
            deleted,
            errors: result.errors,
        })
    }

    /// Check the `Content-MD5` header against the collected body.
    ///
    /// Runs before the backend sees the payload, so a failed digest never
    /// leaves a partial object.
    pub(crate) fn verify_integrity(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), S3Error> {
        if !self.config().integrity_check {
            return Ok(());
        }
        if let Some(header) = content_md5(headers) {
            let expected = decode_content_md5(header)?;
            verify_content_md5(&expected, body)?;
        }
        Ok(())
    }

    /// Hand a fully validated payload to the backend.
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        metadata: Metadata,
        body: Bytes,
    ) -> Result<PutObjectOutput, S3Error> {
        let etag = compute_etag(&body);
        self.backend()
            .put_object(bucket, key, metadata, body, self.now())?;
        debug!(bucket, key, %etag, "put_object completed");
        Ok(PutObjectOutput { etag })
    }
}
