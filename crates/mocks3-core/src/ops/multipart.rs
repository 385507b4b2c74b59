//! Multipart upload operation handlers.

use bytes::Bytes;
use http::HeaderMap;
use tracing::debug;

use mocks3_http::request::content_length;
use mocks3_model::error::S3Error;
use mocks3_model::input::ListPartsInput;
use mocks3_model::output::{
    CompleteMultipartUploadOutput, CreateMultipartUploadOutput, ListPartsOutput, UploadPartOutput,
};
use mocks3_model::s3_error;
use mocks3_model::types::CompletedMultipartUpload;

use crate::metadata::metadata_from_headers;
use crate::provider::FakeS3;
use crate::validation::validate_object_key;

#[allow(clippy::unused_async)]
impl FakeS3 {
    /// Initiate a multipart upload, capturing the metadata snapshot.
    pub async fn handle_create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        headers: &HeaderMap,
    ) -> Result<CreateMultipartUploadOutput, S3Error> {
        let metadata =
            metadata_from_headers(headers, self.now(), self.config().metadata_size_limit)?;

        validate_object_key(key)?;

        if !self.backend().bucket_exists(bucket)? {
            return Err(S3Error::no_such_bucket(bucket));
        }

        let upload = self.uploader().begin(bucket, key, metadata, self.now());

        Ok(CreateMultipartUploadOutput {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            upload_id: upload.id.clone(),
        })
    }

    /// Store one part of a multipart upload.
    ///
    /// Parts with distinct numbers may land concurrently; a repeated number
    /// replaces the earlier part.
    pub async fn handle_upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UploadPartOutput, S3Error> {
        let upload = self.uploader().get(bucket, key, upload_id)?;

        let declared = content_length(headers)?;
        if declared != body.len() as u64 {
            return Err(s3_error!(IncompleteBody));
        }

        self.verify_integrity(headers, &body)?;

        let etag = upload.add_part(part_number, self.now(), body)?;
        debug!(bucket, key, upload_id, part_number, "upload_part completed");

        Ok(UploadPartOutput { etag })
    }

    /// Complete a multipart upload: detach it, reassemble the payload, and
    /// hand the result to the backend as a single object.
    pub async fn handle_complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        request: CompletedMultipartUpload,
    ) -> Result<CompleteMultipartUploadOutput, S3Error> {
        let upload = self.uploader().complete(bucket, key, upload_id)?;
        let (body, etag) = upload.reassemble(&request, self.config().min_part_size)?;

        debug!(
            bucket,
            key,
            upload_id,
            parts = request.parts.len(),
            total_size = body.len(),
            "complete_multipart_upload assembled"
        );

        self.backend()
            .put_object(bucket, key, upload.metadata.clone(), body, self.now())?;

        Ok(CompleteMultipartUploadOutput {
            location: Some(format!("http://s3.amazonaws.com/{bucket}/{key}")),
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            etag,
        })
    }

    /// Abort a multipart upload, discarding its parts.
    pub async fn handle_abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), S3Error> {
        drop(self.uploader().complete(bucket, key, upload_id)?);
        debug!(bucket, key, upload_id, "abort_multipart_upload completed");
        Ok(())
    }

    /// List the parts of an in-progress upload.
    pub async fn handle_list_parts(
        &self,
        input: ListPartsInput,
    ) -> Result<ListPartsOutput, S3Error> {
        self.uploader().list_parts(&input)
    }
}
