//! Bucket operation handlers.

use mocks3_model::error::S3Error;
use mocks3_model::input::{ListMultipartUploadsInput, ListObjectsInput};
use mocks3_model::output::{ListBucketsOutput, ListMultipartUploadsOutput, ListObjectsOutput};
use mocks3_model::types::Owner;
use tracing::debug;

use crate::provider::FakeS3;
use crate::validation::validate_bucket_name;

// Handler methods stay async for consistency with the dispatch layer even
// when the work is synchronous.
#[allow(clippy::unused_async)]
impl FakeS3 {
    /// List all buckets.
    pub async fn handle_list_buckets(&self) -> Result<ListBucketsOutput, S3Error> {
        let buckets = self.backend().list_buckets()?;
        Ok(ListBucketsOutput {
            owner: Owner::default(),
            buckets,
        })
    }

    /// Create a bucket.
    pub async fn handle_create_bucket(&self, bucket: &str) -> Result<(), S3Error> {
        validate_bucket_name(bucket)?;
        self.backend().create_bucket(bucket, self.now())?;
        debug!(bucket, "create_bucket completed");
        Ok(())
    }

    /// Delete a bucket, which must be empty.
    pub async fn handle_delete_bucket(&self, bucket: &str) -> Result<(), S3Error> {
        self.backend().delete_bucket(bucket)?;
        debug!(bucket, "delete_bucket completed");
        Ok(())
    }

    /// Check that a bucket exists.
    pub async fn handle_head_bucket(&self, bucket: &str) -> Result<(), S3Error> {
        if !self.backend().bucket_exists(bucket)? {
            return Err(S3Error::no_such_bucket(bucket));
        }
        Ok(())
    }

    /// List a bucket's objects, filtered by prefix.
    pub async fn handle_list_objects(
        &self,
        input: ListObjectsInput,
    ) -> Result<ListObjectsOutput, S3Error> {
        let listing = self.backend().get_bucket(&input.bucket, &input.prefix)?;
        debug!(
            bucket = %input.bucket,
            prefix = %input.prefix,
            count = listing.contents.len(),
            "list_objects completed"
        );
        Ok(ListObjectsOutput {
            name: listing.name,
            prefix: listing.prefix,
            contents: listing.contents,
        })
    }

    /// List in-progress multipart uploads.
    pub async fn handle_list_multipart_uploads(
        &self,
        input: ListMultipartUploadsInput,
    ) -> Result<ListMultipartUploadsOutput, S3Error> {
        Ok(self.uploader().list(&input))
    }
}
