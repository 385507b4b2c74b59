//! The emulator provider.
//!
//! [`FakeS3`] owns the backend, the multipart uploader, the clock, and the
//! configuration, and implements the HTTP layer's
//! [`S3Handler`](mocks3_http::S3Handler) boundary by dispatching each routed
//! operation to its handler and encoding the result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use mocks3_http::body::S3ResponseBody;
use mocks3_http::dispatch::S3Handler;
use mocks3_http::response::{
    IntoS3Response, create_bucket_response, delete_object_response, empty_response,
};
use mocks3_http::router::RoutingContext;
use mocks3_http::service::{S3HttpConfig, S3HttpService};
use mocks3_http::request;
use mocks3_model::S3Operation;
use mocks3_model::clock::{Clock, SystemClock};
use mocks3_model::error::S3Error;

use crate::backend::Backend;
use crate::config::S3Config;
use crate::memory::InMemoryBackend;
use crate::uploader::Uploader;

/// The S3 emulator: backend, uploader, clock, and configuration.
///
/// Cloning is cheap; all fields are shared.
///
/// # Examples
///
/// ```no_run
/// use mocks3_core::FakeS3;
/// use mocks3_http::S3HttpConfig;
///
/// # async fn run() -> std::io::Result<()> {
/// let service = FakeS3::in_memory().into_service(S3HttpConfig::default());
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:9000").await?;
/// service.serve(listener).await
/// # }
/// ```
pub struct FakeS3 {
    backend: Arc<dyn Backend>,
    uploader: Arc<Uploader>,
    clock: Arc<dyn Clock>,
    config: Arc<S3Config>,
}

impl std::fmt::Debug for FakeS3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeS3")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Clone for FakeS3 {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            uploader: Arc::clone(&self.uploader),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
        }
    }
}

impl FakeS3 {
    /// Create an emulator over the given backend with default configuration
    /// and the wall clock.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_options(backend, S3Config::default(), Arc::new(SystemClock))
    }

    /// Create an emulator with explicit configuration and clock.
    #[must_use]
    pub fn with_options(backend: Arc<dyn Backend>, config: S3Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            uploader: Arc::new(Uploader::new()),
            clock,
            config: Arc::new(config),
        }
    }

    /// Create an emulator over a fresh [`InMemoryBackend`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    /// Wrap the emulator in an [`S3HttpService`], sharing its clock with the
    /// HTTP middleware.
    #[must_use]
    pub fn into_service(self, http_config: S3HttpConfig) -> S3HttpService<FakeS3> {
        let clock = Arc::clone(&self.clock);
        S3HttpService::with_clock(self, http_config, clock)
    }

    /// The storage backend.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// The multipart uploader.
    #[must_use]
    pub fn uploader(&self) -> &Uploader {
        &self.uploader
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// The emulator's clock.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// The current time, from the injectable clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Dispatch one routed operation to its handler and encode the result.
    async fn dispatch(
        self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> Result<http::Response<S3ResponseBody>, S3Error> {
        match op {
            S3Operation::ListBuckets => self.handle_list_buckets().await?.into_s3_response(),

            S3Operation::CreateBucket => {
                let bucket = require_bucket(&ctx)?;
                self.handle_create_bucket(bucket).await?;
                create_bucket_response(bucket)
            }

            S3Operation::DeleteBucket => {
                self.handle_delete_bucket(require_bucket(&ctx)?).await?;
                empty_response(http::StatusCode::NO_CONTENT)
            }

            S3Operation::HeadBucket => {
                self.handle_head_bucket(require_bucket(&ctx)?).await?;
                empty_response(http::StatusCode::OK)
            }

            S3Operation::ListObjects => {
                let input = request::list_objects_input(require_bucket(&ctx)?, &ctx);
                self.handle_list_objects(input).await?.into_s3_response()
            }

            S3Operation::ListMultipartUploads => {
                let input = request::list_multipart_uploads_input(require_bucket(&ctx)?, &ctx)?;
                self.handle_list_multipart_uploads(input)
                    .await?
                    .into_s3_response()
            }

            S3Operation::DeleteObjects => {
                let bucket = require_bucket(&ctx)?;
                let delete = request::parse_delete_body(&body)?;
                self.handle_delete_objects(bucket, delete)
                    .await?
                    .into_s3_response()
            }

            S3Operation::PostObject => {
                let bucket = require_bucket(&ctx)?;
                self.handle_post_object(bucket, &parts.headers, &body)
                    .await?
                    .into_s3_response()
            }

            S3Operation::GetObject => {
                let (bucket, key) = require_object(&ctx)?;
                self.handle_get_object(bucket, key, &parts.headers)
                    .await?
                    .into_s3_response()
            }

            S3Operation::HeadObject => {
                let (bucket, key) = require_object(&ctx)?;
                self.handle_head_object(bucket, key).await?.into_s3_response()
            }

            S3Operation::PutObject => {
                let (bucket, key) = require_object(&ctx)?;
                self.handle_put_object(bucket, key, &parts.headers, body)
                    .await?
                    .into_s3_response()
            }

            S3Operation::DeleteObject => {
                let (bucket, key) = require_object(&ctx)?;
                self.handle_delete_object(bucket, key).await?;
                delete_object_response()
            }

            S3Operation::CreateMultipartUpload => {
                let (bucket, key) = require_object(&ctx)?;
                self.handle_create_multipart_upload(bucket, key, &parts.headers)
                    .await?
                    .into_s3_response()
            }

            S3Operation::UploadPart => {
                let (bucket, key) = require_object(&ctx)?;
                let upload_id = request::upload_id(&ctx)?;
                let part_number = request::part_number(&ctx)?;
                self.handle_upload_part(bucket, key, &upload_id, part_number, &parts.headers, body)
                    .await?
                    .into_s3_response()
            }

            S3Operation::CompleteMultipartUpload => {
                let (bucket, key) = require_object(&ctx)?;
                let upload_id = request::upload_id(&ctx)?;
                let completed = request::parse_complete_body(&body)?;
                self.handle_complete_multipart_upload(bucket, key, &upload_id, completed)
                    .await?
                    .into_s3_response()
            }

            S3Operation::AbortMultipartUpload => {
                let (bucket, key) = require_object(&ctx)?;
                let upload_id = request::upload_id(&ctx)?;
                self.handle_abort_multipart_upload(bucket, key, &upload_id)
                    .await?;
                empty_response(http::StatusCode::NO_CONTENT)
            }

            S3Operation::ListParts => {
                let (bucket, key) = require_object(&ctx)?;
                let input = request::list_parts_input(bucket, key, &ctx)?;
                self.handle_list_parts(input).await?.into_s3_response()
            }

            S3Operation::SelectObjectContent => {
                Err(S3Error::not_implemented("SelectObjectContent"))
            }
        }
    }
}

/// The routed bucket name; the router guarantees it for bucket operations.
fn require_bucket(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.bucket
        .as_deref()
        .ok_or_else(|| S3Error::invalid_request("missing bucket in request path"))
}

/// The routed bucket and key; the router guarantees both for object
/// operations.
fn require_object(ctx: &RoutingContext) -> Result<(&str, &str), S3Error> {
    let bucket = require_bucket(ctx)?;
    let key = ctx
        .key
        .as_deref()
        .ok_or_else(|| S3Error::invalid_request("missing key in request path"))?;
    Ok((bucket, key))
}

impl S3Handler for FakeS3 {
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>
    {
        let this = self.clone();
        Box::pin(async move { this.dispatch(op, parts, body, ctx).await })
    }
}
