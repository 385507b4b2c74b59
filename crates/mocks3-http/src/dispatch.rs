//! S3 operation dispatch: the boundary between the HTTP layer and the
//! emulator engine.
//!
//! [`dispatch_operation`] bridges routing with the business-logic handler.
//! The handler receives the identified operation together with the raw HTTP
//! parts, the collected body, and the routing context, and returns a fully
//! formed HTTP response.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use mocks3_model::S3Operation;
use mocks3_model::error::S3Error;

use crate::body::S3ResponseBody;
use crate::router::RoutingContext;

/// Trait the emulator engine implements to handle S3 operations.
///
/// Boxed futures keep the trait object-safe so the service layer can hold an
/// `Arc<dyn S3Handler>`-style handler without generics leaking upward.
pub trait S3Handler: Send + Sync + 'static {
    /// Handle an S3 operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>;
}

/// Dispatch a routed S3 request to the handler.
///
/// Called by [`S3HttpService`](crate::service::S3HttpService) after routing
/// and the middleware checks.
///
/// # Errors
///
/// Propagates whatever [`S3Error`] the handler produced.
pub async fn dispatch_operation<H: S3Handler>(
    handler: &H,
    parts: http::request::Parts,
    body: Bytes,
    ctx: RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let op = ctx.operation;
    tracing::debug!(operation = %op, bucket = ?ctx.bucket, key = ?ctx.key, "dispatching S3 operation");
    handler.handle_operation(op, parts, body, ctx).await
}

/// A handler that answers `NotImplemented` for every operation.
///
/// Useful for testing the routing and middleware layers in isolation.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedHandler;

impl S3Handler for NotImplementedHandler {
    fn handle_operation(
        &self,
        op: S3Operation,
        _parts: http::request::Parts,
        _body: Bytes,
        _ctx: RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>
    {
        Box::pin(async move { Err(S3Error::not_implemented(op.as_str())) })
    }
}
