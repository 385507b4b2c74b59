//! S3 HTTP layer: routing, request parsing, response encoding, and the hyper
//! service for the mocks3 emulator.
//!
//! - **Routing** ([`router`]): maps HTTP requests to S3 operations from
//!   method, path, query parameters, and headers. Supports path-style and
//!   virtual-hosted-style bucket addressing.
//! - **Request extraction** ([`request`]): typed query/header parsing (range
//!   headers, list markers, clamped limits, XML request bodies).
//! - **Browser uploads** ([`multipart`]): a synchronous
//!   `multipart/form-data` parser for `POST` object uploads.
//! - **Response encoding** ([`response`]): converts typed outputs into HTTP
//!   responses with S3 headers and XML bodies; renders the `<Error>`
//!   document.
//! - **Dispatch** ([`dispatch`]): the [`S3Handler`](dispatch::S3Handler)
//!   boundary between this layer and the emulator engine.
//! - **Service** ([`service`]): the hyper `Service` tying together CORS, the
//!   time-skew guard, routing, body collection, dispatch, and common
//!   response headers.
//!
//! # Architecture
//!
//! ```text
//! HTTP request
//!   -> S3HttpService (hyper Service)
//!     -> CORS preflight / time-skew guard
//!     -> S3Router (virtual hosting + operation identification)
//!     -> body collection
//!     -> dispatch_operation (S3Handler trait)
//!     -> common response headers (x-amz-request-id, Server, CORS)
//!   <- HTTP response
//! ```

// S3Error is the pervasive domain error used as Result<T, S3Error>. Its size
// is inherent to its fields; boxing it in every Result would add indirection
// on the hot path for negligible benefit.
#![allow(clippy::result_large_err)]

pub mod body;
pub mod dispatch;
pub mod multipart;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use body::S3ResponseBody;
pub use dispatch::{NotImplementedHandler, S3Handler};
pub use response::IntoS3Response;
pub use router::{RoutingContext, S3Router};
pub use service::{S3HttpConfig, S3HttpService};
