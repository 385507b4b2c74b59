//! The mocks3 emulator engine.
//!
//! This crate owns everything behind the HTTP protocol layer:
//!
//! - [`backend`]: the narrow contract a storage engine must satisfy, plus
//!   the shared object/listing shapes.
//! - [`memory`]: the in-memory backend the integration tests run against.
//! - [`uploader`]: the multipart upload registry with part tables,
//!   reassembly, and listings.
//! - [`checksums`]: MD5 helpers, composite multipart ETags, and the
//!   `Content-MD5` integrity check.
//! - [`metadata`]: the `x-amz-*` header/form filter with the size limit.
//! - [`validation`]: bucket name and object key rules.
//! - [`config`]: engine tunables.
//! - [`ops`] and [`provider`]: the operation handlers and the
//!   [`FakeS3`](provider::FakeS3) provider binding them to the HTTP layer.
//!
//! # Architecture
//!
//! ```text
//! S3HttpService (mocks3-http)
//!        |
//!        v
//! FakeS3 (S3Handler impl)
//!    |          |
//!    v          v
//! Uploader   Backend (dyn; InMemoryBackend ships here)
//! ```

// S3Error is the pervasive domain error used as Result<T, S3Error>. Boxing
// it in every Result would add indirection for negligible benefit.
#![allow(clippy::result_large_err)]

pub mod backend;
pub mod checksums;
pub mod config;
pub mod memory;
pub mod metadata;
mod ops;
pub mod provider;
pub mod uploader;
pub mod validation;

pub use backend::Backend;
pub use config::S3Config;
pub use memory::InMemoryBackend;
pub use provider::FakeS3;
