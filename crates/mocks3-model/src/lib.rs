//! Data model for the mocks3 S3 emulator.
//!
//! This crate defines the wire-level vocabulary shared by the protocol
//! front-end and the storage engine:
//!
//! - [`error`]: the closed S3 error taxonomy ([`S3ErrorCode`]) and the
//!   [`S3Error`] value handlers return.
//! - [`operations`]: the [`S3Operation`] enum the router resolves requests to.
//! - [`types`]: shared wire structs (buckets, object listings, byte ranges,
//!   multipart bookkeeping, multi-delete documents).
//! - [`input`] / [`output`]: per-operation typed inputs and outputs.
//! - [`clock`]: the injectable time source every timestamp flows from.

pub mod clock;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{S3Error, S3ErrorCode};
pub use operations::S3Operation;
