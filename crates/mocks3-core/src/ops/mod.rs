//! Operation handlers.
//!
//! Each submodule implements one operation family on
//! [`FakeS3`](crate::provider::FakeS3): typed input in, typed output or
//! [`S3Error`](mocks3_model::error::S3Error) out. The HTTP translation stays
//! in `mocks3-http`.

mod bucket;
mod multipart;
mod object;
