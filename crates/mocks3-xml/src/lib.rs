//! S3 XML layer for the mocks3 emulator.
//!
//! Handles conversion between model types and the S3 RestXml wire format.
//!
//! # Key components
//!
//! - [`S3Serialize`] trait and [`to_xml`] for response bodies
//! - [`S3Deserialize`] trait and [`from_xml`] for request bodies
//! - [`error_to_xml`] for the `<Error>` document
//!
//! # S3 XML conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 with milliseconds (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{S3Deserialize, from_xml};
pub use error::{XmlError, error_to_xml};
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
