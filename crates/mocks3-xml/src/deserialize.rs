//! S3 XML deserialization: parsing request bodies into model types.
//!
//! Provides the [`S3Deserialize`] trait and implementations for the two
//! request documents the emulator accepts: `<Delete>` (multi-delete) and
//! `<CompleteMultipartUpload>`.

use quick_xml::Reader;
use quick_xml::events::Event;

use mocks3_model::types::{CompletedMultipartUpload, CompletedPart, Delete, ObjectIdentifier};

use crate::error::XmlError;

/// Trait for deserializing S3 types from XML.
///
/// The root element has already been consumed by the caller; implementations
/// read child elements until the matching end tag.
pub trait S3Deserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// The reader is positioned just after the opening tag of this element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the XML is malformed or required fields are
    /// missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize S3-compatible XML into a typed value.
///
/// Finds the root element and delegates to the type's [`S3Deserialize`]
/// implementation.
///
/// # Errors
///
/// Returns [`XmlError`] if the XML is malformed or deserialization fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    // Skip the XML declaration and find the root element.
    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return T::deserialize_xml(&mut reader);
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_owned()));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the text content of the current element and consume its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse a boolean from XML text (`true`/`false`).
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

/// Parse a u32 from XML text.
fn parse_u32(s: &str) -> Result<u32, XmlError> {
    s.parse::<u32>()
        .map_err(|e| XmlError::ParseError(format!("invalid integer '{s}': {e}")))
}

// ---------------------------------------------------------------------------
// Multi-delete
// ---------------------------------------------------------------------------

impl S3Deserialize for ObjectIdentifier {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let tag = std::str::from_utf8(name.as_ref())
                        .map_err(|e| XmlError::ParseError(e.to_string()))?;
                    match tag {
                        "Key" => key = Some(read_text_content(reader)?),
                        _ => skip_element(reader)?,
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in Object".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        let key = key.ok_or_else(|| XmlError::MissingElement("Object.Key".to_owned()))?;
        Ok(ObjectIdentifier { key })
    }
}

impl S3Deserialize for Delete {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut quiet = false;
        let mut objects = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let tag = std::str::from_utf8(name.as_ref())
                        .map_err(|e| XmlError::ParseError(e.to_string()))?;
                    match tag {
                        "Quiet" => quiet = parse_bool(&read_text_content(reader)?)?,
                        "Object" => objects.push(ObjectIdentifier::deserialize_xml(reader)?),
                        _ => skip_element(reader)?,
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in Delete".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        Ok(Delete { quiet, objects })
    }
}

// ---------------------------------------------------------------------------
// Complete multipart upload
// ---------------------------------------------------------------------------

impl S3Deserialize for CompletedPart {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut part_number = None;
        let mut etag = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let tag = std::str::from_utf8(name.as_ref())
                        .map_err(|e| XmlError::ParseError(e.to_string()))?;
                    match tag {
                        "PartNumber" => part_number = Some(parse_u32(&read_text_content(reader)?)?),
                        "ETag" => etag = Some(read_text_content(reader)?),
                        _ => skip_element(reader)?,
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in Part".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        Ok(CompletedPart {
            part_number: part_number
                .ok_or_else(|| XmlError::MissingElement("Part.PartNumber".to_owned()))?,
            etag: etag.ok_or_else(|| XmlError::MissingElement("Part.ETag".to_owned()))?,
        })
    }
}

impl S3Deserialize for CompletedMultipartUpload {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut parts = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let tag = std::str::from_utf8(name.as_ref())
                        .map_err(|e| XmlError::ParseError(e.to_string()))?;
                    match tag {
                        "Part" => parts.push(CompletedPart::deserialize_xml(reader)?),
                        _ => skip_element(reader)?,
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in CompleteMultipartUpload".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        Ok(CompletedMultipartUpload { parts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_delete_request() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <Delete>
                <Quiet>true</Quiet>
                <Object><Key>foo</Key></Object>
                <Object><Key>bar</Key></Object>
            </Delete>"#;

        let delete: Delete = from_xml(xml).expect("parseable");
        assert!(delete.quiet);
        assert_eq!(delete.objects.len(), 2);
        assert_eq!(delete.objects[0].key, "foo");
        assert_eq!(delete.objects[1].key, "bar");
    }

    #[test]
    fn test_should_default_quiet_to_false() {
        let xml = b"<Delete><Object><Key>k</Key></Object></Delete>";
        let delete: Delete = from_xml(xml).expect("parseable");
        assert!(!delete.quiet);
    }

    #[test]
    fn test_should_unescape_key_text() {
        let xml = b"<Delete><Object><Key>a&amp;b</Key></Object></Delete>";
        let delete: Delete = from_xml(xml).expect("parseable");
        assert_eq!(delete.objects[0].key, "a&b");
    }

    #[test]
    fn test_should_reject_object_without_key() {
        let xml = b"<Delete><Object></Object></Delete>";
        assert!(from_xml::<Delete>(xml).is_err());
    }

    #[test]
    fn test_should_parse_complete_multipart_request() {
        let xml = br#"<CompleteMultipartUpload>
            <Part><PartNumber>1</PartNumber><ETag>"aaa"</ETag></Part>
            <Part><PartNumber>2</PartNumber><ETag>"bbb"</ETag></Part>
        </CompleteMultipartUpload>"#;

        let req: CompletedMultipartUpload = from_xml(xml).expect("parseable");
        assert_eq!(req.parts.len(), 2);
        assert_eq!(req.parts[0].part_number, 1);
        assert_eq!(req.parts[0].etag, "\"aaa\"");
        assert_eq!(req.parts[1].part_number, 2);
    }

    #[test]
    fn test_should_parse_empty_complete_request() {
        let xml = b"<CompleteMultipartUpload></CompleteMultipartUpload>";
        let req: CompletedMultipartUpload = from_xml(xml).expect("parseable");
        assert!(req.parts.is_empty());
    }

    #[test]
    fn test_should_reject_truncated_document() {
        let xml = b"<CompleteMultipartUpload><Part><PartNumber>1</PartNumber>";
        assert!(from_xml::<CompletedMultipartUpload>(xml).is_err());
    }

    #[test]
    fn test_should_reject_garbage() {
        assert!(from_xml::<Delete>(b"this is not xml").is_err());
    }

    #[test]
    fn test_should_reject_bad_part_number() {
        let xml = b"<CompleteMultipartUpload><Part><PartNumber>x</PartNumber><ETag>\"a\"</ETag></Part></CompleteMultipartUpload>";
        assert!(from_xml::<CompletedMultipartUpload>(xml).is_err());
    }
}
