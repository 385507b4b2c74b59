//! Multipart form-data parser for browser-based `POST` object uploads.
//!
//! Parses `multipart/form-data` bodies into named fields and file payloads.
//! This is a synchronous parser over the already-collected body bytes.
//! Duplicate fields are preserved so the handler can enforce the
//! one-key/one-file rule of the S3 POST contract.

use bytes::Bytes;

use mocks3_model::error::S3Error;
use mocks3_model::s3_error;

/// A parsed multipart form-data submission.
#[derive(Debug, Default)]
pub struct MultipartForm {
    /// Non-file form fields in document order (duplicates preserved).
    pub fields: Vec<(String, String)>,
    /// File payloads in document order.
    pub files: Vec<Bytes>,
}

impl MultipartForm {
    /// All values submitted under the given field name.
    #[must_use]
    pub fn field_values<'a>(&'a self, name: &str) -> Vec<&'a str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Extract the boundary from a `Content-Type: multipart/form-data` header.
///
/// # Errors
///
/// Returns [`S3Error`] with `MalformedPOSTRequest` if the Content-Type is
/// missing the multipart media type or the boundary parameter.
pub fn extract_boundary(content_type: &str) -> Result<String, S3Error> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return Err(s3_error!(MalformedPOSTRequest).with_resource(content_type));
    }

    for part in content_type.split(';') {
        let trimmed = part.trim();
        if let Some(val) = trimmed.strip_prefix("boundary=") {
            let boundary = val.trim_matches('"').to_owned();
            if boundary.is_empty() {
                return Err(s3_error!(MalformedPOSTRequest, "empty multipart boundary"));
            }
            return Ok(boundary);
        }
    }

    Err(s3_error!(MalformedPOSTRequest, "missing multipart boundary"))
}

/// Parse a multipart/form-data body into form fields and file payloads.
///
/// A part is a file when its `Content-Disposition` carries a `filename`
/// parameter or its field name is `file`; everything else is a form field.
///
/// # Errors
///
/// Returns [`S3Error`] with `MalformedPOSTRequest` if the framing is not
/// parseable.
pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<MultipartForm, S3Error> {
    let delimiter = format!("--{boundary}");

    let mut form = MultipartForm::default();

    let parts = split_multipart_parts(body, delimiter.as_bytes())?;

    for part_bytes in parts {
        let Some((headers_section, part_body)) = split_headers_body(part_bytes) else {
            return Err(s3_error!(MalformedPOSTRequest, "part without header block"));
        };

        let disposition = parse_content_disposition(headers_section);
        let Some(field_name) = disposition.name else {
            return Err(s3_error!(
                MalformedPOSTRequest,
                "part without Content-Disposition name"
            ));
        };

        if field_name == "file" || disposition.filename.is_some() {
            form.files.push(Bytes::copy_from_slice(part_body));
        } else {
            let value = String::from_utf8_lossy(part_body).into_owned();
            form.fields.push((field_name, value));
        }
    }

    Ok(form)
}

/// Split the multipart body into individual parts by boundary.
///
/// The closing delimiter is the inter-part delimiter followed by `--`, so
/// after consuming any delimiter the next two bytes decide whether the body
/// has ended.
fn split_multipart_parts<'a>(body: &'a [u8], delimiter: &[u8]) -> Result<Vec<&'a [u8]>, S3Error> {
    let mut parts = Vec::new();

    // Skip the preamble (everything before the first delimiter).
    let Some(pos) = find_bytes(body, delimiter) else {
        return Err(s3_error!(MalformedPOSTRequest, "missing multipart delimiter"));
    };
    let mut remaining = &body[pos + delimiter.len()..];

    loop {
        // `--` right after a delimiter marks the closing delimiter.
        if remaining.starts_with(b"--") {
            break;
        }
        remaining = skip_crlf(remaining);

        let Some(pos) = find_bytes(remaining, delimiter) else {
            return Err(s3_error!(MalformedPOSTRequest, "unterminated multipart body"));
        };
        parts.push(strip_trailing_crlf(&remaining[..pos]));
        remaining = &remaining[pos + delimiter.len()..];
    }

    Ok(parts)
}

/// Split a part into headers and body at the first `\r\n\r\n`.
fn split_headers_body(part: &[u8]) -> Option<(&[u8], &[u8])> {
    let separator = b"\r\n\r\n";
    find_bytes(part, separator).map(|pos| (&part[..pos], &part[pos + separator.len()..]))
}

/// Parsed Content-Disposition header fields.
struct ContentDisposition {
    name: Option<String>,
    filename: Option<String>,
}

/// Parse the Content-Disposition header from a part's header block.
fn parse_content_disposition(headers: &[u8]) -> ContentDisposition {
    let headers_str = String::from_utf8_lossy(headers);
    let mut name = None;
    let mut filename = None;

    for line in headers_str.split("\r\n") {
        let lower = line.to_ascii_lowercase();
        if !lower.starts_with("content-disposition:") {
            continue;
        }

        if let Some(n) = extract_quoted_param(line, "name") {
            name = Some(n);
        }
        if let Some(f) = extract_quoted_param(line, "filename") {
            filename = Some(f);
        }
    }

    ContentDisposition { name, filename }
}

/// Extract a (possibly quoted) parameter value from a header line.
fn extract_quoted_param(header_line: &str, param_name: &str) -> Option<String> {
    let quoted_pattern = format!("{param_name}=\"");
    let unquoted_pattern = format!("{param_name}=");

    let lower_line = header_line.to_ascii_lowercase();

    if let Some(pos) = lower_line.find(&quoted_pattern) {
        let start = pos + quoted_pattern.len();
        let rest = &header_line[start..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_owned());
        }
    }

    if let Some(pos) = lower_line.find(&unquoted_pattern) {
        let start = pos + unquoted_pattern.len();
        let rest = &header_line[start..];
        let end = rest.find(';').unwrap_or(rest.len());
        let val = rest[..end].trim().to_owned();
        if !val.is_empty() {
            return Some(val);
        }
    }

    None
}

/// Find the position of a needle in a haystack.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Skip a leading `\r\n`.
fn skip_crlf(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\r\n").unwrap_or(data)
}

/// Strip a trailing `\r\n`.
fn strip_trailing_crlf(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n").unwrap_or(data)
}
