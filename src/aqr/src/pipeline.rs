//! Payload classification and the top-level decode pipeline
//!
//! One `decode` call takes a raw payload string to a result envelope.
//! Classification is by literal prefix; the secure numeral path is the
//! fallback for anything that does not look like markup.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::decompress::decompress_payload;
use crate::fields::{map_fields, tokenize, Delimiter};
use crate::photo::extract_photo;
use crate::record::{Envelope, QrRecord};
use crate::{xml, Error, Result};
use crate::{SHORT_XML_PREFIX, XML_DECL_MALFORMED_PREFIX, XML_DECL_PREFIX};

/// Options threaded through one decode call
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Delimiter encoding of the payload producer
    pub delimiter: Delimiter,
}

/// Payload families recognized by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    XmlVerbose,
    XmlShort,
    SecureQr,
}

/// Classify a payload by its literal prefix.
///
/// Image payloads (data URLs, bare base64 PNG) are recognized only to
/// reject them with a usable message: turning an image into payload
/// text is the QR scanner's job, not this decoder's.
pub fn classify(payload: &str) -> Result<Format> {
    if payload.starts_with(XML_DECL_PREFIX) || payload.starts_with(XML_DECL_MALFORMED_PREFIX) {
        return Ok(Format::XmlVerbose);
    }
    if payload.starts_with(SHORT_XML_PREFIX) {
        return Ok(Format::XmlShort);
    }
    if payload.starts_with("data:image") || payload.starts_with("iVBOR") {
        return Err(Error::UnrecognizedFormat(
            "image payloads must go through a QR scanner first".to_string(),
        ));
    }
    if payload.starts_with('<') {
        return Err(Error::UnrecognizedFormat(
            "unknown XML root".to_string(),
        ));
    }
    Ok(Format::SecureQr)
}

/// Decode a raw QR payload into a result envelope.
///
/// All taxonomy errors become `success:false` envelopes here; nothing
/// propagates past this boundary. Partial records (missing anchor,
/// absent photo) still decode successfully.
pub fn decode(payload: &str, options: &DecodeOptions) -> Envelope {
    match decode_record(payload, options) {
        Ok(record) => Envelope::ok(record),
        Err(err) => Envelope::from(err),
    }
}

/// Decode to a record, surfacing taxonomy errors to the caller.
pub fn decode_record(payload: &str, options: &DecodeOptions) -> Result<QrRecord> {
    let payload = payload.trim();
    match classify(payload)? {
        Format::XmlVerbose => xml::parse_verbose_xml(&repair_declaration(payload)),
        Format::XmlShort => xml::parse_short_xml(payload),
        Format::SecureQr => decode_secure(payload, options),
    }
}

/// The secure numeral path: decompress, recover the photo, tokenize,
/// and map the fields.
fn decode_secure(payload: &str, options: &DecodeOptions) -> Result<QrRecord> {
    let buffer = decompress_payload(payload)?;
    let photo = extract_photo(&buffer).map(|bytes| STANDARD.encode(bytes));
    let mut record = map_fields(tokenize(&buffer, options.delimiter));
    record.photo = photo;
    Ok(record)
}

/// Rewrite the malformed wrapped declaration (`</?xml ...`) back to a
/// well-formed one before handing it to the parser.
fn repair_declaration(payload: &str) -> Cow<'_, str> {
    match payload.strip_prefix(XML_DECL_MALFORMED_PREFIX) {
        Some(rest) => Cow::Owned(format!("{XML_DECL_PREFIX}{rest}")),
        None => Cow::Borrowed(payload),
    }
}
