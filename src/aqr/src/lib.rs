//! Aadhaar QR payload decoder
//!
//! Decodes the three QR payload generations found on Aadhaar documents
//! into one normalized record.
//!
//! # Format Overview
//!
//! ## Secure QR (numeral payload)
//!
//! The current format. The QR symbol carries a big integer printed in
//! base 10:
//! - The numeral converts to a minimal big-endian byte sequence.
//! - The bytes are a gzip stream; decompression yields the record buffer.
//! - The buffer is `0xFF`-delimited Latin-1 text. Absolute field
//!   positions drift between issuer revisions, so fields are addressed
//!   relative to the date-of-birth field (the first date-shaped token).
//! - A photograph may be embedded as a raw image blob after the text
//!   fields, bounded only by its container magic and end marker.
//!
//! ## Legacy XML variants
//!
//! Older cards carry XML instead:
//! - A verbose schema with spelled-out attributes (`uid`, `name`, ...).
//! - A short-code schema (`<QPDB u=.. n=.. i=..>`) with single-letter
//!   attributes and a base64 photo.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let payload = std::fs::read_to_string("payload.txt")?;
//! let envelope = aqr::decode(payload.trim(), &aqr::DecodeOptions::default());
//! println!("{}", serde_json::to_string(&envelope)?);
//! # Ok(())
//! # }
//! ```

pub mod decompress;
pub mod fields;
pub mod numeral;
pub mod photo;
pub mod pipeline;
pub mod record;
pub mod xml;

// Re-export commonly used items
#[doc(inline)]
pub use decompress::{decompress_bytes, decompress_payload};
#[doc(inline)]
pub use fields::{anchor_index, map_fields, tokenize, Delimiter};
#[doc(inline)]
pub use numeral::{bytes_to_numeral, numeral_to_bytes};
#[doc(inline)]
pub use photo::extract_photo;
#[doc(inline)]
pub use pipeline::{classify, decode, DecodeOptions, Format};
#[doc(inline)]
pub use record::{Envelope, QrRecord};
#[doc(inline)]
pub use xml::{parse_short_xml, parse_verbose_xml};

/// XML declaration prefix of the verbose legacy format
pub const XML_DECL_PREFIX: &str = "<?xml";

/// Malformed declaration seen in the wild: the declaration wrapped in a
/// stray closing-tag prefix. Repaired before parsing.
pub const XML_DECL_MALFORMED_PREFIX: &str = "</?xml";

/// Root tag prefix of the short-code legacy format
pub const SHORT_XML_PREFIX: &str = "<QPDB";

/// Field delimiter byte of a correctly decoded secure QR buffer
pub const DELIMITER_BYTE: u8 = 0xFF;

/// Two-byte delimiter left by producers that UTF-8 encode the buffer
/// before it reaches the decoder
pub const DELIMITER_UTF8: [u8; 2] = [0xC3, 0xBF];

/// Errors from payload decoding
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unrecognized payload format: {0}")]
    UnrecognizedFormat(String),

    #[error("Invalid Base10 format: {0}")]
    InvalidNumeralFormat(String),

    #[error("Failed to decompress QR data: {0}")]
    DecompressionError(String),

    #[error("Failed to parse XML data: {0}")]
    XmlParseError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check if a payload starts with an XML declaration (either form)
pub fn is_xml(payload: &str) -> bool {
    payload.starts_with(XML_DECL_PREFIX) || payload.starts_with(XML_DECL_MALFORMED_PREFIX)
}

/// Check if a payload starts with the short-code root tag
pub fn is_short_xml(payload: &str) -> bool {
    payload.starts_with(SHORT_XML_PREFIX)
}
