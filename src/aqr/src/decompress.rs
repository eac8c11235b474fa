//! Secure QR payload decompression
//!
//! The numeral payload converts to bytes that form a gzip stream; the
//! decompressed output is the raw record buffer.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::numeral::numeral_to_bytes;
use crate::{Error, Result};

/// Decompress a secure QR numeral payload into its record buffer.
pub fn decompress_payload(payload: &str) -> Result<Vec<u8>> {
    let bytes = numeral_to_bytes(payload)?;
    decompress_bytes(&bytes)
}

/// Gzip-decompress an already converted byte sequence.
pub fn decompress_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut buffer = Vec::new();
    decoder
        .read_to_end(&mut buffer)
        .map_err(|e| Error::DecompressionError(e.to_string()))?;
    Ok(buffer)
}
