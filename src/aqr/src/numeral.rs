//! Base-10 numeral conversion
//!
//! Secure QR payloads are big integers printed in decimal, far past
//! `u128`. The conversions here run schoolbook long arithmetic over the
//! digit string instead of pulling in a bignum dependency.

use crate::{Error, Result};

/// Convert a decimal numeral string to its minimal big-endian byte form.
///
/// Surrounding ASCII whitespace is tolerated; anything else that is not
/// a digit rejects the payload. No leading zero byte is produced except
/// for the numeral zero itself, which yields a single `0x00`.
pub fn numeral_to_bytes(numeral: &str) -> Result<Vec<u8>> {
    let trimmed = numeral.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidNumeralFormat(
            "payload is not a base-10 numeral".to_string(),
        ));
    }

    // Long division by 256, collecting remainders as output bytes
    // (least significant first).
    let mut digits: Vec<u8> = trimmed.bytes().map(|b| b - b'0').collect();
    let mut bytes = Vec::new();

    while digits.iter().any(|&d| d != 0) {
        let mut quotient = Vec::with_capacity(digits.len());
        let mut remainder: u32 = 0;
        for &d in &digits {
            let acc = remainder * 10 + u32::from(d);
            quotient.push((acc / 256) as u8);
            remainder = acc % 256;
        }
        bytes.push(remainder as u8);

        let first_nonzero = quotient
            .iter()
            .position(|&d| d != 0)
            .unwrap_or(quotient.len());
        digits = quotient.split_off(first_nonzero);
    }

    if bytes.is_empty() {
        bytes.push(0);
    }
    bytes.reverse();
    Ok(bytes)
}

/// Inverse conversion: render a big-endian byte sequence as a decimal
/// numeral string.
///
/// Used to build synthetic payloads and test vectors; real payloads
/// arrive already in numeral form.
pub fn bytes_to_numeral(bytes: &[u8]) -> String {
    // Little-endian decimal digit accumulator: value = value * 256 + byte
    let mut digits: Vec<u8> = vec![0];

    for &byte in bytes {
        let mut carry = u32::from(byte);
        for d in digits.iter_mut() {
            let acc = u32::from(*d) * 256 + carry;
            *d = (acc % 10) as u8;
            carry = acc / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }

    digits.iter().rev().map(|&d| char::from(b'0' + d)).collect()
}
