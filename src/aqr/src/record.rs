//! Normalized record and result envelope

use serde::Serialize;

/// Decoded identity record.
///
/// Every attribute is normalized to a `String`; attributes that could
/// not be recovered are empty rather than absent, so a partially
/// readable payload still produces a full record shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QrRecord {
    /// Masked identifier: a literal prefix plus the last four characters
    pub uid: String,
    pub name: String,
    pub gender: String,
    /// Date of birth as carried by the payload (three shapes accepted)
    pub dob: String,
    /// Year of birth, derived from `dob` when the shape allows it
    pub yob: String,
    /// Issue date unpacked from the reference field (`YYYY-MM-DD`)
    pub issued_date: String,
    /// Issue time unpacked from the reference field (`HH:MM:SS`)
    pub issued_time: String,
    pub mobile: String,
    pub email: String,
    /// Care-of line ("S/O ...", "W/O ...")
    pub co: String,
    /// House number
    pub house: String,
    pub street: String,
    /// Landmark (legacy XML only)
    pub lm: String,
    /// Locality (legacy XML only)
    pub loc: String,
    /// Village / town / city
    pub vtc: String,
    /// Post office (legacy XML only; absent from secure QR)
    pub po: String,
    pub dist: String,
    pub state: String,
    /// Postal code
    pub pc: String,
    /// Composed address line
    pub address: String,
    /// Base64 of the recovered photo bytes (JPEG where re-encoding
    /// succeeded, the raw embedded slice otherwise)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Detached signature blob of the short-code XML format, verbatim
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signature: String,
    /// Raw field sequence of the secure QR buffer, kept for diagnostics
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub raw_fields: Vec<String>,
}

/// Uniform success/error wrapper around a decode attempt.
///
/// Exactly one of `data`/`error` is populated; the absent side is
/// omitted from the serialized output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<QrRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Wrap a decoded record
    pub fn ok(record: QrRecord) -> Self {
        Self {
            success: true,
            data: Some(record),
            error: None,
        }
    }

    /// Wrap a failure message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<crate::Error> for Envelope {
    fn from(err: crate::Error) -> Self {
        Self::err(err.to_string())
    }
}
