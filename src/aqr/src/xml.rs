//! Legacy XML QR variants
//!
//! Two XML generations predate the secure numeral format:
//! - a verbose schema with spelled-out attribute names
//!   (`uid`, `name`, `gender`, ...), and
//! - a short-code schema with single-letter attributes
//!   (`<QPDB u=".." n=".." i="..">`) carrying a base64 photo.
//!
//! Both are stateless attribute-to-record mappings; neither checks the
//! root tag name, since issuers have renamed it across revisions.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roxmltree::Document;

use crate::fields::compose_address;
use crate::record::QrRecord;
use crate::{Error, Result};

/// Parse the verbose-attribute legacy format.
///
/// Missing attributes map to empty strings; unknown attributes are
/// ignored.
pub fn parse_verbose_xml(xml: &str) -> Result<QrRecord> {
    let doc = Document::parse(xml).map_err(|e| Error::XmlParseError(e.to_string()))?;
    let root = doc.root_element();
    let attr = |name: &str| root.attribute(name).unwrap_or_default().to_string();

    let co = attr("co");
    let lm = attr("lm");
    let loc = attr("loc");
    let vtc = attr("vtc");
    let dist = attr("dist");
    let state = attr("state");
    let pc = attr("pc");
    let address = compose_address(&[&co, &lm, &loc, &vtc, &dist, &state, &pc]);

    Ok(QrRecord {
        uid: attr("uid"),
        name: attr("name"),
        gender: attr("gender"),
        dob: attr("dob"),
        yob: attr("yob"),
        co,
        lm,
        loc,
        vtc,
        po: attr("po"),
        dist,
        state,
        pc,
        address,
        ..QrRecord::default()
    })
}

/// Parse the short-code legacy format.
///
/// Attribute map: `u`=uid, `n`=name, `g`=gender, `d`=dob, `a`=address,
/// `i`=photo (base64), `s`=signature, `m`=mobile.
pub fn parse_short_xml(xml: &str) -> Result<QrRecord> {
    let doc = Document::parse(xml).map_err(|e| Error::XmlParseError(e.to_string()))?;
    let root = doc.root_element();
    let attr = |name: &str| root.attribute(name).unwrap_or_default().to_string();

    Ok(QrRecord {
        uid: attr("u"),
        name: attr("n"),
        gender: attr("g"),
        dob: attr("d"),
        address: attr("a"),
        mobile: attr("m"),
        signature: attr("s"),
        photo: decode_photo_attr(root.attribute("i")),
        ..QrRecord::default()
    })
}

/// Decode the short-code photo attribute.
///
/// The attribute is base64 image bytes. A valid image is re-encoded to
/// JPEG like an embedded secure QR photo; bytes that decode but are not
/// an image clear the photo entirely. Never an error.
fn decode_photo_attr(value: Option<&str>) -> Option<String> {
    let raw = STANDARD.decode(value?.trim()).ok()?;
    let decoded = image::load_from_memory(&raw).ok()?;
    let jpeg = crate::photo::encode_jpeg(&decoded).unwrap_or(raw);
    Some(STANDARD.encode(jpeg))
}
