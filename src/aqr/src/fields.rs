//! Field tokenization and anchor-relative record mapping
//!
//! Decompressed secure QR buffers are delimiter-joined Latin-1 text.
//! Absolute field positions drift between issuer format revisions, but
//! positions relative to the date-of-birth field stay stable, so the
//! mapper locates the first date-shaped token and addresses every other
//! field by its offset from that anchor.

use crate::record::QrRecord;
use crate::{DELIMITER_BYTE, DELIMITER_UTF8};

/// Delimiter encoding used by the payload producer.
///
/// Two encodings are seen in the wild: buffers read back byte-for-byte
/// carry the bare `0xFF` delimiter, while buffers that went through a
/// UTF-8 encode pass upstream carry it as the pair `C3 BF`. Which one a
/// producer emits is not documented anywhere, so it is a toggle rather
/// than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Single `0xFF` byte
    #[default]
    Raw,
    /// `C3 BF` pair
    Utf8Pair,
}

/// Relative position of the anchor (date of birth) in the canonical
/// layout. Field `K` lives at `anchor_index - 4 + K`.
const ANCHOR_CANONICAL_INDEX: usize = 4;

// Canonical field offsets. Index 0 is the version marker; the reference
// field carries the last four identifier digits plus the issue
// timestamp.
const K_REFERENCE: usize = 1;
const K_UID: usize = 2;
const K_NAME: usize = 3;
const K_DOB: usize = 4;
const K_GENDER: usize = 5;
const K_CARE_OF: usize = 6;
const K_VTC: usize = 7;
const K_HOUSE: usize = 8;
const K_STREET: usize = 9;
const K_DISTRICT: usize = 10;
const K_PINCODE: usize = 11;
const K_STATE: usize = 13;
const K_MOBILE: usize = 17;
const K_EMAIL: usize = 46;

/// Masked-identifier prefix; only the last four characters survive
const UID_MASK_PREFIX: &str = "XXXX-XXXX-";

/// Split a decoded buffer into its delimiter-separated fields.
///
/// Bytes are interpreted with Latin-1 semantics (one byte, one char),
/// so tokenization cannot fail on any input. A buffer without
/// delimiters yields a single field.
pub fn tokenize(buffer: &[u8], delimiter: Delimiter) -> Vec<String> {
    match delimiter {
        Delimiter::Raw => buffer
            .split(|&b| b == DELIMITER_BYTE)
            .map(latin1_to_string)
            .collect(),
        Delimiter::Utf8Pair => split_on_pair(buffer, &DELIMITER_UTF8)
            .into_iter()
            .map(latin1_to_string)
            .collect(),
    }
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn split_on_pair<'a>(buffer: &'a [u8], pair: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut start = 0;
    for pos in memchr::memmem::find_iter(buffer, pair) {
        parts.push(&buffer[start..pos]);
        start = pos + pair.len();
    }
    parts.push(&buffer[start..]);
    parts
}

/// Index of the first date-shaped field, if any.
///
/// Always the first match by position; later, more complete-looking
/// candidates never override it.
pub fn anchor_index(fields: &[String]) -> Option<usize> {
    fields.iter().position(|f| is_date_shaped(f))
}

/// Date shapes accepted for the anchor, tried in this order:
/// `YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY`.
///
/// Shape checks only; day/month ranges are not validated, since the
/// anchor's job is positional, not calendrical.
fn is_date_shaped(token: &str) -> bool {
    is_ymd_dashed(token) || is_dmy(token, b'/') || is_dmy(token, b'-')
}

/// `YYYY-MM-DD`
fn is_ymd_dashed(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..].iter().all(u8::is_ascii_digit)
}

/// `DD<sep>MM<sep>YYYY`
fn is_dmy(s: &str, sep: u8) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[..2].iter().all(u8::is_ascii_digit)
        && b[2] == sep
        && b[3..5].iter().all(u8::is_ascii_digit)
        && b[5] == sep
        && b[6..].iter().all(u8::is_ascii_digit)
}

/// Year component of whichever date shape matched, or empty.
fn year_of(date: &str) -> String {
    if is_ymd_dashed(date) {
        date[..4].to_string()
    } else if is_dmy(date, b'/') || is_dmy(date, b'-') {
        date[6..].to_string()
    } else {
        String::new()
    }
}

/// Map a tokenized field sequence onto the normalized record.
///
/// Every lookup is bounds-checked independently: a missing anchor or an
/// out-of-range index degrades that one attribute to the empty string
/// and never aborts the rest of the record.
pub fn map_fields(fields: Vec<String>) -> QrRecord {
    let anchor = anchor_index(&fields);
    let get = |k: usize| -> String {
        anchor
            .and_then(|a| (a + k).checked_sub(ANCHOR_CANONICAL_INDEX))
            .and_then(|i| fields.get(i))
            .cloned()
            .unwrap_or_default()
    };

    let dob = get(K_DOB);
    let yob = year_of(&dob);
    let (issued_date, issued_time) = unpack_reference(&get(K_REFERENCE));
    let uid = mask_uid(&get(K_UID));
    let house = get(K_HOUSE);
    let street = get(K_STREET);
    let dist = get(K_DISTRICT);
    let state = get(K_STATE);
    let pc = get(K_PINCODE);
    let address = compose_address(&[&house, &street, &pc, &dist, &state]);
    let name = get(K_NAME);
    let gender = get(K_GENDER);
    let co = get(K_CARE_OF);
    let vtc = get(K_VTC);
    let mobile = get(K_MOBILE);
    let email = get(K_EMAIL);

    QrRecord {
        uid,
        name,
        gender,
        dob,
        yob,
        issued_date,
        issued_time,
        mobile,
        email,
        co,
        house,
        street,
        vtc,
        dist,
        state,
        pc,
        address,
        raw_fields: fields,
        ..QrRecord::default()
    }
}

/// Unpack the issue timestamp from the reference field.
///
/// The reference field is the last four identifier digits followed by a
/// `YYYYMMDDHHMMSS` timestamp, 18 digits total. Anything shorter or
/// non-numeric yields empty date and time.
fn unpack_reference(reference: &str) -> (String, String) {
    let b = reference.as_bytes();
    if b.len() < 18 || !b[..18].iter().all(u8::is_ascii_digit) {
        return (String::new(), String::new());
    }
    let date = format!(
        "{}-{}-{}",
        &reference[4..8],
        &reference[8..10],
        &reference[10..12]
    );
    let time = format!(
        "{}:{}:{}",
        &reference[12..14],
        &reference[14..16],
        &reference[16..18]
    );
    (date, time)
}

/// Mask the identifier down to its last four characters.
fn mask_uid(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = field.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{UID_MASK_PREFIX}{tail}")
}

/// Join address components with `", "`.
///
/// Empty components are kept in place (`"a, , c"`), matching what card
/// printers do with the same data. A fully empty component list
/// composes to the empty string.
pub(crate) fn compose_address(parts: &[&str]) -> String {
    if parts.iter().all(|p| p.is_empty()) {
        return String::new();
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Canonical 18-field layout with the anchor at index 4
    fn canonical_fields() -> Vec<String> {
        let mut fields = to_fields(&[
            "V2",
            "123420240115103045",
            "123412341234",
            "Shankar Lal",
            "1978-05-14",
            "M",
            "S/O: Ram Lal",
            "Badarwas",
            "55",
            "Main Bazaar",
            "Shivpuri",
            "473885",
            "",
            "Madhya Pradesh",
        ]);
        fields.resize(18, String::new());
        fields[17] = "9876501234".to_string();
        fields
    }

    #[test]
    fn test_tokenize_raw_delimiter() {
        let buffer = b"a\xFFb\xFFc";
        assert_eq!(tokenize(buffer, Delimiter::Raw), to_fields(&["a", "b", "c"]));
    }

    #[test]
    fn test_tokenize_utf8_pair_delimiter() {
        let buffer = b"a\xC3\xBFb\xC3\xBFc";
        assert_eq!(
            tokenize(buffer, Delimiter::Utf8Pair),
            to_fields(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_tokenize_modes_do_not_cross_split() {
        // Raw mode must leave the pair alone, and pair mode must leave
        // bare 0xFF bytes alone (they become 'ÿ' field content).
        let pair_buffer = b"a\xC3\xBFb";
        assert_eq!(
            tokenize(pair_buffer, Delimiter::Raw),
            to_fields(&["a\u{C3}\u{BF}b"])
        );

        let raw_buffer = b"a\xFFb";
        assert_eq!(
            tokenize(raw_buffer, Delimiter::Utf8Pair),
            to_fields(&["a\u{FF}b"])
        );
    }

    #[test]
    fn test_tokenize_no_delimiter_yields_one_field() {
        assert_eq!(tokenize(b"whole", Delimiter::Raw), to_fields(&["whole"]));
        assert_eq!(tokenize(b"", Delimiter::Raw), to_fields(&[""]));
    }

    #[test]
    fn test_anchor_accepts_all_three_shapes() {
        for date in ["1978-05-14", "14/05/1978", "14-05-1978"] {
            let fields = to_fields(&["x", date, "y"]);
            assert_eq!(anchor_index(&fields), Some(1), "shape {date}");
        }
    }

    #[test]
    fn test_anchor_is_first_match_by_position() {
        let fields = to_fields(&["x", "2001-01-01", "14/05/1978"]);
        assert_eq!(anchor_index(&fields), Some(1));
    }

    #[test]
    fn test_anchor_rejects_near_misses() {
        for token in [
            "1978-5-14",    // short month
            "1978/05/14",   // wrong separator for YMD
            "14.05.1978",   // unsupported separator
            "1978-05-14x",  // trailing junk
            "197a-05-14",   // non-digit
            "",
        ] {
            let fields = to_fields(&[token]);
            assert_eq!(anchor_index(&fields), None, "token {token:?}");
        }
    }

    #[test]
    fn test_map_canonical_layout() {
        let record = map_fields(canonical_fields());

        assert_eq!(record.uid, "XXXX-XXXX-1234");
        assert_eq!(record.name, "Shankar Lal");
        assert_eq!(record.dob, "1978-05-14");
        assert_eq!(record.yob, "1978");
        assert_eq!(record.gender, "M");
        assert_eq!(record.co, "S/O: Ram Lal");
        assert_eq!(record.vtc, "Badarwas");
        assert_eq!(record.house, "55");
        assert_eq!(record.street, "Main Bazaar");
        assert_eq!(record.dist, "Shivpuri");
        assert_eq!(record.pc, "473885");
        assert_eq!(record.state, "Madhya Pradesh");
        assert_eq!(record.mobile, "9876501234");
        assert_eq!(record.issued_date, "2024-01-15");
        assert_eq!(record.issued_time, "10:30:45");
        assert_eq!(
            record.address,
            "55, Main Bazaar, 473885, Shivpuri, Madhya Pradesh"
        );
        // Secure QR carries no post office
        assert_eq!(record.po, "");
    }

    #[test]
    fn test_map_survives_format_drift() {
        // A newer revision that inserts two fields ahead of the record
        // shifts every absolute position; anchor-relative mapping must
        // not care.
        let mut fields = to_fields(&["V3", "extra"]);
        fields.extend(canonical_fields());
        let record = map_fields(fields);

        assert_eq!(record.name, "Shankar Lal");
        assert_eq!(record.dob, "1978-05-14");
        assert_eq!(record.state, "Madhya Pradesh");
    }

    #[test]
    fn test_map_without_anchor_degrades_to_empty() {
        let record = map_fields(to_fields(&["V2", "no", "dates", "here"]));

        assert_eq!(record.uid, "");
        assert_eq!(record.name, "");
        assert_eq!(record.dob, "");
        assert_eq!(record.address, "");
        // The raw sequence is still kept for diagnostics
        assert_eq!(record.raw_fields.len(), 4);
    }

    #[test]
    fn test_map_out_of_bounds_fields_are_empty() {
        // Anchor present but the sequence ends before mobile/email
        let fields = to_fields(&["V2", "ref", "uid9999", "Name", "1990-01-01", "F"]);
        let record = map_fields(fields);

        assert_eq!(record.name, "Name");
        assert_eq!(record.gender, "F");
        assert_eq!(record.mobile, "");
        assert_eq!(record.email, "");
        assert_eq!(record.state, "");
    }

    #[test]
    fn test_map_anchor_too_early_for_full_window() {
        // Anchor at index 0: everything before it is out of range and
        // must come back empty without panicking.
        let record = map_fields(to_fields(&["1990-01-01", "M"]));
        assert_eq!(record.uid, "");
        assert_eq!(record.name, "");
        assert_eq!(record.dob, "1990-01-01");
        assert_eq!(record.gender, "M");
    }

    #[test]
    fn test_yob_from_each_shape() {
        assert_eq!(year_of("1978-05-14"), "1978");
        assert_eq!(year_of("14/05/1978"), "1978");
        assert_eq!(year_of("14-05-1978"), "1978");
        assert_eq!(year_of("unparseable"), "");
    }

    #[test]
    fn test_unpack_reference() {
        assert_eq!(
            unpack_reference("123420240115103045"),
            ("2024-01-15".to_string(), "10:30:45".to_string())
        );
        // Trailing digits beyond 18 are ignored
        assert_eq!(
            unpack_reference("12342024011510304599"),
            ("2024-01-15".to_string(), "10:30:45".to_string())
        );
        assert_eq!(unpack_reference("1234"), (String::new(), String::new()));
        assert_eq!(
            unpack_reference("1234x0240115103045"),
            (String::new(), String::new())
        );
    }

    #[test]
    fn test_mask_uid() {
        assert_eq!(mask_uid("123412341234"), "XXXX-XXXX-1234");
        assert_eq!(mask_uid("99"), "XXXX-XXXX-99");
        assert_eq!(mask_uid(""), "");
    }

    #[test]
    fn test_compose_address_keeps_empty_components() {
        assert_eq!(compose_address(&["a", "", "c"]), "a, , c");
        assert_eq!(compose_address(&["", "", ""]), "");
    }
}
