//! Embedded photo recovery
//!
//! Secure QR buffers can carry a photograph as a raw image blob after
//! the text fields. There is no length field; only the container magic
//! bounds the start, and an end marker (where the format has one)
//! bounds the end. Uses memchr for SIMD-accelerated signature search.
//!
//! Absence of a photo is a normal outcome. Nothing in this module
//! errors.

use std::io::Cursor;

use image::DynamicImage;
use memchr::memmem;

/// JP2 box signature (full jP box header)
const JP2_BOX_SIG: &[u8] = &[
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];

/// Raw JPEG-2000 codestream marker (SOC + SIZ)
const J2K_CODESTREAM_SIG: &[u8] = &[0xFF, 0x4F, 0xFF, 0x51];

/// JPEG start-of-image marker
const JPEG_SOI_SIG: &[u8] = &[0xFF, 0xD8, 0xFF];

/// PNG signature
const PNG_SIG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// JPEG / JPEG-2000 end-of-image marker
const EOI_MARKER: &[u8] = &[0xFF, 0xD9];

/// PNG terminal chunk tag, followed by a 4-byte CRC
const IEND_TAG: &[u8] = b"IEND";

/// Containers the scanner recognizes, in declared priority order.
/// Priority only breaks ties: the earliest signature by byte position
/// always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Jp2Box,
    J2kCodestream,
    Jpeg,
    Png,
}

impl Container {
    fn signature(self) -> &'static [u8] {
        match self {
            Container::Jp2Box => JP2_BOX_SIG,
            Container::J2kCodestream => J2K_CODESTREAM_SIG,
            Container::Jpeg => JPEG_SOI_SIG,
            Container::Png => PNG_SIG,
        }
    }
}

/// Extract the embedded photo from a decoded buffer, if present.
///
/// The slice is re-encoded as JPEG for uniform downstream consumption;
/// when re-encoding fails the raw slice is returned unchanged. A buffer
/// with no recognizable photo returns `None`.
pub fn extract_photo(buffer: &[u8]) -> Option<Vec<u8>> {
    let (start, container) = find_start(buffer)?;
    let end = find_end(buffer, start, container)?;
    let slice = &buffer[start..end];
    Some(reencode_jpeg(slice).unwrap_or_else(|| slice.to_vec()))
}

/// Earliest signature match across all four containers.
fn find_start(buffer: &[u8]) -> Option<(usize, Container)> {
    let candidates = [
        Container::Jp2Box,
        Container::J2kCodestream,
        Container::Jpeg,
        Container::Png,
    ];

    let mut best: Option<(usize, Container)> = None;
    for container in candidates {
        if let Some(pos) = memmem::find(buffer, container.signature()) {
            if best.map_or(true, |(b, _)| pos < b) {
                best = Some((pos, container));
            }
        }
    }
    best
}

/// End offset (exclusive) of the photo slice for a given container.
///
/// A missing end marker means no photo, not a truncated one: slicing to
/// an arbitrary boundary would hand downstream decoders garbage.
fn find_end(buffer: &[u8], start: usize, container: Container) -> Option<usize> {
    let scan_from = start + container.signature().len();
    match container {
        Container::Jpeg | Container::J2kCodestream => memmem::find(&buffer[scan_from..], EOI_MARKER)
            .map(|pos| scan_from + pos + EOI_MARKER.len()),
        Container::Png => memmem::find(&buffer[scan_from..], IEND_TAG)
            .map(|pos| scan_from + pos + IEND_TAG.len() + 4),
        // No reliable end marker is known for the box format; take the
        // rest of the buffer. TODO: confirm against payloads where the
        // photo is not the last segment.
        Container::Jp2Box => Some(buffer.len()),
    }
}

/// Re-encode an image slice as JPEG.
fn reencode_jpeg(slice: &[u8]) -> Option<Vec<u8>> {
    let decoded = image::load_from_memory(slice).ok()?;
    encode_jpeg(&decoded)
}

/// Encode a decoded image as JPEG into memory.
pub(crate) fn encode_jpeg(decoded: &DynamicImage) -> Option<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    decoded.write_to(&mut out, image::ImageFormat::Jpeg).ok()?;
    Some(out.into_inner())
}
