//! The fixed 28-byte document header.

use crate::error::FormatError;
use crate::wire::{Reader, Writer};
use kir_common::crc32;

/// File magic: format family `KIR`, major version `1`.
pub const MAGIC: [u8; 4] = *b"KIR1";

/// Minor format version written by this encoder.
pub const FORMAT_VERSION: u16 = 2;

/// Oldest minor version this decoder reads.
pub const MIN_READABLE_VERSION: u16 = 1;

/// Written as a little-endian `u32`; reads back byte-swapped on a
/// big-endian producer.
pub const ENDIAN_MARKER: u32 = 0x1234_5678;

/// Size of the header in bytes.
pub const HEADER_LEN: usize = 28;

/// Bytes covered by the header checksum.
const CHECKED_LEN: usize = 24;

/// Parsed header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Minor format version.
    pub version: u16,
    /// Reserved flags.
    pub flags: u16,
    /// Declared document length in bytes.
    pub total_length: u64,
    /// Number of sections following the header.
    pub section_count: u32,
}

impl HeaderInfo {
    /// Returns `true` if the document was written by a newer minor version.
    pub fn is_newer(&self) -> bool {
        self.version > FORMAT_VERSION
    }

    /// Returns `true` if a version of this age carries a manifest section.
    pub fn expects_manifest(&self) -> bool {
        self.version >= 2
    }
}

pub(crate) fn write_header(w: &mut Writer, info: &HeaderInfo) {
    let mut head = Writer::new();
    head.bytes(&MAGIC);
    head.u16(info.version);
    head.u16(info.flags);
    head.u32(ENDIAN_MARKER);
    head.u64(info.total_length);
    head.u32(info.section_count);
    let head = head.into_inner();
    w.bytes(&head);
    w.u32(crc32(&head));
}

/// Parses and fully checks the header of `bytes`.
///
/// Checks, in order: length, magic, endianness marker, header checksum,
/// minimum version, and that the declared total length equals `bytes.len()`.
pub fn parse_header(bytes: &[u8]) -> Result<HeaderInfo, FormatError> {
    let mut r = Reader::new(bytes, 0);
    let head = r.take(HEADER_LEN, "header")?;
    let mut r = Reader::new(head, 0);

    let mut magic = [0u8; 4];
    magic.copy_from_slice(r.take(4, "magic")?);
    if magic != MAGIC {
        return Err(FormatError::BadMagic { found: magic });
    }
    let version = r.u16("version")?;
    let flags = r.u16("flags")?;
    match r.u32("endianness marker")? {
        ENDIAN_MARKER => {}
        marker if marker == ENDIAN_MARKER.swap_bytes() => {
            return Err(FormatError::ByteOrderMismatch)
        }
        marker => return Err(FormatError::BadEndiannessMarker(marker)),
    }
    let total_length = r.u64("total length")?;
    let section_count = r.u32("section count")?;
    let stored = r.u32("header checksum")?;
    let computed = crc32(&head[..CHECKED_LEN]);
    if stored != computed {
        return Err(FormatError::HeaderChecksum { stored, computed });
    }
    if version < MIN_READABLE_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: version,
            min: MIN_READABLE_VERSION,
        });
    }
    if total_length != bytes.len() as u64 {
        return Err(FormatError::LengthMismatch {
            declared: total_length,
            actual: bytes.len(),
        });
    }
    Ok(HeaderInfo {
        version,
        flags,
        total_length,
        section_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(info: HeaderInfo) -> Vec<u8> {
        let mut w = Writer::new();
        write_header(&mut w, &info);
        w.into_inner()
    }

    fn info(version: u16) -> HeaderInfo {
        HeaderInfo {
            version,
            flags: 0,
            total_length: HEADER_LEN as u64,
            section_count: 0,
        }
    }

    #[test]
    fn header_roundtrip() {
        let bytes = header_bytes(info(FORMAT_VERSION));
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[..4], b"KIR1");
        assert_eq!(&bytes[8..12], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(parse_header(&bytes), Ok(info(FORMAT_VERSION)));
    }

    #[test]
    fn short_input_truncated() {
        assert!(matches!(
            parse_header(b"KIR1"),
            Err(FormatError::Truncated { .. })
        ));
    }

    #[test]
    fn wrong_magic() {
        let mut bytes = header_bytes(info(2));
        bytes[0] = b'X';
        assert!(matches!(parse_header(&bytes), Err(FormatError::BadMagic { .. })));
    }

    #[test]
    fn swapped_marker_is_byte_order_mismatch() {
        let mut bytes = header_bytes(info(2));
        bytes[8..12].copy_from_slice(&ENDIAN_MARKER.to_be_bytes());
        assert_eq!(parse_header(&bytes), Err(FormatError::ByteOrderMismatch));
        bytes[8..12].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(
            parse_header(&bytes),
            Err(FormatError::BadEndiannessMarker(0xDEAD_BEEF))
        );
    }

    #[test]
    fn checksum_covers_header_fields() {
        let mut bytes = header_bytes(info(2));
        bytes[20] ^= 0x01;
        assert!(matches!(
            parse_header(&bytes),
            Err(FormatError::HeaderChecksum { .. })
        ));
    }

    #[test]
    fn version_zero_unsupported() {
        let bytes = header_bytes(info(0));
        assert_eq!(
            parse_header(&bytes),
            Err(FormatError::UnsupportedVersion { found: 0, min: 1 })
        );
    }

    #[test]
    fn newer_version_parses() {
        let parsed = parse_header(&header_bytes(info(7))).unwrap();
        assert!(parsed.is_newer());
    }

    #[test]
    fn length_must_match_input() {
        let mut bytes = header_bytes(info(2));
        bytes.push(0);
        assert_eq!(
            parse_header(&bytes),
            Err(FormatError::LengthMismatch {
                declared: 28,
                actual: 29
            })
        );
    }
}
