//! Section framing and scanning.

use crate::error::{EncodeError, FormatError};
use crate::header::{parse_header, HeaderInfo, HEADER_LEN};
use crate::wire::{len_u32, Reader, Writer};
use kir_common::Crc32;

/// Tag of the component tree section.
pub const TREE_SECTION: u8 = 1;

/// Tag of the reactive manifest section.
pub const MANIFEST_SECTION: u8 = 2;

/// Size of the frame preceding each section body.
pub(crate) const FRAME_LEN: usize = 9;

/// What a section tag denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    /// The component tree.
    Tree,
    /// The reactive manifest.
    Manifest,
    /// Anything else; skipped by this reader.
    Extension(u8),
}

/// Location and checksum status of one section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    /// Raw tag.
    pub tag: u8,
    /// Offset of the section frame.
    pub frame_offset: usize,
    /// Offset of the body.
    pub body_offset: usize,
    /// Length of the body.
    pub body_len: usize,
    /// `false` if the stored checksum did not match. Always `true` when
    /// checksums were not verified.
    pub checksum_ok: bool,
}

impl SectionInfo {
    /// Classifies the tag.
    pub fn kind(&self) -> SectionKind {
        match self.tag {
            TREE_SECTION => SectionKind::Tree,
            MANIFEST_SECTION => SectionKind::Manifest,
            other => SectionKind::Extension(other),
        }
    }

    pub(crate) fn body<'a>(&self, bytes: &'a [u8]) -> Reader<'a> {
        Reader::new(
            &bytes[self.body_offset..self.body_offset + self.body_len],
            self.body_offset,
        )
    }
}

/// A checked header plus the frame of every section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scan {
    /// The parsed header.
    pub header: HeaderInfo,
    /// Sections in file order.
    pub sections: Vec<SectionInfo>,
}

fn section_crc(tag: u8, len: u32, body: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(&[tag]);
    crc.update(&len.to_le_bytes());
    crc.update(body);
    crc.finish()
}

pub(crate) fn write_section(w: &mut Writer, tag: u8, body: &[u8]) -> Result<(), EncodeError> {
    let len = len_u32(body.len(), "section body")?;
    w.u8(tag);
    w.u32(len);
    w.u32(section_crc(tag, len, body));
    w.bytes(body);
    Ok(())
}

/// Parses the header and walks the section frames without decoding bodies.
///
/// Framing problems (a section running past the end, or bytes after the last
/// declared section) are errors. Checksum mismatches are recorded per section
/// in [`SectionInfo::checksum_ok`] so callers decide how severe they are.
pub fn scan(bytes: &[u8], verify_checksums: bool) -> Result<Scan, FormatError> {
    let header = parse_header(bytes)?;
    let mut r = Reader::new(&bytes[HEADER_LEN..], HEADER_LEN);
    let count = r.check_count(u64::from(header.section_count), FRAME_LEN, "sections")?;
    let mut sections = Vec::with_capacity(count);
    for _ in 0..count {
        let frame_offset = r.offset();
        let tag = r.u8("section tag")?;
        let len = r.u32("section length")?;
        let stored = r.u32("section checksum")?;
        let body_offset = r.offset();
        let body = r.take(len as usize, "section body")?;
        let checksum_ok = !verify_checksums || section_crc(tag, len, body) == stored;
        sections.push(SectionInfo {
            tag,
            frame_offset,
            body_offset,
            body_len: body.len(),
            checksum_ok,
        });
    }
    if r.remaining() > 0 {
        return Err(FormatError::SectionCountMismatch {
            declared: header.section_count,
            trailing: r.remaining(),
        });
    }
    Ok(Scan { header, sections })
}
