//! Error types for encoding and decoding.

use kir_ir::{ComponentId, NodeIndex};

/// Errors detected while decoding bytes into a document.
///
/// Offsets are absolute byte positions in the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The input ended before a field could be read.
    #[error("truncated input at byte {offset} while reading {context}")]
    Truncated {
        /// Where reading stopped.
        offset: usize,
        /// What was being read.
        context: &'static str,
    },

    /// The file does not start with the expected magic.
    #[error("bad magic {found:02x?}, expected \"KIR1\"")]
    BadMagic {
        /// The first four bytes of the input.
        found: [u8; 4],
    },

    /// The endianness marker reads byte-swapped.
    #[error("document was written with the opposite byte order")]
    ByteOrderMismatch,

    /// The endianness marker has an unexpected value.
    #[error("bad endianness marker {0:#010x}")]
    BadEndiannessMarker(u32),

    /// The format version is older than this reader supports.
    #[error("format version {found} is older than the minimum readable version {min}")]
    UnsupportedVersion {
        /// Version in the header.
        found: u16,
        /// Oldest version this reader accepts.
        min: u16,
    },

    /// The header checksum does not match.
    #[error("header checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    HeaderChecksum {
        /// Checksum stored in the header.
        stored: u32,
        /// Checksum computed over the header bytes.
        computed: u32,
    },

    /// The declared total length differs from the input length.
    #[error("header declares {declared} bytes but input has {actual}")]
    LengthMismatch {
        /// Length stored in the header.
        declared: u64,
        /// Actual input length.
        actual: usize,
    },

    /// Bytes remain after the declared number of sections.
    #[error("{trailing} bytes follow the {declared} declared sections")]
    SectionCountMismatch {
        /// Section count stored in the header.
        declared: u32,
        /// Unaccounted bytes after the last section.
        trailing: usize,
    },

    /// A section's checksum does not match its contents.
    #[error("checksum mismatch in section {tag} at byte {offset}")]
    SectionChecksum {
        /// Section tag.
        tag: u8,
        /// Offset of the section frame.
        offset: usize,
    },

    /// The tree section is missing.
    #[error("document has no tree section")]
    MissingTreeSection,

    /// A version 2 or later document has no manifest section.
    #[error("document has no manifest section")]
    MissingManifestSection,

    /// A section that may occur once occurs again.
    #[error("section {0} occurs more than once")]
    DuplicateSection(u8),

    /// A count exceeds what the remaining bytes could hold.
    #[error("count {count} at byte {offset} exceeds the remaining input for {context}")]
    CountTooLarge {
        /// The declared count.
        count: u64,
        /// Where the count was read.
        offset: usize,
        /// What was being counted.
        context: &'static str,
    },

    /// Tree levels or property blocks nest too deeply.
    #[error("nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// The nesting limit.
        limit: usize,
    },

    /// A string is not valid UTF-8.
    #[error("invalid UTF-8 at byte {offset}")]
    InvalidUtf8 {
        /// Start of the string payload.
        offset: usize,
    },

    /// A field holds a value outside its encoding.
    #[error("invalid {context} at byte {offset}: {found}")]
    InvalidValue {
        /// Where the field starts.
        offset: usize,
        /// What the field is.
        context: &'static str,
        /// The offending raw value.
        found: u64,
    },

    /// A length-delimited region was not fully consumed.
    #[error("{remaining} unread bytes at the end of {context} (byte {offset})")]
    TrailingBytes {
        /// Where the unread bytes start.
        offset: usize,
        /// How many bytes were left.
        remaining: usize,
        /// The region being read.
        context: &'static str,
    },
}

/// Errors detected while encoding a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A child list or the root refers to a slot that does not exist.
    #[error("slot {slot} does not exist")]
    DanglingSlot {
        /// The missing slot.
        slot: NodeIndex,
    },

    /// The component graph loops back onto an ancestor.
    #[error("component {component} is its own ancestor")]
    Cycle {
        /// A component on the cycle.
        component: ComponentId,
    },

    /// A node is listed as a child more than once in the tree.
    #[error("component {component} appears under more than one parent")]
    SharedNode {
        /// The shared component.
        component: ComponentId,
    },

    /// Tree levels or property blocks nest too deeply.
    #[error("nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// The nesting limit.
        limit: usize,
    },

    /// A string or list does not fit its length field.
    #[error("{what} too large ({len})")]
    TooLarge {
        /// What was being written.
        what: &'static str,
        /// Its length.
        len: usize,
    },

    /// The requested format version cannot be written.
    #[error("cannot write format version {0}")]
    UnsupportedVersion(u16),

    /// Version 1 documents have no manifest section.
    #[error("format version {version} cannot carry a reactive manifest")]
    ManifestNotSupported {
        /// The requested version.
        version: u16,
    },

    /// Extension sections may not use the tree or manifest tags.
    #[error("section tag {0} is reserved")]
    ReservedSectionTag(u8),
}
