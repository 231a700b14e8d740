//! Binary encoding and decoding of KIR documents.
//!
//! A document is a 28-byte header followed by CRC-framed sections:
//!
//! ```text
//! header   magic "KIR1" | version u16 | flags u16 | endian u32
//!          | total length u64 | section count u32 | header crc u32
//! section  tag u8 | body length u32 | crc u32 | body
//! ```
//!
//! Section `1` holds the component tree, section `2` the reactive manifest;
//! any other tag is an extension section that readers skip. All integers are
//! little-endian regardless of host order.
//!
//! Decoding checks the whole header before touching any section. A damaged
//! tree section is always fatal, while a damaged or missing manifest section
//! degrades to an empty manifest (see [`ManifestStatus`]).

#![warn(missing_docs)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod header;
mod manifest;
pub mod section;
mod tree;
mod wire;

pub use decode::{decode, decode_with, DecodeOptions, DecodeStats, Decoded, ManifestStatus};
pub use encode::{encode, encode_document, Encoder, RawProperty};
pub use error::{EncodeError, FormatError};
pub use header::{
    parse_header, HeaderInfo, ENDIAN_MARKER, FORMAT_VERSION, HEADER_LEN, MAGIC,
    MIN_READABLE_VERSION,
};
pub use section::{scan, Scan, SectionInfo, SectionKind, MANIFEST_SECTION, TREE_SECTION};

/// Maximum nesting of tree levels and property blocks combined.
pub const MAX_NESTING: usize = 1024;
