//! Diagnostic codes emitted by the validator.

use kir_diagnostics::{Category, DiagnosticCode};

const fn io(n: u16) -> DiagnosticCode {
    DiagnosticCode::new(Category::Io, n)
}

const fn format(n: u16) -> DiagnosticCode {
    DiagnosticCode::new(Category::Format, n)
}

const fn structure(n: u16) -> DiagnosticCode {
    DiagnosticCode::new(Category::Structure, n)
}

const fn semantic(n: u16) -> DiagnosticCode {
    DiagnosticCode::new(Category::Semantic, n)
}

/// The file could not be read.
pub const READ_FAILED: DiagnosticCode = io(1);

/// Input ends inside the header or a section frame.
pub const TRUNCATED: DiagnosticCode = format(1);
/// Input does not start with the KIR magic.
pub const BAD_MAGIC: DiagnosticCode = format(2);
/// Written with the opposite byte order.
pub const BYTE_ORDER: DiagnosticCode = format(3);
/// Endianness marker holds an unexpected value.
pub const ENDIAN_MARKER: DiagnosticCode = format(4);
/// Format version below the minimum readable one.
pub const VERSION_TOO_OLD: DiagnosticCode = format(5);
/// Format version newer than this reader.
pub const VERSION_NEWER: DiagnosticCode = format(6);
/// Header checksum mismatch.
pub const HEADER_CHECKSUM: DiagnosticCode = format(7);
/// Declared length differs from the input length.
pub const LENGTH_MISMATCH: DiagnosticCode = format(8);
/// Sections do not account for the input exactly.
pub const SECTION_FRAMING: DiagnosticCode = format(9);
/// Tree section checksum mismatch.
pub const TREE_CHECKSUM: DiagnosticCode = format(10);
/// Manifest section checksum mismatch.
pub const MANIFEST_CHECKSUM: DiagnosticCode = format(11);
/// Extension section checksum mismatch.
pub const EXTENSION_CHECKSUM: DiagnosticCode = format(12);
/// A tree or manifest section occurs twice.
pub const DUPLICATE_SECTION: DiagnosticCode = format(13);
/// No tree section.
pub const MISSING_TREE: DiagnosticCode = format(14);
/// No manifest section in a version 2+ document.
pub const MISSING_MANIFEST: DiagnosticCode = format(15);
/// Tree section body cannot be decoded.
pub const MALFORMED_TREE: DiagnosticCode = format(16);
/// Manifest section body cannot be decoded.
pub const MALFORMED_MANIFEST: DiagnosticCode = format(17);
/// Unknown properties or sections were skipped.
pub const SKIPPED_CONTENT: DiagnosticCode = format(18);

/// The tree has no root.
pub const MISSING_ROOT: DiagnosticCode = structure(1);
/// A child list refers to a missing slot.
pub const DANGLING_CHILD: DiagnosticCode = structure(2);
/// A child appears twice in one child list.
pub const DUPLICATE_CHILD: DiagnosticCode = structure(3);
/// A node is the child of more than one node.
pub const MULTIPLE_PARENTS: DiagnosticCode = structure(4);
/// A node is its own ancestor.
pub const CYCLE: DiagnosticCode = structure(5);
/// Nodes not reachable from the root.
pub const UNREACHABLE: DiagnosticCode = structure(6);
/// The derived parent index does not match the child lists.
pub const STALE_INDEX: DiagnosticCode = structure(7);
/// Two nodes share a component id.
pub const DUPLICATE_COMPONENT_ID: DiagnosticCode = structure(8);
/// The tree is deeper than allowed.
pub const DEPTH_LIMIT: DiagnosticCode = structure(9);
/// The tree has more components than allowed.
pub const COUNT_LIMIT: DiagnosticCode = structure(10);
/// Two variables share an id.
pub const DUPLICATE_VARIABLE_ID: DiagnosticCode = structure(11);
/// Two variables share a name.
pub const DUPLICATE_VARIABLE_NAME: DiagnosticCode = structure(12);
/// A binding names a component not in the tree.
pub const UNRESOLVED_BINDING_COMPONENT: DiagnosticCode = structure(13);
/// A binding names a variable not in the manifest.
pub const UNRESOLVED_BINDING_VARIABLE: DiagnosticCode = structure(14);
/// The root refers to a missing slot.
pub const DANGLING_ROOT: DiagnosticCode = structure(15);
/// A conditional or for-loop names a component not in the tree.
pub const UNRESOLVED_TABLE_COMPONENT: DiagnosticCode = structure(16);
/// A conditional or for-loop names a variable not in the manifest.
pub const UNRESOLVED_TABLE_VARIABLE: DiagnosticCode = structure(17);

/// Component kind unknown to this version.
pub const UNKNOWN_KIND: DiagnosticCode = semantic(1);
/// Property value has the wrong kind for its key.
pub const VALUE_KIND_MISMATCH: DiagnosticCode = semantic(2);
/// Enum ordinal outside the key's domain.
pub const ENUM_OUT_OF_DOMAIN: DiagnosticCode = semantic(3);
/// Dimension unit byte not defined.
pub const UNDEFINED_UNIT: DiagnosticCode = semantic(4);
/// Number outside the key's valid range.
pub const OUT_OF_RANGE: DiagnosticCode = semantic(5);
/// Pixel dimension outside 0..=100000.
pub const IMPLAUSIBLE_PIXELS: DiagnosticCode = semantic(6);
/// Percentage outside 0..=100.
pub const IMPLAUSIBLE_PERCENT: DiagnosticCode = semantic(7);
/// Font size outside 1..=1000.
pub const IMPLAUSIBLE_FONT_SIZE: DiagnosticCode = semantic(8);
/// Negative aspect ratio.
pub const NEGATIVE_ASPECT_RATIO: DiagnosticCode = semantic(9);
/// Text content over 1 000 000 bytes.
pub const OVERSIZED_TEXT: DiagnosticCode = semantic(10);
/// Property block nested inside another block.
pub const NESTED_BLOCK: DiagnosticCode = semantic(11);
/// For-each binding on a non-collection variable.
pub const FOR_EACH_TYPE: DiagnosticCode = semantic(12);
/// Text binding on a component that shows no text.
pub const TEXT_BINDING_TARGET: DiagnosticCode = semantic(13);
/// NaN or infinite number.
pub const NON_FINITE: DiagnosticCode = semantic(14);
/// Variable value does not match its declared type.
pub const VARIABLE_VALUE_TYPE: DiagnosticCode = semantic(15);
