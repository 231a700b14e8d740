//! Format tier: header, version window, framing and checksums.

use crate::codes;
use crate::options::ValidationOptions;
use kir_codec::{
    scan, Decoded, FormatError, ManifestStatus, SectionKind, FORMAT_VERSION, MIN_READABLE_VERSION,
};
use kir_diagnostics::{Diagnostic, DiagnosticCode, Severity};

/// Checks raw bytes without decoding section bodies.
///
/// A header or framing failure yields a single fatal diagnostic, since
/// nothing after it can be located. Otherwise every section is checked.
pub fn check_format(bytes: &[u8], options: &ValidationOptions) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let scan = match scan(bytes, options.crc_check) {
        Ok(scan) => scan,
        Err(err) => {
            diags.push(format_error_diagnostic(&err, options));
            return diags;
        }
    };
    if scan.header.is_newer() {
        diags.push(newer_version(scan.header.version, options));
    }

    let manifest_severity = manifest_severity(options);
    let mut trees = 0;
    let mut manifests = 0;
    for section in &scan.sections {
        match section.kind() {
            SectionKind::Tree => {
                trees += 1;
                if !section.checksum_ok {
                    diags.push(
                        Diagnostic::fatal(codes::TREE_CHECKSUM, "tree section checksum mismatch")
                            .with_note(format!("section frame at byte {}", section.frame_offset)),
                    );
                }
            }
            SectionKind::Manifest => {
                manifests += 1;
                if !section.checksum_ok {
                    diags.push(
                        diagnostic(
                            manifest_severity,
                            codes::MANIFEST_CHECKSUM,
                            "manifest section checksum mismatch",
                        )
                        .with_note(format!("section frame at byte {}", section.frame_offset)),
                    );
                }
            }
            SectionKind::Extension(tag) => {
                if !section.checksum_ok {
                    diags.push(Diagnostic::advisory(
                        codes::EXTENSION_CHECKSUM,
                        format!("extension section {tag} checksum mismatch"),
                    ));
                }
            }
        }
    }
    match trees {
        0 => diags.push(Diagnostic::fatal(codes::MISSING_TREE, "document has no tree section")),
        1 => {}
        n => diags.push(Diagnostic::fatal(
            codes::DUPLICATE_SECTION,
            format!("tree section occurs {n} times"),
        )),
    }
    if manifests == 0 && scan.header.expects_manifest() {
        diags.push(diagnostic(
            manifest_severity,
            codes::MISSING_MANIFEST,
            "document has no manifest section",
        ));
    } else if manifests > 1 {
        diags.push(diagnostic(
            manifest_severity,
            codes::DUPLICATE_SECTION,
            format!("manifest section occurs {manifests} times"),
        ));
    }
    diags
}

/// Findings recorded by the decoder: version window, manifest degradation
/// and skipped content.
pub(crate) fn decode_findings(decoded: &Decoded, options: &ValidationOptions) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    if decoded.header.is_newer() {
        diags.push(newer_version(decoded.header.version, options));
    }
    if let ManifestStatus::Degraded(err) = &decoded.manifest_status {
        diags.push(
            diagnostic(
                manifest_severity(options),
                manifest_code(err),
                "manifest unusable, reactive state reset to empty",
            )
            .with_note(err.to_string()),
        );
    }
    let stats = &decoded.stats;
    if stats.skipped_properties > 0 || stats.skipped_sections > 0 {
        diags.push(
            Diagnostic::advisory(
                codes::SKIPPED_CONTENT,
                format!(
                    "skipped {} unknown properties and {} extension sections",
                    stats.skipped_properties, stats.skipped_sections
                ),
            )
            .with_note("the document was likely written by a newer producer"),
        );
    }
    if stats.corrupt_extension_sections > 0 {
        diags.push(Diagnostic::advisory(
            codes::EXTENSION_CHECKSUM,
            format!(
                "{} extension sections failed their checksum",
                stats.corrupt_extension_sections
            ),
        ));
    }
    diags
}

/// Maps a decoder error about the whole document to a fatal diagnostic.
pub(crate) fn format_error_diagnostic(err: &FormatError, options: &ValidationOptions) -> Diagnostic {
    let code = match err {
        FormatError::Truncated { .. } => codes::TRUNCATED,
        FormatError::BadMagic { .. } => codes::BAD_MAGIC,
        FormatError::ByteOrderMismatch => codes::BYTE_ORDER,
        FormatError::BadEndiannessMarker(_) => codes::ENDIAN_MARKER,
        FormatError::UnsupportedVersion { .. } => codes::VERSION_TOO_OLD,
        FormatError::HeaderChecksum { .. } => codes::HEADER_CHECKSUM,
        FormatError::LengthMismatch { .. } => codes::LENGTH_MISMATCH,
        FormatError::SectionCountMismatch { .. } => codes::SECTION_FRAMING,
        FormatError::SectionChecksum { .. } => codes::TREE_CHECKSUM,
        FormatError::MissingTreeSection => codes::MISSING_TREE,
        FormatError::MissingManifestSection => codes::MISSING_MANIFEST,
        FormatError::DuplicateSection(_) => codes::DUPLICATE_SECTION,
        FormatError::CountTooLarge { .. }
        | FormatError::NestingTooDeep { .. }
        | FormatError::InvalidUtf8 { .. }
        | FormatError::InvalidValue { .. }
        | FormatError::TrailingBytes { .. } => codes::MALFORMED_TREE,
    };
    let diag = Diagnostic::fatal(code, err.to_string());
    match err {
        FormatError::ByteOrderMismatch => {
            diag.with_help("re-encode the document; all fields must be little-endian")
        }
        FormatError::UnsupportedVersion { .. } => {
            diag.with_help(format!("this reader accepts versions {MIN_READABLE_VERSION} and later"))
        }
        _ if !options.crc_check => diag.with_note("section checksums were not verified"),
        _ => diag,
    }
}

fn manifest_code(err: &FormatError) -> DiagnosticCode {
    match err {
        FormatError::SectionChecksum { .. } => codes::MANIFEST_CHECKSUM,
        FormatError::MissingManifestSection => codes::MISSING_MANIFEST,
        FormatError::DuplicateSection(_) => codes::DUPLICATE_SECTION,
        _ => codes::MALFORMED_MANIFEST,
    }
}

fn newer_version(version: u16, options: &ValidationOptions) -> Diagnostic {
    let severity = if options.strict_version {
        Severity::Fatal
    } else {
        Severity::Advisory
    };
    diagnostic(
        severity,
        codes::VERSION_NEWER,
        format!("format version {version} is newer than {FORMAT_VERSION}"),
    )
    .with_note("unknown properties and sections are skipped")
}

fn manifest_severity(options: &ValidationOptions) -> Severity {
    if options.manifest_degradation {
        Severity::Advisory
    } else {
        Severity::Fatal
    }
}

fn diagnostic(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Diagnostic {
    match severity {
        Severity::Fatal => Diagnostic::fatal(code, message),
        Severity::Advisory => Diagnostic::advisory(code, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kir_codec::{encode, Encoder, HEADER_LEN};
    use kir_ir::{ComponentId, ComponentKind, ComponentNode, ComponentTree, ReactiveManifest};
    use kir_ir::{ReactiveValue, VarType};

    fn bytes() -> Vec<u8> {
        let mut tree = ComponentTree::new();
        tree.set_root(ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Container));
        let mut manifest = ReactiveManifest::new();
        manifest
            .add_variable("n", VarType::Int, ReactiveValue::Int(1))
            .unwrap();
        encode(&tree, &manifest).unwrap()
    }

    fn codes_of(diags: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diags.iter().map(|d| d.code).collect()
    }

    #[test]
    fn clean_document_has_no_findings() {
        assert!(check_format(&bytes(), &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn bad_magic_single_fatal() {
        let mut b = bytes();
        b[1] = b'X';
        let diags = check_format(&b, &ValidationOptions::default());
        assert_eq!(codes_of(&diags), vec![codes::BAD_MAGIC]);
        assert!(diags[0].is_fatal());
    }

    #[test]
    fn byte_swapped_header() {
        let mut b = bytes();
        b[8..12].reverse();
        let diags = check_format(&b, &ValidationOptions::default());
        assert_eq!(codes_of(&diags), vec![codes::BYTE_ORDER]);
        assert!(!diags[0].help.is_empty());
    }

    #[test]
    fn manifest_checksum_severity_follows_degradation() {
        let mut b = bytes();
        let last = b.len() - 1;
        b[last] ^= 0x01;
        let diags = check_format(&b, &ValidationOptions::default());
        assert_eq!(codes_of(&diags), vec![codes::MANIFEST_CHECKSUM]);
        assert!(!diags[0].is_fatal());

        let diags = check_format(&b, &ValidationOptions::strict());
        assert!(diags[0].is_fatal());

        assert!(check_format(&b, &ValidationOptions::permissive()).is_empty());
    }

    #[test]
    fn tree_checksum_is_fatal() {
        let mut b = bytes();
        b[HEADER_LEN + 9 + 1] ^= 0x01;
        let diags = check_format(&b, &ValidationOptions::default());
        assert_eq!(codes_of(&diags), vec![codes::TREE_CHECKSUM]);
        assert!(diags[0].is_fatal());
    }

    #[test]
    fn newer_version_advisory_unless_strict() {
        let tree = ComponentTree::new();
        let manifest = ReactiveManifest::new();
        let b = Encoder::new(&tree, &manifest).format_version(3).encode().unwrap();
        let diags = check_format(&b, &ValidationOptions::default());
        assert_eq!(codes_of(&diags), vec![codes::VERSION_NEWER]);
        assert!(!diags[0].is_fatal());
        assert!(check_format(&b, &ValidationOptions::strict())[0].is_fatal());
    }

    #[test]
    fn version_one_needs_no_manifest() {
        let mut tree = ComponentTree::new();
        tree.set_root(ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Row));
        let manifest = ReactiveManifest::new();
        let b = Encoder::new(&tree, &manifest).format_version(1).encode().unwrap();
        assert!(check_format(&b, &ValidationOptions::strict()).is_empty());
    }
}
