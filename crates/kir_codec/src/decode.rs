//! Document decoding.

use crate::error::FormatError;
use crate::header::HeaderInfo;
use crate::manifest::decode_manifest;
use crate::section::{scan, SectionInfo, SectionKind};
use crate::tree::decode_tree;
use kir_ir::{Document, ReactiveManifest};

/// Decoder settings.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// Verify section checksums. The header checksum is always verified.
    pub verify_checksums: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
        }
    }
}

/// Counters for content the decoder tolerated rather than rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Property records skipped for an unknown key or value type.
    pub skipped_properties: usize,
    /// Extension sections skipped.
    pub skipped_sections: usize,
    /// Extension sections whose checksum did not match.
    pub corrupt_extension_sections: usize,
}

/// What happened to the manifest section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestStatus {
    /// Present and decoded.
    Intact,
    /// Not present, as expected for a version 1 document.
    Absent,
    /// Present but unusable, or missing from a version 2+ document. The
    /// document carries an empty manifest instead.
    Degraded(FormatError),
}

/// The result of a successful decode.
#[derive(Clone, Debug)]
pub struct Decoded {
    /// The decoded tree and manifest.
    pub document: Document,
    /// Header fields.
    pub header: HeaderInfo,
    /// Section frames in file order.
    pub sections: Vec<SectionInfo>,
    /// Outcome for the manifest section.
    pub manifest_status: ManifestStatus,
    /// Tolerated-content counters.
    pub stats: DecodeStats,
}

impl Decoded {
    /// Returns `true` if the manifest was replaced by an empty one.
    pub fn is_degraded(&self) -> bool {
        matches!(self.manifest_status, ManifestStatus::Degraded(_))
    }
}

/// Decodes a document, verifying all checksums.
pub fn decode(bytes: &[u8]) -> Result<Decoded, FormatError> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decodes a document with explicit options.
///
/// Header and tree section problems are errors. Manifest section problems
/// degrade to an empty manifest, reported in [`Decoded::manifest_status`].
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Decoded, FormatError> {
    let scan = scan(bytes, options.verify_checksums)?;
    let mut stats = DecodeStats::default();
    let mut tree_section: Option<&SectionInfo> = None;
    let mut manifest_section: Option<Result<&SectionInfo, FormatError>> = None;

    for section in &scan.sections {
        match section.kind() {
            SectionKind::Tree => {
                if tree_section.is_some() {
                    return Err(FormatError::DuplicateSection(section.tag));
                }
                if !section.checksum_ok {
                    return Err(FormatError::SectionChecksum {
                        tag: section.tag,
                        offset: section.frame_offset,
                    });
                }
                tree_section = Some(section);
            }
            SectionKind::Manifest => {
                manifest_section = Some(match manifest_section {
                    Some(_) => Err(FormatError::DuplicateSection(section.tag)),
                    None if !section.checksum_ok => Err(FormatError::SectionChecksum {
                        tag: section.tag,
                        offset: section.frame_offset,
                    }),
                    None => Ok(section),
                });
            }
            SectionKind::Extension(tag) => {
                stats.skipped_sections += 1;
                if !section.checksum_ok {
                    stats.corrupt_extension_sections += 1;
                    tracing::debug!(tag, offset = section.frame_offset, "corrupt extension section");
                }
            }
        }
    }

    let tree_section = tree_section.ok_or(FormatError::MissingTreeSection)?;
    let tree = decode_tree(tree_section.body(bytes), &mut stats)?;

    let (manifest, manifest_status) = match manifest_section {
        None if !scan.header.expects_manifest() => (ReactiveManifest::new(), ManifestStatus::Absent),
        None => degraded(FormatError::MissingManifestSection),
        Some(Err(err)) => degraded(err),
        Some(Ok(section)) => match decode_manifest(section.body(bytes)) {
            Ok(manifest) => (manifest, ManifestStatus::Intact),
            Err(err) => degraded(err),
        },
    };

    if stats.skipped_properties > 0 || stats.skipped_sections > 0 {
        tracing::debug!(
            properties = stats.skipped_properties,
            sections = stats.skipped_sections,
            "skipped unknown content"
        );
    }
    tracing::trace!(
        version = scan.header.version,
        components = tree.len(),
        "decoded document"
    );

    Ok(Decoded {
        document: Document::new(tree, manifest),
        header: scan.header,
        sections: scan.sections,
        manifest_status,
        stats,
    })
}

fn degraded(err: FormatError) -> (ReactiveManifest, ManifestStatus) {
    tracing::warn!(error = %err, "manifest unusable, continuing with empty reactive state");
    (ReactiveManifest::new(), ManifestStatus::Degraded(err))
}
