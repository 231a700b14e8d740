//! Decoding plus validation behind a single acceptance gate.

use crate::codes;
use crate::format::{check_format, format_error_diagnostic};
use crate::options::ValidationOptions;
use crate::report::ValidationReport;
use kir_codec::{decode_with, DecodeOptions, DecodeStats, HeaderInfo, ManifestStatus};
use kir_diagnostics::{Category, Diagnostic, DiagnosticSink};
use kir_ir::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a document was rejected. Every variant except `Io` carries the full
/// report, including the diagnostics of tiers that passed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The bytes are not a readable document.
    #[error("format validation failed with {} fatal diagnostics", .0.fatal_count())]
    Format(ValidationReport),
    /// The tree or manifest is inconsistent.
    #[error("structure validation failed with {} fatal diagnostics", .0.fatal_count())]
    Structure(ValidationReport),
    /// A property value or binding is invalid.
    #[error("semantic validation failed with {} fatal diagnostics", .0.fatal_count())]
    Semantic(ValidationReport),
}

impl LoadError {
    /// The validation report, if validation ran.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Format(r) | LoadError::Structure(r) | LoadError::Semantic(r) => Some(r),
        }
    }

    /// Converts the error into a report. A read failure becomes a single
    /// `I001` diagnostic.
    pub fn into_report(self) -> ValidationReport {
        match self {
            LoadError::Io { path, source } => {
                let mut report = ValidationReport::new();
                report.push(
                    Diagnostic::fatal(codes::READ_FAILED, format!("cannot read {}", path.display()))
                        .with_note(source.to_string()),
                );
                report
            }
            LoadError::Format(r) | LoadError::Structure(r) | LoadError::Semantic(r) => r,
        }
    }

    fn from_report(report: ValidationReport) -> Self {
        match report.first_failing_tier() {
            Some(Category::Structure) => LoadError::Structure(report),
            Some(Category::Semantic) => LoadError::Semantic(report),
            _ => LoadError::Format(report),
        }
    }
}

/// An accepted document with the advisories it produced.
#[derive(Clone, Debug)]
pub struct Loaded {
    /// The validated document.
    pub document: Document,
    /// Advisory diagnostics only; an accepted report has no fatal ones.
    pub report: ValidationReport,
    /// Header fields of the source bytes.
    pub header: HeaderInfo,
    /// Outcome for the manifest section.
    pub manifest_status: ManifestStatus,
    /// Content the decoder skipped.
    pub stats: DecodeStats,
}

/// Decodes and validates `bytes`. Returns the document only if no tier
/// produced a fatal diagnostic.
pub fn load(bytes: &[u8], options: &ValidationOptions) -> Result<Loaded, LoadError> {
    let decode_options = DecodeOptions {
        verify_checksums: options.crc_check,
    };
    let decoded = match decode_with(bytes, &decode_options) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::debug!(%err, "decode failed");
            let sink = DiagnosticSink::new();
            sink.extend(check_format(bytes, options));
            if !sink.has_fatal() {
                sink.emit(format_error_diagnostic(&err, options));
            }
            return Err(LoadError::Format(ValidationReport::from_sink(&sink)));
        }
    };

    let report = crate::validate(&decoded, options);
    if !report.is_accepted() {
        return Err(LoadError::from_report(report));
    }
    Ok(Loaded {
        document: decoded.document,
        report,
        header: decoded.header,
        manifest_status: decoded.manifest_status,
        stats: decoded.stats,
    })
}

/// Reads `path` and [`load`]s its contents.
pub fn load_file(path: &Path, options: &ValidationOptions) -> Result<Loaded, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), len = bytes.len(), "loading document");
    load(&bytes, options)
}
