//! Three-tier validation of decoded documents.
//!
//! The **format** tier checks raw bytes (header, version window, section
//! framing and checksums), the **structure** tier checks tree shape and
//! reference integrity, and the **semantic** tier checks property values and
//! binding/type compatibility. Every tier reports all problems it finds as
//! [`Diagnostic`](kir_diagnostics::Diagnostic)s; acceptance is decided once,
//! by [`ValidationReport::is_accepted`], after all tiers ran.
//!
//! [`load`] combines decoding, all tiers and the acceptance gate.

#![warn(missing_docs)]

pub mod codes;
pub mod format;
pub mod load;
pub mod options;
pub mod report;
pub mod semantic;
pub mod structure;

pub use format::check_format;
pub use load::{load, load_file, LoadError, Loaded};
pub use options::ValidationOptions;
pub use report::ValidationReport;
pub use semantic::check_semantics;
pub use structure::check_structure;

use kir_codec::Decoded;
use kir_diagnostics::DiagnosticSink;
use kir_ir::Document;

/// Validates a decoded document: decode-time findings, then the structure
/// and semantic tiers.
pub fn validate(decoded: &Decoded, options: &ValidationOptions) -> ValidationReport {
    let sink = DiagnosticSink::new();
    validate_into(decoded, options, &sink);
    ValidationReport::from_sink(&sink)
}

/// Like [`validate`], emitting into a caller-owned sink.
pub fn validate_into(decoded: &Decoded, options: &ValidationOptions, sink: &DiagnosticSink) {
    sink.extend(format::decode_findings(decoded, options));
    validate_document_into(&decoded.document, options, sink);
}

/// Runs the structure and semantic tiers on an in-memory document.
pub fn validate_document(document: &Document, options: &ValidationOptions) -> ValidationReport {
    let sink = DiagnosticSink::new();
    validate_document_into(document, options, &sink);
    ValidationReport::from_sink(&sink)
}

/// Like [`validate_document`], emitting into a caller-owned sink.
///
/// The sink is shared, so several documents may be checked into it from
/// different threads.
pub fn validate_document_into(
    document: &Document,
    options: &ValidationOptions,
    sink: &DiagnosticSink,
) {
    let before = sink.fatal_count();
    sink.extend(check_structure(document, options));
    if options.semantic {
        sink.extend(check_semantics(document, options));
    }
    tracing::debug!(
        fatal = sink.fatal_count() - before,
        components = document.tree().len(),
        "validation finished"
    );
}
