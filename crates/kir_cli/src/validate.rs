//! `kir validate`: decodes a document and runs the format, structure and
//! semantic tiers behind one acceptance gate.

use std::path::Path;

use kir_diagnostics::{Category, Diagnostic, DiagnosticRenderer, TerminalRenderer};
use kir_validate::{LoadError, ValidationOptions, ValidationReport};
use serde::Serialize;

use crate::{project, GlobalArgs, ReportFormat, ValidateArgs};

/// Runs the `kir validate` command.
///
/// Returns exit code 0 if the document is accepted, 1 if it is rejected.
/// An unreadable file is an error rather than a rejection.
pub fn run(args: &ValidateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = project::load(global)?;
    let options = project.validation(args.profile);
    let path = Path::new(&args.file);

    let outcome = validate_file(path, &options)?;

    match args.format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            if !global.quiet || !outcome.accepted {
                eprint!("{}", renderer.render_all(&outcome.diagnostics));
            }
            if !global.quiet {
                eprintln!("{}", outcome.summary());
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(if outcome.accepted { 0 } else { 1 })
}

/// The verdict for one file.
#[derive(Debug, Serialize)]
pub struct Outcome {
    /// The file that was validated.
    pub file: String,
    /// Whether the document passed every tier.
    pub accepted: bool,
    /// The first tier with a fatal diagnostic.
    pub failed_tier: Option<Category>,
    /// Number of fatal diagnostics.
    pub fatal: usize,
    /// Number of advisory diagnostics.
    pub advisory: usize,
    /// Components in the accepted tree.
    pub components: Option<usize>,
    /// Every diagnostic, in tier order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    fn from_report(file: &Path, report: ValidationReport, components: Option<usize>) -> Self {
        Self {
            file: file.display().to_string(),
            accepted: report.is_accepted(),
            failed_tier: report.first_failing_tier(),
            fatal: report.fatal_count(),
            advisory: report.advisory_count(),
            components,
            diagnostics: report.into_diagnostics(),
        }
    }

    /// One-line verdict.
    pub fn summary(&self) -> String {
        match (self.accepted, self.failed_tier) {
            (true, _) => format!(
                "{}: accepted ({} components, {} advisory)",
                self.file,
                self.components.unwrap_or(0),
                self.advisory
            ),
            (false, Some(tier)) => format!(
                "{}: rejected by {tier} validation ({} fatal)",
                self.file, self.fatal
            ),
            (false, None) => format!("{}: rejected ({} fatal)", self.file, self.fatal),
        }
    }
}

/// Loads and validates `path`.
pub fn validate_file(
    path: &Path,
    options: &ValidationOptions,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    match kir_validate::load_file(path, options) {
        Ok(loaded) => {
            let components = loaded.document.tree().len();
            tracing::debug!(path = %path.display(), components, "document accepted");
            Ok(Outcome::from_report(path, loaded.report, Some(components)))
        }
        Err(err @ LoadError::Io { .. }) => Err(err.into()),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "document rejected");
            Ok(Outcome::from_report(path, err.into_report(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_document, write_document};

    #[test]
    fn accepts_sample_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(dir.path(), "ok.kir", &sample_document());

        let outcome = validate_file(&path, &ValidationOptions::default()).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.components, Some(3));
        assert_eq!(outcome.fatal, 0);
        assert!(outcome.summary().ends_with("accepted (3 components, 0 advisory)"));
    }

    #[test]
    fn rejects_garbage_in_format_tier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.kir");
        std::fs::write(&path, b"KIR0 definitely not a document").unwrap();

        let outcome = validate_file(&path, &ValidationOptions::default()).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.failed_tier, Some(Category::Format));
        assert!(outcome.fatal > 0);
        assert!(outcome.summary().contains("rejected by"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_file(&dir.path().join("absent.kir"), &ValidationOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn json_outcome_lists_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.kir");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let outcome = validate_file(&path, &ValidationOptions::default()).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["accepted"], false);
        assert!(!json["diagnostics"].as_array().unwrap().is_empty());
    }
}
