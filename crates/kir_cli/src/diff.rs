//! `kir diff`: compares two encoded documents.
//!
//! Both inputs go through the full acceptance gate first; a rejected input
//! is reported with its diagnostics and nothing is compared.

use std::path::Path;

use kir_diagnostics::TerminalRenderer;
use kir_diff::ChangeSet;
use kir_ir::Document;
use kir_validate::{LoadError, ValidationOptions};

use crate::{project, DiffArgs, GlobalArgs, ReportFormat};

/// Runs the `kir diff` command.
///
/// Returns 0 when the comparison ran (or, with `--exit-code`, when nothing
/// changed), 1 when the documents differ under `--exit-code`, and 2 when an
/// input is rejected.
pub fn run(args: &DiffArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = project::load(global)?;
    let options = project.validation(None);
    let renderer = TerminalRenderer::new(global.color);

    let Some(old) = load_or_report(&args.old, &options, &renderer)? else {
        return Ok(2);
    };
    let Some(new) = load_or_report(&args.new, &options, &renderer)? else {
        return Ok(2);
    };

    let changes = kir_diff::diff(&old, &new);
    match args.format {
        ReportFormat::Text => print!("{changes}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
    }

    Ok(exit_code(&changes, args.exit_code))
}

fn load_or_report(
    file: &str,
    options: &ValidationOptions,
    renderer: &TerminalRenderer,
) -> Result<Option<Document>, Box<dyn std::error::Error>> {
    match load(Path::new(file), options)? {
        Ok(document) => Ok(Some(document)),
        Err(err) => {
            eprintln!("error: {file}: {err}");
            if let Some(report) = err.report() {
                eprint!("{}", report.render(renderer));
            }
            Ok(None)
        }
    }
}

/// Reads and validates one side. Read failures are errors; rejection is
/// returned for the caller to report.
fn load(
    path: &Path,
    options: &ValidationOptions,
) -> Result<Result<Document, LoadError>, Box<dyn std::error::Error>> {
    match kir_validate::load_file(path, options) {
        Ok(loaded) => Ok(Ok(loaded.document)),
        Err(err @ LoadError::Io { .. }) => Err(err.into()),
        Err(err) => Ok(Err(err)),
    }
}

fn exit_code(changes: &ChangeSet, strict: bool) -> i32 {
    if strict && !changes.is_empty() {
        1
    } else {
        0
    }
}
