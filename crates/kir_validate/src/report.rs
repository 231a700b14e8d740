//! The combined result of all validation tiers.

use kir_diagnostics::{Category, Diagnostic, DiagnosticRenderer, DiagnosticSink};
use serde::Serialize;

/// Diagnostics from every tier that ran.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains `sink` into a new report.
    pub fn from_sink(sink: &DiagnosticSink) -> Self {
        Self {
            diagnostics: sink.take_all(),
        }
    }

    /// Appends diagnostics.
    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diags);
    }

    /// Appends one diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// The acceptance gate: `true` if no diagnostic is fatal.
    pub fn is_accepted(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    /// All diagnostics in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the report.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Number of fatal diagnostics.
    pub fn fatal_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_fatal()).count()
    }

    /// Number of advisory diagnostics.
    pub fn advisory_count(&self) -> usize {
        self.diagnostics.len() - self.fatal_count()
    }

    /// Returns `true` if some diagnostic in `category` is fatal.
    pub fn has_fatal_in(&self, category: Category) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.is_fatal() && d.category() == category)
    }

    /// The tier of the first fatal diagnostic, in tier order.
    pub fn first_failing_tier(&self) -> Option<Category> {
        [
            Category::Io,
            Category::Format,
            Category::Structure,
            Category::Semantic,
        ]
        .into_iter()
        .find(|&c| self.has_fatal_in(c))
    }

    /// Renders every diagnostic and a summary line.
    pub fn render(&self, renderer: &dyn DiagnosticRenderer) -> String {
        renderer.render_all(&self.diagnostics)
    }
}
