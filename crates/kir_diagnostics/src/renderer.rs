//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a list of diagnostics followed by a summary line.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diag in diags {
            out.push_str(&self.render(diag));
        }
        let fatal = diags.iter().filter(|d| d.is_fatal()).count();
        let advisory = diags.len() - fatal;
        out.push_str(&format!("{fatal} fatal, {advisory} advisory\n"));
        out
    }
}

/// Renders diagnostics in a compact rustc-like format.
///
/// Produces output like:
/// ```text
/// fatal[S003]: component graph contains a cycle
///   --> component #12
///    = note: reached again from component #4
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        let ansi = match severity {
            Severity::Fatal => "\x1b[1;31m",
            Severity::Advisory => "\x1b[1;33m",
        };
        format!("{ansi}{severity}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.severity_label(diag.severity),
            diag.code,
            diag.message
        );
        if let Some(id) = diag.component {
            out.push_str(&format!("  --> component #{id}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}
