//! Structured diagnostic messages.

use crate::code::{Category, DiagnosticCode};
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic produced while decoding or validating a document.
///
/// Each diagnostic includes:
/// - A severity and a tier-prefixed code
/// - A primary message
/// - Optionally the id of the component it concerns
/// - Optional notes and help text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of problem.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The component id this diagnostic concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<u32>,
    /// Explanatory footnotes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Actionable suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a new fatal diagnostic.
    pub fn fatal(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, code, message)
    }

    /// Creates a new advisory diagnostic.
    pub fn advisory(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Advisory, code, message)
    }

    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            component: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Attaches the component id this diagnostic concerns.
    pub fn with_component(mut self, id: u32) -> Self {
        self.component = Some(id);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Returns the tier this diagnostic was produced by.
    pub fn category(&self) -> Category {
        self.code.category
    }

    /// Returns `true` if this diagnostic blocks acceptance.
    pub fn is_fatal(&self) -> bool {
        self.severity.is_fatal()
    }
}
