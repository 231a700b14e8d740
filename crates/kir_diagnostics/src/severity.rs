//! Diagnostic severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic.
///
/// Ordered from least severe (`Advisory`) to most severe (`Fatal`). Any
/// fatal diagnostic blocks acceptance of the document it describes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Surfaced to the caller but does not block acceptance.
    Advisory,
    /// Blocks acceptance by downstream consumers.
    Fatal,
}

impl Severity {
    /// Returns `true` if this severity is [`Fatal`](Severity::Fatal).
    pub fn is_fatal(self) -> bool {
        self == Severity::Fatal
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Advisory => write!(f, "advisory"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}
