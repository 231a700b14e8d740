//! Diagnostic codes with tier prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The validation tier (or failure source) a diagnostic belongs to.
///
/// Each category maps to a single-character prefix used in code display,
/// e.g. `F003` for a format problem or `S010` for a structural one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// File missing or unreadable, prefixed with `I`.
    Io,
    /// Header, version, framing and checksum problems, prefixed with `F`.
    Format,
    /// Tree shape and reference integrity problems, prefixed with `S`.
    Structure,
    /// Out-of-range or type-incompatible values, prefixed with `M`.
    Semantic,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Io => 'I',
            Category::Format => 'F',
            Category::Structure => 'S',
            Category::Semantic => 'M',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Io => write!(f, "io"),
            Category::Format => write!(f, "format"),
            Category::Structure => write!(f, "structure"),
            Category::Semantic => write!(f, "semantic"),
        }
    }
}

/// A structured diagnostic code combining a category prefix and a number.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit
/// number, e.g. `F001`, `S004`, `M012`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Io.prefix(), 'I');
        assert_eq!(Category::Format.prefix(), 'F');
        assert_eq!(Category::Structure.prefix(), 'S');
        assert_eq!(Category::Semantic.prefix(), 'M');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Format, 3);
        assert_eq!(format!("{code}"), "F003");

        let code = DiagnosticCode::new(Category::Semantic, 112);
        assert_eq!(format!("{code}"), "M112");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Structure, 7);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
