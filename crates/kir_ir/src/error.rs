//! Error types for tree construction and manifest mutation.

use crate::ids::{NodeIndex, VariableId};
use crate::manifest::VarType;

/// Errors from building a [`ComponentTree`](crate::tree::ComponentTree).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The referenced slot does not exist in this tree.
    #[error("no node at slot {0}")]
    UnknownSlot(NodeIndex),
}

/// Errors from mutating a [`ReactiveManifest`](crate::manifest::ReactiveManifest).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManifestError {
    /// Variable names must be non-empty.
    #[error("variable name must not be empty")]
    EmptyName,

    /// A variable with this name already exists with another type.
    #[error("variable '{name}' already declared as {existing}, cannot redeclare as {requested}")]
    ConflictingType {
        /// The variable name.
        name: String,
        /// The type it was first declared with.
        existing: VarType,
        /// The type of the rejected declaration.
        requested: VarType,
    },

    /// A value does not match the variable's declared type.
    #[error("variable '{name}' has type {expected}, got a {found} value")]
    TypeMismatch {
        /// The variable name.
        name: String,
        /// The declared type.
        expected: VarType,
        /// The type of the offered value.
        found: VarType,
    },

    /// No variable with this id exists.
    #[error("unknown variable id {0}")]
    UnknownVariable(VariableId),

    /// No variable with this name exists.
    #[error("unknown variable '{0}'")]
    UnknownName(String),

    /// No conditional at this position.
    #[error("no conditional at index {0}")]
    UnknownConditional(usize),

    /// The manifest ran out of variable ids.
    #[error("variable id space exhausted")]
    IdsExhausted,
}
