//! In-memory data model for compiled UI documents.
//!
//! A [`Document`] pairs a [`ComponentTree`] (an arena of typed components with a
//! derived parent index) with a [`ReactiveManifest`] (the named reactive
//! variables and the bindings that tie them to components). The binary codec,
//! validator, differ and cache all operate on these types.

#![warn(missing_docs)]

pub mod arena;
pub mod document;
pub mod error;
pub mod ids;
pub mod kind;
pub mod manifest;
pub mod property;
pub mod tree;

pub use arena::{Arena, ArenaId};
pub use document::Document;
pub use error::{ManifestError, TreeError};
pub use ids::{ComponentId, NodeIndex, VariableId};
pub use kind::ComponentKind;
pub use manifest::{
    Binding, BindingKind, ReactiveConditional, ReactiveForLoop, ReactiveManifest, ReactiveValue,
    VarType, VariableDescriptor,
};
pub use property::{
    DimensionUnit, NumericRange, PropertyCategory, PropertyKey, PropertyMap, PropertyValue,
    ValueKind,
};
pub use tree::{ComponentNode, ComponentTree, TreeIndex};
