//! Opaque ID newtypes for components, variables and arena slots.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and `Serialize`/`Deserialize`.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` value.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw `u32` value.
            pub const fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Stable, compiler-assigned component id, unique within one tree.
    ComponentId
);

define_id!(
    /// Id of a reactive variable, unique within one manifest.
    VariableId
);

define_id!(
    /// Arena slot of a node inside one [`ComponentTree`](crate::tree::ComponentTree).
    ///
    /// Slots are only meaningful for the tree that produced them.
    NodeIndex
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = ComponentId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(VariableId::from_raw(7).as_raw(), 7);
    }

    #[test]
    fn ids_hash_and_order() {
        let mut set = HashSet::new();
        set.insert(NodeIndex::from_raw(1));
        set.insert(NodeIndex::from_raw(1));
        set.insert(NodeIndex::from_raw(2));
        assert_eq!(set.len(), 2);
        assert!(ComponentId::from_raw(1) < ComponentId::from_raw(2));
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(ComponentId::from_raw(12).to_string(), "12");
    }

    #[test]
    fn serde_is_transparent_number() {
        let json = serde_json::to_string(&VariableId::from_raw(3)).unwrap();
        assert_eq!(json, "3");
    }
}
