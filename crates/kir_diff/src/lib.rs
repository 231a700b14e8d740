//! Structural comparison of two documents and reactive state carry-over.
//!
//! [`diff`] matches components of an old and a new [`Document`] and reports
//! what changed as a [`ChangeSet`]. [`reconcile`] uses the manifest half of
//! that comparison to copy surviving variable values from the old manifest
//! into the new one, which is how state survives a hot reload.
//!
//! Components are matched by [`ComponentId`](kir_ir::ComponentId) first.
//! New components without an id match fall back to position: the child at
//! the same index under a matched parent, if it has the same kind and is not
//! already matched. There is no content-similarity fallback, so a component
//! that moved to a different index and changed id is reported as removed and
//! added.

#![warn(missing_docs)]

pub mod changes;
pub mod matcher;
pub mod reconcile;

pub use changes::{
    diff_manifests, BindingKey, ChangeSet, ComponentChange, ConditionalKey, ForLoopKey,
    ManifestChanges, VariableChange,
};
pub use matcher::{match_trees, MatchKind, Matching, NodeMatch};
pub use reconcile::{reconcile, ReconcileReport, Reconciled};

use kir_ir::{ComponentTree, Document, PropertyMap, PropertyKey};

/// Compares two documents.
pub fn diff(old: &Document, new: &Document) -> ChangeSet {
    let (old_tree, new_tree) = (old.tree(), new.tree());
    let matching = match_trees(old_tree, new_tree);

    let mut components = Vec::new();
    for pair in matching.pairs() {
        if let Some(change) = compare_nodes(old_tree, new_tree, pair) {
            components.push(change);
        }
    }
    let added = matching
        .unmatched_new()
        .iter()
        .filter_map(|&slot| new_tree.node(slot).map(|n| n.id))
        .collect();
    let removed = matching
        .unmatched_old()
        .iter()
        .filter_map(|&slot| old_tree.node(slot).map(|n| n.id))
        .collect();

    let changes = ChangeSet {
        components,
        added,
        removed,
        manifest: diff_manifests(old.manifest(), new.manifest()),
        component_count_delta: matching.new_count() as i64 - matching.old_count() as i64,
    };
    tracing::debug!(
        changed = changes.components.len(),
        added = changes.added.len(),
        removed = changes.removed.len(),
        "diff computed"
    );
    changes
}

fn compare_nodes(
    old_tree: &ComponentTree,
    new_tree: &ComponentTree,
    pair: &NodeMatch,
) -> Option<ComponentChange> {
    let old = old_tree.node(pair.old)?;
    let new = new_tree.node(pair.new)?;
    let change = ComponentChange {
        old_id: old.id,
        new_id: new.id,
        matched_by: pair.by,
        kind: (old.kind != new.kind).then_some((old.kind, new.kind)),
        child_count_delta: new.children.len() as i64 - old.children.len() as i64,
        text_changed: old.text != new.text,
        properties: changed_properties(&old.properties, &new.properties),
    };
    (!change.is_unchanged()).then_some(change)
}

/// Keys set on one side only, or set on both with different values. Old
/// order first, then keys only the new map sets.
fn changed_properties(old: &PropertyMap, new: &PropertyMap) -> Vec<PropertyKey> {
    let mut keys: Vec<PropertyKey> = old
        .iter()
        .filter(|(key, value)| !new.get(*key).is_some_and(|v| v.bitwise_eq(value)))
        .map(|(key, _)| key)
        .collect();
    keys.extend(new.keys().filter(|key| old.get(*key).is_none()));
    keys
}
