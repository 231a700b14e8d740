//! Pairing of old and new components.

use kir_ir::{ComponentId, ComponentTree, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;

/// How a pair was established.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Same component id in both trees.
    Id,
    /// Same kind at the same child index under a matched parent.
    Positional,
}

/// An old slot paired with a new slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeMatch {
    /// Slot in the old tree.
    pub old: NodeIndex,
    /// Slot in the new tree.
    pub new: NodeIndex,
    /// How the pair was found.
    pub by: MatchKind,
}

/// The result of [`match_trees`]. Only components reachable from each root
/// take part.
#[derive(Clone, Debug, Default)]
pub struct Matching {
    pairs: Vec<NodeMatch>,
    unmatched_old: Vec<NodeIndex>,
    unmatched_new: Vec<NodeIndex>,
    old_count: usize,
    new_count: usize,
}

impl Matching {
    /// Matched pairs in new-tree pre-order.
    pub fn pairs(&self) -> &[NodeMatch] {
        &self.pairs
    }

    /// Old slots without a counterpart, in old-tree pre-order.
    pub fn unmatched_old(&self) -> &[NodeIndex] {
        &self.unmatched_old
    }

    /// New slots without a counterpart, in new-tree pre-order.
    pub fn unmatched_new(&self) -> &[NodeIndex] {
        &self.unmatched_new
    }

    /// The new slot paired with `old`.
    pub fn new_for(&self, old: NodeIndex) -> Option<NodeIndex> {
        self.pairs.iter().find(|p| p.old == old).map(|p| p.new)
    }

    /// Reachable components in the old tree.
    pub fn old_count(&self) -> usize {
        self.old_count
    }

    /// Reachable components in the new tree.
    pub fn new_count(&self) -> usize {
        self.new_count
    }
}

/// Pairs components of `old` and `new`: by id, then by position and kind.
pub fn match_trees(old: &ComponentTree, new: &ComponentTree) -> Matching {
    let old_order = old.preorder();
    let new_order = new.preorder();

    let mut old_by_id: HashMap<ComponentId, NodeIndex> = HashMap::with_capacity(old_order.len());
    for &slot in &old_order {
        if let Some(node) = old.node(slot) {
            old_by_id.entry(node.id).or_insert(slot);
        }
    }

    // new slot -> (old slot, kind)
    let mut to_old: HashMap<NodeIndex, (NodeIndex, MatchKind)> = HashMap::new();
    let mut old_taken: HashMap<NodeIndex, NodeIndex> = HashMap::new();

    for &slot in &new_order {
        let Some(node) = new.node(slot) else { continue };
        if let Some(&old_slot) = old_by_id.get(&node.id) {
            if !old_taken.contains_key(&old_slot) {
                old_taken.insert(old_slot, slot);
                to_old.insert(slot, (old_slot, MatchKind::Id));
            }
        }
    }

    let same_kind = |o: NodeIndex, n: NodeIndex| match (old.node(o), new.node(n)) {
        (Some(a), Some(b)) => a.kind == b.kind,
        _ => false,
    };

    if let (Some(old_root), Some(new_root)) = (old.root(), new.root()) {
        if !to_old.contains_key(&new_root)
            && !old_taken.contains_key(&old_root)
            && same_kind(old_root, new_root)
        {
            old_taken.insert(old_root, new_root);
            to_old.insert(new_root, (old_root, MatchKind::Positional));
        }
    }

    // Pre-order visits a parent before its children, so a child whose parent
    // was itself matched by position is still considered.
    for &slot in &new_order {
        let Some(&(old_parent, _)) = to_old.get(&slot) else { continue };
        let old_children = old.children(old_parent);
        for (i, &child) in new.children(slot).iter().enumerate() {
            if to_old.contains_key(&child) {
                continue;
            }
            let Some(&candidate) = old_children.get(i) else { continue };
            if !old_taken.contains_key(&candidate) && same_kind(candidate, child) {
                old_taken.insert(candidate, child);
                to_old.insert(child, (candidate, MatchKind::Positional));
            }
        }
    }

    let mut matching = Matching {
        old_count: old_order.len(),
        new_count: new_order.len(),
        ..Matching::default()
    };
    for &slot in &new_order {
        match to_old.get(&slot) {
            Some(&(old_slot, by)) => matching.pairs.push(NodeMatch {
                old: old_slot,
                new: slot,
                by,
            }),
            None => matching.unmatched_new.push(slot),
        }
    }
    matching.unmatched_old = old_order
        .into_iter()
        .filter(|slot| !old_taken.contains_key(slot))
        .collect();
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use kir_ir::{ComponentKind, ComponentNode};

    fn node(id: u32, kind: ComponentKind) -> ComponentNode {
        ComponentNode::new(ComponentId::from_raw(id), kind)
    }

    fn row_of(ids: &[(u32, ComponentKind)]) -> ComponentTree {
        let mut tree = ComponentTree::new();
        let root = tree.set_root(node(1, ComponentKind::Row));
        for &(id, kind) in ids {
            tree.add_child(root, node(id, kind)).unwrap();
        }
        tree
    }

    #[test]
    fn id_matches_win_over_position() {
        let old = row_of(&[(2, ComponentKind::Text), (3, ComponentKind::Text)]);
        let new = row_of(&[(3, ComponentKind::Text), (2, ComponentKind::Text)]);
        let m = match_trees(&old, &new);
        assert_eq!(m.pairs().len(), 3);
        assert!(m.pairs().iter().all(|p| p.by == MatchKind::Id));
        let old_two = old.find(ComponentId::from_raw(2)).unwrap();
        assert_eq!(m.new_for(old_two), new.find(ComponentId::from_raw(2)));
    }

    #[test]
    fn positional_fallback_requires_same_kind() {
        let old = row_of(&[(2, ComponentKind::Text), (3, ComponentKind::Button)]);
        let new = row_of(&[(9, ComponentKind::Text), (10, ComponentKind::Image)]);
        let m = match_trees(&old, &new);
        let positional: Vec<_> = m
            .pairs()
            .iter()
            .filter(|p| p.by == MatchKind::Positional)
            .collect();
        assert_eq!(positional.len(), 1);
        assert_eq!(m.unmatched_new(), &[new.find(ComponentId::from_raw(10)).unwrap()]);
        assert_eq!(m.unmatched_old(), &[old.find(ComponentId::from_raw(3)).unwrap()]);
    }

    #[test]
    fn positional_match_reaches_grandchildren() {
        let mut old = ComponentTree::new();
        let root = old.set_root(node(1, ComponentKind::Column));
        let list = old.add_child(root, node(2, ComponentKind::List)).unwrap();
        old.add_child(list, node(3, ComponentKind::ListItem)).unwrap();

        let mut new = ComponentTree::new();
        let root = new.set_root(node(100, ComponentKind::Column));
        let list = new.add_child(root, node(200, ComponentKind::List)).unwrap();
        new.add_child(list, node(300, ComponentKind::ListItem)).unwrap();

        let m = match_trees(&old, &new);
        assert_eq!(m.pairs().len(), 3);
        assert!(m.unmatched_new().is_empty() && m.unmatched_old().is_empty());
    }

    #[test]
    fn empty_trees() {
        let m = match_trees(&ComponentTree::new(), &ComponentTree::new());
        assert!(m.pairs().is_empty());
        assert_eq!((m.old_count(), m.new_count()), (0, 0));
    }
}
