//! The component tree: an arena of nodes plus a derived parent index.
//!
//! Children are stored as ordered lists of [`NodeIndex`] slots. Parent links
//! are never stored on nodes; they live in a [`TreeIndex`] that is rebuilt by
//! [`ComponentTree::reindex`] and kept up to date by the builder methods.
//! Mutating child lists through [`ComponentTree::node_mut`] leaves the index
//! stale until the next `reindex`.

use crate::arena::Arena;
use crate::error::TreeError;
use crate::ids::{ComponentId, NodeIndex};
use crate::kind::ComponentKind;
use crate::property::{PropertyKey, PropertyMap, PropertyValue};
use std::collections::HashMap;

/// A single UI component.
#[derive(Clone, PartialEq, Debug)]
pub struct ComponentNode {
    /// Stable compiler-assigned id.
    pub id: ComponentId,
    /// Component type.
    pub kind: ComponentKind,
    /// Style and content properties.
    pub properties: PropertyMap,
    /// Text content, if any.
    pub text: Option<String>,
    /// Ordered child slots.
    pub children: Vec<NodeIndex>,
}

impl ComponentNode {
    /// Creates a node with no properties, text or children.
    pub fn new(id: ComponentId, kind: ComponentKind) -> Self {
        Self {
            id,
            kind,
            properties: PropertyMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets a property.
    pub fn with_property(mut self, key: PropertyKey, value: PropertyValue) -> Self {
        self.properties.insert(key, value);
        self
    }
}

/// Derived lookup tables for a [`ComponentTree`].
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TreeIndex {
    parents: Vec<Option<NodeIndex>>,
    by_id: HashMap<ComponentId, NodeIndex>,
}

impl TreeIndex {
    /// Returns the recorded parent of `slot`.
    pub fn parent(&self, slot: NodeIndex) -> Option<NodeIndex> {
        self.parents.get(slot.as_raw() as usize).copied().flatten()
    }

    /// Returns the slot recorded for `id`.
    pub fn slot_of(&self, id: ComponentId) -> Option<NodeIndex> {
        self.by_id.get(&id).copied()
    }

    /// Returns the parent table, one entry per arena slot.
    pub fn parents(&self) -> &[Option<NodeIndex>] {
        &self.parents
    }
}

/// An arena of [`ComponentNode`]s with an optional root.
#[derive(Clone, Debug, Default)]
pub struct ComponentTree {
    nodes: Arena<NodeIndex, ComponentNode>,
    root: Option<NodeIndex>,
    index: TreeIndex,
}

impl PartialEq for ComponentTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.nodes == other.nodes
    }
}

impl ComponentTree {
    /// Creates an empty tree with no root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `node` as the root and returns its slot.
    ///
    /// A previous root, if any, stays in the arena but becomes unreachable.
    pub fn set_root(&mut self, node: ComponentNode) -> NodeIndex {
        let slot = self.alloc(node);
        self.root = Some(slot);
        slot
    }

    /// Points the root at an existing slot, or clears it.
    pub fn set_root_slot(&mut self, slot: Option<NodeIndex>) {
        self.root = slot;
    }

    /// Allocates a detached node and returns its slot.
    pub fn alloc(&mut self, node: ComponentNode) -> NodeIndex {
        let id = node.id;
        let slot = self.nodes.alloc(node);
        self.index.parents.push(None);
        self.index.by_id.entry(id).or_insert(slot);
        slot
    }

    /// Allocates `node` and appends it to `parent`'s children.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        node: ComponentNode,
    ) -> Result<NodeIndex, TreeError> {
        if !self.nodes.contains(parent) {
            return Err(TreeError::UnknownSlot(parent));
        }
        let slot = self.alloc(node);
        self.attach(parent, slot)?;
        Ok(slot)
    }

    /// Appends an existing slot to `parent`'s children.
    ///
    /// No shape checks are made: attaching a node twice or under its own
    /// descendant produces a tree the structure validator rejects.
    pub fn attach(&mut self, parent: NodeIndex, child: NodeIndex) -> Result<(), TreeError> {
        let node = self
            .nodes
            .get_mut(parent)
            .ok_or(TreeError::UnknownSlot(parent))?;
        node.children.push(child);
        if let Some(entry) = self.index.parents.get_mut(child.as_raw() as usize) {
            if entry.is_none() {
                *entry = Some(parent);
            }
        }
        Ok(())
    }

    /// Returns the root slot.
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Returns the root node.
    pub fn root_node(&self) -> Option<&ComponentNode> {
        self.root.and_then(|slot| self.nodes.get(slot))
    }

    /// Returns the node at `slot`.
    pub fn node(&self, slot: NodeIndex) -> Option<&ComponentNode> {
        self.nodes.get(slot)
    }

    /// Returns the node at `slot` mutably. Changing its `id` or `children`
    /// leaves the index stale until [`reindex`](Self::reindex).
    pub fn node_mut(&mut self, slot: NodeIndex) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(slot)
    }

    /// Finds the slot of the component with `id`, preferring a reachable one.
    pub fn find(&self, id: ComponentId) -> Option<NodeIndex> {
        self.index.slot_of(id)
    }

    /// Returns the parent slot recorded in the index.
    pub fn parent(&self, slot: NodeIndex) -> Option<NodeIndex> {
        self.index.parent(slot)
    }

    /// Returns the child slots of `slot`, empty if it does not exist.
    pub fn children(&self, slot: NodeIndex) -> &[NodeIndex] {
        self.nodes
            .get(slot)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every arena slot in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &ComponentNode)> {
        self.nodes.iter()
    }

    /// Pre-order traversal from the root. Each slot is visited at most once
    /// and dangling slots are skipped, so cycles terminate.
    pub fn preorder(&self) -> Vec<NodeIndex> {
        self.preorder_with_depth()
            .into_iter()
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Like [`preorder`](Self::preorder), paired with each node's depth
    /// (the root has depth 1).
    pub fn preorder_with_depth(&self) -> Vec<(NodeIndex, usize)> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![(root, 1usize)];
        while let Some((slot, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(slot) else {
                continue;
            };
            let seen = &mut visited[slot.as_raw() as usize];
            if *seen {
                continue;
            }
            *seen = true;
            out.push((slot, depth));
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Depth of `slot` following recorded parents (root = 1), or `None` if
    /// the chain does not reach a parentless node within `len()` steps.
    pub fn depth_of(&self, slot: NodeIndex) -> Option<usize> {
        if !self.nodes.contains(slot) {
            return None;
        }
        let mut depth = 1;
        let mut current = slot;
        while let Some(parent) = self.index.parent(current) {
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
            current = parent;
        }
        Some(depth)
    }

    /// The index as currently recorded.
    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    /// Builds a fresh index from the current child lists without storing it.
    ///
    /// A slot listed under several parents records the first one in arena
    /// order. Ids resolve to reachable slots first, then to the lowest
    /// unreachable slot.
    pub fn compute_index(&self) -> TreeIndex {
        let mut parents = vec![None; self.nodes.len()];
        for (slot, node) in self.nodes.iter() {
            for &child in &node.children {
                if let Some(entry) = parents.get_mut(child.as_raw() as usize) {
                    if entry.is_none() {
                        *entry = Some(slot);
                    }
                }
            }
        }
        let mut by_id = HashMap::with_capacity(self.nodes.len());
        for slot in self.preorder() {
            if let Some(node) = self.nodes.get(slot) {
                by_id.entry(node.id).or_insert(slot);
            }
        }
        for (slot, node) in self.nodes.iter() {
            by_id.entry(node.id).or_insert(slot);
        }
        TreeIndex { parents, by_id }
    }

    /// Rebuilds the derived index.
    pub fn reindex(&mut self) {
        self.index = self.compute_index();
    }
}
