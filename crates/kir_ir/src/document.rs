//! The document: a component tree paired with its reactive manifest.

use crate::manifest::ReactiveManifest;
use crate::tree::ComponentTree;
use std::sync::Arc;

/// An immutable tree + manifest pair.
///
/// There is no in-place mutation API; producing a changed document means
/// building a new one, e.g. with [`with_manifest`](Self::with_manifest).
/// The tree is reference counted, so documents that differ only in their
/// manifest share it.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Document {
    tree: Arc<ComponentTree>,
    manifest: ReactiveManifest,
}

impl Document {
    /// Pairs a tree with a manifest.
    pub fn new(tree: ComponentTree, manifest: ReactiveManifest) -> Self {
        Self::from_shared(Arc::new(tree), manifest)
    }

    /// Pairs an already shared tree with a manifest.
    pub fn from_shared(tree: Arc<ComponentTree>, manifest: ReactiveManifest) -> Self {
        Self { tree, manifest }
    }

    /// The component tree.
    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// The shared handle to the component tree.
    pub fn shared_tree(&self) -> &Arc<ComponentTree> {
        &self.tree
    }

    /// The reactive manifest.
    pub fn manifest(&self) -> &ReactiveManifest {
        &self.manifest
    }

    /// Consumes the document and returns one with `manifest` in place of the old one.
    pub fn with_manifest(self, manifest: ReactiveManifest) -> Self {
        Self {
            tree: self.tree,
            manifest,
        }
    }

    /// Splits the document into its parts. The tree is cloned only if it is
    /// still shared.
    pub fn into_parts(self) -> (ComponentTree, ReactiveManifest) {
        (Arc::unwrap_or_clone(self.tree), self.manifest)
    }

    /// Splits the document without touching the tree.
    pub fn into_shared_parts(self) -> (Arc<ComponentTree>, ReactiveManifest) {
        (self.tree, self.manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ComponentId;
    use crate::kind::ComponentKind;
    use crate::manifest::{ReactiveValue, VarType};
    use crate::tree::ComponentNode;

    #[test]
    fn with_manifest_replaces_only_manifest() {
        let mut tree = ComponentTree::new();
        tree.set_root(ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Container));
        let doc = Document::new(tree.clone(), ReactiveManifest::new());

        let mut manifest = ReactiveManifest::new();
        manifest
            .add_variable("count", VarType::Int, ReactiveValue::Int(3))
            .unwrap();
        let doc = doc.with_manifest(manifest.clone());
        assert_eq!(doc.tree(), &tree);
        assert_eq!(doc.manifest(), &manifest);

        let (t, m) = doc.into_parts();
        assert_eq!(t, tree);
        assert_eq!(m, manifest);
    }

    #[test]
    fn clones_share_the_tree() {
        let mut tree = ComponentTree::new();
        tree.set_root(ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Text));
        let doc = Document::new(tree, ReactiveManifest::new());
        let copy = doc.clone().with_manifest(ReactiveManifest::new());
        assert!(Arc::ptr_eq(doc.shared_tree(), copy.shared_tree()));

        let (shared, _) = copy.into_shared_parts();
        let rebuilt = Document::from_shared(shared, ReactiveManifest::new());
        assert!(Arc::ptr_eq(doc.shared_tree(), rebuilt.shared_tree()));
    }
}
