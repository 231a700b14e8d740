//! Documents shared by the command tests.

use std::path::{Path, PathBuf};

use kir_ir::{
    BindingKind, ComponentId, ComponentKind, ComponentNode, ComponentTree, Document,
    ReactiveManifest, ReactiveValue, VarType,
};

/// Container with a "Hello" text bound to `greeting` and an "OK" button.
pub fn sample_document() -> Document {
    sample_with_greeting("Hello")
}

/// The sample document with a different label on the text component.
pub fn sample_with_greeting(greeting: &str) -> Document {
    let mut tree = ComponentTree::new();
    let root = tree.set_root(ComponentNode::new(
        ComponentId::from_raw(1),
        ComponentKind::Container,
    ));
    tree.add_child(
        root,
        ComponentNode::new(ComponentId::from_raw(2), ComponentKind::Text).with_text(greeting),
    )
    .unwrap();
    tree.add_child(
        root,
        ComponentNode::new(ComponentId::from_raw(3), ComponentKind::Button).with_text("OK"),
    )
    .unwrap();

    let mut manifest = ReactiveManifest::new();
    let var = manifest
        .add_variable("greeting", VarType::Str, ReactiveValue::Str("Hello".into()))
        .unwrap();
    manifest
        .add_binding(ComponentId::from_raw(2), var, BindingKind::Text, "greeting")
        .unwrap();
    Document::new(tree, manifest)
}

/// Encodes `document` into `dir/name`.
pub fn write_document(dir: &Path, name: &str, document: &Document) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, kir_codec::encode_document(document).unwrap()).unwrap();
    path
}
