//! Conformance test helpers for the KIR workspace.
//!
//! Provides the hand-built documents the integration tests share, a seeded
//! random document generator for round-trip properties, and a tiny
//! "compiler" that turns a comma-separated label list into a document so the
//! cache and hot-reload paths can be driven without a real front end.

#![warn(missing_docs)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kir_cache::CompileOptions;
use kir_ir::{
    BindingKind, ComponentId, ComponentKind, ComponentNode, ComponentTree, DimensionUnit,
    Document, NodeIndex, PropertyKey, PropertyMap, PropertyValue, ReactiveManifest,
    ReactiveValue, ValueKind, VarType,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Container / Text "Hello" / Button "OK", with a string variable `message`
/// bound to the text component by a text binding.
pub fn bindings_document() -> Document {
    let mut tree = ComponentTree::new();
    let root = tree.set_root(ComponentNode::new(
        ComponentId::from_raw(1),
        ComponentKind::Container,
    ));
    tree.add_child(
        root,
        ComponentNode::new(ComponentId::from_raw(2), ComponentKind::Text)
            .with_text("Hello")
            .with_property(PropertyKey::FontSize, PropertyValue::Float(16.0)),
    )
    .expect("root slot exists");
    tree.add_child(
        root,
        ComponentNode::new(ComponentId::from_raw(3), ComponentKind::Button)
            .with_text("OK")
            .with_property(PropertyKey::Padding, PropertyValue::px(8.0)),
    )
    .expect("root slot exists");

    let mut manifest = ReactiveManifest::new();
    let message = manifest
        .add_variable("message", VarType::Str, ReactiveValue::Str("Hello".into()))
        .expect("fresh manifest");
    manifest
        .add_binding(ComponentId::from_raw(2), message, BindingKind::Text, "message")
        .expect("variable exists");
    Document::new(tree, manifest)
}

/// Compiles a comma-separated list of labels into a column of text
/// components, ids assigned from 2 in order, plus an int variable `count`
/// (initially 0) bound to every text.
///
/// A label of the form `id=label` fixes the component id. An empty or
/// whitespace-only source is a compile error.
pub fn compile_labels(source: &[u8], _options: &CompileOptions) -> Result<Document, String> {
    let text = std::str::from_utf8(source).map_err(|e| e.to_string())?;
    if text.trim().is_empty() {
        return Err("empty source".to_string());
    }

    let mut tree = ComponentTree::new();
    let root = tree.set_root(ComponentNode::new(
        ComponentId::from_raw(1),
        ComponentKind::Column,
    ));
    let mut manifest = ReactiveManifest::new();
    let count = manifest
        .add_variable("count", VarType::Int, ReactiveValue::Int(0))
        .map_err(|e| e.to_string())?;

    for (i, raw) in text.split(',').map(str::trim).enumerate() {
        let (id, label) = match raw.split_once('=') {
            Some((id, label)) => (
                id.trim().parse::<u32>().map_err(|e| format!("bad id in {raw:?}: {e}"))?,
                label.trim(),
            ),
            None => (i as u32 + 2, raw),
        };
        let id = ComponentId::from_raw(id);
        tree.add_child(
            root,
            ComponentNode::new(id, ComponentKind::Text).with_text(label),
        )
        .map_err(|e| e.to_string())?;
        manifest
            .add_binding(id, count, BindingKind::Text, "count")
            .map_err(|e| e.to_string())?;
    }
    Ok(Document::new(tree, manifest))
}

/// Encodes `document` into `dir/name` and returns the path.
pub fn write_document(dir: &Path, name: &str, document: &Document) -> PathBuf {
    let path = dir.join(name);
    let bytes = kir_codec::encode_document(document).expect("fixture encodes");
    std::fs::write(&path, bytes).expect("fixture is writable");
    path
}

/// Bounds for [`random_document`].
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    /// Most components in the tree.
    pub max_nodes: usize,
    /// Deepest tree level (the root is depth 1).
    pub max_depth: usize,
    /// Most children per component.
    pub max_children: usize,
    /// Most properties per component.
    pub max_properties: usize,
    /// Most reactive variables.
    pub max_variables: usize,
    /// Most bindings.
    pub max_bindings: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: 60,
            max_depth: 6,
            max_children: 5,
            max_properties: 6,
            max_variables: 8,
            max_bindings: 12,
        }
    }
}

const STRING_ALPHABET: &[char] = &['a', 'Z', '0', ' ', '-', '_', '\u{e9}', '\u{2713}', '\u{6f22}'];

/// Generates a document with known kinds, typed properties, unique ids and a
/// manifest whose bindings point at components in the tree.
///
/// Every value is finite, so the result compares equal to its own decoded
/// round trip.
pub fn random_document<R: Rng>(rng: &mut R, limits: &Limits) -> Document {
    let mut tree = ComponentTree::new();
    let mut ids = Vec::new();
    let mut used = HashSet::new();

    let root_id = fresh_id(rng, &mut used);
    ids.push(root_id);
    let root = tree.set_root(random_node(rng, root_id, limits.max_properties));
    let mut budget = rng.gen_range(0..limits.max_nodes.max(1));
    grow(rng, limits, &mut tree, root, 1, &mut budget, &mut ids, &mut used);

    let mut manifest = ReactiveManifest::new();
    let mut variables = Vec::new();
    for i in 0..rng.gen_range(0..=limits.max_variables) {
        let value = random_reactive_value(rng);
        let id = manifest
            .add_variable(&format!("var_{i}"), value.var_type(), value)
            .expect("names are unique");
        variables.push(id);
    }
    if !variables.is_empty() {
        for _ in 0..rng.gen_range(0..=limits.max_bindings) {
            let component = *ids.choose(rng).expect("tree has a root");
            let variable = *variables.choose(rng).expect("checked non-empty");
            let kind = *[
                BindingKind::Text,
                BindingKind::Conditional,
                BindingKind::Attribute,
                BindingKind::ForEach,
                BindingKind::Custom,
            ]
            .choose(rng)
            .expect("non-empty");
            let expression = random_string(rng, 12);
            manifest
                .add_binding(component, variable, kind, &expression)
                .expect("variable exists");
        }
    }
    Document::new(tree, manifest)
}

#[allow(clippy::too_many_arguments)]
fn grow<R: Rng>(
    rng: &mut R,
    limits: &Limits,
    tree: &mut ComponentTree,
    parent: NodeIndex,
    depth: usize,
    budget: &mut usize,
    ids: &mut Vec<ComponentId>,
    used: &mut HashSet<u32>,
) {
    if depth >= limits.max_depth {
        return;
    }
    let children = rng.gen_range(0..=limits.max_children);
    for _ in 0..children {
        if *budget == 0 {
            return;
        }
        *budget -= 1;
        let id = fresh_id(rng, used);
        ids.push(id);
        let slot = tree
            .add_child(parent, random_node(rng, id, limits.max_properties))
            .expect("parent slot exists");
        grow(rng, limits, tree, slot, depth + 1, budget, ids, used);
    }
}

fn fresh_id<R: Rng>(rng: &mut R, used: &mut HashSet<u32>) -> ComponentId {
    loop {
        let raw = rng.gen_range(1..1_000_000);
        if used.insert(raw) {
            return ComponentId::from_raw(raw);
        }
    }
}

fn random_node<R: Rng>(rng: &mut R, id: ComponentId, max_properties: usize) -> ComponentNode {
    let kind = ComponentKind::from_tag(rng.gen_range(0..=27));
    let mut node = ComponentNode::new(id, kind);
    node.properties = random_properties(rng, max_properties, true);
    if rng.gen_bool(0.4) {
        node.text = Some(random_string(rng, 24));
    }
    node
}

fn random_properties<R: Rng>(rng: &mut R, max: usize, allow_blocks: bool) -> PropertyMap {
    let mut map = PropertyMap::new();
    for _ in 0..rng.gen_range(0..=max) {
        let key = *PropertyKey::ALL.choose(rng).expect("keys are defined");
        if key.value_kind() == ValueKind::Block && !allow_blocks {
            continue;
        }
        let value = random_property_value(rng, key);
        map.insert(key, value);
    }
    map
}

fn random_property_value<R: Rng>(rng: &mut R, key: PropertyKey) -> PropertyValue {
    match key.value_kind() {
        ValueKind::Bool => PropertyValue::Bool(rng.gen()),
        ValueKind::Int => PropertyValue::Int(rng.gen_range(-10_000..10_000)),
        ValueKind::Float => PropertyValue::Float(rng.gen_range(-1000.0..1000.0)),
        ValueKind::Str => PropertyValue::Str(random_string(rng, 16)),
        ValueKind::Color => PropertyValue::Color(rng.gen()),
        ValueKind::Dimension => PropertyValue::dimension(
            DimensionUnit::from_tag(rng.gen_range(0..8)),
            rng.gen_range(-500.0f32..500.0),
        ),
        ValueKind::Enum => PropertyValue::Enum(rng.gen_range(0..key.enum_domain().unwrap_or(1))),
        ValueKind::Block => PropertyValue::Block(random_properties(rng, 3, false)),
    }
}

fn random_reactive_value<R: Rng>(rng: &mut R) -> ReactiveValue {
    match rng.gen_range(0..5) {
        0 => ReactiveValue::Int(rng.gen()),
        1 => ReactiveValue::Float(rng.gen_range(-1e6..1e6)),
        2 => ReactiveValue::Str(random_string(rng, 20)),
        3 => ReactiveValue::Bool(rng.gen()),
        _ => ReactiveValue::Custom(format!("{{\"n\":{}}}", rng.gen::<u16>())),
    }
}

fn random_string<R: Rng>(rng: &mut R, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| *STRING_ALPHABET.choose(rng).expect("alphabet is non-empty"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_documents_respect_limits() {
        let limits = Limits::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let doc = random_document(&mut rng, &limits);
            assert!(doc.tree().len() <= limits.max_nodes);
            let depth = doc
                .tree()
                .preorder_with_depth()
                .iter()
                .map(|&(_, d)| d)
                .max()
                .unwrap();
            assert!(depth <= limits.max_depth);
            assert!(doc.manifest().variables().len() <= limits.max_variables);
        }
    }

    #[test]
    fn same_seed_same_document() {
        let limits = Limits::default();
        let a = random_document(&mut StdRng::seed_from_u64(42), &limits);
        let b = random_document(&mut StdRng::seed_from_u64(42), &limits);
        assert_eq!(a, b);
    }

    #[test]
    fn compile_labels_assigns_ids_in_order() {
        let doc = compile_labels(b"a, b", &CompileOptions::new()).unwrap();
        let tree = doc.tree();
        assert_eq!(tree.len(), 3);
        assert!(tree.find(ComponentId::from_raw(3)).is_some());
        assert_eq!(doc.manifest().bindings().len(), 2);
    }

    #[test]
    fn compile_labels_explicit_ids() {
        let doc = compile_labels(b"10=x", &CompileOptions::new()).unwrap();
        let slot = doc.tree().find(ComponentId::from_raw(10)).unwrap();
        assert_eq!(doc.tree().node(slot).unwrap().text.as_deref(), Some("x"));
    }

    #[test]
    fn compile_labels_rejects_empty_source() {
        assert!(compile_labels(b"  ", &CompileOptions::new()).is_err());
    }
}
