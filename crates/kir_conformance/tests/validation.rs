//! The acceptance gate over realistic and deliberately broken documents.

use kir_conformance::{bindings_document, write_document};
use kir_diagnostics::Category;
use kir_ir::{
    BindingKind, ComponentId, ComponentKind, ComponentNode, ComponentTree, Document,
    PropertyKey, PropertyValue, ReactiveManifest, ReactiveValue, VarType,
};
use kir_validate::{load, load_file, LoadError, ValidationOptions};

fn encode(doc: &Document) -> Vec<u8> {
    kir_codec::encode_document(doc).unwrap()
}

fn with_text_property(key: PropertyKey, value: PropertyValue) -> Document {
    let mut tree = ComponentTree::new();
    let root = tree.set_root(ComponentNode::new(
        ComponentId::from_raw(1),
        ComponentKind::Row,
    ));
    tree.add_child(
        root,
        ComponentNode::new(ComponentId::from_raw(2), ComponentKind::Text)
            .with_text("x")
            .with_property(key, value),
    )
    .unwrap();
    Document::new(tree, ReactiveManifest::new())
}

#[test]
fn bindings_document_is_accepted_cleanly() {
    let loaded = load(&encode(&bindings_document()), &ValidationOptions::default()).unwrap();
    assert_eq!(loaded.document, bindings_document());
    assert_eq!(loaded.report.fatal_count(), 0);
    assert_eq!(loaded.report.advisory_count(), 0);
}

#[test]
fn out_of_range_value_fails_semantic_tier() {
    let doc = with_text_property(PropertyKey::Opacity, PropertyValue::Float(2.0));
    let err = load(&encode(&doc), &ValidationOptions::default()).unwrap_err();
    let report = match err {
        LoadError::Semantic(report) => report,
        other => panic!("expected semantic rejection, got {other}"),
    };
    assert!(report.has_fatal_in(Category::Semantic));
    assert!(!report.has_fatal_in(Category::Structure));
}

#[test]
fn permissive_profile_skips_semantic_tier() {
    let doc = with_text_property(PropertyKey::Opacity, PropertyValue::Float(2.0));
    assert!(load(&encode(&doc), &ValidationOptions::permissive()).is_ok());
}

#[test]
fn dangling_binding_fails_structure_tier() {
    let doc = bindings_document();
    let (tree, mut manifest) = doc.into_parts();
    let var = manifest
        .add_variable("orphan", VarType::Bool, ReactiveValue::Bool(true))
        .unwrap();
    manifest
        .add_binding(ComponentId::from_raw(404), var, BindingKind::Conditional, "orphan")
        .unwrap();

    let err = load(&encode(&Document::new(tree, manifest)), &ValidationOptions::default())
        .unwrap_err();
    assert!(matches!(err, LoadError::Structure(_)), "{err}");
}

#[test]
fn duplicate_component_ids_fail_structure_tier() {
    let mut tree = ComponentTree::new();
    let root = tree.set_root(ComponentNode::new(
        ComponentId::from_raw(1),
        ComponentKind::Column,
    ));
    for _ in 0..2 {
        tree.add_child(
            root,
            ComponentNode::new(ComponentId::from_raw(5), ComponentKind::Span),
        )
        .unwrap();
    }
    let err = load(
        &encode(&Document::new(tree, ReactiveManifest::new())),
        &ValidationOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Structure(_)));
}

#[test]
fn corrupt_manifest_is_advisory_by_default_and_fatal_when_strict() {
    let mut bytes = encode(&bindings_document());
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    let loaded = load(&bytes, &ValidationOptions::default()).unwrap();
    assert!(loaded.document.manifest().is_empty());
    assert!(loaded.report.advisory_count() > 0);
    assert_eq!(loaded.document.tree(), bindings_document().tree());

    assert!(matches!(
        load(&bytes, &ValidationOptions::strict()),
        Err(LoadError::Format(_))
    ));
}

#[test]
fn every_tier_reports_into_one_gate() {
    let mut bytes = encode(&bindings_document());
    bytes[0] = b'X';
    let err = load(&bytes, &ValidationOptions::default()).unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.first_failing_tier(), Some(Category::Format));
    assert!(!report.is_accepted());
}

#[test]
fn load_file_distinguishes_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "ok.kir", &bindings_document());
    assert!(load_file(&path, &ValidationOptions::default()).is_ok());

    let err = load_file(&dir.path().join("missing.kir"), &ValidationOptions::default())
        .unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.report().is_none());
    assert_eq!(
        err.into_report().first_failing_tier(),
        Some(Category::Io)
    );
}
