//! Manifest registration rules, diff identity and state reconciliation
//! across recompiles.

use kir_cache::CompileOptions;
use kir_conformance::{bindings_document, compile_labels, random_document, Limits};
use kir_diff::{diff, reconcile, MatchKind};
use kir_ir::{ComponentId, ManifestError, ReactiveManifest, ReactiveValue, VarType};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn registration_is_idempotent() {
    let mut manifest = ReactiveManifest::new();
    let first = manifest
        .add_variable("count", VarType::Int, ReactiveValue::Int(1))
        .unwrap();
    let version = manifest.version();

    let second = manifest
        .add_variable("count", VarType::Int, ReactiveValue::Int(99))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(manifest.version(), version);
    assert_eq!(manifest.variables().len(), 1);
    assert_eq!(
        manifest.find_variable("count").unwrap().value,
        ReactiveValue::Int(1)
    );
}

#[test]
fn conflicting_registration_is_rejected() {
    let mut manifest = ReactiveManifest::new();
    manifest
        .add_variable("count", VarType::Int, ReactiveValue::Int(1))
        .unwrap();
    let err = manifest
        .add_variable("count", VarType::Str, ReactiveValue::Str("1".into()))
        .unwrap_err();
    assert!(matches!(err, ManifestError::ConflictingType { .. }));
}

#[test]
fn diff_of_document_with_itself_is_empty() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..50 {
        let doc = random_document(&mut rng, &Limits::default());
        let changes = diff(&doc, &doc);
        assert!(changes.is_empty(), "{changes}");
    }
}

#[test]
fn diff_survives_codec_round_trip() {
    let doc = bindings_document();
    let decoded = kir_codec::decode(&kir_codec::encode_document(&doc).unwrap())
        .unwrap()
        .document;
    assert!(diff(&doc, &decoded).is_empty());
}

#[test]
fn count_survives_structurally_different_recompile() {
    let options = CompileOptions::new();
    let old = compile_labels(b"a, b", &options).unwrap();
    let count = old.manifest().find_variable("count").unwrap().id;
    let (tree, mut manifest) = old.into_parts();
    manifest.set_value(count, ReactiveValue::Int(3)).unwrap();
    let old = kir_ir::Document::new(tree, manifest);

    // A new component in front shifts every positional id.
    let new = compile_labels(b"10=header, a, b, c", &options).unwrap();
    let changes = diff(&old, &new);
    assert!(!changes.is_empty());
    assert_eq!(changes.component_count_delta, 2);

    let reconciled = reconcile(old.manifest(), new.manifest());
    assert_eq!(reconciled.report.restored, vec!["count".to_string()]);
    assert_eq!(
        reconciled.manifest.find_variable("count").unwrap().value,
        ReactiveValue::Int(3)
    );
    assert!(reconciled.manifest.version() > new.manifest().version());
}

#[test]
fn type_change_keeps_new_initial_value() {
    let mut old = ReactiveManifest::new();
    old.add_variable("flag", VarType::Int, ReactiveValue::Int(5))
        .unwrap();
    let mut new = ReactiveManifest::new();
    new.add_variable("flag", VarType::Bool, ReactiveValue::Bool(false))
        .unwrap();
    new.add_variable("fresh", VarType::Int, ReactiveValue::Int(0))
        .unwrap();

    let reconciled = reconcile(&old, &new);
    assert_eq!(reconciled.report.type_changed, vec!["flag".to_string()]);
    assert_eq!(reconciled.report.fresh, vec!["fresh".to_string()]);
    assert_eq!(
        reconciled.manifest.find_variable("flag").unwrap().value,
        ReactiveValue::Bool(false)
    );
}

#[test]
fn components_match_by_id_before_position() {
    let options = CompileOptions::new();
    let old = compile_labels(b"2=a, 3=b", &options).unwrap();
    let new = compile_labels(b"3=b, 2=a", &options).unwrap();

    let changes = diff(&old, &new);
    assert!(changes.added.is_empty());
    assert!(changes.removed.is_empty());
    assert!(changes
        .components
        .iter()
        .all(|c| c.matched_by == MatchKind::Id && !c.id_changed()));
}

#[test]
fn renumbered_component_matches_by_position() {
    let options = CompileOptions::new();
    let old = compile_labels(b"2=a", &options).unwrap();
    let new = compile_labels(b"7=a", &options).unwrap();

    let changes = diff(&old, &new);
    assert!(changes.added.is_empty());
    assert!(changes.removed.is_empty());
    let change = changes
        .components
        .iter()
        .find(|c| c.new_id == ComponentId::from_raw(7))
        .unwrap();
    assert_eq!(change.matched_by, MatchKind::Positional);
    assert_eq!(change.old_id, ComponentId::from_raw(2));
}
