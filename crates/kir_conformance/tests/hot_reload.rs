//! Hot reload end to end: rebuild on a worker-side pipeline, hand off over
//! the channel, swap at a frame boundary.

use kir_cache::{CompileOptions, DocumentCache};
use kir_conformance::compile_labels;
use kir_ir::{ComponentId, Document, ReactiveValue};
use kir_reload::{
    reload_channel, CompileError, FailureStage, FrameOutcome, LiveDocument, ReloadMessage,
    ReloadPipeline, StateMirror,
};
use kir_validate::ValidationOptions;
use std::sync::Arc;

fn compile(source: &[u8], options: &CompileOptions) -> Result<Document, CompileError> {
    compile_labels(source, options).map_err(Into::into)
}

fn count(live: &LiveDocument) -> ReactiveValue {
    live.manifest().find_variable("count").unwrap().value.clone()
}

fn labels(doc: &Document) -> Vec<String> {
    let tree = doc.tree();
    tree.preorder()
        .into_iter()
        .filter_map(|slot| tree.node(slot)?.text.clone())
        .collect()
}

#[test]
fn state_survives_reload_and_swap_waits_for_frame() {
    let mut pipeline = ReloadPipeline::new(compile, ValidationOptions::default());
    let (tx, rx) = reload_channel();
    let mirror = StateMirror::new();

    let initial = pipeline.rebuild(b"a, b", None).unwrap().document;
    let mut live = LiveDocument::new(initial, rx, mirror.clone());
    live.set_value("count", ReactiveValue::Int(3)).unwrap();
    assert!(matches!(live.frame_boundary(), FrameOutcome::Unchanged));

    let baseline = mirror.latest().unwrap();
    let ready = pipeline
        .rebuild(b"10=title, a, b", Some(&baseline))
        .unwrap();
    tx.send(ReloadMessage::Ready(Box::new(ready))).unwrap();

    // Nothing changes until the next boundary.
    assert_eq!(labels(&live.document()), vec!["a", "b"]);

    match live.frame_boundary() {
        FrameOutcome::Swapped {
            generation,
            restored,
        } => {
            assert_eq!(generation, 1);
            assert_eq!(restored, vec!["count".to_string()]);
        }
        other => panic!("expected swap, got {other:?}"),
    }
    assert_eq!(labels(&live.document()), vec!["title", "a", "b"]);
    assert_eq!(count(&live), ReactiveValue::Int(3));
    assert!(live.tree().find(ComponentId::from_raw(10)).is_some());
}

#[test]
fn failed_rebuild_keeps_running_document() {
    let mut pipeline = ReloadPipeline::new(compile, ValidationOptions::default());
    let (tx, rx) = reload_channel();
    let initial = pipeline.rebuild(b"a", None).unwrap().document;
    let mut live = LiveDocument::new(initial.clone(), rx, StateMirror::new());

    let failure = pipeline.rebuild(b" ", Some(live.snapshot())).unwrap_err();
    assert_eq!(failure.stage, FailureStage::Compile);
    tx.send(ReloadMessage::Failed(failure)).unwrap();

    assert!(matches!(live.frame_boundary(), FrameOutcome::Failed(_)));
    assert_eq!(live.document(), initial);
    assert_eq!(live.generation(), 0);
    assert!(live.last_failure().is_some());
}

#[test]
fn live_updates_during_rebuild_are_not_lost() {
    let mut pipeline = ReloadPipeline::new(compile, ValidationOptions::default());
    let (tx, rx) = reload_channel();
    let mirror = StateMirror::new();
    let initial = pipeline.rebuild(b"a", None).unwrap().document;
    let mut live = LiveDocument::new(initial, rx, mirror.clone());

    let snapshot = mirror.latest().unwrap();
    let ready = pipeline.rebuild(b"a, b", Some(&snapshot)).unwrap();
    // The application writes after the worker took its snapshot.
    live.set_value("count", ReactiveValue::Int(8)).unwrap();
    tx.send(ReloadMessage::Ready(Box::new(ready))).unwrap();

    assert!(matches!(
        live.frame_boundary(),
        FrameOutcome::Swapped { .. }
    ));
    assert_eq!(count(&live), ReactiveValue::Int(8));
}

#[test]
fn only_latest_pending_reload_is_applied() {
    let mut pipeline = ReloadPipeline::new(compile, ValidationOptions::default());
    let (tx, rx) = reload_channel();
    let initial = pipeline.rebuild(b"a", None).unwrap().document;
    let mut live = LiveDocument::new(initial, rx, StateMirror::new());

    let sources: [&[u8]; 3] = [b"x", b"x, y", b"x, y, z"];
    for source in sources {
        let ready = pipeline.rebuild(source, Some(live.snapshot())).unwrap();
        tx.send(ReloadMessage::Ready(Box::new(ready))).unwrap();
    }
    assert!(matches!(
        live.frame_boundary(),
        FrameOutcome::Swapped { generation: 1, .. }
    ));
    assert_eq!(labels(&live.document()), vec!["x", "y", "z"]);
    assert!(matches!(live.frame_boundary(), FrameOutcome::Unchanged));
}

#[test]
fn cached_pipeline_reuses_compiled_documents() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path(), ValidationOptions::default()).unwrap();
    let mut pipeline =
        ReloadPipeline::new(compile, ValidationOptions::default()).with_cache(cache);

    let first = Arc::new(pipeline.rebuild(b"a, b", None).unwrap().document);
    let second = pipeline.rebuild(b"a, b", Some(&first)).unwrap();
    assert!(second.changes.is_empty());

    let reopened = DocumentCache::open(dir.path(), ValidationOptions::default()).unwrap();
    assert_eq!(reopened.len(), 1);
}
