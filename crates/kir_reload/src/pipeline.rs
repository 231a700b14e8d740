//! One rebuild: source bytes to a reconciled, validated document.

use kir_cache::{CacheError, CompileOptions, DocumentCache};
use kir_codec::encode_document;
use kir_diagnostics::Diagnostic;
use kir_diff::{diff, reconcile, ChangeSet, ReconcileReport};
use kir_ir::Document;
use kir_validate::{codes, load, ValidationOptions, ValidationReport};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Error type returned by the compiler callback.
pub type CompileError = Box<dyn std::error::Error + Send + Sync>;

/// The compiler front end, supplied by the embedder.
pub type CompileFn = dyn Fn(&[u8], &CompileOptions) -> Result<Document, CompileError> + Send;

/// A rebuilt document ready for the render thread.
#[derive(Debug)]
pub struct ReadyDocument {
    /// The new document carrying the reconciled manifest.
    pub document: Document,
    /// Differences from the baseline.
    pub changes: ChangeSet,
    /// Which variables kept their values.
    pub reconcile: ReconcileReport,
    /// The snapshot the values were copied from. The render side compares
    /// it by identity with its last published snapshot.
    pub baseline: Option<Arc<Document>>,
    /// Advisory diagnostics from validation.
    pub report: ValidationReport,
}

/// The step a rebuild failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureStage {
    /// The source could not be read.
    Read,
    /// The compiler rejected the source.
    Compile,
    /// The document could not be encoded.
    Encode,
    /// The document failed validation.
    Validate,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureStage::Read => "read",
            FailureStage::Compile => "compile",
            FailureStage::Encode => "encode",
            FailureStage::Validate => "validation",
        })
    }
}

/// A failed rebuild. The running document is unaffected.
#[derive(Clone, Debug)]
pub struct ReloadFailure {
    /// Where it failed.
    pub stage: FailureStage,
    /// Short description.
    pub message: String,
    /// Diagnostics, when the failure came with any.
    pub report: ValidationReport,
}

impl ReloadFailure {
    /// Creates a failure without diagnostics.
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            report: ValidationReport::new(),
        }
    }

    fn with_report(mut self, report: ValidationReport) -> Self {
        self.report = report;
        self
    }
}

impl fmt::Display for ReloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

/// Compiles, round-trips through the codec, validates, diffs and reconciles.
pub struct ReloadPipeline {
    compile: Box<CompileFn>,
    options: CompileOptions,
    validation: ValidationOptions,
    cache: Option<DocumentCache>,
}

impl ReloadPipeline {
    /// Creates a pipeline around a compiler callback.
    pub fn new<F>(compile: F, validation: ValidationOptions) -> Self
    where
        F: Fn(&[u8], &CompileOptions) -> Result<Document, CompileError> + Send + 'static,
    {
        Self {
            compile: Box::new(compile),
            options: CompileOptions::new(),
            validation,
            cache: None,
        }
    }

    /// Sets the options passed to the compiler.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Routes compiles through `cache`.
    pub fn with_cache(mut self, cache: DocumentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Reads `path` and rebuilds it.
    pub fn rebuild_file(
        &mut self,
        path: &Path,
        baseline: Option<&Arc<Document>>,
    ) -> Result<ReadyDocument, ReloadFailure> {
        let source = std::fs::read(path).map_err(|e| {
            let mut report = ValidationReport::new();
            report.push(
                Diagnostic::fatal(codes::READ_FAILED, format!("cannot read {}", path.display()))
                    .with_note(e.to_string()),
            );
            ReloadFailure::new(FailureStage::Read, e.to_string()).with_report(report)
        })?;
        self.rebuild(&source, baseline)
    }

    /// Rebuilds `source` against `baseline`, the document currently live.
    ///
    /// With no baseline every variable is fresh.
    pub fn rebuild(
        &mut self,
        source: &[u8],
        baseline: Option<&Arc<Document>>,
    ) -> Result<ReadyDocument, ReloadFailure> {
        let compiled = self.compile(source)?;

        let bytes = encode_document(&compiled)
            .map_err(|e| ReloadFailure::new(FailureStage::Encode, e.to_string()))?;
        let loaded = load(&bytes, &self.validation).map_err(|e| {
            let message = e.to_string();
            ReloadFailure::new(FailureStage::Validate, message).with_report(e.into_report())
        })?;

        let empty = Document::default();
        let old = baseline.map_or(&empty, |doc| &**doc);
        let changes = diff(old, &loaded.document);
        let reconciled = reconcile(old.manifest(), loaded.document.manifest());
        tracing::info!(
            changed = changes.components.len(),
            added = changes.added.len(),
            removed = changes.removed.len(),
            restored = reconciled.report.restored.len(),
            "rebuild finished"
        );
        Ok(ReadyDocument {
            document: loaded.document.with_manifest(reconciled.manifest),
            changes,
            reconcile: reconciled.report,
            baseline: baseline.cloned(),
            report: loaded.report,
        })
    }

    fn compile(&mut self, source: &[u8]) -> Result<Document, ReloadFailure> {
        let compile = &self.compile;
        match &mut self.cache {
            Some(cache) => cache
                .get_or_compile(source, &self.options, |s, o| compile(s, o))
                .map(|outcome| outcome.document)
                .map_err(|e| match e {
                    CacheError::Rejected(report) => {
                        ReloadFailure::new(FailureStage::Validate, "compiled document rejected")
                            .with_report(report)
                    }
                    CacheError::Compile(inner) => {
                        ReloadFailure::new(FailureStage::Compile, inner.to_string())
                    }
                    other => ReloadFailure::new(FailureStage::Compile, other.to_string()),
                }),
            None => compile(source, &self.options)
                .map_err(|e| ReloadFailure::new(FailureStage::Compile, e.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use kir_ir::{
        BindingKind, ComponentId, ComponentKind, ComponentNode, ComponentTree, ReactiveManifest,
        ReactiveValue, VarType,
    };

    /// Compiles `name:kind,name:kind` into a column of text nodes with one
    /// `count` variable. An empty source is a compile error.
    pub(crate) fn toy_compile(
        source: &[u8],
        _: &CompileOptions,
    ) -> Result<Document, CompileError> {
        let text = std::str::from_utf8(source)?;
        if text.trim().is_empty() {
            return Err("empty source".into());
        }
        let mut tree = ComponentTree::new();
        let root = tree.set_root(ComponentNode::new(
            ComponentId::from_raw(1),
            ComponentKind::Column,
        ));
        let mut manifest = ReactiveManifest::new();
        let count = manifest.add_variable("count", VarType::Int, ReactiveValue::Int(0))?;
        for (i, label) in text.trim().split(',').enumerate() {
            let id = ComponentId::from_raw(i as u32 + 2);
            tree.add_child(root, ComponentNode::new(id, ComponentKind::Text).with_text(label))?;
            manifest.add_binding(id, count, BindingKind::Text, "count")?;
        }
        Ok(Document::new(tree, manifest))
    }

    pub(crate) fn pipeline() -> ReloadPipeline {
        ReloadPipeline::new(toy_compile, ValidationOptions::default())
    }

    #[test]
    fn first_build_has_fresh_state() {
        let ready = pipeline().rebuild(b"a,b", None).unwrap();
        assert_eq!(ready.reconcile.fresh, vec!["count".to_string()]);
        assert!(ready.baseline.is_none());
        assert_eq!(ready.changes.added.len(), 3);
    }

    #[test]
    fn rebuild_carries_state_over() {
        let mut pipeline = pipeline();
        let first = pipeline.rebuild(b"a", None).unwrap().document;
        let (tree, mut manifest) = first.into_parts();
        let count = manifest.find_variable("count").unwrap().id;
        manifest.set_value(count, ReactiveValue::Int(3)).unwrap();
        let live = Arc::new(Document::new(tree, manifest));

        let ready = pipeline.rebuild(b"a,b,c", Some(&live)).unwrap();
        assert_eq!(
            ready.document.manifest().find_variable("count").unwrap().value,
            ReactiveValue::Int(3)
        );
        assert!(ready.baseline.is_some_and(|b| Arc::ptr_eq(&b, &live)));
        assert_eq!(ready.changes.added.len(), 2);
    }

    #[test]
    fn compile_failure_is_reported() {
        let err = pipeline().rebuild(b"  ", None).unwrap_err();
        assert_eq!(err.stage, FailureStage::Compile);
        assert_eq!(err.to_string(), "compile failed: empty source");
    }

    #[test]
    fn validation_failure_carries_diagnostics() {
        let mut pipeline = ReloadPipeline::new(
            |source: &[u8], options: &CompileOptions| {
                let (mut tree, manifest) = toy_compile(source, options)?.into_parts();
                let root = tree.root().ok_or("no root")?;
                if let Some(node) = tree.node_mut(root) {
                    node.properties
                        .insert(kir_ir::PropertyKey::Opacity, kir_ir::PropertyValue::Float(2.0));
                }
                Ok(Document::new(tree, manifest))
            },
            ValidationOptions::default(),
        );
        let err = pipeline.rebuild(b"a", None).unwrap_err();
        assert_eq!(err.stage, FailureStage::Validate);
        assert_eq!(err.report.fatal_count(), 1);
    }

    #[test]
    fn cached_rebuild_skips_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DocumentCache::open(dir.path(), ValidationOptions::default()).unwrap();
        let mut pipeline = pipeline().with_cache(cache);
        let first = pipeline.rebuild(b"x,y", None).unwrap();
        let second = pipeline.rebuild(b"x,y", None).unwrap();
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline()
            .rebuild_file(&dir.path().join("absent.kry"), None)
            .unwrap_err();
        assert_eq!(err.stage, FailureStage::Read);
        assert_eq!(err.report.diagnostics()[0].code, codes::READ_FAILED);
    }
}
