//! The render-side owner of the running document.

use crate::channel::{ReloadMessage, ReloadReceiver};
use crate::mirror::StateMirror;
use crate::pipeline::ReloadFailure;
use kir_diff::reconcile;
use kir_ir::{ComponentTree, Document, ManifestError, ReactiveManifest, ReactiveValue};
use std::sync::Arc;

/// What happened at a frame boundary.
#[derive(Debug)]
pub enum FrameOutcome {
    /// No reload was pending.
    Unchanged,
    /// A new document was swapped in.
    Swapped {
        /// Swap counter after this swap.
        generation: u64,
        /// Variables whose values were carried over.
        restored: Vec<String>,
    },
    /// A rebuild failed; the running document was kept.
    Failed(ReloadFailure),
}

/// Holds the document being rendered and its live reactive state.
///
/// The tree is only replaced in [`frame_boundary`](Self::frame_boundary).
/// Between boundaries the renderer may read it freely and the application
/// may update variables through [`set_value`](Self::set_value). Updates
/// write the owned manifest in place; the tree stays shared with the last
/// published snapshot.
pub struct LiveDocument {
    tree: Arc<ComponentTree>,
    manifest: ReactiveManifest,
    published: Arc<Document>,
    dirty: bool,
    receiver: ReloadReceiver,
    mirror: StateMirror,
    generation: u64,
    last_failure: Option<ReloadFailure>,
}

impl LiveDocument {
    /// Starts rendering `document` and publishes it as the first snapshot.
    pub fn new(document: Document, receiver: ReloadReceiver, mirror: StateMirror) -> Self {
        let published = Arc::new(document);
        mirror.publish(Arc::clone(&published));
        Self {
            tree: Arc::clone(published.shared_tree()),
            manifest: published.manifest().clone(),
            published,
            dirty: false,
            receiver,
            mirror,
            generation: 0,
            last_failure: None,
        }
    }

    /// The tree being rendered.
    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// The shared handle to the tree being rendered.
    pub fn shared_tree(&self) -> &Arc<ComponentTree> {
        &self.tree
    }

    /// The live manifest.
    pub fn manifest(&self) -> &ReactiveManifest {
        &self.manifest
    }

    /// The current tree and live manifest as a document. The tree is shared.
    pub fn document(&self) -> Document {
        Document::from_shared(Arc::clone(&self.tree), self.manifest.clone())
    }

    /// The last snapshot published to the mirror.
    pub fn snapshot(&self) -> &Arc<Document> {
        &self.published
    }

    /// Number of swaps so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The most recent failed rebuild, cleared by the next swap.
    pub fn last_failure(&self) -> Option<&ReloadFailure> {
        self.last_failure.as_ref()
    }

    /// Updates a variable by name.
    pub fn set_value(&mut self, name: &str, value: ReactiveValue) -> Result<(), ManifestError> {
        let id = self
            .manifest
            .find_variable(name)
            .map(|v| v.id)
            .ok_or_else(|| ManifestError::UnknownName(name.to_string()))?;
        self.manifest.set_value(id, value)?;
        self.dirty = true;
        Ok(())
    }

    /// Applies a pending reload, if any, and publishes live state.
    ///
    /// Call between frames. Unless the incoming document was built against
    /// the snapshot published last and live state has not moved since, its
    /// manifest is reconciled again against the live one so that no update
    /// is lost.
    pub fn frame_boundary(&mut self) -> FrameOutcome {
        let outcome = match self.receiver.take_latest() {
            None => FrameOutcome::Unchanged,
            Some(ReloadMessage::Failed(failure)) => {
                tracing::warn!(%failure, "hot reload failed, keeping current document");
                self.last_failure = Some(failure.clone());
                FrameOutcome::Failed(failure)
            }
            Some(ReloadMessage::Ready(ready)) => {
                let current = !self.dirty
                    && ready
                        .baseline
                        .as_ref()
                        .is_some_and(|b| Arc::ptr_eq(b, &self.published));
                let (tree, manifest) = ready.document.into_shared_parts();
                let mut restored = ready.reconcile.restored;
                self.manifest = if current {
                    manifest
                } else {
                    let again = reconcile(&self.manifest, &manifest);
                    tracing::debug!(
                        dirty = self.dirty,
                        live = self.manifest.version(),
                        "rebuild baseline is stale, reconciling again"
                    );
                    restored = again.report.restored;
                    again.manifest
                };
                self.tree = tree;
                self.generation += 1;
                self.last_failure = None;
                tracing::info!(generation = self.generation, "document swapped");
                FrameOutcome::Swapped {
                    generation: self.generation,
                    restored,
                }
            }
        };
        if self.dirty || matches!(outcome, FrameOutcome::Swapped { .. }) {
            self.publish();
        }
        outcome
    }

    fn publish(&mut self) {
        self.published = Arc::new(self.document());
        self.mirror.publish(Arc::clone(&self.published));
        self.dirty = false;
    }
}
