//! Render-side state shared read-only with the worker.

use kir_ir::Document;
use std::sync::{Arc, Mutex, PoisonError};

/// The most recent snapshot of the live document, published by the render
/// thread and read by the reload worker as its diff baseline.
#[derive(Clone, Debug, Default)]
pub struct StateMirror {
    latest: Arc<Mutex<Option<Arc<Document>>>>,
}

impl StateMirror {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot.
    pub fn publish(&self, snapshot: Arc<Document>) {
        *self.lock() = Some(snapshot);
    }

    /// The latest snapshot, if any was published.
    pub fn latest(&self) -> Option<Arc<Document>> {
        self.lock().clone()
    }

    /// Manifest version of the latest snapshot.
    pub fn version(&self) -> Option<u32> {
        self.lock().as_ref().map(|doc| doc.manifest().version())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<Document>>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
