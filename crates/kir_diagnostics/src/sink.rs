//! Thread-safe diagnostic accumulator.

use crate::code::Category;
use crate::diagnostic::Diagnostic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A thread-safe accumulator for diagnostics emitted while checking a document.
///
/// The fatal count is tracked atomically so [`has_fatal`](Self::has_fatal) can
/// be checked without locking the diagnostic vector. A reload worker and a
/// caller inspecting its progress may share one sink.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    fatal_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            fatal_count: AtomicUsize::new(0),
        }
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.is_fatal() {
            self.fatal_count.fetch_add(1, Ordering::Relaxed);
        }
        self.lock().push(diag);
    }

    /// Emits every diagnostic from an iterator.
    pub fn extend(&self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.emit(diag);
        }
    }

    /// Returns `true` if any fatal diagnostics have been emitted.
    pub fn has_fatal(&self) -> bool {
        self.fatal_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of fatal diagnostics emitted so far.
    pub fn fatal_count(&self) -> usize {
        self.fatal_count.load(Ordering::Relaxed)
    }

    /// Returns the number of fatal diagnostics in one category.
    pub fn fatal_count_in(&self, category: Category) -> usize {
        self.lock()
            .iter()
            .filter(|d| d.is_fatal() && d.category() == category)
            .count()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    ///
    /// The fatal counter is not reset.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    fn make_fatal() -> Diagnostic {
        Diagnostic::fatal(DiagnosticCode::new(Category::Structure, 3), "cycle")
    }

    fn make_advisory() -> Diagnostic {
        Diagnostic::advisory(DiagnosticCode::new(Category::Semantic, 20), "odd size")
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_fatal());
        assert_eq!(sink.fatal_count(), 0);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn emit_fatal() {
        let sink = DiagnosticSink::new();
        sink.emit(make_fatal());
        assert!(sink.has_fatal());
        assert_eq!(sink.fatal_count(), 1);
        assert_eq!(sink.fatal_count_in(Category::Structure), 1);
        assert_eq!(sink.fatal_count_in(Category::Format), 0);
    }

    #[test]
    fn advisory_is_not_fatal() {
        let sink = DiagnosticSink::new();
        sink.emit(make_advisory());
        assert!(!sink.has_fatal());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn take_all_drains() {
        let sink = DiagnosticSink::new();
        sink.extend([make_fatal(), make_advisory()]);
        assert_eq!(sink.take_all().len(), 2);
        assert!(sink.take_all().is_empty());
        assert_eq!(sink.fatal_count(), 1);
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let sink = Arc::new(DiagnosticSink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..50 {
                        sink.emit(make_fatal());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.fatal_count(), 400);
        assert_eq!(sink.diagnostics().len(), 400);
    }
}
