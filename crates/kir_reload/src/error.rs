//! Error types for the reload machinery.

/// Errors from setting up or driving a reload worker. Failed rebuilds are
/// not errors; they travel as [`ReloadMessage::Failed`](crate::ReloadMessage).
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// The worker thread could not be started.
    #[error("failed to spawn reload worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The receiving side of the reload channel was dropped.
    #[error("reload channel disconnected")]
    Disconnected,

    /// The worker thread panicked.
    #[error("reload worker panicked")]
    WorkerPanicked,
}
