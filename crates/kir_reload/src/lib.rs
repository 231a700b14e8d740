//! Hot-reload plumbing.
//!
//! ```text
//! ReloadWorker thread                    render thread
//! ───────────────────                    ─────────────
//! FileWatcher::poll                      LiveDocument (owns current doc)
//!   └─ ReloadPipeline::rebuild             │
//!        compile → encode → decode         │  frame N
//!        → validate → diff → reconcile     │
//!   └─ ReloadSender::send ──────────────►  frame_boundary()  ← swap here only
//!                                          │  frame N+1
//!   StateMirror::latest ◄──────────────── publish snapshot
//! ```
//!
//! The worker never touches the live document. It reads the last published
//! snapshot from the [`StateMirror`] as its baseline, and the render side
//! re-reconciles at swap time if live state moved since that snapshot.

#![warn(missing_docs)]

pub mod channel;
pub mod error;
pub mod live;
pub mod mirror;
pub mod pipeline;
pub mod watcher;
pub mod worker;

pub use channel::{reload_channel, ReloadMessage, ReloadReceiver, ReloadSender};
pub use error::ReloadError;
pub use live::{FrameOutcome, LiveDocument};
pub use mirror::StateMirror;
pub use pipeline::{CompileError, FailureStage, ReadyDocument, ReloadFailure, ReloadPipeline};
pub use watcher::FileWatcher;
pub use worker::{ReloadWorker, WorkerConfig};
