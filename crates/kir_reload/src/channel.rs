//! Single-producer, single-consumer handoff from worker to render thread.

use crate::error::ReloadError;
use crate::pipeline::{ReadyDocument, ReloadFailure};
use std::sync::mpsc;

/// One rebuild result.
#[derive(Debug)]
pub enum ReloadMessage {
    /// A validated, reconciled document ready to swap in.
    Ready(Box<ReadyDocument>),
    /// The rebuild failed; the running document stays.
    Failed(ReloadFailure),
}

/// Producer half. Not `Clone`: there is exactly one producer.
#[derive(Debug)]
pub struct ReloadSender {
    tx: mpsc::Sender<ReloadMessage>,
}

/// Consumer half.
#[derive(Debug)]
pub struct ReloadReceiver {
    rx: mpsc::Receiver<ReloadMessage>,
}

/// Creates a connected sender and receiver.
pub fn reload_channel() -> (ReloadSender, ReloadReceiver) {
    let (tx, rx) = mpsc::channel();
    (ReloadSender { tx }, ReloadReceiver { rx })
}

impl ReloadSender {
    /// Sends a message. Fails only if the receiver was dropped.
    pub fn send(&self, message: ReloadMessage) -> Result<(), ReloadError> {
        self.tx.send(message).map_err(|_| ReloadError::Disconnected)
    }
}

impl ReloadReceiver {
    /// Drains the channel without blocking and returns only the newest
    /// message. Older ones are superseded and dropped.
    pub fn take_latest(&self) -> Option<ReloadMessage> {
        let mut latest = None;
        let mut dropped = 0usize;
        while let Ok(message) = self.rx.try_recv() {
            if latest.replace(message).is_some() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "superseded reload messages dropped");
        }
        latest
    }
}
