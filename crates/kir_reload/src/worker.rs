//! The background thread that watches, rebuilds and sends.

use crate::channel::{ReloadMessage, ReloadSender};
use crate::error::ReloadError;
use crate::mirror::StateMirror;
use crate::pipeline::ReloadPipeline;
use crate::watcher::FileWatcher;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the worker watches and how it rebuilds.
pub struct WorkerConfig {
    /// The source file handed to the pipeline.
    pub entry: PathBuf,
    /// Change detection; any reported change triggers a rebuild of `entry`.
    pub watcher: FileWatcher,
    /// The rebuild pipeline.
    pub pipeline: ReloadPipeline,
    /// Sleep between polls.
    pub poll_interval: Duration,
}

/// Handle to a running reload thread. Dropping it stops the thread.
pub struct ReloadWorker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReloadWorker {
    /// Starts the worker. The watcher baseline is taken before this returns,
    /// so any later change is seen.
    pub fn spawn(
        mut config: WorkerConfig,
        sender: ReloadSender,
        mirror: StateMirror,
    ) -> Result<Self, ReloadError> {
        config.watcher.poll();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("kir-reload".to_string())
            .spawn(move || run(config, sender, mirror, flag))
            .map_err(ReloadError::Spawn)?;
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Returns `true` until [`stop`](Self::stop) is called or the thread exits.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread to stop and waits for it.
    pub fn stop(&mut self) -> Result<(), ReloadError> {
        self.running.store(false, Ordering::SeqCst);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ReloadError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for ReloadWorker {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::error!(%err, "reload worker did not stop cleanly");
        }
    }
}

fn run(
    mut config: WorkerConfig,
    sender: ReloadSender,
    mirror: StateMirror,
    running: Arc<AtomicBool>,
) {
    tracing::info!(entry = %config.entry.display(), "reload worker started");
    while running.load(Ordering::SeqCst) {
        let changed = config.watcher.poll();
        if !changed.is_empty() {
            tracing::debug!(files = changed.len(), "rebuilding");
            let baseline = mirror.latest();
            let message = match config.pipeline.rebuild_file(&config.entry, baseline.as_ref()) {
                Ok(ready) => ReloadMessage::Ready(Box::new(ready)),
                Err(failure) => {
                    tracing::warn!(%failure, "rebuild failed");
                    ReloadMessage::Failed(failure)
                }
            };
            if sender.send(message).is_err() {
                tracing::debug!("render side gone, reload worker exiting");
                break;
            }
        }
        thread::sleep(config.poll_interval);
    }
    tracing::info!("reload worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::reload_channel;
    use crate::live::{FrameOutcome, LiveDocument};
    use crate::pipeline::tests::pipeline;
    use kir_ir::ReactiveValue;
    use std::time::Instant;

    // Rename into place so the watcher never sees a half-written file.
    fn replace(path: &std::path::Path, content: &str) {
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content).unwrap();
        std::fs::rename(&tmp, path).unwrap();
    }

    fn wait_for_frame(live: &mut LiveDocument) -> FrameOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match live.frame_boundary() {
                FrameOutcome::Unchanged if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5));
                }
                outcome => return outcome,
            }
        }
    }

    #[test]
    fn edits_are_rebuilt_and_swapped() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("app.kry");
        std::fs::write(&entry, "a").unwrap();

        let mut pipeline = pipeline();
        let initial = pipeline.rebuild_file(&entry, None).unwrap().document;
        let (tx, rx) = reload_channel();
        let mirror = StateMirror::new();
        let mut live = LiveDocument::new(initial, rx, mirror.clone());
        live.set_value("count", ReactiveValue::Int(3)).unwrap();
        live.frame_boundary();

        let mut watcher = FileWatcher::new(vec!["kry".to_string()], Duration::ZERO);
        watcher.watch(dir.path());
        let mut worker = ReloadWorker::spawn(
            WorkerConfig {
                entry: entry.clone(),
                watcher,
                pipeline,
                poll_interval: Duration::from_millis(5),
            },
            tx,
            mirror,
        )
        .unwrap();
        assert!(worker.is_running());

        replace(&entry, "a,b,c");
        match wait_for_frame(&mut live) {
            FrameOutcome::Swapped { generation, .. } => assert_eq!(generation, 1),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(live.tree().len(), 4);
        assert_eq!(
            live.manifest().find_variable("count").unwrap().value,
            ReactiveValue::Int(3)
        );

        replace(&entry, "   ");
        assert!(matches!(wait_for_frame(&mut live), FrameOutcome::Failed(_)));
        assert_eq!(live.tree().len(), 4);

        worker.stop().unwrap();
        assert!(!worker.is_running());
    }
}
