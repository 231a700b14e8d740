//! Modification-time polling over watched files and directories.

use kir_config::ReloadConfig;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

/// Polls watched paths and reports changed files once they have been quiet
/// for the debounce interval.
///
/// Directories are walked recursively and filtered by extension. Files
/// watched directly are always included. The first poll records a baseline
/// and reports nothing.
#[derive(Debug)]
pub struct FileWatcher {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    debounce: Duration,
    seen: HashMap<PathBuf, Stamp>,
    pending: BTreeSet<PathBuf>,
    last_change: Option<Instant>,
    primed: bool,
}

impl FileWatcher {
    /// Creates a watcher for files with the given extensions (without dot).
    pub fn new(extensions: Vec<String>, debounce: Duration) -> Self {
        Self {
            roots: Vec::new(),
            extensions,
            debounce,
            seen: HashMap::new(),
            pending: BTreeSet::new(),
            last_change: None,
            primed: false,
        }
    }

    /// Creates a watcher from the `[reload]` section of `kir.toml`.
    pub fn from_config(config: &ReloadConfig) -> Self {
        Self::new(
            config.extensions.clone(),
            Duration::from_millis(config.debounce_ms),
        )
    }

    /// Adds a file or directory.
    pub fn watch(&mut self, path: impl Into<PathBuf>) {
        self.roots.push(path.into());
    }

    /// Polls using the current time.
    pub fn poll(&mut self) -> Vec<PathBuf> {
        self.poll_at(Instant::now())
    }

    /// Polls as if the time were `now`. Returns changed and removed paths,
    /// sorted, once no further change was seen for the debounce interval.
    pub fn poll_at(&mut self, now: Instant) -> Vec<PathBuf> {
        let current = self.scan();
        if !self.primed {
            self.seen = current;
            self.primed = true;
            return Vec::new();
        }

        let mut changed = false;
        for (path, stamp) in &current {
            if self.seen.get(path) != Some(stamp) {
                self.pending.insert(path.clone());
                changed = true;
            }
        }
        for path in self.seen.keys() {
            if !current.contains_key(path) {
                self.pending.insert(path.clone());
                changed = true;
            }
        }
        self.seen = current;
        if changed {
            self.last_change = Some(now);
        }

        match self.last_change {
            Some(at) if !self.pending.is_empty() && now.duration_since(at) >= self.debounce => {
                self.last_change = None;
                let paths: Vec<PathBuf> = std::mem::take(&mut self.pending).into_iter().collect();
                tracing::debug!(count = paths.len(), "watched files changed");
                paths
            }
            _ => Vec::new(),
        }
    }

    fn scan(&self) -> HashMap<PathBuf, Stamp> {
        let mut found = HashMap::new();
        for root in &self.roots {
            if root.is_dir() {
                self.walk(root, &mut found);
            } else if let Some(stamp) = stamp(root) {
                found.insert(root.clone(), stamp);
            }
        }
        found
    }

    fn walk(&self, dir: &Path, found: &mut HashMap<PathBuf, Stamp>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(dir = %dir.display(), %err, "cannot list watched directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, found);
            } else if self.matches(&path) {
                if let Some(stamp) = stamp(&path) {
                    found.insert(path, stamp);
                }
            }
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}

fn stamp(path: &Path) -> Option<Stamp> {
    let meta = std::fs::metadata(path).ok()?;
    Some(Stamp {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher(dir: &Path, debounce: Duration) -> FileWatcher {
        let mut w = FileWatcher::new(vec!["kry".to_string()], debounce);
        w.watch(dir);
        w
    }

    #[test]
    fn first_poll_primes_baseline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.kry"), "a").unwrap();
        let mut w = watcher(dir.path(), Duration::ZERO);
        assert!(w.poll().is_empty());
        assert!(w.poll().is_empty());
    }

    #[test]
    fn reports_new_modified_and_removed_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app.kry");
        std::fs::write(&app, "a").unwrap();
        let mut w = watcher(dir.path(), Duration::ZERO);
        w.poll();

        std::fs::write(&app, "abc").unwrap();
        let nested = dir.path().join("ui");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("button.kry"), "b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        assert_eq!(w.poll(), vec![app.clone(), nested.join("button.kry")]);

        std::fs::remove_file(&app).unwrap();
        assert_eq!(w.poll(), vec![app]);
    }

    #[test]
    fn debounce_waits_for_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app.kry");
        std::fs::write(&app, "a").unwrap();
        let mut w = watcher(dir.path(), Duration::from_millis(500));
        let t0 = Instant::now();
        w.poll_at(t0);

        std::fs::write(&app, "ab").unwrap();
        assert!(w.poll_at(t0 + Duration::from_millis(10)).is_empty());
        assert!(w.poll_at(t0 + Duration::from_millis(300)).is_empty());
        assert_eq!(w.poll_at(t0 + Duration::from_millis(510)), vec![app]);
        assert!(w.poll_at(t0 + Duration::from_millis(2000)).is_empty());
    }

    #[test]
    fn directly_watched_file_ignores_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.ui");
        std::fs::write(&file, "x").unwrap();
        let mut w = FileWatcher::new(vec!["kry".to_string()], Duration::ZERO);
        w.watch(&file);
        w.poll();
        std::fs::write(&file, "xy").unwrap();
        assert_eq!(w.poll(), vec![file]);
    }

    #[test]
    fn from_config_uses_defaults() {
        let w = FileWatcher::from_config(&ReloadConfig::default());
        assert_eq!(w.debounce, Duration::from_millis(500));
        assert_eq!(w.extensions, vec!["kry".to_string()]);
    }
}
