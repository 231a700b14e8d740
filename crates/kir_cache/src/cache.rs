//! High-level cache orchestrator.

use std::path::{Path, PathBuf};

use kir_codec::{encode_document, FORMAT_VERSION};
use kir_common::ContentHash;
use kir_ir::Document;
use kir_validate::{load, validate_document, ValidationOptions, ValidationReport};

use crate::artifact::ArtifactStore;
use crate::error::CacheError;
use crate::index::{CacheIndex, IndexEntry};
use crate::inputs::{cache_key, CompileOptions};

/// Version recorded in the index and in artifact headers.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether a document came from disk or from the compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Read from a cached artifact.
    Hit,
    /// Compiled, then stored.
    Miss,
}

/// A validated document from [`DocumentCache::get_or_compile`].
#[derive(Clone, Debug)]
pub struct CacheOutcome {
    /// The document.
    pub document: Document,
    /// Its cache key.
    pub key: ContentHash,
    /// Hit or miss.
    pub status: CacheStatus,
    /// Advisory diagnostics from validation.
    pub report: ValidationReport,
}

/// Cache of encoded documents keyed by compiler inputs.
///
/// Layout: `<dir>/index.json` and `<dir>/docs/<key>.kirc`. The index is
/// rewritten atomically after every change.
pub struct DocumentCache {
    dir: PathBuf,
    index: CacheIndex,
    store: ArtifactStore,
    validation: ValidationOptions,
    tool_version: String,
}

impl DocumentCache {
    /// Opens the cache in `dir`, creating it if needed. An index written by a
    /// different tool or codec version is discarded.
    pub fn open(dir: &Path, validation: ValidationOptions) -> Result<Self, CacheError> {
        Self::open_with_version(dir, validation, TOOL_VERSION)
    }

    /// Like [`open`](Self::open) with an explicit tool version.
    pub fn open_with_version(
        dir: &Path,
        validation: ValidationOptions,
        tool_version: &str,
    ) -> Result<Self, CacheError> {
        let index = match CacheIndex::load(dir) {
            Some(index) if index.is_compatible(tool_version, FORMAT_VERSION) => index,
            Some(_) => {
                tracing::info!(dir = %dir.display(), "cache index is from another version, starting fresh");
                CacheIndex::new(tool_version, FORMAT_VERSION)
            }
            None => CacheIndex::new(tool_version, FORMAT_VERSION),
        };
        let store = ArtifactStore::new(dir);
        store.ensure_dir()?;
        Ok(Self {
            dir: dir.to_path_buf(),
            index,
            store,
            validation,
            tool_version: tool_version.to_string(),
        })
    }

    /// Returns the cached document for these inputs, or compiles, validates
    /// and stores it.
    ///
    /// A cached artifact that fails to read, decode or validate is evicted
    /// and the call proceeds as a miss. A freshly compiled document that
    /// fails validation is returned as [`CacheError::Rejected`] and not
    /// stored.
    pub fn get_or_compile<F, E>(
        &mut self,
        source: &[u8],
        options: &CompileOptions,
        compile: F,
    ) -> Result<CacheOutcome, CacheError>
    where
        F: FnOnce(&[u8], &CompileOptions) -> Result<Document, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let key = cache_key(source, options);
        let hex = key.to_string();

        if let Some(outcome) = self.try_hit(key, &hex)? {
            return Ok(outcome);
        }

        tracing::debug!(key = %hex, "cache miss");
        let document = compile(source, options).map_err(|e| CacheError::Compile(e.into()))?;
        let report = validate_document(&document, &self.validation);
        if !report.is_accepted() {
            return Err(CacheError::Rejected(report));
        }
        let bytes = encode_document(&document)?;
        let blob = ArtifactStore::file_name(&hex);
        self.store.write(&blob, &bytes, &self.tool_version)?;
        self.index.entries.insert(
            hex,
            IndexEntry {
                blob,
                fingerprint: options.fingerprint(),
                payload_size: bytes.len() as u64,
            },
        );
        self.index.save(&self.dir)?;

        Ok(CacheOutcome {
            document,
            key,
            status: CacheStatus::Miss,
            report,
        })
    }

    fn try_hit(&mut self, key: ContentHash, hex: &str) -> Result<Option<CacheOutcome>, CacheError> {
        let Some(entry) = self.index.entries.get(hex) else {
            return Ok(None);
        };
        let reason = match self.store.read(&entry.blob) {
            Ok(bytes) => match load(&bytes, &self.validation) {
                Ok(loaded) => {
                    tracing::debug!(key = %hex, "cache hit");
                    return Ok(Some(CacheOutcome {
                        document: loaded.document,
                        key,
                        status: CacheStatus::Hit,
                        report: loaded.report,
                    }));
                }
                Err(err) => err.to_string(),
            },
            Err(err) => err.to_string(),
        };
        tracing::info!(key = %hex, %reason, "evicting cache entry");
        self.evict(hex)?;
        Ok(None)
    }

    fn evict(&mut self, hex: &str) -> Result<bool, CacheError> {
        let Some(entry) = self.index.entries.remove(hex) else {
            return Ok(false);
        };
        self.store.remove(&entry.blob)?;
        self.index.save(&self.dir)?;
        Ok(true)
    }

    /// Drops the entry for `key`. Returns `true` if there was one.
    pub fn invalidate(&mut self, key: &ContentHash) -> Result<bool, CacheError> {
        let removed = self.evict(&key.to_string())?;
        if removed {
            tracing::debug!(%key, "cache entry invalidated");
        }
        Ok(removed)
    }

    /// Drops entries whose artifact is gone and deletes artifacts no entry
    /// references. Returns the number of entries and files removed.
    pub fn gc(&mut self) -> Result<usize, CacheError> {
        let before = self.index.entries.len();
        let store = &self.store;
        self.index.entries.retain(|_, entry| store.exists(&entry.blob));
        let dropped = before - self.index.entries.len();

        let live: Vec<&str> = self
            .index
            .entries
            .values()
            .map(|e| e.blob.as_str())
            .collect();
        let deleted = self.store.gc(&live)?;
        if dropped > 0 {
            self.index.save(&self.dir)?;
        }
        tracing::info!(dropped, deleted, "cache gc finished");
        Ok(dropped + deleted)
    }

    /// Removes every entry and artifact.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.index.entries.clear();
        self.store.gc(&[])?;
        self.index.save(&self.dir)?;
        tracing::info!(dir = %self.dir.display(), "cache cleared");
        Ok(())
    }

    /// Returns `true` if `key` has an entry.
    pub fn contains(&self, key: &ContentHash) -> bool {
        self.index.entries.contains_key(&key.to_string())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.entries.len()
    }

    /// Returns `true` if the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.entries.is_empty()
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The loaded index.
    pub fn index(&self) -> &CacheIndex {
        &self.index
    }
}
