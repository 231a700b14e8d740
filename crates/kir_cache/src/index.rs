//! The persisted cache index, `index.json`.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the index file within the cache directory.
pub const INDEX_FILE: &str = "index.json";

/// All cached documents, keyed by the hex cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheIndex {
    /// Tool version that wrote the index. A different version starts fresh.
    pub tool_version: String,
    /// Codec format version of the cached payloads.
    pub format_version: u16,
    /// Entries by hex key.
    pub entries: BTreeMap<String, IndexEntry>,
}

/// One cached document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Artifact file name under `docs/`.
    pub blob: String,
    /// Normalized compile options the document was built with.
    pub fingerprint: String,
    /// Encoded document size in bytes.
    pub payload_size: u64,
}

impl CacheIndex {
    /// Creates an empty index.
    pub fn new(tool_version: &str, format_version: u16) -> Self {
        Self {
            tool_version: tool_version.to_string(),
            format_version,
            entries: BTreeMap::new(),
        }
    }

    /// Loads the index from `cache_dir`, returning `None` if it is missing
    /// or unreadable.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(cache_dir.join(INDEX_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Writes the index atomically: a temporary file in `cache_dir` is
    /// renamed over `index.json`.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        let io = |source| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(cache_dir).map_err(io)?;
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(cache_dir).map_err(io)?;
        tmp.write_all(json.as_bytes()).map_err(io)?;
        let path = cache_dir.join(INDEX_FILE);
        tmp.persist(&path).map_err(|e| CacheError::Io {
            path,
            source: e.error,
        })?;
        Ok(())
    }

    /// Returns `true` if the index was written by this tool and codec version.
    pub fn is_compatible(&self, tool_version: &str, format_version: u16) -> bool {
        self.tool_version == tool_version && self.format_version == format_version
    }
}
