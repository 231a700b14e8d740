//! On-disk artifact files.
//!
//! Each artifact is a 4-byte little-endian header length, a bincode-encoded
//! [`ArtifactHeader`], then the encoded document as payload.

use std::path::{Path, PathBuf};

use kir_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"KIRC";

/// Artifact container version. The payload carries its own format version.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Subdirectory holding artifacts.
pub const DOCS_SUBDIR: &str = "docs";

/// Artifact file extension.
pub const ARTIFACT_EXT: &str = "kirc";

/// Header prepended to every artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Must be `b"KIRC"`.
    pub magic: [u8; 4],
    /// Container version.
    pub format_version: u32,
    /// Version of the tool that wrote the artifact.
    pub tool_version: String,
    /// Hash of the payload.
    pub checksum: ContentHash,
}

/// Reads and writes artifacts under `<cache_dir>/docs/`.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `cache_dir`.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            dir: cache_dir.join(DOCS_SUBDIR),
        }
    }

    /// Creates the artifact directory.
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })
    }

    /// Directory holding the artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the artifact for `key`.
    pub fn file_name(key: &str) -> String {
        format!("{key}.{ARTIFACT_EXT}")
    }

    /// Full path of the artifact named `file_name`.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Writes `payload` as artifact `file_name`.
    pub fn write(
        &self,
        file_name: &str,
        payload: &[u8],
        tool_version: &str,
    ) -> Result<(), CacheError> {
        self.ensure_dir()?;
        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            tool_version: tool_version.to_string(),
            checksum: ContentHash::from_bytes(payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);

        let path = self.path(file_name);
        std::fs::write(&path, &output).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Reads artifact `file_name` and returns its verified payload.
    pub fn read(&self, file_name: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.path(file_name);
        let raw = std::fs::read(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        let invalid = |reason: &str| CacheError::InvalidHeader {
            path: path.clone(),
            reason: reason.to_string(),
        };

        let len_bytes: [u8; 4] = raw
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| invalid("file shorter than the length prefix"))?;
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        let header_bytes = raw
            .get(4..)
            .and_then(|rest| rest.get(..header_len))
            .ok_or_else(|| invalid("header length exceeds file size"))?;
        let (header, _): (ArtifactHeader, usize) =
            bincode::serde::decode_from_slice(header_bytes, bincode::config::standard())
                .map_err(|e| invalid(&e.to_string()))?;

        if header.magic != ARTIFACT_MAGIC {
            return Err(invalid("bad magic"));
        }
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path,
                expected: ARTIFACT_FORMAT_VERSION,
                actual: header.format_version,
            });
        }

        let payload = &raw[4 + header_len..];
        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                path,
                expected: header.checksum.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(payload.to_vec())
    }

    /// Deletes artifact `file_name`. A missing file is not an error.
    pub fn remove(&self, file_name: &str) -> Result<bool, CacheError> {
        let path = self.path(file_name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Returns `true` if artifact `file_name` exists.
    pub fn exists(&self, file_name: &str) -> bool {
        self.path(file_name).is_file()
    }

    /// Deletes artifact files not named in `live`. Returns the number removed.
    pub fn gc(&self, live: &[&str]) -> Result<usize, CacheError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let entries = std::fs::read_dir(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXT) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if !live.contains(&name) {
                std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    fn write_raw(store: &ArtifactStore, name: &str, header: &ArtifactHeader, payload: &[u8]) {
        store.ensure_dir().unwrap();
        let header_bytes =
            bincode::serde::encode_to_vec(header, bincode::config::standard()).unwrap();
        let mut output = Vec::new();
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);
        std::fs::write(store.path(name), output).unwrap();
    }

    #[test]
    fn write_and_read_roundtrip() {
        let (_dir, store) = make_store();
        store.write("a.kirc", b"encoded document", "0.1.0").unwrap();
        assert_eq!(store.read("a.kirc").unwrap(), b"encoded document");
        assert!(store.exists("a.kirc"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let (_dir, store) = make_store();
        assert!(matches!(store.read("nope.kirc"), Err(CacheError::Io { .. })));
    }

    #[test]
    fn garbage_and_truncation_are_invalid_headers() {
        let (_dir, store) = make_store();
        store.ensure_dir().unwrap();
        std::fs::write(store.path("short.kirc"), b"AB").unwrap();
        std::fs::write(store.path("junk.kirc"), b"\xff\xff\x00\x00junk").unwrap();
        assert!(matches!(
            store.read("short.kirc"),
            Err(CacheError::InvalidHeader { .. })
        ));
        assert!(matches!(
            store.read("junk.kirc"),
            Err(CacheError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn wrong_magic_version_and_checksum() {
        let (_dir, store) = make_store();
        let good = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            tool_version: "0.1.0".to_string(),
            checksum: ContentHash::from_bytes(b"data"),
        };

        let mut bad_magic = good.clone();
        bad_magic.magic = *b"BAAD";
        write_raw(&store, "magic.kirc", &bad_magic, b"data");
        assert!(matches!(
            store.read("magic.kirc"),
            Err(CacheError::InvalidHeader { .. })
        ));

        let mut old = good.clone();
        old.format_version = 999;
        write_raw(&store, "old.kirc", &old, b"data");
        assert!(matches!(
            store.read("old.kirc"),
            Err(CacheError::VersionMismatch { actual: 999, .. })
        ));

        write_raw(&store, "tampered.kirc", &good, b"tampered");
        assert!(matches!(
            store.read("tampered.kirc"),
            Err(CacheError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn gc_keeps_live_files_only() {
        let (_dir, store) = make_store();
        store.write("keep.kirc", b"a", "0.1.0").unwrap();
        store.write("drop.kirc", b"b", "0.1.0").unwrap();
        std::fs::write(store.path("notes.txt"), b"not an artifact").unwrap();

        assert_eq!(store.gc(&["keep.kirc"]).unwrap(), 1);
        assert!(store.exists("keep.kirc"));
        assert!(!store.exists("drop.kirc"));
        assert!(store.path("notes.txt").exists());
    }

    #[test]
    fn remove_reports_whether_a_file_existed() {
        let (_dir, store) = make_store();
        store.write("x.kirc", b"x", "0.1.0").unwrap();
        assert!(store.remove("x.kirc").unwrap());
        assert!(!store.remove("x.kirc").unwrap());
    }

    #[test]
    fn gc_without_directory() {
        let (_dir, store) = make_store();
        assert_eq!(store.gc(&[]).unwrap(), 0);
    }
}
