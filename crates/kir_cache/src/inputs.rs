//! Compiler inputs and the cache key derived from them.

use kir_codec::FORMAT_VERSION;
use kir_common::{ContentHash, ContentHasher};
use std::collections::BTreeMap;

/// Compiler options as string pairs.
///
/// Keys and values are trimmed on insert and kept sorted, so two option sets
/// that differ only in order or surrounding whitespace share a fingerprint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    entries: BTreeMap<String, String>,
}

impl CompileOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an earlier value.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.entries
            .insert(key.trim().to_string(), value.trim().to_string());
        self
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key.trim()).map(String::as_str)
    }

    /// Canonical `key=value` lines in key order.
    pub fn fingerprint(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for CompileOptions {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut options = CompileOptions::new();
        for (k, v) in iter {
            options.set(k, v);
        }
        options
    }
}

/// XXH3-128 over the codec format version, the source bytes and the option
/// fingerprint.
pub fn cache_key(source: &[u8], options: &CompileOptions) -> ContentHash {
    ContentHasher::new()
        .update(&FORMAT_VERSION.to_le_bytes())
        .update(source)
        .update(options.fingerprint().as_bytes())
        .finish()
}
