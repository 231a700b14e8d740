//! Configuration types deserialized from `kir.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The top-level configuration parsed from `kir.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct KirConfig {
    /// Validation profile and per-check overrides.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Compiled document cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Hot-reload watcher settings.
    #[serde(default)]
    pub reload: ReloadConfig,
}

/// Named validation preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Checksums and semantic checks on, newer versions tolerated.
    #[default]
    Default,
    /// Tighter limits, newer versions rejected.
    Strict,
    /// Checksums and semantic checks off, generous limits.
    Permissive,
}

/// The `[validation]` section.
///
/// The profile selects a preset; any field set explicitly overrides the
/// corresponding preset value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    /// Preset the overrides apply on top of.
    #[serde(default)]
    pub profile: Profile,
    /// Verify header and section checksums.
    pub crc_check: Option<bool>,
    /// Run the semantic tier.
    pub semantic: Option<bool>,
    /// Report implausible values as advisories.
    pub plausibility: Option<bool>,
    /// Treat a newer format version as fatal instead of advisory.
    pub strict_version: Option<bool>,
    /// Allow a corrupt manifest section to degrade to an empty manifest.
    pub manifest_degradation: Option<bool>,
    /// Maximum allowed tree depth.
    pub max_tree_depth: Option<usize>,
    /// Maximum allowed number of components.
    pub max_component_count: Option<usize>,
}

/// The `[cache]` section.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Cache directory, relative to the project directory unless absolute.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Whether compiled documents are cached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            enabled: true,
        }
    }
}

/// The `[reload]` section.
#[derive(Debug, Deserialize)]
pub struct ReloadConfig {
    /// Quiet period after the last change before a rebuild starts.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// How often watched files are polled for modification.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// File extensions (without the dot) that trigger a rebuild.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            extensions: default_extensions(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".kir-cache")
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_extensions() -> Vec<String> {
    vec!["kry".to_string()]
}
