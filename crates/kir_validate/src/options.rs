//! Validation settings and presets.

use kir_config::{Profile, ValidationConfig};

/// Switches and limits for the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Verify section checksums.
    pub crc_check: bool,
    /// Run the semantic tier.
    pub semantic: bool,
    /// Report implausible but valid values, such as huge pixel sizes, as
    /// advisories.
    pub plausibility: bool,
    /// Reject documents from a newer minor version instead of warning.
    pub strict_version: bool,
    /// Accept a document whose manifest section is unusable, with empty
    /// reactive state, instead of rejecting it.
    pub manifest_degradation: bool,
    /// Deepest allowed tree (the root is depth 1).
    pub max_tree_depth: usize,
    /// Largest allowed component count.
    pub max_component_count: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            crc_check: true,
            semantic: true,
            plausibility: true,
            strict_version: false,
            manifest_degradation: true,
            max_tree_depth: 100,
            max_component_count: 100_000,
        }
    }
}

impl ValidationOptions {
    /// Tighter limits; newer versions and degraded manifests are rejected.
    pub fn strict() -> Self {
        Self {
            strict_version: true,
            manifest_degradation: false,
            max_tree_depth: 50,
            max_component_count: 10_000,
            ..Self::default()
        }
    }

    /// No checksum or semantic checks, generous limits.
    pub fn permissive() -> Self {
        Self {
            crc_check: false,
            semantic: false,
            plausibility: false,
            max_tree_depth: 1000,
            max_component_count: 1_000_000,
            ..Self::default()
        }
    }

    /// Returns the preset for a profile.
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Default => Self::default(),
            Profile::Strict => Self::strict(),
            Profile::Permissive => Self::permissive(),
        }
    }

    /// Builds options from the `[validation]` config section: the profile
    /// preset with any explicit fields applied on top.
    pub fn from_config(config: &ValidationConfig) -> Self {
        let base = Self::for_profile(config.profile);
        Self {
            crc_check: config.crc_check.unwrap_or(base.crc_check),
            semantic: config.semantic.unwrap_or(base.semantic),
            plausibility: config.plausibility.unwrap_or(base.plausibility),
            strict_version: config.strict_version.unwrap_or(base.strict_version),
            manifest_degradation: config
                .manifest_degradation
                .unwrap_or(base.manifest_degradation),
            max_tree_depth: config.max_tree_depth.unwrap_or(base.max_tree_depth),
            max_component_count: config
                .max_component_count
                .unwrap_or(base.max_component_count),
        }
    }
}
