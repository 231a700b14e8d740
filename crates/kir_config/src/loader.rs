//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::KirConfig;
use std::path::Path;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "kir.toml";

/// Loads the configuration from `<project_dir>/kir.toml`.
///
/// A missing file yields the default configuration.
pub fn load_config(project_dir: &Path) -> Result<KirConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(KirConfig::default());
    }
    load_config_file(&path)
}

/// Loads the configuration from an explicit path. The file must exist.
pub fn load_config_file(path: &Path) -> Result<KirConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kir.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<KirConfig, ConfigError> {
    let config: KirConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &KirConfig) -> Result<(), ConfigError> {
    if config.validation.max_tree_depth == Some(0) {
        return Err(ConfigError::ValidationError(
            "validation.max_tree_depth must be > 0".to_string(),
        ));
    }
    if config.validation.max_component_count == Some(0) {
        return Err(ConfigError::ValidationError(
            "validation.max_component_count must be > 0".to_string(),
        ));
    }
    if config.cache.enabled && config.cache.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "cache.dir must not be empty".to_string(),
        ));
    }
    if config.reload.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "reload.poll_interval_ms must be > 0".to_string(),
        ));
    }
    for ext in &config.reload.extensions {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::ValidationError(format!(
                "reload.extensions entry '{ext}' must be a bare extension like \"kry\""
            )));
        }
    }
    Ok(())
}
