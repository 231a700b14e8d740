//! Parsing and validation of `kir.toml` configuration files.
//!
//! This crate reads the optional workspace configuration and produces a
//! strongly-typed [`KirConfig`] covering validation profiles, the document
//! cache, and hot-reload watcher settings. Every section is optional; a missing
//! file is equivalent to an empty one.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
