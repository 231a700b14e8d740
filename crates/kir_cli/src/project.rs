//! Project directory and configuration resolution shared by all commands.

use std::path::{Path, PathBuf};

use kir_config::KirConfig;
use kir_validate::ValidationOptions;

use crate::{GlobalArgs, ProfileArg};

/// Loaded configuration and the directory relative paths resolve against.
pub struct Project {
    /// Directory holding `kir.toml`, or the working directory.
    pub dir: PathBuf,
    /// Parsed configuration.
    pub config: KirConfig,
}

impl Project {
    /// Validation options from `[validation]`, with the profile replaced by
    /// `profile` when given. Explicit overrides in the file still apply.
    pub fn validation(&self, profile: Option<ProfileArg>) -> ValidationOptions {
        match profile {
            Some(profile) => {
                let mut config = self.config.validation.clone();
                config.profile = profile.into();
                ValidationOptions::from_config(&config)
            }
            None => ValidationOptions::from_config(&self.config.validation),
        }
    }

    /// The cache directory, resolved against the project directory.
    pub fn cache_dir(&self) -> PathBuf {
        resolve(&self.dir, &self.config.cache.dir)
    }
}

/// Loads `--config` if given, otherwise `kir.toml` in the working directory
/// (defaults when absent).
pub fn load(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    match &global.config {
        Some(path) => {
            let path = Path::new(path);
            let config = kir_config::load_config_file(path)?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(Project { dir, config })
        }
        None => {
            let dir = std::env::current_dir()?;
            let config = kir_config::load_config(&dir)?;
            Ok(Project { dir, config })
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn global_with(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config,
        }
    }

    #[test]
    fn explicit_config_sets_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kir.toml");
        fs::write(&path, "[cache]\ndir = \"build/cache\"\n").unwrap();

        let project = load(&global_with(Some(path.display().to_string()))).unwrap();
        assert_eq!(project.dir, dir.path());
        assert_eq!(project.cache_dir(), dir.path().join("build/cache"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load(&global_with(Some(path.display().to_string()))).is_err());
    }

    #[test]
    fn profile_flag_overrides_file_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kir.toml");
        fs::write(&path, "[validation]\nprofile = \"permissive\"\n").unwrap();
        let project = load(&global_with(Some(path.display().to_string()))).unwrap();

        assert_eq!(project.validation(None), ValidationOptions::permissive());
        assert_eq!(
            project.validation(Some(ProfileArg::Strict)),
            ValidationOptions::strict()
        );
    }

    #[test]
    fn absolute_cache_dir_is_kept() {
        let base = Path::new("/project");
        let abs = Path::new("/var/cache/kir");
        assert_eq!(resolve(base, abs), abs);
        assert_eq!(resolve(base, Path::new("c")), base.join("c"));
    }
}
