//! `kir cache`: maintenance of the document cache named in `[cache]`.

use std::path::Path;

use kir_cache::DocumentCache;
use kir_validate::ValidationOptions;

use crate::{project, CacheCommand, GlobalArgs};

/// Runs a `kir cache` subcommand. A cache directory that does not exist yet
/// is left alone.
pub fn run(command: &CacheCommand, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = project::load(global)?;
    let dir = project.cache_dir();
    if !dir.is_dir() {
        if !global.quiet {
            eprintln!("no cache at {}", dir.display());
        }
        return Ok(0);
    }

    let message = execute(command, &dir, project.validation(None))?;
    if !global.quiet {
        eprintln!("{message}");
    }
    Ok(0)
}

/// Applies `command` to the cache in `dir` and describes what happened.
pub fn execute(
    command: &CacheCommand,
    dir: &Path,
    validation: ValidationOptions,
) -> Result<String, kir_cache::CacheError> {
    let mut cache = DocumentCache::open(dir, validation)?;
    match command {
        CacheCommand::Gc => {
            let removed = cache.gc()?;
            Ok(format!(
                "removed {removed} stale item(s), {} entries remain",
                cache.len()
            ))
        }
        CacheCommand::Clear => {
            let entries = cache.len();
            cache.clear()?;
            Ok(format!("cleared {entries} entries from {}", dir.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_document;
    use kir_cache::CompileOptions;
    use kir_ir::Document;

    fn compile(_: &[u8], _: &CompileOptions) -> Result<Document, std::io::Error> {
        Ok(sample_document())
    }

    fn populated(dir: &Path) {
        let mut cache = DocumentCache::open(dir, ValidationOptions::default()).unwrap();
        cache
            .get_or_compile(b"a", &CompileOptions::new(), compile)
            .unwrap();
        cache
            .get_or_compile(b"b", &CompileOptions::new(), compile)
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_empties_cache() {
        let dir = tempfile::tempdir().unwrap();
        populated(dir.path());

        let message = execute(&CacheCommand::Clear, dir.path(), ValidationOptions::default())
            .unwrap();
        assert!(message.starts_with("cleared 2 entries"));
        let cache = DocumentCache::open(dir.path(), ValidationOptions::default()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn gc_on_healthy_cache_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        populated(dir.path());

        let message =
            execute(&CacheCommand::Gc, dir.path(), ValidationOptions::default()).unwrap();
        assert_eq!(message, "removed 0 stale item(s), 2 entries remain");
    }
}
