//! `tracing` subscriber setup.
//!
//! `RUST_LOG` takes precedence; otherwise the level follows `--verbose` and
//! `--quiet`. Output goes to stderr so JSON reports on stdout stay clean.

use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

/// Installs the global subscriber. A second call is a no-op.
pub fn init(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(global.verbose)
        .try_init();
}

fn default_directive(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}
