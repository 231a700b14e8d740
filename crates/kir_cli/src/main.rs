//! KIR CLI: inspection tooling for encoded component IR documents.
//!
//! Provides `kir inspect` for dumping a document's header, sections, tree and
//! manifest, `kir validate` for running the three validation tiers, `kir diff`
//! for comparing two documents, and `kir cache` for maintaining the document
//! cache.

#![warn(missing_docs)]

mod cache;
mod diff;
mod inspect;
mod logging;
mod project;
#[cfg(test)]
mod testing;
mod validate;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// KIR: component IR inspection tool.
#[derive(Parser, Debug)]
#[command(name = "kir", version, about = "Component IR inspection tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `kir.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the header, sections, tree and manifest of a document.
    Inspect(InspectArgs),
    /// Decode a document and run every validation tier.
    Validate(ValidateArgs),
    /// Compare two documents.
    Diff(DiffArgs),
    /// Maintain the document cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Arguments for the `kir inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Encoded document to inspect.
    pub file: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Skip the component tree listing.
    #[arg(long)]
    pub no_tree: bool,
}

/// Arguments for the `kir validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Encoded document to validate.
    pub file: String,

    /// Validation profile; overrides the one in `kir.toml`.
    #[arg(short, long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `kir diff` subcommand.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// The older document.
    pub old: String,

    /// The newer document.
    pub new: String,

    /// Output format for the change set.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Exit with status 1 when the documents differ.
    #[arg(long)]
    pub exit_code: bool,
}

/// Cache maintenance commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CacheCommand {
    /// Remove index entries without artifacts and artifacts without entries.
    Gc,
    /// Remove every cached document.
    Clear,
}

/// Validation profile selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// Checksums and semantic checks on, newer versions tolerated.
    Default,
    /// Tighter limits, newer versions rejected.
    Strict,
    /// Checksums and semantic checks off.
    Permissive,
}

impl From<ProfileArg> for kir_config::Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Default => kir_config::Profile::Default,
            ProfileArg::Strict => kir_config::Profile::Strict,
            ProfileArg::Permissive => kir_config::Profile::Permissive,
        }
    }
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    logging::init(&global);

    let result = match cli.command {
        Command::Inspect(ref args) => inspect::run(args, &global),
        Command::Validate(ref args) => validate::run(args, &global),
        Command::Diff(ref args) => diff::run(args, &global),
        Command::Cache(ref command) => cache::run(command, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_inspect_default() {
        let cli = Cli::parse_from(["kir", "inspect", "app.kir"]);
        match cli.command {
            Command::Inspect(ref args) => {
                assert_eq!(args.file, "app.kir");
                assert_eq!(args.format, ReportFormat::Text);
                assert!(!args.no_tree);
            }
            _ => panic!("expected Inspect command"),
        }
    }

    #[test]
    fn parse_validate_with_profile() {
        let cli = Cli::parse_from([
            "kir", "validate", "app.kir", "--profile", "strict", "--format", "json",
        ]);
        match cli.command {
            Command::Validate(ref args) => {
                assert_eq!(args.file, "app.kir");
                assert_eq!(args.profile, Some(ProfileArg::Strict));
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn parse_validate_default_profile_is_unset() {
        let cli = Cli::parse_from(["kir", "validate", "app.kir"]);
        match cli.command {
            Command::Validate(ref args) => assert!(args.profile.is_none()),
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn parse_diff() {
        let cli = Cli::parse_from(["kir", "diff", "old.kir", "new.kir", "--exit-code"]);
        match cli.command {
            Command::Diff(ref args) => {
                assert_eq!(args.old, "old.kir");
                assert_eq!(args.new, "new.kir");
                assert!(args.exit_code);
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Diff command"),
        }
    }

    #[test]
    fn parse_cache_subcommands() {
        let cli = Cli::parse_from(["kir", "cache", "gc"]);
        assert!(matches!(cli.command, Command::Cache(CacheCommand::Gc)));
        let cli = Cli::parse_from(["kir", "cache", "clear"]);
        assert!(matches!(cli.command, Command::Cache(CacheCommand::Clear)));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["kir", "--quiet", "--color", "never", "cache", "gc"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kir", "inspect", "a.kir", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["kir", "--config", "/path/to/kir.toml", "cache", "clear"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/kir.toml"));
    }

    #[test]
    fn profile_arg_maps_to_config_profile() {
        assert_eq!(
            kir_config::Profile::from(ProfileArg::Permissive),
            kir_config::Profile::Permissive
        );
        assert_eq!(
            kir_config::Profile::from(ProfileArg::Default),
            kir_config::Profile::Default
        );
    }

    #[test]
    fn rejects_unknown_profile() {
        let result = Cli::try_parse_from(["kir", "validate", "a.kir", "--profile", "lenient"]);
        assert!(result.is_err());
    }
}
