//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `init`: Write `.glotngrc.json` and seed the languages file
//! - `scan`: Classify the source tree and report translatable text
//! - `extract`: Generate keys, update locale files and rewrite sources
//! - `revert`: Replace key references with their base-locale text
//! - `prune`: Remove keys from every locale file
//! - `manifest`: Rewrite `translate-manifest.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::classify::AggressiveMode;
use crate::core::store::UpdateMode;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Init(cmd)) => cmd.common.verbose,
            Some(Command::Scan(cmd)) => cmd.common.verbose,
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Revert(cmd)) => cmd.common.verbose,
            Some(Command::Prune(cmd)) => cmd.common.verbose,
            Some(Command::Manifest(cmd)) => cmd.common.verbose,
            None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project directory to search for .glotngrc.json from
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Source directory (overrides config file)
    #[arg(long)]
    pub src_dir: Option<PathBuf>,

    /// Locale output directory (overrides config file)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ClassifyArgs {
    /// How readily call-argument literals are accepted (overrides config file)
    #[arg(long, value_enum)]
    pub aggressive_mode: Option<AggressiveMode>,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub classify: ClassifyArgs,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub classify: ClassifyArgs,

    /// Locale file update strategy (overrides config file)
    #[arg(long, value_enum)]
    pub update_mode: Option<UpdateMode>,

    /// Actually write files (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct RevertCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually write files (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct PruneCommand {
    /// Keys to remove; `*` matches within one key segment
    #[arg(required = true)]
    pub keys: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually delete keys (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct ManifestCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize .glotngrc.json and the languages file
    Init(InitCommand),
    /// Report translatable text without changing anything
    Scan(ScanCommand),
    /// Extract text into locale files and replace it with translate references
    Extract(ExtractCommand),
    /// Restore literal text from translate references
    Revert(RevertCommand),
    /// Remove keys from the base and every target locale file
    Prune(PruneCommand),
    /// Rewrite translate-manifest.json from the locale files on disk
    Manifest(ManifestCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_overrides() {
        let args = Arguments::try_parse_from([
            "glot-ng",
            "extract",
            "--apply",
            "--update-mode",
            "recreate",
            "--aggressive-mode",
            "high",
            "--src-dir",
            "app",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose());
        let Some(Command::Extract(cmd)) = args.command else {
            panic!("expected extract");
        };
        assert!(cmd.apply);
        assert_eq!(cmd.update_mode, Some(UpdateMode::Recreate));
        assert_eq!(cmd.classify.aggressive_mode, Some(AggressiveMode::High));
        assert_eq!(cmd.common.src_dir, Some(PathBuf::from("app")));
    }

    #[test]
    fn test_prune_requires_keys() {
        assert!(Arguments::try_parse_from(["glot-ng", "prune"]).is_err());
        let args = Arguments::try_parse_from(["glot-ng", "prune", "A.B", "A.*"]).unwrap();
        let Some(Command::Prune(cmd)) = args.command else {
            panic!("expected prune");
        };
        assert_eq!(cmd.keys, vec!["A.B", "A.*"]);
        assert!(!cmd.apply);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Arguments::command().debug_assert();
    }
}
