//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::packages::Source;

/// Foundry - Developer environment bootstrap.
#[derive(Debug, Parser)]
#[command(name = "foundry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding packages.yaml, pipx.yaml, npm.yaml and envrc_template
    #[arg(
        short,
        long,
        global = true,
        env = "FOUNDRY_CONFIG_DIR",
        default_value = "config"
    )]
    pub config_dir: PathBuf,

    /// File that records packages apt cannot provide (default: <config-dir>/../TODO.md)
    #[arg(long, global = true, env = "FOUNDRY_GAP_LOG")]
    pub gap_log: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install everything declared in the config directory (default if no command specified)
    Install(InstallArgs),

    /// Check that every system package is available via apt
    VerifyApt(VerifyAptArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// A step of the install command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// System packages (brew or apt)
    System,
    /// pipx packages
    Pipx,
    /// Global npm packages
    Npm,
    /// ~/.envrc from the template
    Envrc,
}

impl From<Source> for Step {
    fn from(source: Source) -> Self {
        match source {
            Source::System => Self::System,
            Source::Pipx => Self::Pipx,
            Source::Npm => Self::Npm,
        }
    }
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InstallArgs {
    /// Run only these steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<Step>,

    /// Skip these steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<Step>,

    /// Show what would be installed without refreshing, recording or installing
    #[arg(long)]
    pub dry_run: bool,
}

impl InstallArgs {
    /// Whether `step` runs under these arguments.
    pub fn selects(&self, step: Step) -> bool {
        (self.only.is_empty() || self.only.contains(&step)) && !self.skip.contains(&step)
    }
}

/// Arguments for the `verify-apt` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VerifyAptArgs {
    /// Report missing packages without writing the gap log
    #[arg(long)]
    pub no_record: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
