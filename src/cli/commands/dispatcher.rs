//! Routing parsed arguments to a [`Command`].
//!
//! Every command gets the same [`CommandRunner`], so tests can swap in a
//! scripted one through [`CommandDispatcher::with_runner`].

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, InstallArgs};
use crate::error::Result;
use crate::shell::{CommandRunner, SystemRunner};
use crate::ui::UserInterface;

/// A subcommand ready to run.
///
/// `Err` is reserved for problems that stop the command before it starts,
/// such as a missing config directory. Failed installs are an `Ok` result
/// with a non-zero exit code.
pub trait Command {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Process outcome of a command.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: i32,
}

impl CommandResult {
    /// Exit code 0.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Success or exit code 1.
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::success()
        } else {
            Self::failure(1)
        }
    }
}

/// Builds the command for a parsed [`Cli`] and runs it.
pub struct CommandDispatcher {
    config_dir: PathBuf,
    gap_log: Option<PathBuf>,
    runner: Box<dyn CommandRunner>,
}

impl CommandDispatcher {
    /// Create a dispatcher that runs package managers on this host.
    pub fn new(config_dir: PathBuf, gap_log: Option<PathBuf>) -> Self {
        Self {
            config_dir,
            gap_log,
            runner: Box::new(SystemRunner),
        }
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Config directory every command reads.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Run the selected subcommand, or `install` when none was given.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Install(args)) => self.install(args.clone()).execute(ui),
            Some(Commands::VerifyApt(args)) => {
                let cmd = super::verify_apt::VerifyAptCommand::new(
                    &self.config_dir,
                    self.gap_log.as_deref(),
                    args.clone(),
                    self.runner.as_ref(),
                );
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => self.install(InstallArgs::default()).execute(ui),
        }
    }

    fn install(&self, args: InstallArgs) -> super::install::InstallCommand<'_> {
        super::install::InstallCommand::new(
            &self.config_dir,
            self.gap_log.as_deref(),
            args,
            self.runner.as_ref(),
        )
    }
}
