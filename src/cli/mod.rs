//! Command-line interface for foundry.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, InstallArgs, Step, VerifyAptArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
