//! Errors that stop a command.
//!
//! [`FoundryError`] covers config loading and command execution. Failures
//! inside one package source never surface here: the reconciler folds them
//! into a [`SourceOutcome`](crate::packages::SourceOutcome) so other sources
//! keep going.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by config loading, command execution and the CLI commands.
#[derive(Debug, Error)]
pub enum FoundryError {
    /// The config directory does not exist.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// A YAML file in the config directory could not be decoded.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// `settings.yaml` decoded but holds an unusable value.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// External command could not be started or exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External command exceeded its time limit and was killed.
    #[error("Command timed out after {seconds}s: {command}")]
    CommandTimedOut { command: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// `Result` with [`FoundryError`].
pub type Result<T> = std::result::Result<T, FoundryError>;
