//! Foundry - Developer environment bootstrap.
//!
//! Foundry reads declarative package lists from a config directory and drives
//! the host's package managers (Homebrew or apt, pipx, npm) until everything
//! declared is installed. Packages apt cannot provide are recorded in a gap
//! log for manual follow-up.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Config directory loading and settings
//! - [`envrc`] - Seeding `~/.envrc` for direnv
//! - [`error`] - Error types and result aliases
//! - [`packages`] - Package normalization, probing and reconciliation
//! - [`shell`] - External command execution
//! - [`ui`] - Terminal output, spinners and event rendering
//!
//! # Example
//!
//! ```
//! use foundry::packages::{
//!     PackageEntry, PipxBackend, ReconcileEvent, ReconcileOptions, Reconciler, Source,
//! };
//! use foundry::shell::MockRunner;
//!
//! let mut runner = MockRunner::new();
//! runner.respond("pipx list --short", "black 24.3.0\n");
//!
//! let entries = vec![PackageEntry::from("black"), PackageEntry::from("cookiecutter")];
//! let mut events: Vec<ReconcileEvent> = Vec::new();
//! let outcome = Reconciler::new(&runner, ReconcileOptions::default()).reconcile(
//!     Source::Pipx,
//!     &entries,
//!     &PipxBackend,
//!     &mut events,
//! );
//!
//! assert!(outcome.success());
//! assert_eq!(runner.invocations_matching("pipx install"), vec!["pipx install cookiecutter"]);
//! ```

pub mod cli;
pub mod config;
pub mod envrc;
pub mod error;
pub mod packages;
pub mod shell;
pub mod ui;

pub use error::{FoundryError, Result};
