//! Configuration loading and parsing.
//!
//! - Schema definitions in [`schema`]
//! - Config directory discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use foundry::config::ConfigDir;
//! use foundry::packages::Source;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("pipx.yaml"), "packages:\n  - cookiecutter\n").unwrap();
//!
//! let dir = ConfigDir::open(temp.path()).unwrap();
//! let entries = dir.load_package_list(Source::Pipx).unwrap().unwrap();
//! assert_eq!(entries.len(), 1);
//! assert!(dir.load_package_list(Source::Npm).unwrap().is_none());
//! ```

pub mod loader;
pub mod schema;

pub use loader::{ConfigDir, SETTINGS_FILE};
pub use schema::{MalformedEntryPolicy, PackageList, Settings, SudoPolicy};
