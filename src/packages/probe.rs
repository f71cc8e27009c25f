//! Installed-set probing.
//!
//! A probe that fails for any reason (manager missing, timeout, non-zero
//! exit) collapses to an empty set: everything is then treated as a
//! candidate, and installing an already-present package is a no-op for every
//! supported manager.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{FoundryError, Result};
use crate::shell::CommandRunner;

use super::backend::PackageBackend;

/// Package identifiers a manager reports as installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet(HashSet<String>);

impl InstalledSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `package` is installed.
    pub fn contains(&self, package: &str) -> bool {
        self.0.contains(package)
    }

    /// Number of installed packages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InstalledSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Query `backend` for its installed set, failing open to empty.
pub fn probe_installed(
    backend: &dyn PackageBackend,
    runner: &dyn CommandRunner,
    timeout: Duration,
) -> InstalledSet {
    match try_probe_installed(backend, runner, timeout) {
        Ok(installed) => {
            tracing::debug!("{} reports {} installed packages", backend.name(), installed.len());
            installed
        }
        Err(e) => {
            tracing::debug!(
                "Could not list installed {} packages ({}); assuming none installed",
                backend.name(),
                e
            );
            InstalledSet::new()
        }
    }
}

/// Query `backend` for its installed set, surfacing failures.
pub fn try_probe_installed(
    backend: &dyn PackageBackend,
    runner: &dyn CommandRunner,
    timeout: Duration,
) -> Result<InstalledSet> {
    let spec = backend.list_installed_command().with_timeout(timeout);
    let result = runner.run(&spec)?;
    if !result.success {
        return Err(FoundryError::CommandFailed {
            command: spec.display(),
            code: result.exit_code,
        });
    }
    Ok(backend.parse_installed(&result.stdout))
}

/// Whitespace-delimited tokens (`brew list`).
pub fn parse_tokens(stdout: &str) -> InstalledSet {
    stdout.split_whitespace().collect()
}

/// First token of each non-blank line (`pipx list --short`).
pub fn parse_first_tokens(stdout: &str) -> InstalledSet {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect()
}

/// `<name>\t<status>` lines from dpkg-query, keeping fully installed packages.
pub fn parse_dpkg_status(stdout: &str) -> InstalledSet {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, status) = line.split_once('\t')?;
            (status.trim() == "installed" && !name.trim().is_empty()).then(|| name.trim())
        })
        .collect()
}

/// Package names from the `npm list -g --depth=0` tree.
///
/// The first line is the global prefix path; `npm ...` lines are warnings.
/// Entries look like `├── typescript@5.4.5` or `└── @scope/pkg@1.0.0`.
pub fn parse_npm_tree(stdout: &str) -> InstalledSet {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('/') && !line.starts_with("npm"))
        .filter_map(|line| {
            let entry = line.trim_start_matches(is_tree_glyph);
            let token = entry.split_whitespace().next()?;
            Some(strip_version(token))
        })
        .filter(|name| !name.is_empty())
        .collect()
}

fn is_tree_glyph(c: char) -> bool {
    matches!(c, '├' | '└' | '│' | '─' | '┬' | '+' | '`' | '|' | '-' | ' ')
}

fn strip_version(token: &str) -> &str {
    match token.rfind('@') {
        Some(idx) if idx > 0 => &token[..idx],
        _ => token,
    }
}
