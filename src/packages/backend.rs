//! Package manager backends.
//!
//! The [`PackageBackend`] trait is the command surface the reconciler needs
//! from each ecosystem: a version probe, an installed listing and its parser,
//! a single-package install, and (apt only) an index refresh plus
//! availability validation. Backends only build [`CommandSpec`]s; running them
//! is the job of a [`CommandRunner`](crate::shell::CommandRunner).

use std::collections::BTreeMap;

use crate::shell::CommandSpec;

use super::manager::ResolvedManager;
use super::probe::{self, InstalledSet};

/// Command surface for one package ecosystem.
pub trait PackageBackend {
    /// Short name used in messages (`brew`, `apt`, `pipx`, `npm`).
    fn name(&self) -> &'static str;

    /// Executable that must respond before anything else is attempted.
    fn tool(&self) -> &'static str;

    /// System manager this backend stands for, if it is one.
    ///
    /// Entries for system managers are normalized against it (apt overrides);
    /// language-level backends use the declared name as-is.
    fn manager(&self) -> Option<ResolvedManager> {
        None
    }

    /// Command proving the tool is reachable.
    fn version_command(&self) -> CommandSpec {
        CommandSpec::new(self.tool(), ["--version"])
    }

    /// Command listing installed packages.
    fn list_installed_command(&self) -> CommandSpec;

    /// Parse the output of [`list_installed_command`](Self::list_installed_command).
    fn parse_installed(&self, stdout: &str) -> InstalledSet;

    /// Command installing exactly one package.
    fn install_command(&self, package: &str) -> CommandSpec;

    /// Command refreshing the package index before any per-package checks.
    fn refresh_index_command(&self) -> Option<CommandSpec> {
        None
    }

    /// Whether candidates must be checked against repository metadata first.
    fn validates_availability(&self) -> bool {
        false
    }
}

/// Homebrew.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrewBackend;

impl PackageBackend for BrewBackend {
    fn name(&self) -> &'static str {
        "brew"
    }

    fn tool(&self) -> &'static str {
        "brew"
    }

    fn manager(&self) -> Option<ResolvedManager> {
        Some(ResolvedManager::Brew)
    }

    fn list_installed_command(&self) -> CommandSpec {
        CommandSpec::new("brew", ["list"])
    }

    fn parse_installed(&self, stdout: &str) -> InstalledSet {
        probe::parse_tokens(stdout)
    }

    fn install_command(&self, package: &str) -> CommandSpec {
        CommandSpec::new("brew", ["install", package])
    }
}

/// apt-get / dpkg.
#[derive(Debug, Default, Clone, Copy)]
pub struct AptBackend {
    sudo: bool,
}

impl AptBackend {
    /// Create an apt backend; `sudo` wraps the mutating apt-get commands.
    pub fn new(sudo: bool) -> Self {
        Self { sudo }
    }

    fn apt_get<const N: usize>(&self, args: [&str; N]) -> CommandSpec {
        let spec = CommandSpec::new("apt-get", args);
        if self.sudo {
            spec.with_sudo()
        } else {
            spec
        }
    }
}

impl PackageBackend for AptBackend {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn tool(&self) -> &'static str {
        "apt-get"
    }

    fn manager(&self) -> Option<ResolvedManager> {
        Some(ResolvedManager::Apt)
    }

    fn list_installed_command(&self) -> CommandSpec {
        CommandSpec::new("dpkg-query", ["-W", "-f", "${Package}\t${db:Status-Status}\n"])
    }

    fn parse_installed(&self, stdout: &str) -> InstalledSet {
        probe::parse_dpkg_status(stdout)
    }

    fn install_command(&self, package: &str) -> CommandSpec {
        self.apt_get(["install", "-y", package])
    }

    fn refresh_index_command(&self) -> Option<CommandSpec> {
        Some(self.apt_get(["update"]))
    }

    fn validates_availability(&self) -> bool {
        true
    }
}

/// pipx-installed Python applications.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipxBackend;

impl PackageBackend for PipxBackend {
    fn name(&self) -> &'static str {
        "pipx"
    }

    fn tool(&self) -> &'static str {
        "pipx"
    }

    fn list_installed_command(&self) -> CommandSpec {
        CommandSpec::new("pipx", ["list", "--short"])
    }

    fn parse_installed(&self, stdout: &str) -> InstalledSet {
        probe::parse_first_tokens(stdout)
    }

    fn install_command(&self, package: &str) -> CommandSpec {
        CommandSpec::new("pipx", ["install", package])
    }
}

/// Global npm packages.
#[derive(Debug, Default, Clone)]
pub struct NpmBackend {
    install_env: BTreeMap<String, String>,
}

impl NpmBackend {
    /// Create an npm backend whose installs run with `install_env` added.
    pub fn new(install_env: BTreeMap<String, String>) -> Self {
        Self { install_env }
    }
}

impl PackageBackend for NpmBackend {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn tool(&self) -> &'static str {
        "npm"
    }

    fn list_installed_command(&self) -> CommandSpec {
        CommandSpec::new("npm", ["list", "-g", "--depth=0"])
    }

    fn parse_installed(&self, stdout: &str) -> InstalledSet {
        probe::parse_npm_tree(stdout)
    }

    fn install_command(&self, package: &str) -> CommandSpec {
        self.install_env.iter().fold(
            CommandSpec::new("npm", ["install", "-g", package]),
            |spec, (key, value)| spec.with_env(key, value),
        )
    }
}

/// Backend for a resolved system manager.
pub fn system_backend(manager: ResolvedManager, apt_sudo: bool) -> Box<dyn PackageBackend> {
    match manager {
        ResolvedManager::Brew => Box::new(BrewBackend),
        ResolvedManager::Apt => Box::new(AptBackend::new(apt_sudo)),
    }
}
