//! Configuration schema definitions.
//!
//! This module contains the structs that map to the YAML files in the
//! config directory: the per-source package lists and `settings.yaml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FoundryError, Result};
use crate::packages::PackageEntry;
use crate::shell::{find_in_path, is_elevated};

/// A `packages.yaml`, `pipx.yaml` or `npm.yaml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageList {
    /// Declared entries, in file order. `packages:` with no value is empty.
    pub packages: Option<Vec<PackageEntry>>,
}

impl PackageList {
    /// The declared entries.
    pub fn into_entries(self) -> Vec<PackageEntry> {
        self.packages.unwrap_or_default()
    }
}

/// Optional `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Gap log location (relative paths are relative to the config directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_log: Option<PathBuf>,

    /// Deadline for version, listing and availability probes
    pub probe_timeout_secs: u64,

    /// How malformed package entries are surfaced
    pub malformed_entries: MalformedEntryPolicy,

    /// Whether apt-get runs through sudo
    pub apt_sudo: SudoPolicy,

    /// Extra environment for npm installs (variables already set are left alone)
    pub npm_env: BTreeMap<String, String>,

    /// Template copied to ~/.envrc (relative to the config directory)
    pub envrc_template: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gap_log: None,
            probe_timeout_secs: 10,
            malformed_entries: MalformedEntryPolicy::default(),
            apt_sudo: SudoPolicy::default(),
            npm_env: default_npm_env(),
            envrc_template: PathBuf::from("envrc_template"),
        }
    }
}

fn default_npm_env() -> BTreeMap<String, String> {
    BTreeMap::from([("PUPPETEER_SKIP_DOWNLOAD".to_string(), "1".to_string())])
}

impl Settings {
    /// Probe deadline as a duration.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_secs == 0 {
            return Err(FoundryError::ConfigValidationError {
                message: "probe_timeout_secs must be greater than zero".to_string(),
            });
        }
        if let Some(key) = self.npm_env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(FoundryError::ConfigValidationError {
                message: format!("npm_env has an invalid variable name: {:?}", key),
            });
        }
        Ok(())
    }

    /// The npm environment to apply, minus variables the caller already set.
    pub fn npm_install_env(&self) -> BTreeMap<String, String> {
        self.npm_install_env_with(|key| std::env::var_os(key).is_some())
    }

    fn npm_install_env_with(&self, is_set: impl Fn(&str) -> bool) -> BTreeMap<String, String> {
        self.npm_env
            .iter()
            .filter(|(key, _)| !is_set(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// How entries with no derivable package name are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedEntryPolicy {
    /// Debug log only.
    #[default]
    Silent,
    /// Also show a warning.
    Warn,
}

/// When apt-get commands are prefixed with sudo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SudoPolicy {
    /// When not root and sudo is on PATH.
    #[default]
    Auto,
    /// Always.
    Always,
    /// Never.
    Never,
}

impl SudoPolicy {
    /// Whether to use sudo on this host.
    pub fn use_sudo(&self) -> bool {
        self.use_sudo_with(is_elevated(), find_in_path("sudo").is_some())
    }

    fn use_sudo_with(&self, elevated: bool, sudo_available: bool) -> bool {
        match self {
            Self::Auto => !elevated && sudo_available,
            Self::Always => true,
            Self::Never => false,
        }
    }
}
