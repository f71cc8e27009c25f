//! Per-source reconciliation.
//!
//! [`Reconciler::reconcile`] drives one package source from its declared
//! entries to an installed state:
//!
//! 1. empty list: nothing to do
//! 2. normalize entries for the backend's manager, dropping malformed ones
//! 3. probe the tool version; unreachable tools fail the source
//! 4. refresh the package index (apt)
//! 5. filter through the availability check (apt); misses become gaps
//! 6. diff against the installed set
//! 7. install each candidate in order, stopping at the first failure
//!
//! Nothing that goes wrong inside a source escapes it: every failure ends up
//! in the returned [`SourceOutcome`].

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::shell::CommandRunner;

use super::availability::{Availability, AvailabilityValidator};
use super::backend::PackageBackend;
use super::entry::PackageEntry;
use super::gap_log::GapLog;
use super::probe::probe_installed;
use super::report::{ReconcileEvent, Reporter};

/// Default deadline for version, listing and availability probes.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A category of declared packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// OS-native packages (`packages.yaml`), installed through brew or apt.
    System,
    /// Python applications (`pipx.yaml`).
    Pipx,
    /// Global Node packages (`npm.yaml`).
    Npm,
}

impl Source {
    /// All sources, in the order they are reconciled.
    pub const ALL: [Source; 3] = [Source::System, Source::Pipx, Source::Npm];

    /// Identifier used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Pipx => "pipx",
            Self::Npm => "npm",
        }
    }

    /// Config file declaring this source's packages.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::System => "packages.yaml",
            Self::Pipx => "pipx.yaml",
            Self::Npm => "npm.yaml",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "system packages",
            Self::Pipx => "pipx packages",
            Self::Npm => "npm packages",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The install command succeeded.
    Installed,
    /// The install command failed or could not run.
    Failed { diagnostic: String },
}

/// Conditions that end a source early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The package manager did not answer its version probe.
    #[error("{tool} is not available")]
    ToolMissing { tool: String },

    /// Refreshing the package index failed.
    #[error("{manager} index refresh failed: {diagnostic}")]
    IndexRefreshFailed { manager: String, diagnostic: String },

    /// Installing a package failed; later candidates were not attempted.
    #[error("Failed to install {package}: {diagnostic}")]
    InstallFailed { package: String, diagnostic: String },

    /// The source's config file could not be read.
    #[error("{message}")]
    InvalidConfig { message: String },
}

/// Aggregate result for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    /// The source reconciled.
    pub source: Source,
    /// Backend name (`brew`, `apt`, `pipx`, `npm`), if one was selected.
    pub manager: Option<String>,
    /// Install attempts, in order.
    pub installs: Vec<(String, InstallOutcome)>,
    /// Packages missing from the repository index.
    pub gaps: Vec<String>,
    /// Entries dropped during normalization.
    pub skipped: Vec<String>,
    /// Packages a dry run would have installed.
    pub planned: Vec<String>,
    /// What ended the source early, if anything did.
    pub failure: Option<ReconcileError>,
}

impl SourceOutcome {
    fn new(source: Source, manager: Option<&str>) -> Self {
        Self {
            source,
            manager: manager.map(ToString::to_string),
            installs: Vec::new(),
            gaps: Vec::new(),
            skipped: Vec::new(),
            planned: Vec::new(),
            failure: None,
        }
    }

    /// Outcome for a source whose config could not be loaded.
    pub fn config_error(source: Source, message: impl Into<String>) -> Self {
        Self {
            failure: Some(ReconcileError::InvalidConfig {
                message: message.into(),
            }),
            ..Self::new(source, None)
        }
    }

    /// Whether every attempted install succeeded and nothing was fatal.
    pub fn success(&self) -> bool {
        self.failure.is_none()
            && self
                .installs
                .iter()
                .all(|(_, outcome)| *outcome == InstallOutcome::Installed)
    }

    /// Packages that were installed.
    pub fn installed(&self) -> Vec<&str> {
        self.installs
            .iter()
            .filter(|(_, outcome)| *outcome == InstallOutcome::Installed)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Outcomes for every source in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    outcomes: Vec<SourceOutcome>,
}

impl ReconcileReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source outcome.
    pub fn push(&mut self, outcome: SourceOutcome) {
        self.outcomes.push(outcome);
    }

    /// Sources that failed.
    pub fn failed_sources(&self) -> Vec<Source> {
        self.outcomes
            .iter()
            .filter(|o| !o.success())
            .map(|o| o.source)
            .collect()
    }
}

/// Reconciler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Deadline for probes (never applied to installs or index refreshes).
    pub probe_timeout: Duration,
    /// Report what would be installed without refreshing, recording or installing.
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            dry_run: false,
        }
    }
}

/// Drives package sources to their declared state.
pub struct Reconciler<'a> {
    runner: &'a dyn CommandRunner,
    gap_log: Option<&'a GapLog>,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler running commands through `runner`.
    pub fn new(runner: &'a dyn CommandRunner, options: ReconcileOptions) -> Self {
        Self {
            runner,
            gap_log: None,
            options,
        }
    }

    /// Record apt availability misses in `gap_log`.
    pub fn with_gap_log(mut self, gap_log: &'a GapLog) -> Self {
        self.gap_log = Some(gap_log);
        self
    }

    /// Reconcile one source against `backend`.
    pub fn reconcile(
        &self,
        source: Source,
        entries: &[PackageEntry],
        backend: &dyn PackageBackend,
        reporter: &mut dyn Reporter,
    ) -> SourceOutcome {
        reporter.event(&ReconcileEvent::Started {
            source,
            manager: backend.name().to_string(),
        });
        let outcome = self.run(source, entries, backend, reporter);
        reporter.event(&ReconcileEvent::Finished {
            source,
            success: outcome.success(),
        });
        outcome
    }

    fn run(
        &self,
        source: Source,
        entries: &[PackageEntry],
        backend: &dyn PackageBackend,
        reporter: &mut dyn Reporter,
    ) -> SourceOutcome {
        let mut outcome = SourceOutcome::new(source, Some(backend.name()));

        if entries.is_empty() {
            reporter.event(&ReconcileEvent::NothingConfigured { source });
            return outcome;
        }

        let mut declared = Vec::with_capacity(entries.len());
        for entry in entries {
            let normalized = match backend.manager() {
                Some(manager) => entry.normalize(manager),
                None => entry.plain_name().map(ToString::to_string),
            };
            match normalized {
                Some(name) => declared.push(name),
                None => {
                    let raw = entry.describe();
                    tracing::debug!("Skipping {} entry with no package name: {}", source, raw);
                    reporter.event(&ReconcileEvent::EntrySkipped {
                        source,
                        entry: raw.clone(),
                    });
                    outcome.skipped.push(raw);
                }
            }
        }

        if declared.is_empty() {
            reporter.event(&ReconcileEvent::NothingForManager {
                source,
                manager: backend.name().to_string(),
            });
            return outcome;
        }

        if !self.tool_answers(backend) {
            reporter.event(&ReconcileEvent::ToolMissing {
                source,
                tool: backend.tool().to_string(),
            });
            outcome.failure = Some(ReconcileError::ToolMissing {
                tool: backend.tool().to_string(),
            });
            return outcome;
        }

        if !self.options.dry_run {
            if let Some(refresh) = backend.refresh_index_command() {
                reporter.event(&ReconcileEvent::RefreshingIndex { source });
                if let Err(diagnostic) = self.run_to_completion(&refresh) {
                    reporter.event(&ReconcileEvent::IndexRefreshFailed {
                        source,
                        diagnostic: diagnostic.clone(),
                    });
                    outcome.failure = Some(ReconcileError::IndexRefreshFailed {
                        manager: backend.name().to_string(),
                        diagnostic,
                    });
                    return outcome;
                }
            }
        }

        if backend.validates_availability() {
            let gap_log = if self.options.dry_run {
                None
            } else {
                self.gap_log
            };
            let validator =
                AvailabilityValidator::new(self.runner, self.options.probe_timeout, gap_log);
            declared.retain(|package| match validator.check(package) {
                Availability::Available => true,
                Availability::Missing { gap } => {
                    reporter.event(&ReconcileEvent::PackageUnavailable {
                        source,
                        package: package.clone(),
                        gap,
                    });
                    outcome.gaps.push(package.clone());
                    false
                }
            });
        }

        let installed = probe_installed(backend, self.runner, self.options.probe_timeout);
        let candidates: Vec<String> = declared
            .into_iter()
            .filter(|package| !installed.contains(package))
            .collect();

        if candidates.is_empty() {
            reporter.event(&ReconcileEvent::UpToDate { source });
            return outcome;
        }

        if self.options.dry_run {
            for package in candidates {
                reporter.event(&ReconcileEvent::WouldInstall {
                    source,
                    package: package.clone(),
                });
                outcome.planned.push(package);
            }
            return outcome;
        }

        reporter.event(&ReconcileEvent::Installing {
            source,
            count: candidates.len(),
        });
        for package in candidates {
            reporter.event(&ReconcileEvent::InstallStarted {
                source,
                package: package.clone(),
            });
            match self.run_to_completion(&backend.install_command(&package)) {
                Ok(()) => {
                    reporter.event(&ReconcileEvent::Installed {
                        source,
                        package: package.clone(),
                    });
                    outcome.installs.push((package, InstallOutcome::Installed));
                }
                Err(diagnostic) => {
                    reporter.event(&ReconcileEvent::InstallFailed {
                        source,
                        package: package.clone(),
                        diagnostic: diagnostic.clone(),
                    });
                    outcome.installs.push((
                        package.clone(),
                        InstallOutcome::Failed {
                            diagnostic: diagnostic.clone(),
                        },
                    ));
                    outcome.failure = Some(ReconcileError::InstallFailed {
                        package,
                        diagnostic,
                    });
                    break;
                }
            }
        }

        outcome
    }

    fn tool_answers(&self, backend: &dyn PackageBackend) -> bool {
        let probe = backend
            .version_command()
            .with_timeout(self.options.probe_timeout);
        match self.runner.run(&probe) {
            Ok(result) if result.success => true,
            Ok(result) => {
                tracing::debug!(
                    "{} exited with {:?}: {}",
                    probe.display(),
                    result.exit_code,
                    result.diagnostic()
                );
                false
            }
            Err(e) => {
                tracing::debug!("{} did not respond: {}", backend.tool(), e);
                false
            }
        }
    }

    /// Run a mutating command with no deadline, returning its diagnostic on failure.
    fn run_to_completion(&self, spec: &crate::shell::CommandSpec) -> Result<(), String> {
        match self.runner.run(spec) {
            Ok(result) if result.success => Ok(()),
            Ok(result) => {
                let diagnostic = result.diagnostic();
                if diagnostic.is_empty() {
                    Err(format!("{} exited with {:?}", spec.display(), result.exit_code))
                } else {
                    Err(diagnostic)
                }
            }
            Err(e) => Err(e.to_string()),
        }
    }
}
