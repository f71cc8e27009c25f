//! direnv setup: seed `~/.envrc` from the config directory's template.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FoundryError, Result};
use crate::shell::{CommandRunner, CommandSpec};

/// What the envrc step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvrcOutcome {
    /// direnv did not answer `direnv --version`.
    DirenvMissing,
    /// The template was copied to this path.
    Created(PathBuf),
    /// Dry run: the template would be copied to this path.
    WouldCreate(PathBuf),
    /// An `.envrc` already exists and was left alone.
    AlreadyPresent(PathBuf),
    /// There is no template to copy.
    NoTemplate(PathBuf),
}

/// Inputs to the envrc step.
#[derive(Debug, Clone)]
pub struct EnvrcSetup {
    /// Template file in the config directory.
    pub template: PathBuf,
    /// Directory receiving `.envrc`.
    pub home: PathBuf,
    /// Deadline for the direnv probe.
    pub probe_timeout: Duration,
    /// Report without copying.
    pub dry_run: bool,
}

impl EnvrcSetup {
    /// Set up against the current user's home directory.
    pub fn for_current_user(template: PathBuf, probe_timeout: Duration, dry_run: bool) -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| FoundryError::ConfigValidationError {
            message: "Could not determine the home directory".to_string(),
        })?;
        Ok(Self {
            template,
            home,
            probe_timeout,
            dry_run,
        })
    }

    /// Target path of the copy.
    pub fn target(&self) -> PathBuf {
        self.home.join(".envrc")
    }

    /// Run the step.
    ///
    /// # Errors
    ///
    /// Returns an error only if the copy itself fails.
    pub fn run(&self, runner: &dyn CommandRunner) -> Result<EnvrcOutcome> {
        if !direnv_available(runner, self.probe_timeout) {
            return Ok(EnvrcOutcome::DirenvMissing);
        }

        let target = self.target();
        if !self.template.is_file() {
            tracing::debug!("No envrc template at {}", self.template.display());
            return Ok(EnvrcOutcome::NoTemplate(self.template.clone()));
        }
        if target.exists() {
            return Ok(EnvrcOutcome::AlreadyPresent(target));
        }
        if self.dry_run {
            return Ok(EnvrcOutcome::WouldCreate(target));
        }

        copy_template(&self.template, &target)?;
        Ok(EnvrcOutcome::Created(target))
    }
}

fn direnv_available(runner: &dyn CommandRunner, timeout: Duration) -> bool {
    let probe = CommandSpec::new("direnv", ["--version"]).with_timeout(timeout);
    match runner.run(&probe) {
        Ok(result) => result.success,
        Err(e) => {
            tracing::debug!("direnv did not respond: {}", e);
            false
        }
    }
}

fn copy_template(template: &Path, target: &Path) -> Result<()> {
    fs::copy(template, target).map_err(|e| {
        FoundryError::Other(anyhow::anyhow!(
            "Failed to copy {} to {}: {}",
            template.display(),
            target.display(),
            e
        ))
    })?;
    tracing::debug!("Copied {} to {}", template.display(), target.display());
    Ok(())
}
