//! The `foundry verify-apt` command.
//!
//! Checks every system package, as apt would name it, against the apt index
//! and records the misses in the gap log. Nothing is installed.

use std::path::{Path, PathBuf};

use crate::cli::args::VerifyAptArgs;
use crate::config::ConfigDir;
use crate::error::Result;
use crate::packages::{Availability, AvailabilityValidator, GapStatus, ResolvedManager, Source};
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The verify-apt command implementation.
pub struct VerifyAptCommand<'a> {
    config_dir: PathBuf,
    gap_log: Option<PathBuf>,
    args: VerifyAptArgs,
    runner: &'a dyn CommandRunner,
}

impl<'a> VerifyAptCommand<'a> {
    /// Create a new verify-apt command.
    pub fn new(
        config_dir: &Path,
        gap_log: Option<&Path>,
        args: VerifyAptArgs,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            gap_log: gap_log.map(Path::to_path_buf),
            args,
            runner,
        }
    }
}

impl Command for VerifyAptCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let dir = ConfigDir::open(&self.config_dir)?;
        let settings = dir.load_settings()?;
        let entries = dir.load_package_list(Source::System)?.unwrap_or_default();
        let gap_log = dir.gap_log(&settings, self.gap_log.as_deref());

        let validator = AvailabilityValidator::new(
            self.runner,
            settings.probe_timeout(),
            (!self.args.no_record).then_some(&gap_log),
        );

        let mut missing = Vec::new();
        for name in entries
            .iter()
            .filter_map(|entry| entry.normalize(ResolvedManager::Apt))
        {
            match validator.check(&name) {
                Availability::Available => ui.detail(&format!("{} is available", name)),
                Availability::Missing { gap } => {
                    ui.warning(&format!("Missing apt package: {}", name));
                    if let GapStatus::Failed(reason) = gap {
                        ui.warning(&format!(
                            "Could not record {} in {}: {}",
                            name,
                            gap_log.path().display(),
                            reason
                        ));
                    }
                    missing.push(name);
                }
            }
        }

        if missing.is_empty() {
            ui.success("All packages present in apt");
            Ok(CommandResult::success())
        } else {
            ui.error(&format!("{} package(s) missing from apt", missing.len()));
            Ok(CommandResult::failure(1))
        }
    }
}
