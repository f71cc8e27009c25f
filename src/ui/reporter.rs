//! Rendering reconciliation events onto a [`UserInterface`].

use crate::config::MalformedEntryPolicy;
use crate::packages::{GapStatus, ReconcileEvent, Reporter};

use super::{SpinnerHandle, UserInterface};

/// Adapts [`ReconcileEvent`]s to UI calls.
pub struct UiReporter<'a> {
    ui: &'a mut dyn UserInterface,
    malformed: MalformedEntryPolicy,
    spinner: Option<Box<dyn SpinnerHandle>>,
}

impl<'a> UiReporter<'a> {
    /// Create a reporter writing to `ui`.
    pub fn new(ui: &'a mut dyn UserInterface, malformed: MalformedEntryPolicy) -> Self {
        Self {
            ui,
            malformed,
            spinner: None,
        }
    }
}

impl Reporter for UiReporter<'_> {
    fn event(&mut self, event: &ReconcileEvent) {
        match event {
            ReconcileEvent::Started { source, manager } => {
                self.ui
                    .show_header(&format!("Installing {} ({})", source.label(), manager));
            }
            ReconcileEvent::NothingConfigured { source } => {
                self.ui
                    .message(&format!("No {} configured", source.label()));
            }
            ReconcileEvent::EntrySkipped { source, entry } => {
                if self.malformed == MalformedEntryPolicy::Warn {
                    self.ui.warning(&format!(
                        "Skipping {} entry with no package name: {}",
                        source, entry
                    ));
                }
            }
            ReconcileEvent::NothingForManager { source, manager } => {
                self.ui.message(&format!(
                    "No {} to install with {}",
                    source.label(),
                    manager
                ));
            }
            ReconcileEvent::ToolMissing { tool, .. } => {
                self.ui
                    .error(&format!("{} is not installed or not on PATH", tool));
            }
            ReconcileEvent::RefreshingIndex { .. } => {
                self.ui.message("Updating package index...");
            }
            ReconcileEvent::IndexRefreshFailed { diagnostic, .. } => {
                self.ui
                    .error(&format!("Failed to update package index: {}", diagnostic));
            }
            ReconcileEvent::PackageUnavailable { package, gap, .. } => match gap {
                GapStatus::Recorded => self.ui.warning(&format!(
                    "{} is not available via apt; added to the TODO list",
                    package
                )),
                GapStatus::AlreadyRecorded => self.ui.warning(&format!(
                    "{} is not available via apt; already on the TODO list",
                    package
                )),
                GapStatus::NotRecorded => {
                    self.ui
                        .warning(&format!("{} is not available via apt", package))
                }
                GapStatus::Failed(reason) => self.ui.warning(&format!(
                    "{} is not available via apt; could not update the TODO list: {}",
                    package, reason
                )),
            },
            ReconcileEvent::UpToDate { source } => {
                self.ui
                    .success(&format!("All {} are already installed", source.label()));
            }
            ReconcileEvent::Installing { count, .. } => {
                let noun = if *count == 1 { "package" } else { "packages" };
                self.ui.message(&format!("Installing {} {}", count, noun));
            }
            ReconcileEvent::InstallStarted { package, .. } => {
                self.spinner = Some(self.ui.start_spinner(&format!("Installing {}", package)));
            }
            ReconcileEvent::Installed { package, .. } => {
                let msg = format!("Installed {}", package);
                match self.spinner.take() {
                    Some(mut spinner) => spinner.finish_success(&msg),
                    None => self.ui.success(&msg),
                }
            }
            ReconcileEvent::InstallFailed {
                package,
                diagnostic,
                ..
            } => {
                let msg = format!("Failed to install {}", package);
                match self.spinner.take() {
                    Some(mut spinner) => spinner.finish_error(&msg),
                    None => self.ui.error(&msg),
                }
                for line in diagnostic.lines() {
                    self.ui.error(&format!("    {}", line));
                }
            }
            ReconcileEvent::WouldInstall { package, .. } => {
                self.ui.message(&format!("Would install {}", package));
            }
            ReconcileEvent::Finished { source, success } => {
                if *success {
                    self.ui.detail(&format!("Finished {}", source.label()));
                } else {
                    self.ui
                        .error(&format!("Some {} could not be installed", source.label()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::Source;
    use crate::ui::{LineKind, MockUI, SpinnerStatus};

    fn render(events: &[ReconcileEvent], policy: MalformedEntryPolicy) -> MockUI {
        let mut ui = MockUI::new();
        {
            let mut reporter = UiReporter::new(&mut ui, policy);
            for event in events {
                reporter.event(event);
            }
        }
        ui
    }

    #[test]
    fn install_lifecycle_uses_spinner() {
        let ui = render(
            &[
                ReconcileEvent::InstallStarted {
                    source: Source::Pipx,
                    package: "black".into(),
                },
                ReconcileEvent::Installed {
                    source: Source::Pipx,
                    package: "black".into(),
                },
            ],
            MalformedEntryPolicy::Silent,
        );

        assert_eq!(ui.spinners(), ["Installing black"]);
        assert_eq!(
            ui.spinner_results(),
            vec![("Installed black".to_string(), SpinnerStatus::Success)]
        );
    }

    #[test]
    fn failed_install_shows_diagnostic() {
        let ui = render(
            &[
                ReconcileEvent::InstallStarted {
                    source: Source::Npm,
                    package: "typescript".into(),
                },
                ReconcileEvent::InstallFailed {
                    source: Source::Npm,
                    package: "typescript".into(),
                    diagnostic: "npm ERR! code EACCES".into(),
                },
            ],
            MalformedEntryPolicy::Silent,
        );

        assert!(ui.has_error("EACCES"));
        assert_eq!(ui.spinner_results()[0].1, SpinnerStatus::Error);
    }

    #[test]
    fn malformed_entries_are_silent_by_default() {
        let event = ReconcileEvent::EntrySkipped {
            source: Source::System,
            entry: "42".into(),
        };

        let silent = render(&[event.clone()], MalformedEntryPolicy::Silent);
        assert!(silent.lines(LineKind::Warning).is_empty());

        let warned = render(&[event], MalformedEntryPolicy::Warn);
        assert!(warned.has_warning("42"));
    }

    #[test]
    fn recorded_gap_is_a_warning() {
        let ui = render(
            &[ReconcileEvent::PackageUnavailable {
                source: Source::System,
                package: "just".into(),
                gap: GapStatus::Recorded,
            }],
            MalformedEntryPolicy::Silent,
        );

        assert!(ui.has_warning("just is not available via apt"));
        assert!(ui.errors().is_empty());
    }

    #[test]
    fn failed_source_is_an_error() {
        let ui = render(
            &[ReconcileEvent::Finished {
                source: Source::Npm,
                success: false,
            }],
            MalformedEntryPolicy::Silent,
        );
        assert!(ui.has_error("npm packages"));
    }
}
