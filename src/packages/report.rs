//! Structured reconciliation events.
//!
//! The reconciler never prints. It emits [`ReconcileEvent`]s to a
//! [`Reporter`], and the CLI renders them onto its user interface.

use super::availability::GapStatus;
use super::reconcile::Source;

/// Something observable that happened while reconciling a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Work on a source began.
    Started { source: Source, manager: String },
    /// The declared list is empty.
    NothingConfigured { source: Source },
    /// An entry had no derivable name and was dropped.
    EntrySkipped { source: Source, entry: String },
    /// Every entry was dropped during normalization.
    NothingForManager { source: Source, manager: String },
    /// The manager did not answer its version probe.
    ToolMissing { source: Source, tool: String },
    /// The package index is being refreshed.
    RefreshingIndex { source: Source },
    /// The package index refresh failed.
    IndexRefreshFailed { source: Source, diagnostic: String },
    /// A package is not in the repository index.
    PackageUnavailable {
        source: Source,
        package: String,
        gap: GapStatus,
    },
    /// Every declared package is already installed.
    UpToDate { source: Source },
    /// Installs are about to begin.
    Installing { source: Source, count: usize },
    /// One install command started.
    InstallStarted { source: Source, package: String },
    /// One install command succeeded.
    Installed { source: Source, package: String },
    /// One install command failed; the remaining candidates are abandoned.
    InstallFailed {
        source: Source,
        package: String,
        diagnostic: String,
    },
    /// Dry run: the package would be installed.
    WouldInstall { source: Source, package: String },
    /// Work on a source ended.
    Finished { source: Source, success: bool },
}

/// Sink for reconciliation events.
pub trait Reporter {
    /// Handle one event.
    fn event(&mut self, event: &ReconcileEvent);
}

/// Collects events, for tests and post-run inspection.
impl Reporter for Vec<ReconcileEvent> {
    fn event(&mut self, event: &ReconcileEvent) {
        self.push(event.clone());
    }
}
