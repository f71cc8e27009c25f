//! Package reconciliation.
//!
//! This module turns declared package lists into install commands:
//! - [`manager`] picks brew or apt for the host
//! - [`entry`] decodes and normalizes declared entries
//! - [`backend`] describes each package manager's command surface
//! - [`probe`] asks a manager what is already installed
//! - [`availability`] and [`gap_log`] handle packages apt does not carry
//! - [`reconcile`] drives one source from declared to installed
//! - [`report`] carries structured events out to the caller

pub mod availability;
pub mod backend;
pub mod entry;
pub mod gap_log;
pub mod manager;
pub mod probe;
pub mod reconcile;
pub mod report;

pub use availability::{Availability, AvailabilityValidator, GapStatus};
pub use backend::{system_backend, AptBackend, BrewBackend, NpmBackend, PackageBackend, PipxBackend};
pub use entry::PackageEntry;
pub use gap_log::{gap_line, GapLog, GapWrite};
pub use manager::{resolve, resolve_for, ResolvedManager};
pub use probe::{probe_installed, InstalledSet};
pub use reconcile::{
    InstallOutcome, ReconcileError, ReconcileOptions, ReconcileReport, Reconciler, Source,
    SourceOutcome, DEFAULT_PROBE_TIMEOUT,
};
pub use report::{ReconcileEvent, Reporter};
