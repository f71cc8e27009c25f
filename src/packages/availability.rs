//! apt repository availability checks.

use std::time::Duration;

use crate::shell::{CommandRunner, CommandSpec};

use super::gap_log::{GapLog, GapWrite};

/// Marker apt-cache prints when the index has no such package.
const NOT_FOUND_MARKER: &str = "No packages found";

/// What happened to the gap log for a missing package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapStatus {
    /// A new line was written.
    Recorded,
    /// The package was already in the log.
    AlreadyRecorded,
    /// No log is attached (dry run).
    NotRecorded,
    /// Writing the log failed.
    Failed(String),
}

/// Result of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// The package is in the apt index.
    Available,
    /// The package is not installable through apt.
    Missing { gap: GapStatus },
}

/// Checks identifiers against apt metadata, logging misses.
pub struct AvailabilityValidator<'a> {
    runner: &'a dyn CommandRunner,
    timeout: Duration,
    gap_log: Option<&'a GapLog>,
}

impl<'a> AvailabilityValidator<'a> {
    /// Create a validator; pass `None` as `gap_log` to check without recording.
    pub fn new(runner: &'a dyn CommandRunner, timeout: Duration, gap_log: Option<&'a GapLog>) -> Self {
        Self {
            runner,
            timeout,
            gap_log,
        }
    }

    /// Whether apt knows `package`.
    ///
    /// A query that cannot run, exits non-zero, or reports no packages is a miss.
    pub fn exists(&self, package: &str) -> bool {
        let spec = CommandSpec::new("apt-cache", ["show", package]).with_timeout(self.timeout);
        match self.runner.run(&spec) {
            Ok(result) => {
                result.success
                    && !result.stdout.contains(NOT_FOUND_MARKER)
                    && !result.stderr.contains(NOT_FOUND_MARKER)
            }
            Err(e) => {
                tracing::debug!("Availability query for {} failed: {}", package, e);
                false
            }
        }
    }

    /// Check `package`, recording a gap on a miss.
    pub fn check(&self, package: &str) -> Availability {
        if self.exists(package) {
            return Availability::Available;
        }

        let gap = match self.gap_log {
            None => GapStatus::NotRecorded,
            Some(log) => match log.record(package) {
                Ok(GapWrite::Appended) => GapStatus::Recorded,
                Ok(GapWrite::AlreadyPresent) => GapStatus::AlreadyRecorded,
                Err(e) => {
                    tracing::warn!(
                        "Could not record gap for {} in {}: {}",
                        package,
                        log.path().display(),
                        e
                    );
                    GapStatus::Failed(e.to_string())
                }
            },
        };
        Availability::Missing { gap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use std::fs;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn known_package_exists() {
        let mut runner = MockRunner::new();
        runner.respond("apt-cache show jq", "Package: jq\nVersion: 1.7.1\n");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, None);

        assert!(validator.exists("jq"));
        assert_eq!(runner.specs()[0].timeout, Some(TIMEOUT));
    }

    #[test]
    fn non_zero_exit_is_a_miss() {
        let mut runner = MockRunner::new();
        runner.fail("apt-cache show just", 100, "E: No packages found");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, None);

        assert!(!validator.exists("just"));
    }

    #[test]
    fn not_found_marker_is_a_miss_even_on_success() {
        let mut runner = MockRunner::new();
        runner.respond("apt-cache show just", "N: No packages found\n");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, None);

        assert!(!validator.exists("just"));
    }

    #[test]
    fn unrunnable_query_is_a_miss() {
        let mut runner = MockRunner::new();
        runner.missing_program("apt-cache");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, None);

        assert!(!validator.exists("jq"));
    }

    #[test]
    fn timed_out_query_is_a_miss() {
        let mut runner = MockRunner::new();
        runner.time_out("apt-cache show jq");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, None);

        assert!(!validator.exists("jq"));
    }

    #[test]
    fn miss_is_recorded_once() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("TODO.md"));
        let mut runner = MockRunner::new();
        runner.fail("apt-cache show *", 100, "");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, Some(&log));

        assert_eq!(
            validator.check("just"),
            Availability::Missing {
                gap: GapStatus::Recorded
            }
        );
        assert_eq!(
            validator.check("just"),
            Availability::Missing {
                gap: GapStatus::AlreadyRecorded
            }
        );

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("for just").count(), 1);
    }

    #[test]
    fn miss_without_log_is_not_recorded() {
        let runner = {
            let mut r = MockRunner::new();
            r.fail("apt-cache show *", 100, "");
            r
        };
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, None);

        assert_eq!(
            validator.check("just"),
            Availability::Missing {
                gap: GapStatus::NotRecorded
            }
        );
    }

    #[test]
    fn failed_gap_write_is_reported_not_raised() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let log = GapLog::new(blocker.join("TODO.md"));
        let mut runner = MockRunner::new();
        runner.fail("apt-cache show *", 100, "");
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, Some(&log));

        assert!(matches!(
            validator.check("just"),
            Availability::Missing {
                gap: GapStatus::Failed(_)
            }
        ));
    }

    #[test]
    fn available_package_leaves_log_untouched() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("TODO.md"));
        let runner = MockRunner::new();
        let validator = AvailabilityValidator::new(&runner, TIMEOUT, Some(&log));

        assert_eq!(validator.check("jq"), Availability::Available);
        assert!(!log.path().exists());
    }
}
