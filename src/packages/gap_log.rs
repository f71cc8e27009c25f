//! Persistent log of apt availability gaps.
//!
//! Each package confirmed missing from the apt index becomes one unchecked
//! markdown task in the log. Lines are only ever appended, and a package is
//! never recorded twice.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Heading written when the log is first created.
pub const GAP_LOG_HEADER: &str = "# TODO\n";

/// Default log file name, placed beside the config directory.
pub const DEFAULT_GAP_LOG_NAME: &str = "TODO.md";

/// The gap log line for `package`, without a trailing newline.
pub fn gap_line(package: &str) -> String {
    format!("- [ ] Add apt installation method for {}", package)
}

/// What happened when a gap was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapWrite {
    /// A new line was appended.
    Appended,
    /// The line was already present.
    AlreadyPresent,
}

/// Handle to the gap log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapLog {
    path: PathBuf,
}

impl GapLog {
    /// Create a handle; nothing is touched until a gap is recorded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location for a config directory: `<config-dir>/../TODO.md`.
    pub fn beside(config_dir: &Path) -> Self {
        Self::new(config_dir.join("..").join(DEFAULT_GAP_LOG_NAME))
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the log already mentions `package`.
    pub fn contains(&self, package: &str) -> Result<bool> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(has_line(&content, &gap_line(package))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Append the gap line for `package` unless it is already present.
    ///
    /// The file (and its parent directories) are created with
    /// [`GAP_LOG_HEADER`] if missing.
    pub fn record(&self, package: &str) -> Result<GapWrite> {
        let line = gap_line(package);
        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if existing.as_deref().is_some_and(|c| has_line(c, &line)) {
            tracing::debug!("Gap for {} already recorded in {}", package, self.path.display());
            return Ok(GapWrite::AlreadyPresent);
        }

        let mut text = String::new();
        match existing.as_deref() {
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                text.push_str(GAP_LOG_HEADER);
            }
            Some(content) if !content.is_empty() && !content.ends_with('\n') => text.push('\n'),
            Some(_) => {}
        }
        text.push_str(&line);
        text.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())?;

        tracing::debug!("Recorded gap for {} in {}", package, self.path.display());
        Ok(GapWrite::Appended)
    }
}

/// Whole-line match; `fd` must not match the `fd-find` line.
fn has_line(content: &str, line: &str) -> bool {
    content.lines().any(|l| l.trim_end() == line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn gap_line_format() {
        assert_eq!(gap_line("just"), "- [ ] Add apt installation method for just");
    }

    #[test]
    fn creates_log_with_header() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("TODO.md"));

        assert_eq!(log.record("just").unwrap(), GapWrite::Appended);

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "# TODO\n- [ ] Add apt installation method for just\n"
        );
    }

    #[test]
    fn creates_missing_parent_directories() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("notes").join("TODO.md"));

        log.record("just").unwrap();

        assert!(log.path().exists());
    }

    #[test]
    fn same_gap_is_recorded_once() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("TODO.md"));

        log.record("just").unwrap();
        assert_eq!(log.record("just").unwrap(), GapWrite::AlreadyPresent);

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("method for just").count(), 1);
    }

    #[test]
    fn prefix_of_recorded_name_is_a_new_gap() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("TODO.md"));

        assert_eq!(log.record("fd-find").unwrap(), GapWrite::Appended);
        assert!(!log.contains("fd").unwrap());
        assert_eq!(log.record("fd").unwrap(), GapWrite::Appended);
        assert_eq!(log.record("fd").unwrap(), GapWrite::AlreadyPresent);

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "# TODO\n\
             - [ ] Add apt installation method for fd-find\n\
             - [ ] Add apt installation method for fd\n"
        );
    }

    #[test]
    fn line_with_trailing_spaces_still_counts() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("TODO.md");
        fs::write(&path, "# TODO\n- [ ] Add apt installation method for just  \n").unwrap();
        let log = GapLog::new(&path);

        assert_eq!(log.record("just").unwrap(), GapWrite::AlreadyPresent);
    }

    #[test]
    fn appends_to_existing_log_without_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("TODO.md");
        fs::write(&path, "# Notes\n- [x] Something done").unwrap();
        let log = GapLog::new(&path);

        log.record("hyperfine").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Notes\n- [x] Something done\n- [ ] Add apt installation method for hyperfine\n"
        );
    }

    #[test]
    fn contains_reports_existing_gaps() {
        let temp = TempDir::new().unwrap();
        let log = GapLog::new(temp.path().join("TODO.md"));

        assert!(!log.contains("just").unwrap());
        log.record("just").unwrap();
        assert!(log.contains("just").unwrap());
        assert!(!log.contains("fd").unwrap());
    }

    #[test]
    fn default_location_is_beside_config_dir() {
        let log = GapLog::beside(Path::new("/home/dev/setup/config"));
        assert_eq!(log.path(), Path::new("/home/dev/setup/config/../TODO.md"));
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let log = GapLog::new(blocker.join("TODO.md"));

        assert!(log.record("just").is_err());
    }
}
