//! Config directory discovery and loading.
//!
//! A config directory holds one YAML list per package source, the envrc
//! template and an optional `settings.yaml`. Each list is loaded on its own
//! so a broken file only affects its source.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{PackageList, Settings};
use crate::error::{FoundryError, Result};
use crate::packages::{GapLog, PackageEntry, Source};

/// Name of the optional settings file.
pub const SETTINGS_FILE: &str = "settings.yaml";

/// A directory of foundry config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    /// Open `path` as a config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if `path` is not a directory.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(FoundryError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// The directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file in the directory (absolute paths pass through).
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Load the package list for `source`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` if the file is not a valid package list.
    pub fn load_package_list(&self, source: Source) -> Result<Option<Vec<PackageEntry>>> {
        let path = self.root.join(source.file_name());
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        let list: PackageList = parse_document(&content, &path)?;
        Ok(Some(list.into_entries()))
    }

    /// Load and validate `settings.yaml`, defaulting when absent.
    pub fn load_settings(&self) -> Result<Settings> {
        let path = self.root.join(SETTINGS_FILE);
        let settings = match read_optional(&path)? {
            Some(content) => parse_document(&content, &path)?,
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// The gap log: `explicit` if given, else the settings value, else beside this directory.
    pub fn gap_log(&self, settings: &Settings, explicit: Option<&Path>) -> GapLog {
        match explicit {
            Some(path) => GapLog::new(path),
            None => match &settings.gap_log {
                Some(path) => GapLog::new(self.resolve(path)),
                None => GapLog::beside(&self.root),
            },
        }
    }

    /// Path of the envrc template.
    pub fn envrc_template(&self, settings: &Settings) -> PathBuf {
        self.resolve(&settings.envrc_template)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FoundryError::Io(e)),
    }
}

/// Parse a YAML document, treating an empty or comment-only file as all defaults.
fn parse_document<T>(content: &str, path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    let parse_error = |e: serde_yaml::Error| FoundryError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let value: serde_yaml::Value = if is_blank_document(content) {
        serde_yaml::Value::Null
    } else {
        serde_yaml::from_str(content).map_err(parse_error)?
    };

    if value.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(value).map_err(parse_error)
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_dir(files: &[(&str, &str)]) -> (TempDir, ConfigDir) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let dir = ConfigDir::open(temp.path()).unwrap();
        (temp, dir)
    }

    #[test]
    fn open_rejects_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = ConfigDir::open(&temp.path().join("nope"));
        assert!(matches!(result, Err(FoundryError::ConfigNotFound { .. })));
    }

    #[test]
    fn open_rejects_file() {
        let (temp, _) = config_dir(&[("packages.yaml", "packages: []")]);
        let result = ConfigDir::open(&temp.path().join("packages.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn missing_list_is_none() {
        let (_temp, dir) = config_dir(&[]);
        assert_eq!(dir.load_package_list(Source::Npm).unwrap(), None);
    }

    #[test]
    fn loads_system_list_shapes() {
        let (_temp, dir) = config_dir(&[(
            "packages.yaml",
            "packages:\n  - jq\n  - name: fd\n    apt-override: fd-find\n  - ripgrep:\n      apt-override: ripgrep\n",
        )]);

        let entries = dir.load_package_list(Source::System).unwrap().unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], PackageEntry::from("jq"));
        assert!(entries.iter().all(|e| !e.is_malformed()));
    }

    #[test]
    fn empty_and_comment_only_files_are_empty_lists() {
        let (_temp, dir) = config_dir(&[("pipx.yaml", ""), ("npm.yaml", "# nothing yet\n")]);
        assert_eq!(dir.load_package_list(Source::Pipx).unwrap(), Some(vec![]));
        assert_eq!(dir.load_package_list(Source::Npm).unwrap(), Some(vec![]));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let (_temp, dir) = config_dir(&[("pipx.yaml", "packages: [unclosed\n")]);
        let err = dir.load_package_list(Source::Pipx).unwrap_err();
        match err {
            FoundryError::ConfigParseError { path, .. } => assert!(path.ends_with("pipx.yaml")),
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn non_sequence_packages_is_parse_error() {
        let (_temp, dir) = config_dir(&[("npm.yaml", "packages: typescript\n")]);
        assert!(dir.load_package_list(Source::Npm).is_err());
    }

    #[test]
    fn settings_default_when_absent() {
        let (_temp, dir) = config_dir(&[]);
        assert_eq!(dir.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn settings_are_validated() {
        let (_temp, dir) = config_dir(&[(SETTINGS_FILE, "probe_timeout_secs: 0\n")]);
        assert!(matches!(
            dir.load_settings(),
            Err(FoundryError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn gap_log_precedence() {
        let (temp, dir) = config_dir(&[]);
        let mut settings = Settings::default();

        assert_eq!(
            dir.gap_log(&settings, None).path(),
            temp.path().join("..").join("TODO.md")
        );

        settings.gap_log = Some(PathBuf::from("gaps.md"));
        assert_eq!(
            dir.gap_log(&settings, None).path(),
            temp.path().join("gaps.md")
        );

        let explicit = temp.path().join("explicit.md");
        assert_eq!(dir.gap_log(&settings, Some(explicit.as_path())).path(), explicit);
    }

    #[test]
    fn envrc_template_resolves_in_directory() {
        let (temp, dir) = config_dir(&[]);
        assert_eq!(
            dir.envrc_template(&Settings::default()),
            temp.path().join("envrc_template")
        );
    }
}
