//! Declared package entries and their normalization.
//!
//! A `packages:` list accepts three shapes:
//!
//! ```yaml
//! packages:
//!   - jq                        # bare name
//!   - name: fd
//!     apt-override: fd-find     # record with an apt-only override
//!   - ripgrep:                  # single-key shorthand
//!       apt-override: ripgrep
//! ```
//!
//! Shapes are sniffed once, at load time, into [`PackageEntry`]. Anything
//! with no derivable name becomes [`PackageEntry::Malformed`] and is skipped
//! by [`PackageEntry::normalize`].

use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

use super::manager::ResolvedManager;

const NAME_KEY: &str = "name";
const APT_OVERRIDE_KEY: &str = "apt-override";

/// One declared package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEntry {
    /// A plain package name.
    Bare(String),
    /// A name with an optional apt-specific replacement.
    Overridable {
        name: String,
        apt_override: Option<String>,
    },
    /// An entry no name could be derived from; holds the raw YAML for diagnostics.
    Malformed(String),
}

impl PackageEntry {
    /// Decode a raw YAML value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::Bare(name.clone()),
            Value::Mapping(map) => Self::from_mapping(map).unwrap_or_else(|| Self::malformed(value)),
            _ => Self::malformed(value),
        }
    }

    fn from_mapping(map: &Mapping) -> Option<Self> {
        if let Some(name) = map.get(NAME_KEY) {
            return Some(Self::Overridable {
                name: non_empty_str(name)?,
                apt_override: map.get(APT_OVERRIDE_KEY).and_then(non_empty_str),
            });
        }

        if map.len() != 1 {
            return None;
        }

        let (key, meta) = map.iter().next()?;
        if key.as_str() == Some(APT_OVERRIDE_KEY) {
            return None;
        }
        let apt_override = match meta {
            Value::Mapping(nested) => nested.get(APT_OVERRIDE_KEY).and_then(non_empty_str),
            _ => None,
        };
        Some(Self::Overridable {
            name: non_empty_str(key)?,
            apt_override,
        })
    }

    fn malformed(value: &Value) -> Self {
        let raw = serde_yaml::to_string(value)
            .map(|s| s.trim().replace('\n', " "))
            .unwrap_or_else(|_| format!("{:?}", value));
        Self::Malformed(raw)
    }

    /// The declared name, ignoring any override.
    pub fn plain_name(&self) -> Option<&str> {
        match self {
            Self::Bare(name) | Self::Overridable { name, .. } if !name.is_empty() => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    /// Canonical identifier for `manager`, or `None` if this entry is skipped.
    ///
    /// The apt override replaces the name only when `manager` is apt; Homebrew
    /// always installs the declared name.
    pub fn normalize(&self, manager: ResolvedManager) -> Option<String> {
        let name = self.plain_name()?;
        match (self, manager) {
            (
                Self::Overridable {
                    apt_override: Some(apt_name),
                    ..
                },
                ResolvedManager::Apt,
            ) => Some(apt_name.clone()),
            _ => Some(name.to_string()),
        }
    }

    /// Whether this entry will be skipped.
    pub fn is_malformed(&self) -> bool {
        self.plain_name().is_none()
    }

    /// Short text describing this entry in messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Bare(name) if name.is_empty() => "\"\"".to_string(),
            Self::Bare(name) => name.clone(),
            Self::Overridable {
                name,
                apt_override: Some(apt),
            } => format!("{} (apt: {})", name, apt),
            Self::Overridable { name, .. } => name.clone(),
            Self::Malformed(raw) => raw.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for PackageEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl From<&str> for PackageEntry {
    fn from(name: &str) -> Self {
        Self::Bare(name.to_string())
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Vec<PackageEntry> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn decodes_bare_names() {
        let entries = parse("- jq\n- git\n");
        assert_eq!(entries, vec![PackageEntry::from("jq"), PackageEntry::from("git")]);
    }

    #[test]
    fn decodes_record_with_override() {
        let entries = parse("- name: fd\n  apt-override: fd-find\n");
        assert_eq!(
            entries,
            vec![PackageEntry::Overridable {
                name: "fd".into(),
                apt_override: Some("fd-find".into()),
            }]
        );
    }

    #[test]
    fn decodes_record_without_override() {
        let entries = parse("- name: tmux\n");
        assert_eq!(
            entries,
            vec![PackageEntry::Overridable {
                name: "tmux".into(),
                apt_override: None,
            }]
        );
    }

    #[test]
    fn decodes_single_key_shorthand() {
        let entries = parse("- ripgrep:\n    apt-override: rg-tools\n");
        assert_eq!(
            entries,
            vec![PackageEntry::Overridable {
                name: "ripgrep".into(),
                apt_override: Some("rg-tools".into()),
            }]
        );
    }

    #[test]
    fn single_key_with_scalar_value_keeps_name() {
        let entries = parse("- bat: latest\n");
        assert_eq!(entries[0].normalize(ResolvedManager::Apt), Some("bat".into()));
    }

    #[test]
    fn empty_override_is_ignored() {
        let entries = parse("- name: fd\n  apt-override: \"\"\n");
        assert_eq!(entries[0].normalize(ResolvedManager::Apt), Some("fd".into()));
    }

    #[test]
    fn entries_without_name_are_malformed() {
        let entries = parse(
            "- apt-override: orphan\n  other: x\n- 42\n- ~\n- name: \"\"\n- [a, b]\n",
        );
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(PackageEntry::is_malformed));
        assert!(entries
            .iter()
            .all(|e| e.normalize(ResolvedManager::Apt).is_none()));
    }

    #[test]
    fn lone_override_is_malformed() {
        let entries = parse("- apt-override: orphan\n");
        assert!(entries[0].is_malformed());
    }

    #[test]
    fn empty_bare_name_is_skipped() {
        let entry = PackageEntry::from("");
        assert!(entry.is_malformed());
        assert_eq!(entry.normalize(ResolvedManager::Brew), None);
    }

    #[test]
    fn apt_uses_override() {
        let entry = PackageEntry::Overridable {
            name: "fd".into(),
            apt_override: Some("fd-find".into()),
        };
        assert_eq!(entry.normalize(ResolvedManager::Apt), Some("fd-find".into()));
    }

    #[test]
    fn brew_never_uses_override() {
        let entry = PackageEntry::Overridable {
            name: "fd".into(),
            apt_override: Some("fd-find".into()),
        };
        assert_eq!(entry.normalize(ResolvedManager::Brew), Some("fd".into()));
    }

    #[test]
    fn normalization_is_stable() {
        let entry = PackageEntry::Overridable {
            name: "fd".into(),
            apt_override: Some("fd-find".into()),
        };
        for manager in [ResolvedManager::Apt, ResolvedManager::Brew] {
            assert_eq!(entry.normalize(manager), entry.normalize(manager));
        }
    }

    #[test]
    fn describe_mentions_override() {
        let entry = PackageEntry::Overridable {
            name: "fd".into(),
            apt_override: Some("fd-find".into()),
        };
        assert_eq!(entry.describe(), "fd (apt: fd-find)");
    }

    #[test]
    fn malformed_keeps_raw_yaml() {
        let entries = parse("- foo: 1\n  bar: 2\n");
        match &entries[0] {
            PackageEntry::Malformed(raw) => {
                assert!(raw.contains("foo"));
                assert!(raw.contains("bar"));
            }
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }
}
