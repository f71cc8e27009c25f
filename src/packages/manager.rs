//! System package manager selection.

use std::fmt;

/// The system package manager used for the `packages.yaml` source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedManager {
    /// Homebrew (macOS).
    Brew,
    /// apt / dpkg (everything else).
    Apt,
}

impl ResolvedManager {
    /// Short name as used in config files and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brew => "brew",
            Self::Apt => "apt",
        }
    }
}

impl fmt::Display for ResolvedManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the manager for the host this binary runs on.
pub fn resolve() -> ResolvedManager {
    resolve_for(std::env::consts::OS)
}

/// Resolve the manager for an OS identifier.
///
/// Darwin-family platforms get Homebrew; anything else, including
/// unrecognized platforms, gets apt.
pub fn resolve_for(os: &str) -> ResolvedManager {
    let os = os.to_ascii_lowercase();
    if os.starts_with("darwin") || os == "macos" {
        ResolvedManager::Brew
    } else {
        ResolvedManager::Apt
    }
}
