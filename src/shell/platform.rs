//! Host process facts: privilege level and PATH lookup.

use std::path::{Path, PathBuf};

/// Check if running as root/admin.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    {
        std::env::var("ADMIN").is_ok()
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

/// Find `program` on the current `PATH`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in_dirs(program, std::env::split_paths(&path))
}

fn find_in_dirs<I>(program: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_elevated_does_not_panic() {
        let _ = is_elevated();
    }

    #[test]
    fn find_in_dirs_misses_unknown_program() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(find_in_dirs("nope-12345", vec![temp.path().to_path_buf()]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn find_in_dirs_requires_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let tool = temp.path().join("sudo");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        assert!(find_in_dirs("sudo", vec![temp.path().to_path_buf()]).is_none());

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(
            find_in_dirs("sudo", vec![temp.path().to_path_buf()]),
            Some(tool)
        );
    }
}
