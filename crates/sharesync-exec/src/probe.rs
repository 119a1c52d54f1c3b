//! Capability probe that searches `PATH`

use std::env;
use std::ffi::OsString;
use std::path::Path;

use sharesync_core::ports::ICapabilityProbe;

/// Maps a package name to the executable it installs
fn executable_for(tool: &str) -> &str {
    match tool {
        "cifs-utils" => "mount.cifs",
        other => other,
    }
}

/// [`ICapabilityProbe`] that reports whether a tool is an executable on `PATH`
#[derive(Debug, Clone, Default)]
pub struct PathCapabilityProbe {
    /// Overrides the process `PATH` when set
    search_path: Option<OsString>,
}

impl PathCapabilityProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes `search_path` instead of the process environment
    #[must_use]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl ICapabilityProbe for PathCapabilityProbe {
    fn has(&self, tool: &str) -> bool {
        let executable = executable_for(tool);
        if executable.contains(std::path::MAIN_SEPARATOR) {
            return is_executable(Path::new(executable));
        }

        let Some(path_env) = self.search_path.clone().or_else(|| env::var_os("PATH")) else {
            return false;
        };
        env::split_paths(&path_env)
            .filter(|dir| !dir.as_os_str().is_empty())
            .any(|dir| is_executable(&dir.join(executable)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use sharesync_core::ports::requirement_report;
    use tempfile::TempDir;

    use super::*;

    fn install(dir: &TempDir, name: &str) {
        let path = dir.path().join(name);
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_finds_tools_on_search_path() {
        let dir = TempDir::new().unwrap();
        install(&dir, "lftp");
        install(&dir, "mount.cifs");
        let probe = PathCapabilityProbe::with_search_path(dir.path());

        let report = requirement_report(
            &probe,
            &[
                "smbclient".to_string(),
                "cifs-utils".to_string(),
                "rsync".to_string(),
                "lftp".to_string(),
            ],
        );

        assert!(report["lftp"]);
        assert!(report["cifs-utils"]);
        assert!(!report["smbclient"]);
        assert!(!report["rsync"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rsync"), b"").unwrap();
        let probe = PathCapabilityProbe::with_search_path(dir.path());
        assert!(!probe.has("rsync"));
    }

    #[test]
    fn test_empty_search_path() {
        let probe = PathCapabilityProbe::with_search_path("");
        assert!(!probe.has("lftp"));
    }
}
