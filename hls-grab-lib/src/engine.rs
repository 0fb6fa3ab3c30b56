//! Engine binary discovery

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::PlannerConfig;

/// Executable name searched on `PATH`
pub const ENGINE_NAME: &str = "ffmpeg";

/// Find the engine binary.
///
/// An explicit `engine_binary_path` is returned as-is, even if it does not
/// exist, so a misconfiguration surfaces when the engine is run. Otherwise
/// `PATH` is searched.
pub fn locate_engine(config: &PlannerConfig) -> Option<PathBuf> {
    if let Some(path) = &config.engine_binary_path {
        tracing::debug!("engine binary from config: {}", path.display());
        return Some(path.clone());
    }
    let found = std::env::var_os("PATH").and_then(|p| find_in_path(ENGINE_NAME, &p));
    match &found {
        Some(path) => tracing::debug!("engine binary on PATH: {}", path.display()),
        None => tracing::debug!("no {} on PATH", ENGINE_NAME),
    }
    found
}

/// Search a `PATH`-style list for an executable file called `name`.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![dir.join(format!("{}.exe", name)), dir.join(name)]
    } else {
        vec![dir.join(name)]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// First line of `-version` output, e.g. `ffmpeg version 6.1.1 Copyright ...`.
pub fn parse_version_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_override_wins() {
        let config = PlannerConfig {
            engine_binary_path: Some(PathBuf::from("/opt/ff/bin/ffmpeg")),
            ..Default::default()
        };
        assert_eq!(
            locate_engine(&config),
            Some(PathBuf::from("/opt/ff/bin/ffmpeg"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path() {
        use std::ffi::OsString;
        use std::os::unix::fs::PermissionsExt;

        let empty = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let not_exec = tempfile::tempdir().unwrap();

        let plain = not_exec.path().join("ffmpeg");
        std::fs::write(&plain, "").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        let exe = bin.path().join("ffmpeg");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path_var: OsString =
            std::env::join_paths([empty.path(), not_exec.path(), bin.path()]).unwrap();
        assert_eq!(find_in_path("ffmpeg", &path_var), Some(exe));

        let path_var: OsString = std::env::join_paths([empty.path()]).unwrap();
        assert_eq!(find_in_path("ffmpeg", &path_var), None);
    }

    #[test]
    fn test_parse_version_line() {
        let out = "ffmpeg version 6.1.1 Copyright (c) 2000-2023\nbuilt with gcc\n";
        assert_eq!(
            parse_version_line(out).as_deref(),
            Some("ffmpeg version 6.1.1 Copyright (c) 2000-2023")
        );
        assert_eq!(parse_version_line(""), None);
    }
}
