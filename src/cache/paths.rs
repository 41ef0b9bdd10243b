// Cache path utilities.
// Resolves where the persisted cache and the log file live on this platform.

use std::path::PathBuf;

use directories::ProjectDirs;

const APP_NAME: &str = "gh-explorer";

/// Get the base cache directory (~/.cache/gh-explorer on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the persisted response cache.
pub fn cache_file_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("cache.json"))
}

/// Path to the log file written while the TUI owns the terminal.
pub fn log_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("gh-explorer.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_paths() {
        // These tests verify path construction, not actual filesystem
        if let Some(path) = cache_file_path() {
            assert!(path.ends_with("cache.json"));
            assert_eq!(path.parent(), cache_dir().as_deref());
        }
        if let Some(path) = log_path() {
            assert!(path.ends_with("gh-explorer.log"));
        }
    }
}
