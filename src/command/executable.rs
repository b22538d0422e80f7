//! yt-dlp executable discovery

use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;

/// Bare executable name, left to the OS when nothing else is found
pub const YTDLP_NAME: &str = "yt-dlp";

/// Platform file name of a yt-dlp binary shipped next to the application
pub fn bundled_file_name() -> &'static str {
    if cfg!(windows) { "yt-dlp.exe" } else { YTDLP_NAME }
}

/// Resolve the yt-dlp executable
///
/// Order: explicitly configured path, a binary bundled in the directory of the
/// running executable, the first match on `PATH` (when `search_path` is set),
/// and finally the bare name so spawning reports the failure.
pub fn resolve_ytdlp(tools: &ToolsConfig) -> PathBuf {
    if let Some(path) = &tools.ytdlp_path {
        tracing::debug!(path = %path.display(), "Using configured yt-dlp");
        return path.clone();
    }

    let app_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(bundled) = app_dir.as_deref().and_then(find_bundled) {
        tracing::debug!(path = %bundled.display(), "Using bundled yt-dlp");
        return bundled;
    }

    if tools.search_path {
        if let Ok(found) = which::which(YTDLP_NAME) {
            tracing::debug!(path = %found.display(), "Found yt-dlp in PATH");
            return found;
        }
    }

    tracing::warn!("yt-dlp not found, falling back to bare executable name");
    PathBuf::from(YTDLP_NAME)
}

/// A yt-dlp binary inside `dir`, if one exists
pub fn find_bundled(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(bundled_file_name());
    candidate.is_file().then_some(candidate)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn configured_path_wins() {
        let tools = ToolsConfig {
            ytdlp_path: Some(PathBuf::from("/opt/tools/yt-dlp")),
            search_path: true,
        };
        assert_eq!(resolve_ytdlp(&tools), PathBuf::from("/opt/tools/yt-dlp"));
    }

    #[test]
    fn bundled_binary_is_found_in_directory() {
        let dir = tempdir().unwrap();
        assert!(find_bundled(dir.path()).is_none());

        let binary = dir.path().join(bundled_file_name());
        std::fs::write(&binary, b"").unwrap();
        assert_eq!(find_bundled(dir.path()), Some(binary));
    }

    #[test]
    fn directory_named_like_binary_is_ignored() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(bundled_file_name())).unwrap();
        assert!(find_bundled(dir.path()).is_none());
    }

    #[test]
    fn without_search_falls_back_to_bundled_or_bare_name() {
        let tools = ToolsConfig {
            ytdlp_path: None,
            search_path: false,
        };
        let resolved = resolve_ytdlp(&tools);
        // The test binary directory normally has no yt-dlp next to it.
        let bundled = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().and_then(find_bundled));
        assert_eq!(resolved, bundled.unwrap_or_else(|| PathBuf::from(YTDLP_NAME)));
    }

    #[test]
    fn path_search_agrees_with_which() {
        let tools = ToolsConfig::default();
        let resolved = resolve_ytdlp(&tools);
        let bundled = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().and_then(find_bundled));
        let expected = bundled
            .or_else(|| which::which(YTDLP_NAME).ok())
            .unwrap_or_else(|| PathBuf::from(YTDLP_NAME));
        assert_eq!(resolved, expected);
    }
}
