//! Configuration types for media-dl
//!
//! Configuration is supplied by the embedding application. Values are taken as
//! given: a `parallel_downloads` of zero simply starts no workers.

use crate::types::VideoQuality;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Download behavior configuration (destination, concurrency, media defaults)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Default destination directory (default: `~/Downloads`, or `./downloads`)
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Number of worker loops for a bulk start (default: 1)
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,

    /// Quality applied to new items that do not specify one (default: 1080p)
    #[serde(default = "default_quality")]
    pub default_quality: VideoQuality,

    /// Whether new items download audio only by default
    #[serde(default)]
    pub audio_only: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            parallel_downloads: default_parallel_downloads(),
            default_quality: default_quality(),
            audio_only: false,
        }
    }
}

/// External tool configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit or bundled binary exists (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Subprocess output handling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Progress template handed to yt-dlp via `--progress-template`
    #[serde(default = "default_progress_template")]
    pub template: String,

    /// How long to keep draining stdout/stderr after the process exits (default: 5s)
    #[serde(default = "default_reader_drain_timeout")]
    pub reader_drain_timeout: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            template: default_progress_template(),
            reader_drain_timeout: default_reader_drain_timeout(),
        }
    }
}

/// Main configuration for the media downloader
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Subprocess output handling
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl Config {
    /// Default destination directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }
}

/// Defaults applied to newly added media items
///
/// Runtime-mutable through [`MediaDownloader::update_media_defaults`](crate::MediaDownloader::update_media_defaults).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDefaults {
    /// Quality ceiling
    pub quality: VideoQuality,
    /// Destination directory
    pub download_dir: PathBuf,
    /// Download audio only
    pub audio_only: bool,
}

impl From<&DownloadConfig> for MediaDefaults {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            quality: config.default_quality,
            download_dir: config.download_dir.clone(),
            audio_only: config.audio_only,
        }
    }
}

/// Marker placed before the title in every progress line
pub const PROGRESS_MARKER: &str = "[media-dl]";

fn default_download_dir() -> PathBuf {
    std::env::var_os(if cfg!(windows) { "USERPROFILE" } else { "HOME" })
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

fn default_parallel_downloads() -> usize {
    1
}

fn default_quality() -> VideoQuality {
    VideoQuality::Q1080p
}

fn default_true() -> bool {
    true
}

fn default_progress_template() -> String {
    format!(
        "{PROGRESS_MARKER} %(info.title)s [downloaded] %(progress.downloaded_bytes)s \
         [total] %(progress.total_bytes)s [frag] %(progress.fragment_index)s \
         [frags] %(progress.fragment_count)s"
    )
}

fn default_reader_drain_timeout() -> Duration {
    Duration::from_secs(5)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.download.parallel_downloads, 1);
        assert_eq!(config.download.default_quality, VideoQuality::Q1080p);
        assert!(!config.download.audio_only);
        assert!(config.tools.search_path);
        assert!(config.tools.ytdlp_path.is_none());
        assert_eq!(config.progress.reader_drain_timeout, Duration::from_secs(5));
    }

    #[test]
    fn default_template_uses_progress_marker_and_all_fields() {
        let template = default_progress_template();
        assert!(template.starts_with(PROGRESS_MARKER));
        for field in [
            "%(info.title)s",
            "%(progress.downloaded_bytes)s",
            "%(progress.total_bytes)s",
            "%(progress.fragment_index)s",
            "%(progress.fragment_count)s",
        ] {
            assert!(template.contains(field), "missing {field} in {template}");
        }
        assert!(!template.contains('\n'));
    }

    #[test]
    fn config_deserializes_flattened_fields_with_defaults() {
        let json = r#"{ "parallel_downloads": 4, "default_quality": "720p", "ytdlp_path": "/opt/yt-dlp" }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.download.parallel_downloads, 4);
        assert_eq!(config.download.default_quality, VideoQuality::Q720p);
        assert_eq!(
            config.tools.ytdlp_path.as_deref(),
            Some(std::path::Path::new("/opt/yt-dlp"))
        );
        assert!(config.tools.search_path);
        assert!(config.progress.template.starts_with(PROGRESS_MARKER));
    }

    #[test]
    fn media_defaults_follow_download_config() {
        let download = DownloadConfig {
            download_dir: PathBuf::from("/media"),
            parallel_downloads: 2,
            default_quality: VideoQuality::Q480p,
            audio_only: true,
        };
        let defaults = MediaDefaults::from(&download);
        assert_eq!(defaults.quality, VideoQuality::Q480p);
        assert_eq!(defaults.download_dir, PathBuf::from("/media"));
        assert!(defaults.audio_only);
    }
}
