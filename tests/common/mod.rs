//! Common test utilities for media-dl integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use media_dl::{CommandProvider, CommandSpec, Config, Event, MediaDownloader, MediaRecord};
use tempfile::TempDir;

/// Stand-in for yt-dlp: runs a `/bin/sh` script with the media URL as `$1`
pub struct ShellProvider {
    pub script: String,
}

impl CommandProvider for ShellProvider {
    fn command_for(&self, media: &MediaRecord) -> CommandSpec {
        CommandSpec {
            program: PathBuf::from("/bin/sh"),
            args: vec![
                "-c".to_string(),
                self.script.clone(),
                "fake-yt-dlp".to_string(),
                media.url().to_string(),
            ],
        }
    }
}

/// Script printing a single 100% progress line titled after the URL's last segment
pub const COMPLETE_SCRIPT: &str = r#"title="${1##*/}"
echo "[youtube] $title: Downloading webpage"
echo "[media-dl] $title [downloaded] 512 [total] 1024 [frag] NA [frags] NA"
echo "[media-dl] $title [downloaded] 1024 [total] 1024 [frag] NA [frags] NA""#;

/// Create a downloader rooted in a fresh temp dir, driven by `script`
pub async fn create_downloader(script: &str, parallel: usize) -> (MediaDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().expect("tempdir");

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.parallel_downloads = parallel;
    config.tools.search_path = false;

    let downloader = MediaDownloader::with_command_provider(
        config,
        std::sync::Arc::new(ShellProvider {
            script: script.to_string(),
        }),
    )
    .await
    .expect("downloader");

    (downloader, temp_dir)
}

/// Collect events until the predicate matches or the timeout expires
pub async fn collect_events_until<F>(
    events: &mut tokio::sync::broadcast::Receiver<Event>,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<Event>
where
    F: Fn(&[Event]) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            collected.push(event);
            if stop_predicate(&collected) {
                break;
            }
        }
    })
    .await;

    collected
}
