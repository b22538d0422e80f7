//! Shared test helpers for creating MediaDownloader instances in tests.

use crate::command::{CommandProvider, CommandSpec};
use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::media::MediaRecord;
use crate::types::{MediaId, Status};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

/// Progress line in the format the parser expects
pub(crate) fn progress_line(title: &str, downloaded: &str, total: &str, frag: &str, frags: &str) -> String {
    format!("[media-dl] {title} [downloaded] {downloaded} [total] {total} [frag] {frag} [frags] {frags}")
}

/// Runs a `/bin/sh -c` script instead of yt-dlp
///
/// Scripts are chosen by URL, falling back to a default. The URL is passed as `$1`.
#[derive(Default)]
pub(crate) struct ScriptCommandProvider {
    default_script: String,
    by_url: Mutex<HashMap<String, String>>,
}

impl ScriptCommandProvider {
    pub(crate) fn new(default_script: impl Into<String>) -> Self {
        Self {
            default_script: default_script.into(),
            by_url: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn set_script(&self, url: &str, script: impl Into<String>) {
        self.by_url
            .lock()
            .unwrap()
            .insert(url.to_string(), script.into());
    }
}

impl CommandProvider for ScriptCommandProvider {
    fn command_for(&self, media: &MediaRecord) -> CommandSpec {
        let script = self
            .by_url
            .lock()
            .unwrap()
            .get(media.url())
            .cloned()
            .unwrap_or_else(|| self.default_script.clone());
        CommandSpec {
            program: PathBuf::from("/bin/sh"),
            args: vec![
                "-c".into(),
                script,
                "media-dl-test".into(),
                media.url().to_string(),
            ],
        }
    }
}

/// Points every run at a program that does not exist
pub(crate) struct MissingProgramProvider;

impl CommandProvider for MissingProgramProvider {
    fn command_for(&self, _media: &MediaRecord) -> CommandSpec {
        CommandSpec {
            program: PathBuf::from("/nonexistent/media-dl-test/yt-dlp"),
            args: vec![],
        }
    }
}

/// Helper to create a test MediaDownloader driven by `commands`.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    commands: Arc<dyn CommandProvider>,
    parallel_downloads: usize,
) -> (MediaDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.parallel_downloads = parallel_downloads;
    config.tools.search_path = false;
    config.progress.reader_drain_timeout = Duration::from_secs(2);

    let downloader = MediaDownloader::with_command_provider(config, commands)
        .await
        .unwrap();

    (downloader, temp_dir)
}

/// Poll until `check` holds or the timeout expires
pub(crate) async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Poll until the item reaches `status`
pub(crate) async fn wait_for_status(
    downloader: &MediaDownloader,
    id: &MediaId,
    status: Status,
) -> bool {
    wait_until(Duration::from_secs(10), || {
        downloader.get(id).map(|m| m.status == status).unwrap_or(false)
    })
    .await
}
