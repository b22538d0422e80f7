//! Media records and their per-run state
//!
//! A [`MediaRecord`] is shared (`Arc`) between the queue and whichever task is
//! currently downloading it. Mutable fields live behind a short-lived
//! `std::sync::Mutex`; no lock is ever held across an `.await`.
//!
//! Notification hooks are not stored on the record permanently. Each run gets a
//! [`RunHandle`] carrying its cancellation token and observer; the record only
//! keeps a `Weak` reference to it, so once the run ends, `cancel()` becomes a
//! no-op and no callback can outlive the run that registered it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio_util::sync::CancellationToken;

use crate::types::{MediaId, PlaylistSelection, Progress, Status, VideoQuality};

/// Title shown until yt-dlp reports the real one
pub const PLACEHOLDER_TITLE: &str = "Pending...";

/// Receiver of per-item change notifications
///
/// Every callback is delivered on its own spawned task, so deliveries for the
/// same item may arrive out of order. Implementations that need strict
/// ordering must serialize delivery themselves.
///
/// Records mutated outside a tokio runtime run the callback to completion on
/// the calling thread with `futures::executor::block_on`. Callbacks that may
/// be reached that way must not await tokio resources (timers, tokio I/O,
/// `spawn_blocking`), which need a runtime to make progress.
#[async_trait]
pub trait MediaObserver: Send + Sync {
    /// Progress or log output changed
    async fn on_progress(&self, id: &MediaId, snapshot: &MediaSnapshot);

    /// Status changed
    async fn on_status_changed(&self, id: &MediaId, status: Status);

    /// Title changed
    async fn on_title_changed(&self, id: &MediaId, title: &str);
}

/// State owned by one run of a media item
///
/// Created by [`MediaRecord::begin_run`]. Whoever drives the run keeps the
/// `Arc` alive for its duration.
pub struct RunHandle {
    token: CancellationToken,
    observer: Option<Arc<dyn MediaObserver>>,
}

impl RunHandle {
    /// Cancellation token bound to this run
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether this run has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("cancelled", &self.token.is_cancelled())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

/// Point-in-time copy of a record's observable state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSnapshot {
    /// Media ID
    pub id: MediaId,
    /// Source URL
    pub url: String,
    /// Current title
    pub title: String,
    /// Destination directory
    pub download_dir: PathBuf,
    /// Quality ceiling
    pub quality: VideoQuality,
    /// Audio only
    pub audio_only: bool,
    /// Playlist entries to fetch
    pub playlist: PlaylistSelection,
    /// Current status
    pub status: Status,
    /// Current progress
    pub progress: Progress,
}

#[derive(Debug)]
struct RecordState {
    title: String,
    status: Status,
    progress: Progress,
    run: Weak<RunHandle>,
}

/// A single queued download and its mutable run state
#[derive(Debug)]
pub struct MediaRecord {
    id: MediaId,
    url: String,
    download_dir: PathBuf,
    quality: VideoQuality,
    audio_only: bool,
    playlist: PlaylistSelection,
    state: Mutex<RecordState>,
}

/// Builder-style constructor arguments for [`MediaRecord`]
#[derive(Clone, Debug, Default)]
pub struct NewMedia {
    /// Media ID (must be non-empty to be queued)
    pub id: MediaId,
    /// Source URL
    pub url: String,
    /// Destination directory
    pub download_dir: PathBuf,
    /// Quality ceiling
    pub quality: VideoQuality,
    /// Audio only
    pub audio_only: bool,
    /// Playlist entries to fetch
    pub playlist: PlaylistSelection,
}

impl MediaRecord {
    /// Create a Pending record with the placeholder title and empty progress
    pub fn new(spec: NewMedia) -> Self {
        Self {
            id: spec.id,
            url: spec.url,
            download_dir: spec.download_dir,
            quality: spec.quality,
            audio_only: spec.audio_only,
            playlist: spec.playlist,
            state: Mutex::new(RecordState {
                title: PLACEHOLDER_TITLE.to_string(),
                status: Status::Pending,
                progress: Progress::default(),
                run: Weak::new(),
            }),
        }
    }

    /// Media ID
    pub fn id(&self) -> &MediaId {
        &self.id
    }

    /// Source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Destination directory
    pub fn download_dir(&self) -> &std::path::Path {
        &self.download_dir
    }

    /// Quality ceiling
    pub fn quality(&self) -> VideoQuality {
        self.quality
    }

    /// Whether only audio is downloaded
    pub fn audio_only(&self) -> bool {
        self.audio_only
    }

    /// Playlist entries to fetch
    pub fn playlist(&self) -> &PlaylistSelection {
        &self.playlist
    }

    /// Current status
    pub fn status(&self) -> Status {
        self.lock().status
    }

    /// Current title
    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    /// Current progress
    pub fn progress(&self) -> Progress {
        self.lock().progress.clone()
    }

    /// Whether a run handle is currently live for this record
    pub fn has_active_run(&self) -> bool {
        self.lock().run.strong_count() > 0
    }

    /// Consistent copy of all observable fields
    pub fn snapshot(&self) -> MediaSnapshot {
        let state = self.lock();
        self.snapshot_locked(&state)
    }

    /// Start a new run, replacing any previous run handle
    ///
    /// The returned `Arc` must be kept alive by the task driving the run; the
    /// record itself only holds a weak reference.
    pub fn begin_run(&self, observer: Option<Arc<dyn MediaObserver>>) -> Arc<RunHandle> {
        let handle = Arc::new(RunHandle {
            token: CancellationToken::new(),
            observer,
        });
        self.lock().run = Arc::downgrade(&handle);
        handle
    }

    /// Set the status and notify the observer
    pub fn set_status(&self, status: Status) {
        let observer = {
            let mut state = self.lock();
            state.status = status;
            current_observer(&state)
        };
        if let Some(observer) = observer {
            let id = self.id.clone();
            deliver(async move { observer.on_status_changed(&id, status).await });
        }
    }

    /// Set the title and notify the observer
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        let observer = {
            let mut state = self.lock();
            state.title = title.clone();
            current_observer(&state)
        };
        if let Some(observer) = observer {
            let id = self.id.clone();
            deliver(async move { observer.on_title_changed(&id, &title).await });
        }
    }

    /// Append one output line to the log and notify the observer
    pub fn append_log(&self, line: impl Into<String>) {
        let (observer, snapshot) = {
            let mut state = self.lock();
            state.progress.logs.push(line.into());
            (current_observer(&state), self.snapshot_locked(&state))
        };
        self.notify_progress(observer, snapshot);
    }

    /// Replace byte counters and percentage and notify the observer
    pub fn update_progress(&self, downloaded_bytes: u64, total_bytes: u64, percentage: u8) {
        let (observer, snapshot) = {
            let mut state = self.lock();
            state.progress.downloaded_bytes = downloaded_bytes;
            state.progress.total_bytes = total_bytes;
            state.progress.percentage = percentage.min(100);
            (current_observer(&state), self.snapshot_locked(&state))
        };
        self.notify_progress(observer, snapshot);
    }

    /// Cancel the current run, if any
    ///
    /// Safe to call repeatedly and when no run is live.
    pub fn cancel(&self) {
        let run = self.lock().run.upgrade();
        if let Some(run) = run {
            run.token.cancel();
        }
    }

    fn notify_progress(&self, observer: Option<Arc<dyn MediaObserver>>, snapshot: MediaSnapshot) {
        if let Some(observer) = observer {
            let id = self.id.clone();
            deliver(async move { observer.on_progress(&id, &snapshot).await });
        }
    }

    fn snapshot_locked(&self, state: &RecordState) -> MediaSnapshot {
        MediaSnapshot {
            id: self.id.clone(),
            url: self.url.clone(),
            title: state.title.clone(),
            download_dir: self.download_dir.clone(),
            quality: self.quality,
            audio_only: self.audio_only,
            playlist: self.playlist.clone(),
            status: state.status,
            progress: state.progress.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecordState> {
        // A panic while holding this lock cannot leave the plain-data state torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn current_observer(state: &RecordState) -> Option<Arc<dyn MediaObserver>> {
    state.run.upgrade().and_then(|run| run.observer.clone())
}

/// Fire-and-forget delivery of one notification
///
/// Spawned onto the current tokio runtime when there is one, otherwise run to
/// completion on the calling thread. Always called after the record lock has
/// been released.
fn deliver<F>(notification: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(notification);
        }
        Err(_) => futures::executor::block_on(notification),
    }
}
