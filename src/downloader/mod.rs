//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`queue_ops`] - Adding, removing and inspecting queued media
//! - [`control`] - Starting and pausing downloads
//! - [`config_ops`] - Runtime configuration updates
//! - [`lifecycle`] - Shutdown coordination
//! - [`pool`] - Bounded worker pool used by bulk starts
//! - [`task`] - Running one item through yt-dlp
//! - [`events`] - Observer that republishes changes as [`Event`]s

mod config_ops;
mod control;
mod events;
mod lifecycle;
mod pool;
mod queue_ops;
mod task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use events::EventObserver;
pub use pool::BatchHandle;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize};

use crate::command::{CommandProvider, YtDlpCommandProvider, resolve_ytdlp};
use crate::config::{Config, MediaDefaults};
use crate::error::{Error, Result};
use crate::media::MediaObserver;
use crate::queue::MediaQueue;
use crate::types::Event;
use events::ObserverSet;
use pool::TaskEnv;

/// Runtime-mutable configuration (separate from static config)
#[derive(Clone)]
pub(crate) struct RuntimeConfig {
    /// Worker count for the next bulk start
    pub(crate) parallel_downloads: Arc<AtomicUsize>,
    /// Defaults applied by `add` to options left unset
    pub(crate) media_defaults: Arc<tokio::sync::RwLock<MediaDefaults>>,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Ordered media queue (the canonical owner of every record)
    pub(crate) queue: Arc<MediaQueue>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Builds the command line for each run
    pub(crate) commands: Arc<dyn CommandProvider>,
    /// Observer attached to every run
    pub(crate) observer: Arc<ObserverSet>,
    /// Resolved yt-dlp executable
    pub(crate) ytdlp_path: PathBuf,
    /// Runtime-mutable configuration
    pub(crate) runtime_config: RuntimeConfig,
    /// Whether new runs may start (cleared by shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// Creates the default download directory if needed, resolves the yt-dlp
    /// executable and sets up the event broadcast channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the download directory cannot be created.
    pub async fn new(config: Config) -> Result<Self> {
        let ytdlp_path = resolve_ytdlp(&config.tools);
        let commands = Arc::new(YtDlpCommandProvider::new(
            ytdlp_path.clone(),
            config.progress.template.clone(),
        ));
        Self::build(config, ytdlp_path, commands).await
    }

    /// Create a downloader that takes its command lines from `commands`
    ///
    /// Useful for wrapping yt-dlp in another launcher, or for driving the
    /// downloader with a stand-in program.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the download directory cannot be created.
    pub async fn with_command_provider(
        config: Config,
        commands: Arc<dyn CommandProvider>,
    ) -> Result<Self> {
        let ytdlp_path = resolve_ytdlp(&config.tools);
        Self::build(config, ytdlp_path, commands).await
    }

    async fn build(
        config: Config,
        ytdlp_path: PathBuf,
        commands: Arc<dyn CommandProvider>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        // Create broadcast channel with buffer size of 1000 events
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let runtime_config = RuntimeConfig {
            parallel_downloads: Arc::new(AtomicUsize::new(config.download.parallel_downloads)),
            media_defaults: Arc::new(tokio::sync::RwLock::new(MediaDefaults::from(
                &config.download,
            ))),
        };

        tracing::info!(
            ytdlp = %ytdlp_path.display(),
            parallel_downloads = config.download.parallel_downloads,
            download_dir = %config.download.download_dir.display(),
            "Media downloader initialized"
        );

        Ok(Self {
            queue: Arc::new(MediaQueue::new()),
            observer: Arc::new(ObserverSet::new(EventObserver::new(event_tx.clone()))),
            event_tx,
            config: Arc::new(config),
            commands,
            ytdlp_path,
            runtime_config,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Attach an additional observer to every future run
    ///
    /// Runs already in progress keep the observers they started with.
    pub fn with_observer(mut self, observer: Arc<dyn MediaObserver>) -> Self {
        Arc::make_mut(&mut self.observer).push(observer);
        self
    }

    /// Subscribe to media events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error.
    ///
    /// Progress, status and title events are delivered from independent tasks,
    /// so their relative order is not guaranteed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "media event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The yt-dlp executable resolved at construction
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Observer handed to each new run
    pub(crate) fn run_observer(&self) -> Arc<dyn MediaObserver> {
        self.observer.clone()
    }

    pub(crate) fn is_accepting_new(&self) -> bool {
        self.accepting_new.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub(crate) fn task_env(&self) -> TaskEnv {
        TaskEnv {
            commands: self.commands.clone(),
            drain_timeout: self.config.progress.reader_drain_timeout,
            accepting_new: self.accepting_new.clone(),
        }
    }
}
