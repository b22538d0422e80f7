//! # media-dl
//!
//! Queue-driven media downloader built around the external `yt-dlp` binary.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Bounded** - Bulk starts run at most `parallel_downloads` processes per call
//! - **Observable** - Per-item progress is parsed from yt-dlp's output as it arrives
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{AddOptions, Config, MediaDownloader, VideoQuality};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     downloader
//!         .add(
//!             "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!             AddOptions {
//!                 quality: Some(VideoQuality::Q720p),
//!                 ..Default::default()
//!             },
//!         )
//!         .await;
//!
//!     downloader.start_all().await.join().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// yt-dlp command construction and executable discovery
pub mod command;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Media records, run handles and observers
pub mod media;
/// yt-dlp progress line parsing
pub mod progress;
/// Ordered media queue
pub mod queue;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use command::{CommandProvider, CommandSpec, YtDlpCommandBuilder, YtDlpCommandProvider};
pub use config::{Config, DownloadConfig, MediaDefaults, ProgressConfig, ToolsConfig};
pub use downloader::{BatchHandle, EventObserver, MediaDownloader};
pub use error::{DownloadError, Error, ParseError, ProcessError, Result, ValidationError};
pub use media::{MediaObserver, MediaRecord, MediaSnapshot, NewMedia, RunHandle};
pub use progress::{ProgressLine, ProgressUpdate, compute_progress, parse_progress_line};
pub use queue::MediaQueue;
pub use types::{
    AddOptions, Event, MediaId, PlaylistSelection, Progress, SelectionKind, Status, VideoQuality,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method,
/// which pauses every running download.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = MediaDownloader::new(Config::default()).await?;
///     let _batch = downloader.start_all().await;
///
///     // Run until SIGINT/SIGTERM, then pause everything
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: MediaDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(term), Err(int)) => {
            tracing::error!(
                sigterm_error = %term,
                sigint_error = %int,
                "Could not register any signal handlers, using ctrl_c fallback"
            );
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
