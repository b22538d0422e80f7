//! Error types for media-dl
//!
//! Most failures in this crate are local to a single media item: a malformed
//! progress line is simply not used for progress, and a failing yt-dlp process
//! only marks its own item as failed. The types here exist so those outcomes
//! can still be reported precisely to callers that ask for them.

use crate::types::{MediaId, Status};
use thiserror::Error;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Media item not found in the queue
    #[error("media not found: {0}")]
    NotFound(MediaId),

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// The external downloader process could not be run or exited unsuccessfully
    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    /// A run was cancelled through its cancellation token (pause)
    ///
    /// This is not a failure: the item is left in the `Paused` state and can be
    /// started again.
    #[error("download cancelled")]
    Cancelled,

    /// Shutdown in progress - not starting new downloads
    #[error("shutdown in progress: not starting new downloads")]
    ShuttingDown,

    /// Malformed progress line
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid user-supplied selection
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this error is the cancellation signal rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Download lifecycle errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Cannot perform operation in current state
    #[error("cannot {operation} media {id} in state {current_state:?}")]
    InvalidState {
        /// The media ID that is in an invalid state for the operation
        id: MediaId,
        /// The operation that was attempted (e.g., "start")
        operation: String,
        /// The state that prevents the operation
        current_state: Status,
    },
}

/// Errors from running the external downloader binary
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The process could not be started at all
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that was executed
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the process failed
    #[error("failed to wait for {program}: {source}")]
    Wait {
        /// Program that was executed
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero status
    #[error("{program} exited with {}", describe_exit(.code))]
    ExitStatus {
        /// Program that was executed
        program: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Progress line parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not follow the progress template
    #[error("failed to parse log line: format mismatch")]
    FormatMismatch,
}

/// Playlist selection validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Range start must be at least 1
    #[error("playlist range start must be >= 1, got {0}")]
    RangeStart(i64),

    /// Range end must not precede its start
    #[error("playlist range end {end} is before start {start}")]
    RangeOrder {
        /// Range start
        start: i64,
        /// Range end
        end: i64,
    },

    /// Items selection has no entries
    #[error("playlist item selection is empty")]
    EmptyItems,

    /// Items selection contains an index below 1
    #[error("playlist item index must be >= 1, got {0}")]
    ItemIndex(i64),

    /// Quality label is not one of the known levels
    #[error("unknown video quality: {0}")]
    UnknownQuality(String),
}
