//! Translating media records into yt-dlp invocations
//!
//! - [`builder`] - Fluent argument accumulator
//! - [`executable`] - Locating the yt-dlp binary

pub mod builder;
pub mod executable;

pub use builder::{YtDlpCommandBuilder, format_selector};
pub use executable::resolve_ytdlp;

use std::path::PathBuf;

use crate::media::MediaRecord;

/// Executable path plus argument vector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Program name for logs and error messages
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Produces the command that downloads one media record
///
/// The production implementation is [`YtDlpCommandProvider`]; the seam exists
/// so the download task can be driven by any program that writes progress
/// lines in the same format.
pub trait CommandProvider: Send + Sync {
    /// Command for this record
    fn command_for(&self, media: &MediaRecord) -> CommandSpec;
}

/// [`CommandProvider`] that runs yt-dlp with the configured progress template
#[derive(Clone, Debug)]
pub struct YtDlpCommandProvider {
    program: PathBuf,
    progress_template: String,
}

impl YtDlpCommandProvider {
    /// Create a provider for a resolved executable and progress template
    pub fn new(program: PathBuf, progress_template: impl Into<String>) -> Self {
        Self {
            program,
            progress_template: progress_template.into(),
        }
    }

    /// Resolved yt-dlp path
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl CommandProvider for YtDlpCommandProvider {
    fn command_for(&self, media: &MediaRecord) -> CommandSpec {
        let builder = YtDlpCommandBuilder::new(self.program.clone()).url(media.url());
        let builder = if media.audio_only() {
            builder.audio()
        } else {
            builder.quality(media.quality())
        };
        builder
            .output_dir(media.download_dir())
            .safe_filenames()
            .playlist(media.playlist())
            .progress_template(&self.progress_template)
            .newline()
            .build()
    }
}
