//! Fluent argument builder for yt-dlp

use std::path::{Path, PathBuf};

use super::CommandSpec;
use crate::types::{PlaylistSelection, VideoQuality};

/// Accumulates yt-dlp arguments in call order
///
/// Every method appends to the argument list; [`build`](Self::build) only reads
/// it, so it can be called any number of times.
///
/// ```
/// use media_dl::command::YtDlpCommandBuilder;
/// use media_dl::VideoQuality;
///
/// let spec = YtDlpCommandBuilder::new("yt-dlp")
///     .url("https://example.com/watch?v=1")
///     .quality(VideoQuality::Q720p)
///     .newline()
///     .build();
///
/// assert_eq!(spec.args[0], "https://example.com/watch?v=1");
/// assert!(spec.args.contains(&"--newline".to_string()));
/// ```
#[derive(Clone, Debug)]
pub struct YtDlpCommandBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl YtDlpCommandBuilder {
    /// Start a builder for the given executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Executable this builder targets
    pub fn executable(&self) -> &Path {
        &self.program
    }

    /// Media URL
    pub fn url(mut self, url: &str) -> Self {
        self.args.push(url.to_string());
        self
    }

    /// Height-bounded format selection with a final unconditional fallback
    pub fn quality(mut self, quality: VideoQuality) -> Self {
        self.args.push("-f".into());
        self.args.push(format_selector(quality));
        self
    }

    /// Best audio stream only
    pub fn audio(mut self) -> Self {
        self.args.push("-f".into());
        self.args.push("bestaudio/best".into());
        self
    }

    /// Output template inside `dir`, titles cut to 100 characters
    pub fn output_dir(mut self, dir: &Path) -> Self {
        self.args.push("-o".into());
        self.args.push(format!("{}/%(title).100s.%(ext)s", dir.display()));
        self
    }

    /// Platform-appropriate filename restriction
    pub fn safe_filenames(mut self) -> Self {
        let flag = if cfg!(windows) {
            "--windows-filenames"
        } else {
            "--restrict-filenames"
        };
        self.args.push(flag.into());
        self
    }

    /// Playlist entry selection
    ///
    /// Adds nothing for `All` or for a selection that does not validate.
    pub fn playlist(mut self, selection: &PlaylistSelection) -> Self {
        if let Some(items) = selection.to_items_arg() {
            self.args.push("--playlist-items".into());
            self.args.push(items);
        }
        self
    }

    /// Machine-readable progress output
    pub fn progress_template(mut self, template: &str) -> Self {
        self.args.push("--progress-template".into());
        self.args.push(template.to_string());
        self
    }

    /// One line per progress update instead of carriage-return overwrites
    pub fn newline(mut self) -> Self {
        self.args.push("--newline".into());
        self
    }

    /// The executable and the arguments accumulated so far
    pub fn build(&self) -> CommandSpec {
        CommandSpec {
            program: self.program.clone(),
            args: self.args.clone(),
        }
    }
}

/// yt-dlp `-f` expression for a quality level
pub fn format_selector(quality: VideoQuality) -> String {
    match quality.max_height() {
        Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best"),
        None => "bestvideo+bestaudio/best".to_string(),
    }
}
