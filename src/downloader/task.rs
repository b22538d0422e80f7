//! Running a single media item through yt-dlp

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::command::{CommandProvider, CommandSpec};
use crate::error::{Error, ProcessError, Result};
use crate::media::{MediaRecord, RunHandle};
use crate::progress::{NOT_AVAILABLE, compute_progress, parse_progress_line};
use crate::types::Status;

/// Windows `CREATE_NO_WINDOW`: keep yt-dlp from flashing a console
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Everything one run of a media item needs
pub(crate) struct MediaTaskContext {
    /// The record being downloaded (shared with the queue)
    pub(crate) media: Arc<MediaRecord>,
    /// Run handle; keeping it alive keeps `cancel()` wired to this run
    pub(crate) run: Arc<RunHandle>,
    /// Source of the command line
    pub(crate) commands: Arc<dyn CommandProvider>,
    /// How long to keep reading output after the process exits
    pub(crate) drain_timeout: Duration,
    /// Cleared by shutdown; runs that have not started yet are skipped
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Run one media item to completion
///
/// Status goes to `InProgress` on entry and ends at `Completed`, `Failed`, or
/// `Paused`. A cancelled run returns [`Error::Cancelled`] so callers can tell a
/// pause apart from a failure; failures also append `Download failed: <msg>` to
/// the item's log.
pub(crate) async fn run_media_task(ctx: MediaTaskContext) -> Result<()> {
    let MediaTaskContext {
        media,
        run,
        commands,
        drain_timeout,
        accepting_new,
    } = ctx;
    let id = media.id().clone();

    if run.is_cancelled() {
        tracing::debug!(media_id = %id, "Run cancelled before it started");
        return Err(Error::Cancelled);
    }
    if !accepting_new.load(Ordering::SeqCst) {
        tracing::debug!(media_id = %id, "Shutting down, run not started");
        return Err(Error::Cancelled);
    }

    media.set_status(Status::InProgress);
    let spec = commands.command_for(&media);
    tracing::info!(
        media_id = %id,
        url = media.url(),
        program = %spec.program_name(),
        args = ?spec.args,
        "Starting download"
    );

    match execute(&media, &run, &spec, drain_timeout).await {
        Ok(()) => {
            media.set_status(Status::Completed);
            tracing::info!(media_id = %id, "Download completed");
            Ok(())
        }
        Err(Error::Cancelled) => {
            media.set_status(Status::Paused);
            tracing::info!(media_id = %id, "Download paused");
            Err(Error::Cancelled)
        }
        Err(e) => {
            media.append_log(format!("Download failed: {e}"));
            media.set_status(Status::Failed);
            tracing::warn!(media_id = %id, error = %e, "Download failed");
            Err(e)
        }
    }
}

async fn execute(
    media: &Arc<MediaRecord>,
    run: &RunHandle,
    spec: &CommandSpec,
    drain_timeout: Duration,
) -> Result<()> {
    let program = spec.program_name();

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(tokio::spawn(read_output(media.clone(), stdout, "stdout")));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(tokio::spawn(read_output(media.clone(), stderr, "stderr")));
    }

    let status = tokio::select! {
        status = child.wait() => status,
        _ = run.token().cancelled() => {
            tracing::debug!(media_id = %media.id(), "Cancellation requested, killing yt-dlp");
            if let Err(e) = child.start_kill() {
                tracing::warn!(media_id = %media.id(), error = %e, "Failed to kill yt-dlp");
            }
            child.wait().await.ok();
            // Orphaned grandchildren may still hold the pipes open
            for reader in &readers {
                reader.abort();
            }
            return Err(Error::Cancelled);
        }
    };

    let status = match status {
        Ok(status) => status,
        Err(source) => {
            abort_all(&readers);
            return Err(ProcessError::Wait { program, source }.into());
        }
    };

    drain(readers, drain_timeout).await;

    if status.success() {
        Ok(())
    } else {
        Err(ProcessError::ExitStatus {
            program,
            code: status.code(),
        }
        .into())
    }
}

/// Wait for both readers to hit EOF, but not forever
async fn drain(mut readers: Vec<JoinHandle<()>>, timeout: Duration) {
    let all = futures::future::join_all(readers.iter_mut());
    if tokio::time::timeout(timeout, all).await.is_err() {
        tracing::debug!(?timeout, "Output readers still busy after process exit, aborting");
    }
    abort_all(&readers);
}

fn abort_all(readers: &[JoinHandle<()>]) {
    for reader in readers {
        reader.abort();
    }
}

async fn read_output<R>(media: Arc<MediaRecord>, stream: R, name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                tracing::debug!(media_id = %media.id(), stream = name, line, "yt-dlp output");
                apply_output_line(&media, line);
            }
            Err(e) => {
                tracing::warn!(media_id = %media.id(), stream = name, error = %e, "Failed to read yt-dlp output");
                break;
            }
        }
    }
}

/// Log one trimmed, non-blank output line and apply it if it is a progress line
pub(crate) fn apply_output_line(media: &MediaRecord, line: &str) {
    media.append_log(line);

    let Ok(parsed) = parse_progress_line(line) else {
        return;
    };

    if !parsed.title.is_empty() && parsed.title != NOT_AVAILABLE && parsed.title != media.title() {
        media.set_title(parsed.title.clone());
    }

    let update = compute_progress(&parsed, media.progress().percentage);
    media.update_progress(update.downloaded_bytes, update.total_bytes, update.percentage);
}
