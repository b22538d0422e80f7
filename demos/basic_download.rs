//! Basic download example
//!
//! This example demonstrates the core functionality of media-dl:
//! - Creating a downloader instance
//! - Subscribing to events
//! - Queueing URLs with per-item options
//! - Running a bounded batch and pausing it on Ctrl+C
//!
//! Usage: `cargo run --example basic_download -- <url> [<url>...]`

use media_dl::config::{Config, DownloadConfig};
use media_dl::{AddOptions, Event, MediaDownloader, PlaylistSelection, VideoQuality};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("media_dl=info")),
        )
        .init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: basic_download <url> [<url>...]");
        return Ok(());
    }

    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            parallel_downloads: 2,
            default_quality: VideoQuality::Q1080p,
            ..Default::default()
        },
        ..Default::default()
    };

    let downloader = MediaDownloader::new(config).await?;
    println!("Using yt-dlp at {}", downloader.ytdlp_path().display());

    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Queued { id, url } => {
                    println!("✓ Queued {}: {}", id, url);
                }
                Event::TitleChanged { id, title } => {
                    println!("🎬 {} is \"{}\"", id, title);
                }
                Event::Progress {
                    id,
                    percentage,
                    downloaded_bytes,
                    total_bytes,
                    ..
                } => {
                    println!(
                        "⬇ {}: {}% ({:.1} / {:.1} MB)",
                        id,
                        percentage,
                        downloaded_bytes as f64 / 1_048_576.0,
                        total_bytes as f64 / 1_048_576.0
                    );
                }
                Event::StatusChanged { id, status } => {
                    println!("• {} is now {:?}", id, status);
                }
                Event::Removed { id } => {
                    println!("✗ Removed {}", id);
                }
            }
        }
    });

    for url in &urls {
        downloader
            .add(
                url,
                AddOptions {
                    // Only the first three entries when the URL is a playlist
                    playlist: PlaylistSelection::range(1, 3),
                    ..Default::default()
                },
            )
            .await;
    }

    let batch = downloader.start_all().await;
    tokio::select! {
        _ = batch.join() => {
            println!("All downloads finished");
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Interrupted, pausing downloads");
            downloader.shutdown().await?;
        }
    }

    for item in downloader.queue() {
        println!("{:?}  {}  {}", item.status, item.title, item.url);
    }

    Ok(())
}
