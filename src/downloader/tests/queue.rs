use super::*;
use crate::config::MediaDefaults;
use crate::types::{Event, PlaylistSelection, VideoQuality};
use std::path::PathBuf;

async fn downloader() -> (MediaDownloader, tempfile::TempDir) {
    create_test_downloader(Arc::new(MissingProgramProvider), 2).await
}

#[tokio::test]
async fn test_add_queues_pending_item_with_defaults() {
    let (downloader, temp_dir) = downloader().await;

    let id = downloader
        .add("https://example.com/watch?v=1", AddOptions::default())
        .await;

    assert!(!id.is_empty());
    let item = downloader.get(&id).unwrap();
    assert_eq!(item.status, Status::Pending);
    assert_eq!(item.title, crate::media::PLACEHOLDER_TITLE);
    assert_eq!(item.url, "https://example.com/watch?v=1");
    assert_eq!(item.quality, VideoQuality::Q1080p);
    assert!(!item.audio_only);
    assert_eq!(item.download_dir, temp_dir.path().join("downloads"));
    assert_eq!(item.progress.percentage, 0);
    assert!(item.progress.logs.is_empty());
}

#[tokio::test]
async fn test_add_options_override_defaults() {
    let (downloader, _temp_dir) = downloader().await;

    let id = downloader
        .add(
            "  https://example.com/list  ",
            AddOptions {
                quality: Some(VideoQuality::Q360p),
                download_dir: Some(PathBuf::from("/elsewhere")),
                audio_only: Some(true),
                playlist: PlaylistSelection::range(2, 4),
            },
        )
        .await;

    let item = downloader.get(&id).unwrap();
    assert_eq!(item.url, "https://example.com/list");
    assert_eq!(item.quality, VideoQuality::Q360p);
    assert_eq!(item.download_dir, PathBuf::from("/elsewhere"));
    assert!(item.audio_only);
    assert_eq!(item.playlist, PlaylistSelection::range(2, 4));
}

#[tokio::test]
async fn test_invalid_playlist_is_accepted() {
    let (downloader, _temp_dir) = downloader().await;

    let id = downloader
        .add(
            "https://example.com/list",
            AddOptions {
                playlist: PlaylistSelection::range(5, 1),
                ..Default::default()
            },
        )
        .await;

    assert_eq!(downloader.queue().len(), 1);
    assert_eq!(downloader.get(&id).unwrap().playlist.to_items_arg(), None);
}

#[tokio::test]
async fn test_updated_defaults_apply_to_new_items_only() {
    let (downloader, _temp_dir) = downloader().await;

    let before = downloader.add("https://example.com/a", AddOptions::default()).await;
    downloader
        .update_media_defaults(MediaDefaults {
            quality: VideoQuality::Q2160p,
            download_dir: PathBuf::from("/media/new"),
            audio_only: true,
        })
        .await;
    let after = downloader.add("https://example.com/b", AddOptions::default()).await;

    assert_eq!(downloader.get(&before).unwrap().quality, VideoQuality::Q1080p);
    let item = downloader.get(&after).unwrap();
    assert_eq!(item.quality, VideoQuality::Q2160p);
    assert_eq!(item.download_dir, PathBuf::from("/media/new"));
    assert!(item.audio_only);
}

#[tokio::test]
async fn test_queue_preserves_insertion_order() {
    let (downloader, _temp_dir) = downloader().await;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            downloader
                .add(&format!("https://example.com/{i}"), AddOptions::default())
                .await,
        );
    }
    downloader.remove(&ids[1]).unwrap();

    let queued: Vec<MediaId> = downloader.queue().into_iter().map(|m| m.id).collect();
    assert_eq!(queued, vec![ids[0].clone(), ids[2].clone(), ids[3].clone(), ids[4].clone()]);
}

#[tokio::test]
async fn test_remove_unknown_id_returns_not_found() {
    let (downloader, _temp_dir) = downloader().await;
    downloader.add("https://example.com/a", AddOptions::default()).await;

    let result = downloader.remove(&MediaId::from("missing"));
    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(downloader.queue().len(), 1);
}

#[tokio::test]
async fn test_add_and_remove_emit_events() {
    let (downloader, _temp_dir) = downloader().await;
    let mut events = downloader.subscribe();

    let id = downloader.add("https://example.com/a", AddOptions::default()).await;
    downloader.remove(&id).unwrap();

    match events.recv().await.unwrap() {
        Event::Queued { id: queued, url } => {
            assert_eq!(queued, id);
            assert_eq!(url, "https://example.com/a");
        }
        other => panic!("expected Queued, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        Event::Removed { id: removed } => assert_eq!(removed, id),
        other => panic!("expected Removed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_unknown_id_returns_not_found() {
    let (downloader, _temp_dir) = downloader().await;
    assert!(matches!(
        downloader.get(&MediaId::from("nope")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        downloader.pause_one(&MediaId::from("nope")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        downloader.start_one(&MediaId::from("nope")),
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_set_parallel_downloads() {
    let (downloader, _temp_dir) = downloader().await;
    assert_eq!(downloader.parallel_downloads(), 2);

    downloader.set_parallel_downloads(5);
    assert_eq!(downloader.parallel_downloads(), 5);
}

#[tokio::test]
async fn test_start_all_with_empty_queue_selects_nothing() {
    let (downloader, _temp_dir) = downloader().await;

    let batch = downloader.start_all().await;
    assert!(batch.is_empty());
    assert_eq!(batch.worker_count(), 0);
    batch.join().await;
}

#[tokio::test]
async fn test_zero_parallelism_starts_no_workers() {
    let (downloader, _temp_dir) = downloader().await;
    downloader.set_parallel_downloads(0);
    let id = downloader.add("https://example.com/a", AddOptions::default()).await;

    let batch = downloader.start_all().await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.worker_count(), 0);
    batch.join().await;

    assert_eq!(downloader.get(&id).unwrap().status, Status::Pending);
}

#[tokio::test]
async fn test_spawn_failure_marks_item_failed() {
    let (downloader, _temp_dir) = downloader().await;
    let id = downloader.add("https://example.com/a", AddOptions::default()).await;

    let result = downloader.start_one(&id).unwrap().await.unwrap();
    assert!(matches!(result, Err(Error::Process(_))));

    let item = downloader.get(&id).unwrap();
    assert_eq!(item.status, Status::Failed);
    let last = item.progress.logs.last().unwrap();
    assert!(last.starts_with("Download failed: "), "got: {last}");
    assert!(last.contains("failed to start"), "got: {last}");
}

#[tokio::test]
async fn test_ytdlp_path_is_resolved() {
    let (downloader, _temp_dir) = downloader().await;
    assert!(!downloader.ytdlp_path().as_os_str().is_empty());
}
