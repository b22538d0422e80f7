//! Bridging per-run observer callbacks onto the broadcast event channel

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::media::{MediaObserver, MediaSnapshot};
use crate::types::{Event, MediaId, Status};

/// [`MediaObserver`] that republishes every callback as an [`Event`]
#[derive(Clone, Debug)]
pub struct EventObserver {
    event_tx: broadcast::Sender<Event>,
}

impl EventObserver {
    /// Publish onto the given channel
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self { event_tx }
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine; the event is dropped
        self.event_tx.send(event).ok();
    }
}

#[async_trait]
impl MediaObserver for EventObserver {
    async fn on_progress(&self, id: &MediaId, snapshot: &MediaSnapshot) {
        self.emit(Event::Progress {
            id: id.clone(),
            title: snapshot.title.clone(),
            percentage: snapshot.progress.percentage,
            downloaded_bytes: snapshot.progress.downloaded_bytes,
            total_bytes: snapshot.progress.total_bytes,
            logs: snapshot.progress.logs.clone(),
        });
    }

    async fn on_status_changed(&self, id: &MediaId, status: Status) {
        self.emit(Event::StatusChanged {
            id: id.clone(),
            status,
        });
    }

    async fn on_title_changed(&self, id: &MediaId, title: &str) {
        self.emit(Event::TitleChanged {
            id: id.clone(),
            title: title.to_string(),
        });
    }
}

/// The event bridge plus any observers registered by the embedder
#[derive(Clone)]
pub(crate) struct ObserverSet {
    events: EventObserver,
    extra: Vec<Arc<dyn MediaObserver>>,
}

impl ObserverSet {
    pub(crate) fn new(events: EventObserver) -> Self {
        Self {
            events,
            extra: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, observer: Arc<dyn MediaObserver>) {
        self.extra.push(observer);
    }
}

#[async_trait]
impl MediaObserver for ObserverSet {
    async fn on_progress(&self, id: &MediaId, snapshot: &MediaSnapshot) {
        self.events.on_progress(id, snapshot).await;
        for observer in &self.extra {
            observer.on_progress(id, snapshot).await;
        }
    }

    async fn on_status_changed(&self, id: &MediaId, status: Status) {
        self.events.on_status_changed(id, status).await;
        for observer in &self.extra {
            observer.on_status_changed(id, status).await;
        }
    }

    async fn on_title_changed(&self, id: &MediaId, title: &str) {
        self.events.on_title_changed(id, title).await;
        for observer in &self.extra {
            observer.on_title_changed(id, title).await;
        }
    }
}
