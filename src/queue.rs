//! Ordered, thread-safe collection of media records

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::media::MediaRecord;
use crate::types::MediaId;

/// Insertion-ordered queue of shared media records
///
/// Duplicate ids are allowed; lookups and removal act on the first match.
/// Every operation takes the single internal lock briefly and never awaits.
#[derive(Debug, Default)]
pub struct MediaQueue {
    items: Mutex<Vec<Arc<MediaRecord>>>,
}

impl MediaQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    ///
    /// Returns `false` (and leaves the queue unchanged) when the record's id is empty.
    pub fn add(&self, record: Arc<MediaRecord>) -> bool {
        if record.id().is_empty() {
            tracing::debug!(url = record.url(), "Ignoring media record with empty id");
            return false;
        }
        self.lock().push(record);
        true
    }

    /// Remove the first record with the given id
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no record has that id; the queue is unchanged.
    pub fn remove(&self, id: &MediaId) -> Result<Arc<MediaRecord>> {
        let mut items = self.lock();
        let pos = items
            .iter()
            .position(|m| m.id() == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        Ok(items.remove(pos))
    }

    /// Independent copy of the current ordering
    ///
    /// The returned `Vec` is detached from the queue, though the records in it
    /// are the live shared instances.
    pub fn snapshot(&self) -> Vec<Arc<MediaRecord>> {
        self.lock().clone()
    }

    /// The live record with the given id
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when absent.
    pub fn get(&self, id: &MediaId) -> Result<Arc<MediaRecord>> {
        self.lock()
            .iter()
            .find(|m| m.id() == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// Number of queued records
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<MediaRecord>>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
