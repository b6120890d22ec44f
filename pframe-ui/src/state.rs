//! Shared playlist state
//!
//! Thread-safe owner of the playlist for concurrent HTTP handlers. A single
//! mutex serializes every operation, readers included: a snapshot taken
//! while another handler mutates must never observe a half-applied change,
//! so reads take the same exclusion rather than a separate read lock. All
//! operations are in-memory and sub-millisecond, so the critical section
//! stays short and contention is not a concern at this entity count.

use tokio::sync::Mutex;
use uuid::Uuid;

use pframe_common::{FramePayload, ImageStub, Result, Settings, SettingsUpdate, StateSnapshot};

use crate::playlist::{ImageItem, IngestUpload, PlaylistState};

/// Serialized access to the playlist state
///
/// Each public method acquires the lock once, applies the whole operation,
/// and releases; an operation either commits fully or fails with no partial
/// effect.
#[derive(Debug, Default)]
pub struct StateManager {
    inner: Mutex<PlaylistState>,
}

impl StateManager {
    /// Create a manager around an empty playlist with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest uploaded files; returns the created item stubs
    pub async fn ingest(&self, uploads: Vec<IngestUpload>) -> Vec<ImageStub> {
        self.inner.lock().await.ingest(uploads)
    }

    /// Atomic point-in-time view of current, queue, history and settings
    pub async fn snapshot(&self) -> StateSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Remove an id from the queue
    pub async fn remove_from_queue(&self, id: Uuid) -> Result<()> {
        self.inner.lock().await.remove_from_queue(id)
    }

    /// Replace the queue order with a permutation of its current id set
    pub async fn reorder_queue(&self, order: &[Uuid]) -> Result<()> {
        self.inner.lock().await.reorder_queue(order)
    }

    /// Insert a known item into the queue (moving it out of history if needed)
    pub async fn insert_into_queue(&self, id: Uuid, index: Option<usize>) -> Result<()> {
        self.inner.lock().await.insert_into_queue(id, index)
    }

    /// Move a known item into the bounded history
    pub async fn move_to_history(&self, id: Uuid, index: Option<usize>) -> Result<()> {
        self.inner.lock().await.move_to_history(id, index)
    }

    /// Set an item's display offsets
    pub async fn update_transform(&self, id: Uuid, offset_x: f64, offset_y: f64) -> Result<ImageStub> {
        self.inner.lock().await.update_transform(id, offset_x, offset_y)
    }

    /// Apply a partial settings update; returns the full resulting settings
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        self.inner.lock().await.update_settings(update)
    }

    /// Fetch an item for the raw byte endpoint
    ///
    /// The returned clone shares the immutable byte payload, so serving it
    /// needs no further synchronization.
    pub async fn image(&self, id: Uuid) -> Result<ImageItem> {
        self.inner.lock().await.image(id)
    }

    /// Frame descriptor for the current item (self-healing)
    pub async fn current_frame(&self) -> Result<FramePayload> {
        self.inner.lock().await.current_frame()
    }

    /// Rotate and return the frame descriptor for the new current item
    pub async fn advance_frame(&self) -> Result<FramePayload> {
        self.inner.lock().await.advance_frame()
    }
}
