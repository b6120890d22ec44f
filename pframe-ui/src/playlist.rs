//! In-memory playlist data model
//!
//! Holds the item table plus the three id collections (current, queue,
//! history) and implements every mutation as a synchronous read-modify-write
//! over the whole structure. Callers serialize access through
//! [`crate::state::StateManager`]; nothing here blocks or performs I/O.
//!
//! Invariants maintained after every operation:
//! - the current item is never also queued
//! - every referenced id exists in the item table
//! - the queue contains no duplicates
//! - history holds at most [`HISTORY_LIMIT`] entries (newest first)
//! - settings fields stay within their declared bounds
//!
//! History is a display log: rotation records every shown item there, so a
//! recycled id can sit in history while it is queued or current again, and
//! repeated cycles repeat ids in the log. The manual queue/history moves,
//! by contrast, keep an id in at most one of the two collections.

use std::collections::{HashMap, HashSet, VecDeque};

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use pframe_common::{
    Error, FramePayload, ImageStub, Result, Settings, SettingsUpdate, StateSnapshot,
};

/// Maximum number of history entries; insertion beyond this evicts the oldest
pub const HISTORY_LIMIT: usize = 120;

/// Display offset bounds (fraction of the croppable area)
pub const MIN_OFFSET: f64 = -1.0;
pub const MAX_OFFSET: f64 = 1.0;

/// An ingested image and its metadata
///
/// The byte payload is immutable after ingestion; only the display offsets
/// change, via [`PlaylistState::update_transform`].
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
    pub uploaded_at: DateTime<Utc>,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// One file handed over by the ingestion layer
///
/// The HTTP layer has already validated that the payload is non-empty and
/// carries an image content type; the playlist does not re-inspect bytes.
#[derive(Debug, Clone)]
pub struct IngestUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// The full playlist state: item table, current, queue, history, settings
#[derive(Debug, Default)]
pub struct PlaylistState {
    items: HashMap<Uuid, ImageItem>,
    queue: VecDeque<Uuid>,
    history: VecDeque<Uuid>,
    current: Option<Uuid>,
    settings: Settings,
}

impl PlaylistState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest uploaded files, assigning fresh ids and a shared timestamp
    ///
    /// The first ingested item becomes current when nothing is displayed
    /// yet; everything else is appended to the queue in input order.
    pub fn ingest(&mut self, uploads: Vec<IngestUpload>) -> Vec<ImageStub> {
        let uploaded_at = Utc::now();
        let mut added = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let item = ImageItem {
                id: Uuid::new_v4(),
                filename: upload.filename,
                content_type: upload.content_type,
                data: upload.data,
                uploaded_at,
                offset_x: 0.0,
                offset_y: 0.0,
            };
            debug!("Ingested {} as {}", item.filename, item.id);

            if self.current.is_none() {
                self.current = Some(item.id);
            } else {
                self.queue.push_back(item.id);
            }
            added.push(self.stub(&item));
            self.items.insert(item.id, item);
        }

        info!(
            "Ingested {} item(s); queue length now {}",
            added.len(),
            self.queue.len()
        );
        added
    }

    /// Read-only view of the whole playlist at a single point in time
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            current: self.current.and_then(|id| self.stub_for(id)),
            queue: self.queue.iter().filter_map(|id| self.stub_for(*id)).collect(),
            history: self
                .history
                .iter()
                .filter_map(|id| self.stub_for(*id))
                .collect(),
            settings: self.settings.clone(),
        }
    }

    /// Remove an id from the queue
    ///
    /// Only queue membership is eligible: removing the current item or a
    /// history item through this path is rejected.
    pub fn remove_from_queue(&mut self, id: Uuid) -> Result<()> {
        let position = self
            .queue
            .iter()
            .position(|queued| *queued == id)
            .ok_or_else(|| Error::NotFound(format!("image {} is not in the queue", id)))?;
        self.queue.remove(position);
        debug!("Removed {} from queue", id);
        Ok(())
    }

    /// Replace the queue order with a permutation of its current id set
    ///
    /// The permutation check runs against the queue as it is *now*, inside
    /// the same critical section as the swap, so a concurrent insert cannot
    /// slip between validation and commit.
    pub fn reorder_queue(&mut self, order: &[Uuid]) -> Result<()> {
        let submitted: HashSet<Uuid> = order.iter().copied().collect();
        if submitted.len() != order.len() {
            return Err(Error::InvalidInput(
                "queue order contains duplicates".to_string(),
            ));
        }
        let existing: HashSet<Uuid> = self.queue.iter().copied().collect();
        if submitted != existing {
            return Err(Error::InvalidInput(
                "queue order does not match the current queue".to_string(),
            ));
        }
        self.queue = order.iter().copied().collect();
        debug!("Queue reordered ({} entries)", self.queue.len());
        Ok(())
    }

    /// Insert a known item into the queue at `index` (clamped; append when omitted)
    ///
    /// A history member is pulled out of history first; a queue member is
    /// moved rather than duplicated. The current item can never be queued
    /// while it is displayed.
    pub fn insert_into_queue(&mut self, id: Uuid, index: Option<usize>) -> Result<()> {
        if !self.items.contains_key(&id) {
            return Err(Error::NotFound(format!("image {} not found", id)));
        }
        if self.current == Some(id) {
            return Err(Error::Conflict(
                "cannot queue the currently displayed image".to_string(),
            ));
        }

        let mut target = index.unwrap_or(self.queue.len()).min(self.queue.len());
        self.history.retain(|entry| *entry != id);
        if let Some(position) = self.queue.iter().position(|queued| *queued == id) {
            self.queue.remove(position);
            target = target.min(self.queue.len());
        }
        self.queue.insert(target, id);
        debug!("Inserted {} into queue at {}", id, target);
        Ok(())
    }

    /// Move a known item into history at `index` (clamped; most-recent slot
    /// when omitted), evicting the oldest entry past [`HISTORY_LIMIT`]
    pub fn move_to_history(&mut self, id: Uuid, index: Option<usize>) -> Result<()> {
        if !self.items.contains_key(&id) {
            return Err(Error::NotFound(format!("image {} not found", id)));
        }
        if self.current == Some(id) {
            return Err(Error::Conflict(
                "cannot archive the currently displayed image".to_string(),
            ));
        }

        self.queue.retain(|queued| *queued != id);
        self.history.retain(|entry| *entry != id);
        let target = index.unwrap_or(0).min(self.history.len());
        self.history.insert(target, id);
        self.history.truncate(HISTORY_LIMIT);
        debug!("Moved {} into history at {}", id, target);
        Ok(())
    }

    /// Set an item's display offsets; both values must lie in [-1, 1]
    pub fn update_transform(&mut self, id: Uuid, offset_x: f64, offset_y: f64) -> Result<ImageStub> {
        for (name, value) in [("offset_x", offset_x), ("offset_y", offset_y)] {
            if !(MIN_OFFSET..=MAX_OFFSET).contains(&value) {
                return Err(Error::InvalidInput(format!(
                    "{} must be within [{}, {}], got {}",
                    name, MIN_OFFSET, MAX_OFFSET, value
                )));
            }
        }
        let item = self
            .items
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("image {} not found", id)))?;
        item.offset_x = offset_x;
        item.offset_y = offset_y;
        let stub = stub_of(item);
        Ok(stub)
    }

    /// Apply a partial settings update; all-or-nothing on validation failure
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<Settings> {
        update.apply(&mut self.settings)?;
        info!(
            "Settings updated: interval={}s brightness={}% power_on={} saturation={}",
            self.settings.change_interval,
            self.settings.led_brightness,
            self.settings.power_on,
            self.settings.saturation
        );
        Ok(self.settings.clone())
    }

    /// Look up an item for the byte-fetch endpoint
    pub fn image(&self, id: Uuid) -> Result<ImageItem> {
        self.items
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("image {} not found", id)))
    }

    /// Frame descriptor for the current item, self-healing an absent current
    /// by promoting the queue head
    pub fn current_frame(&mut self) -> Result<FramePayload> {
        self.ensure_current();
        let current = self
            .current
            .ok_or_else(|| Error::NotFound("no content available".to_string()))?;
        self.frame_payload(current)
    }

    /// Rotate to the next item and return its frame descriptor
    ///
    /// With `sequence = [current] ++ queue`: a single-element sequence does
    /// not rotate. Otherwise the old current is logged to the front of
    /// history and recycled to the queue tail, and `sequence[1]` becomes
    /// current, giving a round-robin cycle of length `1 + queue length`.
    /// The history log is not deduplicated; earlier log entries for the
    /// promoted item stay where they are.
    pub fn advance_frame(&mut self) -> Result<FramePayload> {
        self.ensure_current();
        let current = self
            .current
            .ok_or_else(|| Error::NotFound("no content available".to_string()))?;

        if self.queue.is_empty() {
            // Single-item sequence: current stays, no history insertion
            return self.frame_payload(current);
        }

        let next = self.queue.pop_front().ok_or_else(|| {
            Error::Internal("queue emptied during rotation".to_string())
        })?;
        if !self.items.contains_key(&next) {
            return Err(Error::Internal(format!(
                "rotation resolved to unknown image {}",
                next
            )));
        }

        self.history.push_front(current);
        self.history.truncate(HISTORY_LIMIT);
        self.queue.push_back(current);
        self.current = Some(next);

        info!("Advanced frame: {} -> {}", current, next);
        self.frame_payload(next)
    }

    /// Promote the queue head to current when no current item exists
    fn ensure_current(&mut self) {
        if self.current.is_none() {
            if let Some(next) = self.queue.pop_front() {
                info!("Promoted queue head {} to current", next);
                self.current = Some(next);
            }
        }
    }

    fn frame_payload(&self, id: Uuid) -> Result<FramePayload> {
        let item = self
            .items
            .get(&id)
            .ok_or_else(|| Error::Internal(format!("current image {} missing from table", id)))?;
        Ok(FramePayload {
            image_id: item.id,
            filename: item.filename.clone(),
            content_type: item.content_type.clone(),
            image_base64: general_purpose::STANDARD.encode(&item.data),
            offset_x: item.offset_x,
            offset_y: item.offset_y,
            settings: self.settings.clone(),
            queued: self.queue.len(),
            generated_at: Utc::now(),
        })
    }

    fn stub(&self, item: &ImageItem) -> ImageStub {
        stub_of(item)
    }

    fn stub_for(&self, id: Uuid) -> Option<ImageStub> {
        self.items.get(&id).map(stub_of)
    }
}

fn stub_of(item: &ImageItem) -> ImageStub {
    ImageStub {
        id: item.id,
        filename: item.filename.clone(),
        content_type: item.content_type.clone(),
        uploaded_at: item.uploaded_at,
        image_url: format!("/api/images/{}", item.id),
        offset_x: item.offset_x,
        offset_y: item.offset_y,
    }
}
