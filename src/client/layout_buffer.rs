//! Batches drag results before they are sent to the layout endpoint.
//!
//! The scene records a position when a drag gesture ends. Positions are
//! keyed by bookmark id, so repeated drags of the same node collapse into one
//! entry, and [`LayoutBuffer::flush`] sends whatever is pending in batches.

use std::collections::BTreeMap;

use crate::client::http::BookmarkApi;
use crate::types::bookmark::{
    LayoutResult, LayoutUpdate, Position, COORD_LIMIT, MAX_LAYOUT_BATCH, MAX_SCALE, MIN_SCALE,
};
use crate::types::errors::ClientError;

/// Unsaved layout changes, latest position per bookmark.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuffer {
    pending: BTreeMap<String, LayoutUpdate>,
}

impl LayoutBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LayoutUpdate> {
        self.pending.get(id)
    }

    /// Records the end of a drag. Values are clamped into the ranges the
    /// server accepts; a blank id or non-finite input is ignored and
    /// returns `false`.
    pub fn record_drag(&mut self, id: &str, position: Position, scale: f64, pinned: bool) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        let values = [position.x, position.y, position.z, scale];
        if values.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let clamp = |v: f64| v.clamp(-COORD_LIMIT, COORD_LIMIT);
        self.pending.insert(
            id.to_string(),
            LayoutUpdate {
                id: id.to_string(),
                x: clamp(position.x),
                y: clamp(position.y),
                z: clamp(position.z),
                scale: scale.clamp(MIN_SCALE, MAX_SCALE),
                pinned,
            },
        );
        true
    }

    /// Drops any pending change for a bookmark, e.g. after it was deleted.
    pub fn discard(&mut self, id: &str) {
        self.pending.remove(id);
    }

    /// Removes up to `MAX_LAYOUT_BATCH` entries for sending.
    pub fn take_batch(&mut self) -> Vec<LayoutUpdate> {
        let ids: Vec<String> = self.pending.keys().take(MAX_LAYOUT_BATCH).cloned().collect();
        ids.iter()
            .filter_map(|id| self.pending.remove(id))
            .collect()
    }

    /// Puts a failed batch back. Entries re-recorded since the batch was
    /// taken are newer and win.
    pub fn requeue(&mut self, batch: Vec<LayoutUpdate>) {
        for update in batch {
            self.pending.entry(update.id.clone()).or_insert(update);
        }
    }

    /// Sends all pending changes.
    ///
    /// A batch the server rejects as invalid is dropped, since resending it
    /// cannot succeed. Any other failure puts the batch back and stops.
    /// Returns the total number of rows the server updated.
    pub async fn flush<A: BookmarkApi>(&mut self, api: &A) -> Result<LayoutResult, ClientError> {
        let mut updated = 0;
        while !self.pending.is_empty() {
            let batch = self.take_batch();
            match api.save_layout(&batch).await {
                Ok(result) => updated += result.updated,
                Err(ClientError::Validation(msg)) => {
                    tracing::warn!(entries = batch.len(), error = %msg, "layout batch rejected, dropping");
                    return Err(ClientError::Validation(msg));
                }
                Err(e) => {
                    self.requeue(batch);
                    return Err(e);
                }
            }
        }
        Ok(LayoutResult { updated })
    }
}
