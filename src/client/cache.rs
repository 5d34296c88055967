//! Client-side cache of the bookmark list.
//!
//! The UI renders from [`BookmarkCache`]. Mutations either invalidate and
//! refetch, or, for delete, patch the cache first and roll back on failure.

use crate::client::http::BookmarkApi;
use crate::types::bookmark::Bookmark;
use crate::types::errors::ClientError;

/// Cached bookmark list plus a staleness flag.
#[derive(Debug, Clone, Default)]
pub struct BookmarkCache {
    entries: Vec<Bookmark>,
    stale: bool,
    loaded: bool,
}

/// Snapshot taken by [`BookmarkCache::begin_delete`], used to roll back.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    id: String,
    snapshot: Vec<Bookmark>,
}

impl PendingDelete {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl BookmarkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.entries.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// True until the first successful load, and after every invalidation.
    pub fn is_stale(&self) -> bool {
        self.stale || !self.loaded
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Replaces the contents with a fresh server result.
    pub fn replace(&mut self, entries: Vec<Bookmark>) {
        self.entries = entries;
        self.stale = false;
        self.loaded = true;
    }

    /// Inserts or replaces one bookmark in place, keeping list order.
    pub fn upsert(&mut self, bookmark: Bookmark) {
        match self.entries.iter_mut().find(|b| b.id == bookmark.id) {
            Some(existing) => *existing = bookmark,
            None => self.entries.push(bookmark),
        }
    }

    /// Removes the bookmark from the visible list immediately and returns
    /// the exact prior contents for rollback.
    pub fn begin_delete(&mut self, id: &str) -> PendingDelete {
        let pending = PendingDelete {
            id: id.to_string(),
            snapshot: self.entries.clone(),
        };
        self.entries.retain(|b| b.id != id);
        pending
    }

    /// Restores the list exactly as it was before `begin_delete`.
    pub fn rollback(&mut self, pending: PendingDelete) {
        self.entries = pending.snapshot;
    }

    /// Refetches from the server. On failure the current contents are kept
    /// and the cache stays stale.
    pub async fn refresh<A: BookmarkApi>(&mut self, api: &A) -> Result<(), ClientError> {
        match api.list_bookmarks().await {
            Ok(entries) => {
                self.replace(entries);
                Ok(())
            }
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }
}

/// Deletes a bookmark optimistically.
///
/// The item disappears from `cache` before the request is sent. If the
/// server call fails the previous list is restored verbatim. Either way the
/// cache is then refetched to reconcile with the server. The returned result
/// is the outcome of the delete call itself.
pub async fn optimistic_delete<A: BookmarkApi>(
    cache: &mut BookmarkCache,
    api: &A,
    id: &str,
) -> Result<(), ClientError> {
    let pending = cache.begin_delete(id);
    let outcome = api.delete_bookmark(id).await;

    if let Err(e) = &outcome {
        tracing::warn!(bookmark_id = %id, error = %e, "delete failed, restoring list");
        cache.rollback(pending);
    }

    cache.invalidate();
    if let Err(e) = cache.refresh(api).await {
        tracing::warn!(error = %e, "refetch after delete failed");
    }

    outcome
}
