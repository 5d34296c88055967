//! Unit tests for the client bookmark cache and optimistic delete.
//!
//! A scripted in-memory `BookmarkApi` stands in for the server.

use std::sync::Mutex;

use orbitmarks::client::{optimistic_delete, BookmarkApi, BookmarkCache};
use orbitmarks::types::bookmark::{Bookmark, LayoutResult, LayoutUpdate};
use orbitmarks::types::errors::ClientError;

fn bookmark(id: &str) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: id.to_uppercase(),
        url: format!("https://{}.example", id),
        category: "general".to_string(),
        position: None,
        scale: 1.0,
        pinned: false,
        created_at: 0,
        updated_at: 0,
    }
}

fn ids(cache: &BookmarkCache) -> Vec<&str> {
    cache.bookmarks().iter().map(|b| b.id.as_str()).collect()
}

/// Fake server: holds the authoritative list and optional injected failures.
#[derive(Default)]
struct FakeApi {
    server: Mutex<Vec<Bookmark>>,
    fail_delete: Option<ClientError>,
    fail_list: Option<ClientError>,
    delete_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn with(entries: &[&str]) -> Self {
        Self {
            server: Mutex::new(entries.iter().map(|id| bookmark(id)).collect()),
            ..Default::default()
        }
    }
}

impl BookmarkApi for FakeApi {
    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>, ClientError> {
        if let Some(e) = &self.fail_list {
            return Err(e.clone());
        }
        Ok(self.server.lock().unwrap().clone())
    }

    async fn delete_bookmark(&self, id: &str) -> Result<(), ClientError> {
        self.delete_calls.lock().unwrap().push(id.to_string());
        if let Some(e) = &self.fail_delete {
            return Err(e.clone());
        }
        let mut server = self.server.lock().unwrap();
        let before = server.len();
        server.retain(|b| b.id != id);
        if server.len() == before {
            return Err(ClientError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_layout(&self, batch: &[LayoutUpdate]) -> Result<LayoutResult, ClientError> {
        Ok(LayoutResult { updated: batch.len() })
    }
}

#[test]
fn test_new_cache_is_stale_until_loaded() {
    let mut cache = BookmarkCache::new();
    assert!(cache.is_stale());
    cache.replace(vec![bookmark("a")]);
    assert!(!cache.is_stale());
    cache.invalidate();
    assert!(cache.is_stale());
}

#[test]
fn test_upsert_keeps_order() {
    let mut cache = BookmarkCache::new();
    cache.replace(vec![bookmark("a"), bookmark("b")]);

    let mut renamed = bookmark("a");
    renamed.title = "Renamed".to_string();
    cache.upsert(renamed);
    cache.upsert(bookmark("c"));

    assert_eq!(ids(&cache), vec!["a", "b", "c"]);
    assert_eq!(cache.get("a").unwrap().title, "Renamed");
}

#[test]
fn test_begin_delete_and_rollback_restore_exact_order() {
    let mut cache = BookmarkCache::new();
    cache.replace(vec![bookmark("a"), bookmark("b"), bookmark("c")]);

    let pending = cache.begin_delete("b");
    assert_eq!(pending.id(), "b");
    assert_eq!(ids(&cache), vec!["a", "c"]);

    cache.rollback(pending);
    assert_eq!(ids(&cache), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_successful_delete_removes_and_refetches() {
    let api = FakeApi::with(&["a", "b", "c"]);
    let mut cache = BookmarkCache::new();
    cache.refresh(&api).await.unwrap();

    optimistic_delete(&mut cache, &api, "b").await.unwrap();

    assert_eq!(ids(&cache), vec!["a", "c"]);
    assert!(!cache.is_stale());
    assert_eq!(*api.delete_calls.lock().unwrap(), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_failed_delete_restores_item_in_place() {
    let mut api = FakeApi::with(&["a", "b", "c"]);
    let mut cache = BookmarkCache::new();
    cache.refresh(&api).await.unwrap();

    api.fail_delete = Some(ClientError::Network("connection reset".to_string()));
    let result = optimistic_delete(&mut cache, &api, "b").await;

    assert!(matches!(result, Err(ClientError::Network(_))));
    assert_eq!(ids(&cache), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_failed_delete_and_failed_refetch_keep_snapshot() {
    let mut api = FakeApi::with(&["a", "b", "c"]);
    let mut cache = BookmarkCache::new();
    cache.refresh(&api).await.unwrap();

    api.fail_delete = Some(ClientError::Server(500, "boom".to_string()));
    api.fail_list = Some(ClientError::Network("offline".to_string()));
    let result = optimistic_delete(&mut cache, &api, "c").await;

    assert!(matches!(result, Err(ClientError::Server(500, _))));
    assert_eq!(ids(&cache), vec!["a", "b", "c"]);
    assert!(cache.is_stale());
}

#[tokio::test]
async fn test_delete_already_removed_on_server_reconciles() {
    let api = FakeApi::with(&["a", "b"]);
    let mut cache = BookmarkCache::new();
    cache.refresh(&api).await.unwrap();

    // Another client deleted "b" first
    api.server.lock().unwrap().retain(|b| b.id != "b");

    let result = optimistic_delete(&mut cache, &api, "b").await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
    assert_eq!(ids(&cache), vec!["a"], "refetch reconciles with the server");
}

#[tokio::test]
async fn test_unauthorized_delete_is_reported() {
    let mut api = FakeApi::with(&["a"]);
    let mut cache = BookmarkCache::new();
    cache.refresh(&api).await.unwrap();

    api.fail_delete = Some(ClientError::Unauthorized);
    api.fail_list = Some(ClientError::Unauthorized);
    let result = optimistic_delete(&mut cache, &api, "a").await;

    assert_eq!(result, Err(ClientError::Unauthorized));
    assert_eq!(ids(&cache), vec!["a"]);
}
