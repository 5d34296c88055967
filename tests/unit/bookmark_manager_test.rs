//! Unit tests for the BookmarkManager public API.
//!
//! These tests exercise bookmark CRUD, owner scoping and layout batches
//! through the `BookmarkManagerTrait` interface, using an in-memory SQLite
//! database.

use orbitmarks::database::Database;
use orbitmarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use orbitmarks::types::bookmark::{BookmarkPatch, LayoutUpdate, NewBookmark, Position};
use orbitmarks::types::errors::BookmarkError;
use rusqlite::Connection;

/// Helper: fresh in-memory database with two users, "alice" and "bob".
fn setup() -> Database {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    for id in ["alice", "bob"] {
        insert_user(db.connection(), id);
    }
    db
}

fn insert_user(conn: &Connection, id: &str) {
    conn.execute(
        "INSERT INTO users (id, email, password_hash, display_name, created_at) \
         VALUES (?1, ?2, 'unused', ?1, 0)",
        rusqlite::params![id, format!("{}@example.com", id)],
    )
    .expect("Failed to insert user");
}

fn layout(id: &str, x: f64, scale: f64) -> LayoutUpdate {
    LayoutUpdate {
        id: id.to_string(),
        x,
        y: 0.0,
        z: -x,
        scale,
        pinned: true,
    }
}

#[test]
fn test_create_applies_defaults() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");

    let bm = mgr
        .create_bookmark(&NewBookmark::new("  Rust  ", "https://rust-lang.org"))
        .unwrap();
    assert_eq!(bm.title, "Rust");
    assert_eq!(bm.category, "general");
    assert_eq!(bm.scale, 1.0);
    assert_eq!(bm.position, None);
    assert!(!bm.pinned);
    assert_eq!(bm.created_at, bm.updated_at);

    let fetched = mgr.get_bookmark(&bm.id).unwrap();
    assert_eq!(fetched, bm);
}

#[test]
fn test_create_rejects_invalid_input() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");

    let bad_url = mgr.create_bookmark(&NewBookmark::new("x", "ftp://files.example"));
    assert!(matches!(bad_url, Err(BookmarkError::InvalidInput(_))));

    let blank_title = mgr.create_bookmark(&NewBookmark::new("   ", "https://a.io"));
    assert!(matches!(blank_title, Err(BookmarkError::InvalidInput(_))));

    let far = NewBookmark::new("x", "https://a.io").with_position(Position::new(0.0, 1001.0, 0.0));
    assert!(matches!(mgr.create_bookmark(&far), Err(BookmarkError::InvalidInput(_))));

    assert!(mgr.list_bookmarks().unwrap().is_empty());
}

#[test]
fn test_list_is_in_creation_order() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");

    let ids: Vec<String> = ["one", "two", "three"]
        .iter()
        .map(|t| {
            mgr.create_bookmark(&NewBookmark::new(t, &format!("https://{}.io", t)))
                .unwrap()
                .id
        })
        .collect();

    let listed = mgr.list_bookmarks().unwrap();
    assert_eq!(listed.len(), 3);
    for id in &ids {
        assert!(listed.iter().any(|b| &b.id == id));
    }
    // Ordered by creation time, ties broken by id
    for pair in listed.windows(2) {
        let key = |b: &orbitmarks::types::bookmark::Bookmark| (b.created_at, b.id.clone());
        assert!(key(&pair[0]) <= key(&pair[1]));
    }
}

#[test]
fn test_search_and_category_filter() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    mgr.create_bookmark(&NewBookmark::new("Rust Book", "https://doc.rust-lang.org/book").with_category("dev"))
        .unwrap();
    mgr.create_bookmark(&NewBookmark::new("News", "https://news.example").with_category("reading"))
        .unwrap();

    let hits = mgr.search_bookmarks("rust").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Rust Book");

    let by_url = mgr.search_bookmarks("news.example").unwrap();
    assert_eq!(by_url.len(), 1);

    let reading = mgr.list_by_category("reading").unwrap();
    assert_eq!(reading.len(), 1);
    assert_eq!(reading[0].title, "News");
}

#[test]
fn test_search_treats_wildcards_literally() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    mgr.create_bookmark(&NewBookmark::new("Rust Book", "https://doc.rust-lang.org/book"))
        .unwrap();
    mgr.create_bookmark(&NewBookmark::new("News", "https://news.example"))
        .unwrap();

    assert!(mgr.search_bookmarks("%").unwrap().is_empty());
    assert!(mgr.search_bookmarks("_").unwrap().is_empty());
    assert!(mgr.search_bookmarks("\\").unwrap().is_empty());

    mgr.create_bookmark(&NewBookmark::new("100% done", "https://progress.example"))
        .unwrap();
    mgr.create_bookmark(&NewBookmark::new("snake_case", "https://style.example"))
        .unwrap();

    let percent = mgr.search_bookmarks("%").unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].title, "100% done");

    let underscore = mgr.search_bookmarks("_").unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].title, "snake_case");
}

#[test]
fn test_bookmarks_are_isolated_between_users() {
    let db = setup();
    let alice_id = {
        let mut alice = BookmarkManager::for_user(db.connection(), "alice");
        alice
            .create_bookmark(&NewBookmark::new("Private", "https://alice.example"))
            .unwrap()
            .id
    };

    let mut bob = BookmarkManager::for_user(db.connection(), "bob");
    assert!(bob.list_bookmarks().unwrap().is_empty());
    assert!(bob.search_bookmarks("Private").unwrap().is_empty());
    assert!(matches!(bob.get_bookmark(&alice_id), Err(BookmarkError::NotFound(_))));

    let patch = BookmarkPatch {
        title: Some("Hijacked".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        bob.update_bookmark(&alice_id, &patch),
        Err(BookmarkError::NotFound(_))
    ));
    assert!(matches!(bob.delete_bookmark(&alice_id), Err(BookmarkError::NotFound(_))));

    let alice = BookmarkManager::for_user(db.connection(), "alice");
    assert_eq!(alice.get_bookmark(&alice_id).unwrap().title, "Private");
}

#[test]
fn test_delete_missing_is_not_found() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let bm = mgr
        .create_bookmark(&NewBookmark::new("Temp", "https://temp.io"))
        .unwrap();

    mgr.delete_bookmark(&bm.id).unwrap();
    assert!(matches!(mgr.delete_bookmark(&bm.id), Err(BookmarkError::NotFound(_))));
    assert!(matches!(mgr.delete_bookmark("never-existed"), Err(BookmarkError::NotFound(_))));
}

#[test]
fn test_patch_sets_and_clears_position() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let bm = mgr
        .create_bookmark(&NewBookmark::new("Node", "https://node.io"))
        .unwrap();

    let set = BookmarkPatch {
        position: Some(Some(Position::new(1.0, 2.0, 3.0))),
        pinned: Some(true),
        ..Default::default()
    };
    let updated = mgr.update_bookmark(&bm.id, &set).unwrap();
    assert_eq!(updated.position, Some(Position::new(1.0, 2.0, 3.0)));
    assert!(updated.pinned);
    assert_eq!(updated.title, "Node");

    let clear = BookmarkPatch {
        position: Some(None),
        ..Default::default()
    };
    let cleared = mgr.update_bookmark(&bm.id, &clear).unwrap();
    assert_eq!(cleared.position, None);
    assert!(cleared.pinned, "untouched fields keep their values");

    assert_eq!(mgr.get_bookmark(&bm.id).unwrap().position, None);
}

#[test]
fn test_patch_with_invalid_scale_leaves_row_unchanged() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let bm = mgr
        .create_bookmark(&NewBookmark::new("Node", "https://node.io"))
        .unwrap();

    let patch = BookmarkPatch {
        title: Some("Renamed".to_string()),
        scale: Some(9.0),
        ..Default::default()
    };
    assert!(matches!(
        mgr.update_bookmark(&bm.id, &patch),
        Err(BookmarkError::InvalidInput(_))
    ));
    assert_eq!(mgr.get_bookmark(&bm.id).unwrap().title, "Node");
}

#[test]
fn test_apply_layout_updates_owned_rows() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let a = mgr.create_bookmark(&NewBookmark::new("A", "https://a.io")).unwrap();
    let b = mgr.create_bookmark(&NewBookmark::new("B", "https://b.io")).unwrap();

    let result = mgr
        .apply_layout(&[layout(&a.id, 10.0, 1.5), layout(&b.id, -20.0, 0.5)])
        .unwrap();
    assert_eq!(result.updated, 2);

    let a = mgr.get_bookmark(&a.id).unwrap();
    assert_eq!(a.position, Some(Position::new(10.0, 0.0, -10.0)));
    assert_eq!(a.scale, 1.5);
    assert!(a.pinned);
}

#[test]
fn test_apply_layout_rejects_whole_batch_on_one_bad_entry() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let a = mgr.create_bookmark(&NewBookmark::new("A", "https://a.io")).unwrap();
    let b = mgr.create_bookmark(&NewBookmark::new("B", "https://b.io")).unwrap();

    let result = mgr.apply_layout(&[layout(&a.id, 10.0, 1.0), layout(&b.id, 5.0, 5.0)]);
    assert!(matches!(result, Err(BookmarkError::InvalidInput(_))));

    // The valid first entry must not have been written
    let a = mgr.get_bookmark(&a.id).unwrap();
    assert_eq!(a.position, None);
    assert!(!a.pinned);
}

#[test]
fn test_apply_layout_skips_foreign_and_unknown_ids() {
    let db = setup();
    let foreign = {
        let mut bob = BookmarkManager::for_user(db.connection(), "bob");
        bob.create_bookmark(&NewBookmark::new("Bob", "https://bob.io")).unwrap()
    };

    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let own = mgr.create_bookmark(&NewBookmark::new("A", "https://a.io")).unwrap();

    let result = mgr
        .apply_layout(&[
            layout(&own.id, 1.0, 1.0),
            layout(&foreign.id, 2.0, 1.0),
            layout("ghost", 3.0, 1.0),
        ])
        .unwrap();
    assert_eq!(result.updated, 1);

    let bob = BookmarkManager::for_user(db.connection(), "bob");
    assert_eq!(bob.get_bookmark(&foreign.id).unwrap().position, None);
}

#[test]
fn test_apply_layout_rejects_empty_and_duplicate_batches() {
    let db = setup();
    let mut mgr = BookmarkManager::for_user(db.connection(), "alice");
    let a = mgr.create_bookmark(&NewBookmark::new("A", "https://a.io")).unwrap();

    assert!(matches!(mgr.apply_layout(&[]), Err(BookmarkError::InvalidInput(_))));
    assert!(matches!(
        mgr.apply_layout(&[layout(&a.id, 1.0, 1.0), layout(&a.id, 2.0, 1.0)]),
        Err(BookmarkError::InvalidInput(_))
    ));

    let oversized: Vec<LayoutUpdate> = (0..501).map(|i| layout(&format!("id-{}", i), 0.0, 1.0)).collect();
    assert!(matches!(mgr.apply_layout(&oversized), Err(BookmarkError::InvalidInput(_))));
}
