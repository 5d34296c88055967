//! Property-based tests for owner scoping of bookmarks.
//!
//! Whatever mix of bookmarks two users create, neither can see, change or
//! delete the other's, and layout batches only count owned rows.

use orbitmarks::database::Database;
use orbitmarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use orbitmarks::types::bookmark::{LayoutUpdate, NewBookmark};
use orbitmarks::types::errors::BookmarkError;
use proptest::prelude::*;

fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,12}",
        prop_oneof![Just(".com"), Just(".org"), Just(".io")],
    )
        .prop_map(|(scheme, host, tld)| format!("{}://{}{}", scheme, host, tld))
}

fn arb_bookmark() -> impl Strategy<Value = NewBookmark> {
    (
        "[a-zA-Z][a-zA-Z0-9 ]{0,20}",
        arb_url(),
        prop_oneof![Just("dev"), Just("news"), Just("general")],
    )
        .prop_map(|(title, url, category)| NewBookmark::new(&title, &url).with_category(category))
}

fn setup() -> Database {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    for id in ["alice", "bob"] {
        db.connection()
            .execute(
                "INSERT INTO users (id, email, password_hash, display_name, created_at) \
                 VALUES (?1, ?1 || '@example.com', 'unused', ?1, 0)",
                [id],
            )
            .expect("Failed to insert user");
    }
    db
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn users_only_see_their_own_bookmarks(
        alice_items in proptest::collection::vec(arb_bookmark(), 0..8),
        bob_items in proptest::collection::vec(arb_bookmark(), 0..8),
    ) {
        let db = setup();
        let mut alice = BookmarkManager::for_user(db.connection(), "alice");
        let mut bob = BookmarkManager::for_user(db.connection(), "bob");

        let alice_ids: Vec<String> = alice_items
            .iter()
            .map(|b| alice.create_bookmark(b).expect("create should succeed").id)
            .collect();
        for item in &bob_items {
            bob.create_bookmark(item).expect("create should succeed");
        }

        let listed = alice.list_bookmarks().unwrap();
        prop_assert_eq!(listed.len(), alice_items.len());
        prop_assert!(listed.iter().all(|b| alice_ids.contains(&b.id)));
        prop_assert_eq!(bob.list_bookmarks().unwrap().len(), bob_items.len());

        for id in &alice_ids {
            let not_found = matches!(bob.get_bookmark(id), Err(BookmarkError::NotFound(_)));
            prop_assert!(not_found);
            let not_deleted = matches!(bob.delete_bookmark(id), Err(BookmarkError::NotFound(_)));
            prop_assert!(not_deleted);
        }
        prop_assert_eq!(alice.list_bookmarks().unwrap().len(), alice_items.len());
    }

    #[test]
    fn layout_counts_only_owned_entries(
        own_count in 1usize..6,
        foreign_count in 0usize..6,
        x in -1000.0f64..=1000.0,
        scale in 0.2f64..=3.0,
    ) {
        let db = setup();
        let mut alice = BookmarkManager::for_user(db.connection(), "alice");
        let mut bob = BookmarkManager::for_user(db.connection(), "bob");

        let mut ids = Vec::new();
        for i in 0..own_count {
            ids.push(alice.create_bookmark(&NewBookmark::new("own", &format!("https://own{}.io", i))).unwrap().id);
        }
        for i in 0..foreign_count {
            ids.push(bob.create_bookmark(&NewBookmark::new("theirs", &format!("https://theirs{}.io", i))).unwrap().id);
        }

        let batch: Vec<LayoutUpdate> = ids
            .iter()
            .map(|id| LayoutUpdate { id: id.clone(), x, y: 0.0, z: 0.0, scale, pinned: true })
            .collect();
        let result = alice.apply_layout(&batch).unwrap();
        prop_assert_eq!(result.updated, own_count);

        prop_assert!(bob.list_bookmarks().unwrap().iter().all(|b| b.position.is_none() && !b.pinned));
    }
}
