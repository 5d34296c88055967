//! Bookmark Manager for Orbitmarks.
//!
//! Implements `BookmarkManagerTrait`: CRUD and layout-batch operations for one
//! user's bookmarks, backed by SQLite via `rusqlite`.
//!
//! A manager is constructed for a single owner and every statement it issues
//! filters on `user_id`, so rows belonging to other users are invisible to it:
//! they read as absent and cannot be modified.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::bookmark::{
    validate_category, validate_layout_batch, validate_position, validate_scale, validate_title,
    validate_url, Bookmark, BookmarkPatch, LayoutResult, LayoutUpdate, NewBookmark, Position,
    DEFAULT_SCALE,
};
use crate::types::errors::BookmarkError;

const BOOKMARK_COLUMNS: &str =
    "id, title, url, category, pos_x, pos_y, pos_z, scale, pinned, created_at, updated_at";

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError>;
    fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    fn list_by_category(&self, category: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError>;
    fn create_bookmark(&mut self, input: &NewBookmark) -> Result<Bookmark, BookmarkError>;
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError>;
    /// Applies a validated layout batch. Entries for ids the owner does not
    /// have are skipped; the result counts rows actually updated.
    fn apply_layout(&mut self, batch: &[LayoutUpdate]) -> Result<LayoutResult, BookmarkError>;
}

/// Bookmark manager scoped to one owner.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
    owner_id: &'a str,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a manager that only sees bookmarks owned by `owner_id`.
    pub fn for_user(conn: &'a Connection, owner_id: &'a str) -> Self {
        Self { conn, owner_id }
    }

    /// Wraps `query` for a substring LIKE match, escaping `\`, `%` and `_`.
    fn like_pattern(query: &str) -> String {
        let mut pattern = String::with_capacity(query.len() + 2);
        pattern.push('%');
        for c in query.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let x: Option<f64> = row.get(4)?;
        let y: Option<f64> = row.get(5)?;
        let z: Option<f64> = row.get(6)?;
        let position = match (x, y, z) {
            (Some(x), Some(y), Some(z)) => Some(Position::new(x, y, z)),
            _ => None,
        };
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            category: row.get(3)?,
            position,
            scale: row.get(7)?,
            pinned: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn query_list<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_bookmark)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    fn write_row(&self, bookmark: &Bookmark) -> Result<usize, BookmarkError> {
        let (x, y, z) = match bookmark.position {
            Some(p) => (Some(p.x), Some(p.y), Some(p.z)),
            None => (None, None, None),
        };
        self.conn
            .execute(
                "UPDATE bookmarks SET title = ?1, url = ?2, category = ?3, pos_x = ?4, pos_y = ?5, \
                 pos_z = ?6, scale = ?7, pinned = ?8, updated_at = ?9 \
                 WHERE id = ?10 AND user_id = ?11",
                params![
                    bookmark.title,
                    bookmark.url,
                    bookmark.category,
                    x,
                    y,
                    z,
                    bookmark.scale,
                    bookmark.pinned,
                    bookmark.updated_at,
                    bookmark.id,
                    self.owner_id
                ],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Lists all of the owner's bookmarks, oldest first.
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_id = ?1 ORDER BY created_at, id",
            BOOKMARK_COLUMNS
        );
        self.query_list(&sql, params![self.owner_id])
    }

    /// Searches the owner's bookmarks by title, URL or category using SQL LIKE.
    fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        let pattern = Self::like_pattern(query);
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_id = ?1 \
             AND (title LIKE ?2 ESCAPE '\\' OR url LIKE ?2 ESCAPE '\\' \
             OR category LIKE ?2 ESCAPE '\\') \
             ORDER BY created_at, id",
            BOOKMARK_COLUMNS
        );
        self.query_list(&sql, params![self.owner_id, pattern])
    }

    fn list_by_category(&self, category: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_id = ?1 AND category = ?2 \
             ORDER BY created_at, id",
            BOOKMARK_COLUMNS
        );
        self.query_list(&sql, params![self.owner_id, category.trim()])
    }

    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE id = ?1 AND user_id = ?2",
            BOOKMARK_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id, self.owner_id], Self::row_to_bookmark)
            .optional()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    fn create_bookmark(&mut self, input: &NewBookmark) -> Result<Bookmark, BookmarkError> {
        let title = validate_title(&input.title).map_err(BookmarkError::InvalidInput)?;
        let url = validate_url(&input.url).map_err(BookmarkError::InvalidInput)?;
        let category =
            validate_category(input.category.as_deref()).map_err(BookmarkError::InvalidInput)?;
        let scale = validate_scale(input.scale.unwrap_or(DEFAULT_SCALE))
            .map_err(BookmarkError::InvalidInput)?;
        if let Some(position) = &input.position {
            validate_position(position).map_err(BookmarkError::InvalidInput)?;
        }

        let now = Self::now();
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            title,
            url,
            category,
            position: input.position,
            scale,
            pinned: input.pinned,
            created_at: now,
            updated_at: now,
        };
        let (x, y, z) = match bookmark.position {
            Some(p) => (Some(p.x), Some(p.y), Some(p.z)),
            None => (None, None, None),
        };

        self.conn
            .execute(
                "INSERT INTO bookmarks (id, user_id, title, url, category, pos_x, pos_y, pos_z, \
                 scale, pinned, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    bookmark.id,
                    self.owner_id,
                    bookmark.title,
                    bookmark.url,
                    bookmark.category,
                    x,
                    y,
                    z,
                    bookmark.scale,
                    bookmark.pinned,
                    bookmark.created_at,
                    bookmark.updated_at
                ],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        Ok(bookmark)
    }

    /// Applies a partial update. Unknown or foreign ids are `NotFound`.
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        let mut bookmark = self.get_bookmark(id)?;

        if let Some(title) = &patch.title {
            bookmark.title = validate_title(title).map_err(BookmarkError::InvalidInput)?;
        }
        if let Some(url) = &patch.url {
            bookmark.url = validate_url(url).map_err(BookmarkError::InvalidInput)?;
        }
        if let Some(category) = &patch.category {
            bookmark.category =
                validate_category(Some(category)).map_err(BookmarkError::InvalidInput)?;
        }
        if let Some(position) = &patch.position {
            if let Some(p) = position {
                validate_position(p).map_err(BookmarkError::InvalidInput)?;
            }
            bookmark.position = *position;
        }
        if let Some(scale) = patch.scale {
            bookmark.scale = validate_scale(scale).map_err(BookmarkError::InvalidInput)?;
        }
        if let Some(pinned) = patch.pinned {
            bookmark.pinned = pinned;
        }
        bookmark.updated_at = Self::now();

        if self.write_row(&bookmark)? == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(bookmark)
    }

    /// Deletes one of the owner's bookmarks. Unknown or foreign ids are `NotFound`.
    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, self.owner_id],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn apply_layout(&mut self, batch: &[LayoutUpdate]) -> Result<LayoutResult, BookmarkError> {
        // Whole batch is checked before the first write
        validate_layout_batch(batch).map_err(BookmarkError::InvalidInput)?;

        let now = Self::now();
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut updated = 0;
        {
            let mut stmt = tx
                .prepare(
                    "UPDATE bookmarks SET pos_x = ?1, pos_y = ?2, pos_z = ?3, scale = ?4, \
                     pinned = ?5, updated_at = ?6 WHERE id = ?7 AND user_id = ?8",
                )
                .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

            for entry in batch {
                updated += stmt
                    .execute(params![
                        entry.x,
                        entry.y,
                        entry.z,
                        entry.scale,
                        entry.pinned,
                        now,
                        entry.id,
                        self.owner_id
                    ])
                    .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        Ok(LayoutResult { updated })
    }
}
