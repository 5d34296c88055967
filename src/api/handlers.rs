//! Bookmark, layout and settings endpoints.
//!
//! Every handler requires an [`AuthenticatedUser`] and builds its manager for
//! that user, so it cannot read or write another user's rows.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::auth::AuthenticatedUser;
use crate::api::error::ApiError;
use crate::app::App;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::settings_manager::{SettingsManager, SettingsManagerTrait};
use crate::types::bookmark::{Bookmark, BookmarkPatch, LayoutResult, LayoutUpdate, NewBookmark};
use crate::types::settings::DisplaySettings;

/// Optional filters for `GET /api/bookmarks`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Substring matched against title, URL and category.
    pub q: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
}

/// `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

// ─── Bookmarks ───

pub async fn list_bookmarks(
    State(app): State<App>,
    user: AuthenticatedUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let Query(filter) = query?;
    let bookmarks = app.with_db(|conn| {
        let mgr = BookmarkManager::for_user(conn, &user.user_id);
        match (filter.q.as_deref(), filter.category.as_deref()) {
            (Some(q), _) if !q.trim().is_empty() => mgr.search_bookmarks(q.trim()),
            (_, Some(category)) if !category.trim().is_empty() => mgr.list_by_category(category),
            _ => mgr.list_bookmarks(),
        }
    })?;
    Ok(Json(bookmarks))
}

pub async fn create_bookmark(
    State(app): State<App>,
    user: AuthenticatedUser,
    payload: Result<Json<NewBookmark>, JsonRejection>,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    let Json(input) = payload?;
    let bookmark = app.with_db(|conn| {
        BookmarkManager::for_user(conn, &user.user_id).create_bookmark(&input)
    })?;
    tracing::debug!(user_id = %user.user_id, bookmark_id = %bookmark.id, "bookmark created");
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn get_bookmark(
    State(app): State<App>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Bookmark>, ApiError> {
    let bookmark =
        app.with_db(|conn| BookmarkManager::for_user(conn, &user.user_id).get_bookmark(&id))?;
    Ok(Json(bookmark))
}

pub async fn update_bookmark(
    State(app): State<App>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<BookmarkPatch>, JsonRejection>,
) -> Result<Json<Bookmark>, ApiError> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(ApiError::Validation(
            "update must change at least one field".to_string(),
        ));
    }
    let bookmark = app.with_db(|conn| {
        BookmarkManager::for_user(conn, &user.user_id).update_bookmark(&id, &patch)
    })?;
    Ok(Json(bookmark))
}

pub async fn delete_bookmark(
    State(app): State<App>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.with_db(|conn| BookmarkManager::for_user(conn, &user.user_id).delete_bookmark(&id))?;
    tracing::debug!(user_id = %user.user_id, bookmark_id = %id, "bookmark deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/bookmarks/layout`: applies a batch of drag results.
pub async fn save_layout(
    State(app): State<App>,
    user: AuthenticatedUser,
    payload: Result<Json<Vec<LayoutUpdate>>, JsonRejection>,
) -> Result<Json<LayoutResult>, ApiError> {
    let Json(batch) = payload?;
    let result = app.with_db(|conn| {
        BookmarkManager::for_user(conn, &user.user_id).apply_layout(&batch)
    })?;
    if result.updated < batch.len() {
        tracing::debug!(
            user_id = %user.user_id,
            submitted = batch.len(),
            updated = result.updated,
            "layout entries skipped"
        );
    }
    Ok(Json(result))
}

// ─── Settings ───

pub async fn get_settings(
    State(app): State<App>,
    user: AuthenticatedUser,
) -> Result<Json<DisplaySettings>, ApiError> {
    let settings =
        app.with_db(|conn| SettingsManager::for_user(conn, &user.user_id).get_settings())?;
    Ok(Json(settings))
}

pub async fn put_settings(
    State(app): State<App>,
    user: AuthenticatedUser,
    payload: Result<Json<DisplaySettings>, JsonRejection>,
) -> Result<Json<DisplaySettings>, ApiError> {
    let Json(settings) = payload?;
    let stored = app.with_db(|conn| {
        SettingsManager::for_user(conn, &user.user_id).upsert_settings(&settings)
    })?;
    Ok(Json(stored))
}
