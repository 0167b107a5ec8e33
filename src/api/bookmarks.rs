//! Bookmark endpoints: list, create (the ingestion pipeline), delete.
//!
//! Every handler takes a [`CurrentUser`] and scopes its storage access to
//! that id. Delete deliberately answers 404 for both a nonexistent id and
//! an id owned by someone else.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::db::{bookmarks, Bookmark, CreateBookmarkRequest, MessageResponse};
use crate::enrich;
use crate::AppState;

/// GET /api/bookmarks
pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let bookmarks = bookmarks::list_for_user(&state.db, user.0).await?;
    Ok(Json(bookmarks))
}

/// POST /api/bookmarks
///
/// Ingestion pipeline: validate, enrich (metadata required, summary
/// optional), persist, then return the row as stored. Nothing is persisted
/// when the metadata fetch fails.
pub async fn create_bookmark(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    if request.url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let enrichment = enrich::enrich(
        &state.http,
        &state.config.enrichment.summarizer_url,
        &request.url,
    )
    .await
    .map_err(|err| {
        tracing::error!(url = %request.url, error = %err, "Metadata fetch failed, bookmark not saved");
        ApiError::internal("Failed to save bookmark")
    })?;

    let bookmark = bookmarks::insert(
        &state.db,
        user.0,
        &request.url,
        &enrichment.title,
        &enrichment.favicon,
        &enrichment.summary,
    )
    .await?;

    tracing::info!(user_id = user.0, bookmark_id = bookmark.id, "Bookmark created");

    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// DELETE /api/bookmarks/:id
pub async fn delete_bookmark(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let bookmark_id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid bookmark ID"))?;

    if bookmarks::delete_one(&state.db, user.0, bookmark_id).await? {
        Ok(Json(MessageResponse::new("Bookmark deleted successfully")))
    } else {
        Err(ApiError::not_found("Bookmark not found or access denied"))
    }
}
