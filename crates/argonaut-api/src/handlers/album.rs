//! Album endpoints

use crate::auth::Caller;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use argonaut_core::models::{Album, AlbumResponse, CreateAlbumRequest, FileResponse};
use argonaut_core::AppError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAlbumQuery {
    #[serde(default)]
    pub remove_files: bool,
}

async fn load_album(state: &AppState, id: i32) -> Result<Album, AppError> {
    state
        .albums
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Album not found".to_string()))
}

fn ensure_owner(album: &Album, caller: &Caller) -> Result<(), AppError> {
    if album.owner_id == caller.user_id {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "You are not the owner of this album".to_string(),
        ))
    }
}

/// Album with its files. `public_only` hides private files.
async fn with_files(
    state: &AppState,
    album: Album,
    public_only: bool,
) -> Result<AlbumResponse, AppError> {
    let base_url = state.public_base_url();
    let files = state
        .files
        .list_for_album(album.id)
        .await?
        .into_iter()
        .filter(|file| !public_only || file.is_public)
        .map(|file| FileResponse::from_record(file, base_url))
        .collect();

    Ok(AlbumResponse::new(album, files))
}

/// `POST /api/album`
#[tracing::instrument(skip(state, request), fields(owner_id = caller.user_id))]
pub async fn create_album(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateAlbumRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let limit = state.config.max_albums_per_account();
    if limit > 0 {
        let used = state.albums.count_for_owner(caller.user_id).await?;
        if used >= limit {
            return Err(AppError::AlbumLimitExceeded { used, limit }.into());
        }
    }

    let name = match request.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let album = state
        .albums
        .create(caller.user_id, &name, request.is_public)
        .await?;

    tracing::info!(album_id = album.id, "Album created");

    Ok((StatusCode::CREATED, Json(AlbumResponse::new(album, Vec::new()))))
}

/// `GET /api/album/{id}`
pub async fn get_album(
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlbumResponse>, HttpAppError> {
    let album = load_album(&state, id).await?;
    if !album.is_public {
        return Err(AppError::Unauthorized("Album is private".to_string()).into());
    }

    Ok(Json(with_files(&state, album, true).await?))
}

/// `GET /api/album/private/{id}`
pub async fn get_private_album(
    caller: Caller,
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlbumResponse>, HttpAppError> {
    let album = load_album(&state, id).await?;
    ensure_owner(&album, &caller)?;

    Ok(Json(with_files(&state, album, false).await?))
}

/// `GET /api/album/getAll`
pub async fn list_albums(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlbumResponse>>, HttpAppError> {
    let albums = state.albums.list_for_owner(caller.user_id).await?;

    let mut response = Vec::with_capacity(albums.len());
    for album in albums {
        response.push(with_files(&state, album, false).await?);
    }

    Ok(Json(response))
}

/// `GET /api/album/getAllSparse`
pub async fn list_albums_sparse(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Album>>, HttpAppError> {
    Ok(Json(state.albums.list_for_owner(caller.user_id).await?))
}

/// `DELETE /api/album/{id}?removeFiles=bool`
#[tracing::instrument(skip(state), fields(owner_id = caller.user_id, album_id = id))]
pub async fn delete_album(
    caller: Caller,
    Path(id): Path<i32>,
    Query(query): Query<DeleteAlbumQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    let album = load_album(&state, id).await?;
    ensure_owner(&album, &caller)?;

    if query.remove_files {
        let removed = state.removal.remove_album_files(id).await?;
        tracing::info!(removed = removed.len(), "Album files removed");
    }

    if !state.albums.delete(id).await? {
        return Err(AppError::NotFound("Album not found".to_string()).into());
    }

    Ok(StatusCode::NO_CONTENT)
}
