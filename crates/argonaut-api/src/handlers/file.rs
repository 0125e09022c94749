//! File retrieval, listing and deletion

use crate::auth::Caller;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use argonaut_core::filename::public_id_from_segment;
use argonaut_core::models::{FileRecord, FileResponse};
use argonaut_core::AppError;
use argonaut_storage::file_key;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::StreamExt;
use std::sync::Arc;

async fn load_file(state: &AppState, segment: &str) -> Result<FileRecord, AppError> {
    let public_id = public_id_from_segment(segment)
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    state
        .files
        .find_by_public_id(public_id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))
}

fn ensure_public(file: &FileRecord) -> Result<(), AppError> {
    if file.is_public {
        Ok(())
    } else {
        Err(AppError::Unauthorized("File is private".to_string()))
    }
}

fn ensure_owner(file: &FileRecord, caller: &Caller) -> Result<(), AppError> {
    if file.owner_id == caller.user_id {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "You are not the owner of this file".to_string(),
        ))
    }
}

/// `Content-Disposition` filename with quotes and control characters dropped
fn disposition_filename(file: &FileRecord) -> String {
    format!("{}{}", file.name, file.file_extension)
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect()
}

async fn stream_file(state: &AppState, file: &FileRecord) -> Result<Response, HttpAppError> {
    let key = file_key(&file.public_id, &file.file_extension);

    let stream = state.storage.download_stream(&key).await.map_err(|e| {
        tracing::error!(error = %e, storage_key = %key, "Failed to retrieve file from storage");
        AppError::from(e)
    })?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", disposition_filename(file)),
        )
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            AppError::Internal(e.to_string())
        })?;

    Ok(response)
}

/// `GET /file/{publicId}{ext}`
#[tracing::instrument(skip(state))]
pub async fn serve_public_file(
    Path(segment): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let file = load_file(&state, &segment).await?;
    ensure_public(&file)?;
    stream_file(&state, &file).await
}

/// `GET /file/private/{publicId}{ext}`
#[tracing::instrument(skip(state), fields(owner_id = caller.user_id))]
pub async fn serve_private_file(
    caller: Caller,
    Path(segment): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let file = load_file(&state, &segment).await?;
    ensure_owner(&file, &caller)?;
    stream_file(&state, &file).await
}

/// `GET /api/file/{publicId}`
pub async fn get_file_info(
    Path(public_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileResponse>, HttpAppError> {
    let file = load_file(&state, &public_id).await?;
    ensure_public(&file)?;
    Ok(Json(FileResponse::from_record(file, state.public_base_url())))
}

/// `GET /api/file/private/{publicId}`
pub async fn get_private_file_info(
    caller: Caller,
    Path(public_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileResponse>, HttpAppError> {
    let file = load_file(&state, &public_id).await?;
    ensure_owner(&file, &caller)?;
    Ok(Json(FileResponse::from_record(file, state.public_base_url())))
}

/// `GET /api/file/getAll`
pub async fn list_files(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileResponse>>, HttpAppError> {
    let files = state.files.list_for_owner(caller.user_id).await?;
    let base_url = state.public_base_url();

    Ok(Json(
        files
            .into_iter()
            .map(|file| FileResponse::from_record(file, base_url))
            .collect(),
    ))
}

/// `DELETE /api/file/{publicId}`
#[tracing::instrument(skip(state), fields(owner_id = caller.user_id, operation = "delete_file"))]
pub async fn delete_file(
    caller: Caller,
    Path(segment): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    let public_id = public_id_from_segment(&segment)
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    state
        .removal
        .remove_owned(&[public_id.to_string()], caller.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/file/multi` with a JSON array of public ids
#[tracing::instrument(skip(state, public_ids), fields(owner_id = caller.user_id, operation = "delete_files"))]
pub async fn delete_files(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    ValidatedJson(public_ids): ValidatedJson<Vec<String>>,
) -> Result<Json<Vec<FileRecord>>, HttpAppError> {
    let removed = state
        .removal
        .remove_owned(&public_ids, caller.user_id)
        .await?;

    Ok(Json(removed))
}
