use crate::auth::Caller;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::multipart::{read_batch_form, read_single_form};
use argonaut_core::AppError;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// `POST /api/upload/multi`
#[tracing::instrument(skip(state, multipart), fields(owner_id = caller.user_id, operation = "upload_multi"))]
pub async fn upload_multi(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = read_batch_form(multipart, state.uploads.limits().max_file_size_bytes).await?;

    let files = state.uploads.upload_batch(request, caller.user_id).await?;

    Ok((StatusCode::CREATED, Json(files)))
}

/// `POST /api/upload`
#[tracing::instrument(skip(state, multipart), fields(owner_id = caller.user_id, operation = "upload_single"))]
pub async fn upload_single(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_single_form(multipart, state.uploads.limits().max_file_size_bytes).await?;
    let part = form.part.ok_or(AppError::NoFilesProvided)?;

    let file = state
        .uploads
        .upload_single(part, form.info, form.album_id, caller.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(file)))
}
