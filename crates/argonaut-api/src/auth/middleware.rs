use crate::auth::api_key::{extract_api_key, hash_api_key};
use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::state::AppState;
use argonaut_core::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Resolve the presented API key to a [`Caller`] and store it in the request
/// extensions. Requests without a valid key are rejected with `401`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(key) = extract_api_key(request.headers()) else {
        return HttpAppError(AppError::Unauthorized("Missing API key".to_string()))
            .into_response();
    };

    let key_hash = hash_api_key(key);

    match state.api_keys.find_user_id(&key_hash).await {
        Ok(Some(user_id)) => {
            tracing::debug!(user_id, "Request authenticated");
            request.extensions_mut().insert(Caller { user_id });
            next.run(request).await
        }
        Ok(None) => {
            tracing::debug!("Rejected unknown API key");
            HttpAppError(AppError::Unauthorized("Invalid API key".to_string())).into_response()
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
