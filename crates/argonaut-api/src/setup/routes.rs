//! Route configuration and setup.

use crate::auth::auth_middleware;
use crate::constants::FORM_OVERHEAD_BYTES;
use crate::handlers::{album, file, health, upload};
use crate::state::AppState;
use argonaut_core::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let cors = setup_cors(config);

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    public_routes()
        .merge(protected_routes)
        .layer(RequestBodyLimitLayer::new(request_body_limit(config)))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/file/{segment}", get(file::serve_public_file))
        .route("/api/file/{public_id}", get(file::get_file_info))
        .route("/api/album/{id}", get(album::get_album))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload", post(upload::upload_single))
        .route("/api/upload/multi", post(upload::upload_multi))
        .route("/file/private/{segment}", get(file::serve_private_file))
        .route("/api/file/private/{public_id}", get(file::get_private_file_info))
        .route("/api/file/getAll", get(file::list_files))
        .route("/api/file/multi", delete(file::delete_files))
        .route("/api/file/{public_id}", delete(file::delete_file))
        .route("/api/album", post(album::create_album))
        .route("/api/album/private/{id}", get(album::get_private_album))
        .route("/api/album/getAll", get(album::list_albums))
        .route("/api/album/getAllSparse", get(album::list_albums_sparse))
        .route("/api/album/{id}", delete(album::delete_album))
}

/// Largest accepted request body: a full batch of maximum-size files plus
/// form overhead.
fn request_body_limit(config: &Config) -> usize {
    let limits = config.upload_limits();
    let files = usize::try_from(limits.max_file_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(limits.max_files_per_request);
    files.saturating_add(FORM_OVERHEAD_BYTES)
}

fn setup_cors(config: &Config) -> CorsLayer {
    if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins()
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    }
}
