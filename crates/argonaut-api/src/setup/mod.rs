//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use argonaut_core::Config;
use argonaut_db::{PostgresAlbumRepository, PostgresApiKeyRepository, PostgresFileRepository};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_tracing(config.is_production());

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(PostgresFileRepository::new(pool.clone())),
        Arc::new(PostgresAlbumRepository::new(pool.clone())),
        Arc::new(PostgresApiKeyRepository::new(pool)),
        storage,
    ));

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
