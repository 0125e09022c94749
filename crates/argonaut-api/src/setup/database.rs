//! Postgres pool and schema

use anyhow::{Context, Result};
use argonaut_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Schema embedded from the workspace `migrations/` directory at build time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Open the record store pool and bring the schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let timeout = Duration::from_secs(config.db_timeout_seconds());

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(600))
        .connect(config.database_url())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to record store within {}s",
                timeout.as_secs()
            )
        })?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to apply file/album schema")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        migrations = MIGRATOR.iter().count(),
        "Record store ready"
    );

    Ok(pool)
}
