//! Blob storage setup

use anyhow::{Context, Result};
use argonaut_core::Config;
use argonaut_storage::BlobStore;
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    argonaut_storage::create_storage(config)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize storage under {}",
                config.content_root().display()
            )
        })
}
