#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{BlobStore, StorageResult};
use argonaut_core::Config;
use std::sync::Arc;

/// Create the blob store described by the configuration
#[cfg(feature = "storage-local")]
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    let storage = LocalStorage::new(config.content_root()).await?;
    tracing::info!(
        path = %storage.base_path().display(),
        "Local blob storage initialized"
    );
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-local"))]
pub async fn create_storage(_config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    Err(crate::StorageError::ConfigError(
        "Local storage backend not available (storage-local feature not enabled)".to_string(),
    ))
}
