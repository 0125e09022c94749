//! Application state shared by every handler.

use std::sync::Arc;

use argonaut_core::Config;
use argonaut_db::{AlbumStore, ApiKeyStore, FileRecordStore};
use argonaut_storage::BlobStore;

use crate::services::{FileRemovalService, UploadCoordinator};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub files: Arc<dyn FileRecordStore>,
    pub albums: Arc<dyn AlbumStore>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub storage: Arc<dyn BlobStore>,
    pub uploads: UploadCoordinator,
    pub removal: FileRemovalService,
    pub is_production: bool,
}

impl AppState {
    /// Wire the services on top of the given stores.
    pub fn new(
        config: Config,
        files: Arc<dyn FileRecordStore>,
        albums: Arc<dyn AlbumStore>,
        api_keys: Arc<dyn ApiKeyStore>,
        storage: Arc<dyn BlobStore>,
    ) -> Self {
        let uploads = UploadCoordinator::new(
            files.clone(),
            albums.clone(),
            storage.clone(),
            config.upload_limits().clone(),
            config.public_base_url(),
        );
        let removal = FileRemovalService::new(files.clone(), storage.clone());
        let is_production = config.is_production();

        Self {
            config,
            files,
            albums,
            api_keys,
            storage,
            uploads,
            removal,
            is_production,
        }
    }

    pub fn public_base_url(&self) -> &str {
        self.config.public_base_url()
    }
}
