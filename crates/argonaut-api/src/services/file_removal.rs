//! File removal: rows first, then blobs.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

use std::collections::HashSet;
use std::sync::Arc;

use argonaut_core::models::FileRecord;
use argonaut_core::AppError;
use argonaut_db::FileRecordStore;
use argonaut_storage::{file_key, BlobStore};

/// Deletes file records together with their stored bytes.
#[derive(Clone)]
pub struct FileRemovalService {
    files: Arc<dyn FileRecordStore>,
    storage: Arc<dyn BlobStore>,
}

impl FileRemovalService {
    pub fn new(files: Arc<dyn FileRecordStore>, storage: Arc<dyn BlobStore>) -> Self {
        Self { files, storage }
    }

    /// Remove the listed files on behalf of `caller_id`.
    ///
    /// Unknown ids are ignored, but at least one must exist, and every file
    /// found must belong to the caller. Nothing is removed otherwise.
    #[tracing::instrument(skip(self, public_ids), fields(owner_id = caller_id, requested = public_ids.len()))]
    pub async fn remove_owned(
        &self,
        public_ids: &[String],
        caller_id: i32,
    ) -> Result<Vec<FileRecord>, AppError> {
        if public_ids.is_empty() {
            return Err(AppError::InvalidInput("No file ids provided".to_string()));
        }

        let unique: Vec<String> = public_ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let found = self.files.find_by_public_ids(&unique).await?;
        if found.is_empty() {
            return Err(AppError::NotFound("Files not found".to_string()));
        }

        if found.iter().any(|file| file.owner_id != caller_id) {
            return Err(AppError::Unauthorized(
                "You are not the owner of every file".to_string(),
            ));
        }

        let ids: Vec<String> = found.into_iter().map(|file| file.public_id).collect();
        self.remove(&ids).await
    }

    /// Remove every file grouped in `album_id`.
    pub async fn remove_album_files(&self, album_id: i32) -> Result<Vec<FileRecord>, AppError> {
        let ids: Vec<String> = self
            .files
            .list_for_album(album_id)
            .await?
            .into_iter()
            .map(|file| file.public_id)
            .collect();

        self.remove(&ids).await
    }

    /// Delete the rows in one transaction, then the blobs. Blob failures are
    /// logged; the rows are already gone and the caller sees success.
    pub async fn remove(&self, public_ids: &[String]) -> Result<Vec<FileRecord>, AppError> {
        if public_ids.is_empty() {
            return Ok(Vec::new());
        }

        let removed = self.files.remove_by_public_ids(public_ids).await?;

        for file in &removed {
            let key = file_key(&file.public_id, &file.file_extension);
            if let Err(e) = self.storage.delete(&key).await {
                tracing::error!(
                    error = %e,
                    storage_key = %key,
                    "Failed to delete blob after removing its record"
                );
            }
        }

        tracing::info!(removed = removed.len(), "Files removed");
        Ok(removed)
    }
}
