//! Upload coordinator
//!
//! Runs one upload batch end to end: pre-flight validation, concurrent
//! streaming of every part into blob storage, a single atomic save of the
//! file records, and compensating rollback when any of those steps fails.
//!
//! Nothing is written before validation has passed. Once the first write has
//! started, the batch either commits completely or leaves neither blobs nor
//! rows behind.

use std::sync::Arc;

use argonaut_core::filename::file_extension;
use argonaut_core::models::{FileInfo, FileResponse, NewFileRecord};
use argonaut_core::{AppError, UploadLimits};
use argonaut_db::{AlbumStore, FileRecordStore};
use argonaut_storage::{file_key, BlobStore, StorageError, StorageResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use super::batch::PendingBatch;
use super::types::{PartBody, UploadPart, UploadRequest};

/// Coordinates upload batches against the record, album and blob stores.
#[derive(Clone)]
pub struct UploadCoordinator {
    files: Arc<dyn FileRecordStore>,
    albums: Arc<dyn AlbumStore>,
    storage: Arc<dyn BlobStore>,
    limits: UploadLimits,
    public_base_url: String,
}

impl UploadCoordinator {
    pub fn new(
        files: Arc<dyn FileRecordStore>,
        albums: Arc<dyn AlbumStore>,
        storage: Arc<dyn BlobStore>,
        limits: UploadLimits,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            files,
            albums,
            storage,
            limits,
            public_base_url: public_base_url.into(),
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Store every part of `request` for `caller_id` as one batch.
    ///
    /// Returns the committed records in part order. Pre-flight failures
    /// return before any I/O; failures after the first write are rolled back
    /// and reported as [`AppError::UploadFailed`].
    #[tracing::instrument(
        skip(self, request),
        fields(owner_id = caller_id, file_count = request.parts.len(), album_id = ?request.album_id)
    )]
    pub async fn upload_batch(
        &self,
        request: UploadRequest,
        caller_id: i32,
    ) -> Result<Vec<FileResponse>, AppError> {
        let UploadRequest {
            parts,
            infos,
            album_id,
        } = request;

        let infos = self.check_parts(&parts, infos)?;
        self.check_owner_limits(album_id, caller_id).await?;

        let mut batch = PendingBatch::new(self.files.clone(), self.storage.clone());

        for (index, part) in parts.into_iter().enumerate() {
            let info = infos
                .as_ref()
                .and_then(|infos| infos.get(index))
                .cloned()
                .unwrap_or_default();

            let extension = file_extension(&part.file_name);
            let public_id = Uuid::new_v4().to_string();
            let key = file_key(&public_id, &extension);
            let record = NewFileRecord::new(
                public_id,
                &info,
                extension,
                part.content_type,
                caller_id,
                album_id,
            );

            let slot = batch.track(key.clone(), record);
            let task = tokio::spawn(write_part(
                self.storage.clone(),
                key,
                part.body,
                part.len,
            ));
            batch.start_write(slot, task);
        }

        if let Err(reason) = batch.settle_all().await {
            return Err(batch.rollback(reason).await);
        }

        let records = batch.records();
        batch.mark_persisting();

        let saved = match self.files.insert_batch(&records).await {
            Ok(saved) if saved.len() == records.len() => saved,
            Ok(saved) => {
                let reason = format!(
                    "record store saved {} of {} file records",
                    saved.len(),
                    records.len()
                );
                return Err(batch.rollback(reason).await);
            }
            Err(e) => {
                let reason = format!("saving file records failed: {}", e);
                return Err(batch.rollback(reason).await);
            }
        };

        batch.commit();

        tracing::info!(
            owner_id = caller_id,
            file_count = saved.len(),
            "Upload batch committed"
        );

        Ok(saved
            .into_iter()
            .map(|record| FileResponse::from_record(record, &self.public_base_url))
            .collect())
    }

    /// Store a single file. An empty part is rejected with
    /// [`AppError::NoFilesProvided`].
    pub async fn upload_single(
        &self,
        part: UploadPart,
        info: FileInfo,
        album_id: Option<i32>,
        caller_id: i32,
    ) -> Result<FileResponse, AppError> {
        if part.len == 0 {
            return Err(AppError::NoFilesProvided);
        }

        let request = UploadRequest {
            parts: vec![part],
            infos: Some(vec![info]),
            album_id,
        };

        self.upload_batch(request, caller_id)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Upload returned no file record".to_string()))
    }

    /// Pre-flight checks on the parts themselves. Returns the metadata list
    /// to apply, with an empty list normalized to `None`.
    ///
    /// Synchronous: part bodies are not `Sync`, so no borrow of `parts` may
    /// be held across an await point.
    fn check_parts(
        &self,
        parts: &[UploadPart],
        infos: Option<Vec<FileInfo>>,
    ) -> Result<Option<Vec<FileInfo>>, AppError> {
        let limits = &self.limits;

        if parts.is_empty() {
            return Err(AppError::NoFilesProvided);
        }

        if parts.len() > limits.max_files_per_request {
            return Err(AppError::TooManyFiles {
                count: parts.len(),
                max: limits.max_files_per_request,
            });
        }

        for part in parts {
            if part.len > limits.max_file_size_bytes {
                return Err(AppError::FileTooLarge {
                    file_name: part.file_name.clone(),
                    size: part.len,
                    max: limits.max_file_size_bytes,
                });
            }

            let extension = file_extension(&part.file_name);
            if limits.is_blocked(&extension) {
                return Err(AppError::ExtensionBlocked {
                    file_name: part.file_name.clone(),
                    extension,
                });
            }
        }

        let infos = infos.filter(|infos| !infos.is_empty());
        if let Some(infos) = &infos {
            if infos.len() != parts.len() {
                return Err(AppError::MetadataCountMismatch {
                    files: parts.len(),
                    infos: infos.len(),
                });
            }
        }

        Ok(infos)
    }

    /// Pre-flight checks against the album and record stores.
    async fn check_owner_limits(&self, album_id: Option<i32>, caller_id: i32) -> Result<(), AppError> {
        if let Some(album_id) = album_id {
            match self.albums.find_by_id(album_id).await? {
                Some(album) if album.owner_id == caller_id => {}
                _ => return Err(AppError::AlbumNotFound(album_id)),
            }
        }

        let limit = self.limits.max_files_per_account;
        if limit > 0 {
            let used = self.files.count_for_owner(caller_id).await?;
            if used >= limit {
                return Err(AppError::FileLimitExceeded { used, limit });
            }
        }

        Ok(())
    }
}

/// Create the blob for `key` and stream `body` into it.
///
/// At most `expected_len + 1` bytes are read from `body`. The writer is
/// dropped, and the file handle closed, on every return path.
async fn write_part(
    storage: Arc<dyn BlobStore>,
    key: String,
    mut body: PartBody,
    expected_len: u64,
) -> StorageResult<u64> {
    let mut writer = storage.open_for_write(&key).await?;

    // One byte past the declared length is enough to detect an overrun.
    let mut bounded = (&mut body).take(expected_len.saturating_add(1));
    let written = tokio::io::copy(&mut bounded, &mut writer).await?;
    writer.shutdown().await?;

    if written != expected_len {
        return Err(StorageError::UploadFailed(format!(
            "{}: expected {} bytes, received {}",
            key, expected_len, written
        )));
    }

    tracing::debug!(key = %key, bytes = written, "Blob written");
    Ok(written)
}
