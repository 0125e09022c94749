//! In-flight state of one upload batch and its compensating rollback.
//!
//! A [`PendingBatch`] is armed while it is alive. If it is dropped before
//! [`PendingBatch::commit`] or [`PendingBatch::rollback`] ran (the request
//! future was cancelled, a task panicked), the same compensation is spawned
//! onto the runtime from `Drop`.

use std::sync::Arc;

use argonaut_core::models::NewFileRecord;
use argonaut_core::AppError;
use argonaut_db::FileRecordStore;
use argonaut_storage::{BlobStore, StorageError, StorageResult};
use tokio::task::JoinHandle;

use super::types::FileState;

/// Handle of the task streaming one part into its blob; resolves to the byte count.
pub type WriteTask = JoinHandle<StorageResult<u64>>;

struct BatchEntry {
    key: String,
    record: NewFileRecord,
    state: FileState,
    write: Option<WriteTask>,
    /// False when the blob at `key` was never created by this batch
    owns_blob: bool,
}

impl BatchEntry {
    /// Wait for the write task to finish and record the outcome.
    ///
    /// The handle is polled in place so a cancelled caller leaves it for the
    /// next settle attempt instead of detaching the task.
    async fn settle(&mut self) -> Result<(), String> {
        let Some(handle) = self.write.as_mut() else {
            return Ok(());
        };

        let outcome = handle.await;
        self.write = None;

        match outcome {
            Ok(Ok(_)) => {
                self.state = FileState::Written;
                Ok(())
            }
            Ok(Err(StorageError::AlreadyExists(key))) => {
                self.state = FileState::WriteFailed;
                self.owns_blob = false;
                Err(format!("blob {} already exists", key))
            }
            Ok(Err(e)) => {
                self.state = FileState::WriteFailed;
                Err(format!("writing {} failed: {}", self.key, e))
            }
            Err(join_error) => {
                self.state = FileState::WriteFailed;
                Err(format!("write task for {} aborted: {}", self.key, join_error))
            }
        }
    }
}

/// Files of one upload request between the first write and the final
/// commit or rollback.
pub struct PendingBatch {
    entries: Vec<BatchEntry>,
    files: Arc<dyn FileRecordStore>,
    storage: Arc<dyn BlobStore>,
    persisting: bool,
    armed: bool,
}

impl PendingBatch {
    pub fn new(files: Arc<dyn FileRecordStore>, storage: Arc<dyn BlobStore>) -> Self {
        PendingBatch {
            entries: Vec::new(),
            files,
            storage,
            persisting: false,
            armed: true,
        }
    }

    /// Register a file whose write has not started yet. Returns its slot.
    pub fn track(&mut self, key: String, record: NewFileRecord) -> usize {
        self.entries.push(BatchEntry {
            key,
            record,
            state: FileState::Pending,
            write: None,
            owns_blob: false,
        });
        self.entries.len() - 1
    }

    pub fn start_write(&mut self, slot: usize, task: WriteTask) {
        if let Some(entry) = self.entries.get_mut(slot) {
            entry.write = Some(task);
            entry.owns_blob = true;
            entry.state = FileState::Writing;
        }
    }

    /// Await every write in the order they were started. All writes are
    /// awaited even after one fails; the first failure is returned.
    pub async fn settle_all(&mut self) -> Result<(), String> {
        let mut first_failure = None;
        for entry in self.entries.iter_mut() {
            if let Err(reason) = entry.settle().await {
                tracing::warn!(key = %entry.key, reason = %reason, "Blob write failed");
                first_failure.get_or_insert(reason);
            }
        }
        match first_failure {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Note that the record store is about to be written, so a rollback from
    /// here on must also remove rows.
    pub fn mark_persisting(&mut self) {
        self.persisting = true;
    }

    pub fn records(&self) -> Vec<NewFileRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    pub fn states(&self) -> Vec<FileState> {
        self.entries.iter().map(|e| e.state).collect()
    }

    pub fn commit(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.state = FileState::Committed;
        }
        self.armed = false;
    }

    /// Undo every side effect of the batch and return the error to hand back
    /// to the caller.
    pub async fn rollback(&mut self, reason: String) -> AppError {
        tracing::warn!(
            file_count = self.entries.len(),
            reason = %reason,
            "Rolling back upload batch"
        );

        compensate(
            &mut self.entries,
            self.files.as_ref(),
            self.storage.as_ref(),
            self.persisting,
        )
        .await;
        self.armed = false;

        AppError::UploadFailed(reason)
    }
}

impl Drop for PendingBatch {
    fn drop(&mut self) {
        if !self.armed || self.entries.is_empty() {
            return;
        }

        let mut entries = std::mem::take(&mut self.entries);
        let files = self.files.clone();
        let storage = self.storage.clone();
        let persisting = self.persisting;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    file_count = entries.len(),
                    "Upload batch dropped before completion - rolling back"
                );
                handle.spawn(async move {
                    compensate(&mut entries, files.as_ref(), storage.as_ref(), persisting).await;
                });
            }
            Err(_) => {
                let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
                tracing::error!(
                    keys = ?keys,
                    "Upload batch dropped outside a runtime - blobs may be orphaned"
                );
            }
        }
    }
}

/// Remove every blob and row the batch may have produced.
///
/// Writes still in flight are awaited before their blob is touched. Failures
/// are logged and never escalated.
async fn compensate(
    entries: &mut [BatchEntry],
    files: &dyn FileRecordStore,
    storage: &dyn BlobStore,
    remove_rows: bool,
) {
    for entry in entries.iter_mut() {
        if let Err(reason) = entry.settle().await {
            tracing::debug!(key = %entry.key, reason = %reason, "Write settled as failed");
        }
    }

    for entry in entries.iter().filter(|e| e.owns_blob) {
        if let Err(e) = storage.delete(&entry.key).await {
            tracing::warn!(key = %entry.key, error = %e, "Failed to delete blob during rollback");
        }
    }

    if remove_rows {
        let public_ids: Vec<String> = entries
            .iter()
            .map(|e| e.record.public_id.clone())
            .collect();

        match files.remove_by_public_ids(&public_ids).await {
            Ok(removed) if !removed.is_empty() => {
                tracing::info!(removed = removed.len(), "Removed file records during rollback");
            }
            Ok(_) => {}
            Err(e) => {
                let err = AppError::RollbackSaveFailed(e.to_string());
                tracing::error!(error = %err, "Rollback could not remove file records");
            }
        }
    }

    for entry in entries.iter_mut() {
        entry.state = FileState::RolledBack;
    }
}
