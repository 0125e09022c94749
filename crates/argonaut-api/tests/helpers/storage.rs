//! Blob store wrapper that can fail on demand.

#![allow(dead_code)]

use argonaut_storage::{BlobStore, BlobStream, BlobWriter, LocalStorage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// [`LocalStorage`] with counters and failure switches.
pub struct FaultyStorage {
    inner: LocalStorage,
    opens: AtomicUsize,
    deletes: AtomicUsize,
    /// 1-based index of the open call that fails; 0 disables
    fail_open_at: AtomicUsize,
    pub fail_delete: AtomicBool,
}

impl FaultyStorage {
    pub async fn new(content_root: &Path) -> Self {
        Self {
            inner: LocalStorage::new(content_root)
                .await
                .expect("Failed to create local storage"),
            opens: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_open_at: AtomicUsize::new(0),
            fail_delete: AtomicBool::new(false),
        }
    }

    pub fn fail_open_at(&self, nth: usize) {
        self.fail_open_at.store(nth, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn base_path(&self) -> &Path {
        self.inner.base_path()
    }

    /// Number of blobs currently on disk
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.inner.base_path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl BlobStore for FaultyStorage {
    async fn open_for_write(&self, key: &str) -> StorageResult<BlobWriter> {
        let nth = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if nth == self.fail_open_at.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(format!(
                "injected open failure for {}",
                key
            )));
        }
        self.inner.open_for_write(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(format!(
                "injected delete failure for {}",
                key
            )));
        }
        self.inner.delete(key).await
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        self.inner.content_length(key).await
    }

    async fn download_stream(&self, key: &str) -> StorageResult<BlobStream> {
        self.inner.download_stream(key).await
    }
}
