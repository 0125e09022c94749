//! Blob storage abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncWrite;

use argonaut_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Blob already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File {} not found", key)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Exclusive write handle for one blob. Dropping it closes the underlying resource.
pub type BlobWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Chunked blob contents
pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Blob storage abstraction trait
///
/// Blobs are addressed by flat keys (see [`crate::keys`]). Every key is
/// derived from a freshly generated `publicId`, so concurrent requests never
/// contend on the same key and no cross-request locking is needed.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create a new blob and return a handle to stream its bytes into.
    ///
    /// Fails with [`StorageError::AlreadyExists`] if the key is taken. Callers
    /// must `shutdown()` the writer to flush it.
    async fn open_for_write(&self, key: &str) -> StorageResult<BlobWriter>;

    /// Check if a blob exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete a blob. Deleting a blob that does not exist succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Size in bytes of a blob, if it exists.
    async fn content_length(&self, key: &str) -> StorageResult<u64>;

    /// Read a blob as a stream of chunks
    async fn download_stream(&self, key: &str) -> StorageResult<BlobStream>;
}
