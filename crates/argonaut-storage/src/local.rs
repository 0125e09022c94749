use crate::keys::{is_valid_key, storage_root};
use crate::traits::{BlobStore, BlobStream, BlobWriter, StorageError, StorageResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `content_root` - Content directory; blobs go to `{content_root}/fileStorage`
    pub async fn new(content_root: impl AsRef<Path>) -> StorageResult<Self> {
        let base_path = storage_root(content_root.as_ref());

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Directory every blob is stored in
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(format!(
                "Storage key '{}' must be a single path component",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn open_for_write(&self, key: &str) -> StorageResult<BlobWriter> {
        let path = self.key_to_path(key)?;

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(key.to_string()),
                _ => StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                )),
            })?;

        tracing::debug!(path = %path.display(), key = %key, "Local storage blob opened for write");

        Ok(Box::new(file))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(key)?;
        let meta = fs::metadata(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::IoError(e),
        })?;
        Ok(meta.len())
    }

    async fn download_stream(&self, key: &str) -> StorageResult<BlobStream> {
        let path = self.key_to_path(key)?;

        let file = fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::DownloadFailed(format!(
                "Failed to open file {}: {}",
                path.display(),
                e
            )),
        })?;

        let key = key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream download error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    async fn write_blob(storage: &LocalStorage, key: &str, data: &[u8]) {
        let mut writer = storage.open_for_write(key).await.unwrap();
        writer.write_all(data).await.unwrap();
        writer.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_local_storage_write_then_stream() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        write_blob(&storage, "abc.txt", b"test data").await;

        assert!(dir.path().join("fileStorage").join("abc.txt").exists());
        assert_eq!(storage.content_length("abc.txt").await.unwrap(), 9);

        let mut stream = storage.download_stream("abc.txt").await.unwrap();
        let mut downloaded = Vec::new();
        while let Some(chunk) = stream.next().await {
            downloaded.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(downloaded, b"test data");
    }

    #[tokio::test]
    async fn test_open_for_write_refuses_existing_key() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        write_blob(&storage, "taken.png", b"one").await;

        let result = storage.open_for_write("taken.png").await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_exists_reports_io_errors() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        write_blob(&storage, "here.txt", b"x").await;
        assert!(storage.exists("here.txt").await.unwrap());
        assert!(!storage.exists("missing.txt").await.unwrap());

        // Storage root replaced by a regular file: lookups fail with ENOTDIR
        std::fs::remove_file(storage.base_path().join("here.txt")).unwrap();
        std::fs::remove_dir(storage.base_path()).unwrap();
        std::fs::write(storage.base_path(), b"not a directory").unwrap();

        let result = storage.exists("here.txt").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.open_for_write("../escape.txt").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("nested/file.txt").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        write_blob(&storage, "gone.bin", b"x").await;
        storage.delete("gone.bin").await.unwrap();
        assert!(!storage.exists("gone.bin").await.unwrap());

        storage.delete("gone.bin").await.unwrap();
        storage.delete("never-existed.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_blob_reports_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        assert!(matches!(
            storage.download_stream("missing.png").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.content_length("missing.png").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
