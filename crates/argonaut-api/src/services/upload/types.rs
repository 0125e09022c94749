//! Types used by the upload coordinator

use std::fmt;
use std::io::Cursor;

use argonaut_core::constants::DEFAULT_CONTENT_TYPE;
use argonaut_core::models::FileInfo;
use bytes::Bytes;
use tokio::io::AsyncRead;

/// Byte source of one upload part
pub type PartBody = Box<dyn AsyncRead + Send + Unpin>;

/// One file part of an upload request
pub struct UploadPart {
    /// Filename as declared by the client
    pub file_name: String,
    pub content_type: String,
    /// Declared length in bytes. The write fails if the body yields a different count.
    pub len: u64,
    pub body: PartBody,
}

impl UploadPart {
    pub fn from_reader(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        len: u64,
        body: PartBody,
    ) -> Self {
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type
        };

        UploadPart {
            file_name: file_name.into(),
            content_type,
            len,
            body,
        }
    }

    /// Part backed by an in-memory buffer
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        let len = data.len() as u64;
        Self::from_reader(file_name, content_type, len, Box::new(Cursor::new(data)))
    }
}

impl fmt::Debug for UploadPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadPart")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// One upload batch: parts share a single commit/rollback boundary.
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub parts: Vec<UploadPart>,
    /// Per-part metadata, parallel to `parts`. `None` or empty means defaults.
    pub infos: Option<Vec<FileInfo>>,
    pub album_id: Option<i32>,
}

/// Lifecycle of one file within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Writing,
    Written,
    WriteFailed,
    Committed,
    RolledBack,
}

impl FileState {
    /// Whether the blob write is no longer running
    pub fn is_settled(self) -> bool {
        !matches!(self, FileState::Pending | FileState::Writing)
    }
}
