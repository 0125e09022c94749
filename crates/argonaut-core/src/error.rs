//! Error taxonomy shared by every argonaut crate
//!
//! Everything is unified under `AppError`: the upload pre-flight
//! rejections, the post-flight `UploadFailed`, and the ordinary lookup and
//! persistence failures raised by the file and album endpoints.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Level an error is logged at when it reaches the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Rejected input and other caller mistakes
    Debug,
    /// Account limits and similar policy rejections
    Warn,
    /// Failures the operator needs to see
    Error,
}

/// How an error is presented to clients and logs.
pub trait ErrorMetadata {
    /// HTTP status
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// Hint for the client, if any
    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show the client
    fn client_message(&self) -> String;

    /// Internal details must never reach the client
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No files provided")]
    NoFilesProvided,

    #[error("Too many files: {count} submitted, at most {max} allowed")]
    TooManyFiles { count: usize, max: usize },

    #[error("File {file_name} is {size} bytes, limit is {max} bytes")]
    FileTooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("File {file_name} has blocked extension '{extension}'")]
    ExtensionBlocked {
        file_name: String,
        extension: String,
    },

    #[error("Metadata count mismatch: {files} files, {infos} info entries")]
    MetadataCountMismatch { files: usize, infos: usize },

    #[error("Album {0} not found")]
    AlbumNotFound(i32),

    #[error("File limit exceeded: {used}/{limit}")]
    FileLimitExceeded { used: i64, limit: i64 },

    #[error("Album limit exceeded: {used}/{limit}")]
    AlbumLimitExceeded { used: i64, limit: i64 },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Rollback save failed: {0}")]
    RollbackSaveFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// (status, code, recoverable, suggested action, sensitive, log level) per variant.
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::NoFilesProvided => (
            400,
            "NO_FILES_PROVIDED",
            false,
            Some("Attach at least one file"),
            false,
            LogLevel::Debug,
        ),
        AppError::TooManyFiles { .. } => (
            400,
            "TOO_MANY_FILES",
            false,
            Some("Split the upload into smaller batches"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileTooLarge { .. } => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::ExtensionBlocked { .. } => (
            400,
            "EXTENSION_BLOCKED",
            false,
            Some("Remove files with blocked extensions"),
            false,
            LogLevel::Debug,
        ),
        AppError::MetadataCountMismatch { .. } => (
            400,
            "METADATA_COUNT_MISMATCH",
            false,
            Some("Send one info entry per file or none at all"),
            false,
            LogLevel::Debug,
        ),
        AppError::AlbumNotFound(_) => (
            400,
            "ALBUM_NOT_FOUND",
            false,
            Some("Verify the album ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileLimitExceeded { .. } => (
            403,
            "FILE_LIMIT_EXCEEDED",
            false,
            Some("Delete some files before uploading more"),
            false,
            LogLevel::Warn,
        ),
        AppError::AlbumLimitExceeded { .. } => (
            403,
            "ALBUM_LIMIT_EXCEEDED",
            false,
            Some("Delete some albums before creating more"),
            false,
            LogLevel::Warn,
        ),
        AppError::UploadFailed(_) => (
            500,
            "UPLOAD_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::RollbackSaveFailed(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check API key"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Variant name reported as `error_type` outside production
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::NoFilesProvided => "NoFilesProvided",
            AppError::TooManyFiles { .. } => "TooManyFiles",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::ExtensionBlocked { .. } => "ExtensionBlocked",
            AppError::MetadataCountMismatch { .. } => "MetadataCountMismatch",
            AppError::AlbumNotFound(_) => "AlbumNotFound",
            AppError::FileLimitExceeded { .. } => "FileLimitExceeded",
            AppError::AlbumLimitExceeded { .. } => "AlbumLimitExceeded",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::RollbackSaveFailed(_) => "RollbackSaveFailed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Whether this error was raised before any file was written.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            AppError::NoFilesProvided
                | AppError::TooManyFiles { .. }
                | AppError::FileTooLarge { .. }
                | AppError::ExtensionBlocked { .. }
                | AppError::MetadataCountMismatch { .. }
                | AppError::AlbumNotFound(_)
                | AppError::FileLimitExceeded { .. }
        )
    }

    /// Display text followed by the `source()` chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::NoFilesProvided => "No files found".to_string(),
            AppError::TooManyFiles { max, .. } => {
                format!("Too many files. Max files is {}", max)
            }
            AppError::FileTooLarge { file_name, max, .. } => format!(
                "File {} is too big. Maximum file size allowed is {} bytes",
                file_name, max
            ),
            AppError::ExtensionBlocked { extension, .. } => {
                format!("File extension {} is not allowed", extension)
            }
            AppError::MetadataCountMismatch { .. } => {
                "Either leave infos empty or add the same number of info entries as files"
                    .to_string()
            }
            AppError::AlbumNotFound(_) => "Album doesn't exist".to_string(),
            AppError::FileLimitExceeded { limit, .. } => {
                format!("You have reached the maximum file limit of {}", limit)
            }
            AppError::AlbumLimitExceeded { limit, .. } => {
                format!("You have reached the maximum album limit of {}", limit)
            }
            AppError::UploadFailed(_) => "Upload failed, please try again".to_string(),
            AppError::RollbackSaveFailed(_) => "Internal server error".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_upload_failed_hides_detail() {
        let err = AppError::UploadFailed("write to /srv/content/fileStorage/abc.png failed".into());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/srv"));
        assert!(err.to_string().contains("/srv"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_file_too_large() {
        let err = AppError::FileTooLarge {
            file_name: "movie.mp4".to_string(),
            size: 11,
            max: 10,
        };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("movie.mp4"));
        assert!(err.client_message().contains("10"));
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_file_limit_exceeded() {
        let err = AppError::FileLimitExceeded { used: 5, limit: 5 };
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "FILE_LIMIT_EXCEEDED");
        assert!(err.client_message().contains('5'));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("File not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "File not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_preflight_classification() {
        assert!(AppError::NoFilesProvided.is_preflight());
        assert!(AppError::AlbumNotFound(3).is_preflight());
        assert!(AppError::MetadataCountMismatch { files: 2, infos: 1 }.is_preflight());
        assert!(!AppError::UploadFailed("x".into()).is_preflight());
        assert!(!AppError::RollbackSaveFailed("x".into()).is_preflight());
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("disk offline").context("opening blob"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by: opening blob"));
    }
}
