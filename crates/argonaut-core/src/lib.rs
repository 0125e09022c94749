//! Argonaut Core Library
//!
//! This crate provides the domain models, error types, configuration and filename
//! helpers that are shared across all Argonaut components.

pub mod config;
pub mod constants;
pub mod error;
pub mod filename;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadLimits};
pub use error::{AppError, ErrorMetadata, LogLevel};
// Note: BlobStore, StorageError, StorageResult live in argonaut-storage
