//! Argonaut Storage Library
//!
//! This crate provides the blob storage abstraction used by the upload
//! coordinator and the retrieval endpoints, plus the local filesystem backend.
//!
//! # Storage key format
//!
//! A blob key is `{publicId}{extension}` (for example `3f2c...e1.png`). Keys are
//! flat: they never contain a path separator or `..`. Key generation is
//! centralized in the `keys` module so every caller agrees on the layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{file_key, storage_root};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{BlobStore, BlobStream, BlobWriter, StorageError, StorageResult};
