//! Argonaut DB Library
//!
//! Record, album and API key stores plus their Postgres implementations.

pub mod db;

pub use db::{
    AlbumStore, ApiKeyStore, FileRecordStore, PostgresAlbumRepository, PostgresApiKeyRepository,
    PostgresFileRepository, TransactionGuard,
};
