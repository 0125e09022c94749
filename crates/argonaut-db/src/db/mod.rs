//! Database repositories for data access layer
//!
//! Each store is a trait so the upload coordinator and the HTTP layer can run
//! against in-memory implementations in tests; the `Postgres*Repository`
//! types are the production implementations.

pub mod album;
pub mod api_key;
pub mod file;
pub mod transaction;

pub use album::{AlbumStore, PostgresAlbumRepository};
pub use api_key::{ApiKeyStore, PostgresApiKeyRepository};
pub use file::{FileRecordStore, PostgresFileRepository};
pub use transaction::TransactionGuard;
