//! Domain models

pub mod album;
pub mod file;

pub use album::{Album, AlbumResponse, CreateAlbumRequest};
pub use file::{file_url, FileInfo, FileRecord, FileResponse, NewFileRecord};
