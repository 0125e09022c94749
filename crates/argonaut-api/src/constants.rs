//! API-wide constants

/// Header carrying the raw API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Allowance for multipart boundaries and text fields on top of file bytes
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Multipart field names
pub const FILES_FIELD: &str = "files";
pub const FILE_FIELD: &str = "file";
pub const INFOS_FIELD: &str = "infos";
pub const ALBUM_ID_FIELD: &str = "albumId";
pub const IS_PUBLIC_FIELD: &str = "isPublic";
pub const NAME_FIELD: &str = "name";
