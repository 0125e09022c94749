//! Shared constants

/// Folder under the content root that holds every uploaded blob
pub const STORAGE_FOLDER_NAME: &str = "fileStorage";

/// Content type recorded when a part declares none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Route segment public file URLs are served from
pub const FILE_ROUTE: &str = "file";

/// Route segment appended to [`FILE_ROUTE`] for owner-only files
pub const PRIVATE_ROUTE: &str = "private";

/// Extensions rejected when `BLOCKED_EXTENSIONS` is unset
pub const DEFAULT_BLOCKED_EXTENSIONS: &str = ".exe,.bat,.cmd,.com,.sh,.msi,.ps1";
