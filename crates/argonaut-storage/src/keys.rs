//! Shared key generation for blob stores.
//!
//! Key format: `{publicId}{extension}`, stored under `{content_root}/fileStorage/`.

use std::path::{Path, PathBuf};

use argonaut_core::constants::STORAGE_FOLDER_NAME;

/// Storage key for a file. `extension` keeps its leading dot and may be empty.
pub fn file_key(public_id: &str, extension: &str) -> String {
    format!("{}{}", public_id, extension)
}

/// Directory holding every blob for the given content root.
pub fn storage_root(content_root: &Path) -> PathBuf {
    content_root.join(STORAGE_FOLDER_NAME)
}

/// Whether `key` is a single, non-empty path component.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && !key.contains("..")
        && !key.contains(['/', '\\', '\0'])
}
