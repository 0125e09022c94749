use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{FILE_ROUTE, PRIVATE_ROUTE};
use crate::error::AppError;
use crate::filename::display_name;

/// One stored file. `public_id` is the only external reference to the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i32,
    pub public_id: String,
    pub is_public: bool,
    pub file_extension: String,
    pub content_type: String,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub owner_id: i32,
    pub album_id: Option<i32>,
}

impl FileRecord {
    pub fn url(&self, base_url: &str) -> String {
        file_url(base_url, &self.public_id, &self.file_extension, self.is_public)
    }
}

/// A file record that has not been persisted yet (no surrogate id).
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileRecord {
    pub public_id: String,
    pub is_public: bool,
    pub file_extension: String,
    pub content_type: String,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub owner_id: i32,
    pub album_id: Option<i32>,
}

impl NewFileRecord {
    /// Build the record for one upload part, applying `info` defaults.
    pub fn new(
        public_id: String,
        info: &FileInfo,
        file_extension: String,
        content_type: String,
        owner_id: i32,
        album_id: Option<i32>,
    ) -> Self {
        let name = display_name(info.name.as_deref(), &public_id);
        NewFileRecord {
            public_id,
            is_public: info.is_public,
            file_extension,
            content_type,
            name,
            date_added: Utc::now(),
            owner_id,
            album_id,
        }
    }

    /// Attach the id assigned by the record store.
    pub fn into_record(self, id: i32) -> FileRecord {
        FileRecord {
            id,
            public_id: self.public_id,
            is_public: self.is_public,
            file_extension: self.file_extension,
            content_type: self.content_type,
            name: self.name,
            date_added: self.date_added,
            owner_id: self.owner_id,
            album_id: self.album_id,
        }
    }
}

/// Per-file metadata supplied alongside an upload part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: Option<String>,
    pub is_public: bool,
}

impl Default for FileInfo {
    fn default() -> Self {
        FileInfo {
            name: None,
            is_public: true,
        }
    }
}

impl FileInfo {
    /// Parse the `infos` form field: a JSON array of `{ name?, isPublic? }`
    /// objects whose property names are matched case-insensitively.
    pub fn parse_list(raw: &str) -> Result<Vec<FileInfo>, AppError> {
        let entries: Vec<serde_json::Map<String, Value>> = serde_json::from_str(raw)?;
        entries.into_iter().map(FileInfo::from_object).collect()
    }

    fn from_object(object: serde_json::Map<String, Value>) -> Result<FileInfo, AppError> {
        let mut info = FileInfo::default();
        for (key, value) in object {
            if key.eq_ignore_ascii_case("name") {
                info.name = match value {
                    Value::Null => None,
                    Value::String(name) => Some(name),
                    other => {
                        return Err(AppError::InvalidInput(format!(
                            "infos: name must be a string, got {}",
                            other
                        )))
                    }
                };
            } else if key.eq_ignore_ascii_case("isPublic") {
                info.is_public = match value {
                    Value::Null => true,
                    Value::Bool(flag) => flag,
                    other => {
                        return Err(AppError::InvalidInput(format!(
                            "infos: isPublic must be a boolean, got {}",
                            other
                        )))
                    }
                };
            }
        }
        Ok(info)
    }
}

/// File record as returned to clients, with its retrieval URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: i32,
    pub public_id: String,
    pub is_public: bool,
    pub file_extension: String,
    pub content_type: String,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub owner_id: i32,
    pub album_id: Option<i32>,
    pub url: String,
}

impl FileResponse {
    pub fn from_record(record: FileRecord, base_url: &str) -> Self {
        let url = record.url(base_url);
        FileResponse {
            id: record.id,
            public_id: record.public_id,
            is_public: record.is_public,
            file_extension: record.file_extension,
            content_type: record.content_type,
            name: record.name,
            date_added: record.date_added,
            owner_id: record.owner_id,
            album_id: record.album_id,
            url,
        }
    }
}

/// Retrieval URL for a stored file.
pub fn file_url(base_url: &str, public_id: &str, extension: &str, is_public: bool) -> String {
    let base = base_url.trim_end_matches('/');
    if is_public {
        format!("{}/{}/{}{}", base, FILE_ROUTE, public_id, extension)
    } else {
        format!(
            "{}/{}/{}/{}{}",
            base, FILE_ROUTE, PRIVATE_ROUTE, public_id, extension
        )
    }
}
