use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::file::FileResponse;

/// Album grouping uploaded files. Serialized as-is for sparse listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: i32,
    pub is_public: bool,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub owner_id: i32,
}

/// Album with its files and their URLs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: i32,
    pub is_public: bool,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub owner_id: i32,
    pub files: Vec<FileResponse>,
}

impl AlbumResponse {
    pub fn new(album: Album, files: Vec<FileResponse>) -> Self {
        AlbumResponse {
            id: album.id,
            is_public: album.is_public,
            name: album.name,
            date_added: album.date_added,
            owner_id: album.owner_id,
            files,
        }
    }
}

/// Request DTO for creating a new album
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Album name must be at most 255 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}
