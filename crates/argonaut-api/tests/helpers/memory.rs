//! In-memory record, album and API key stores with failure injection.

#![allow(dead_code)]

use argonaut_api::auth::api_key::hash_api_key;
use argonaut_core::models::{Album, FileRecord, NewFileRecord};
use argonaut_core::AppError;
use argonaut_db::{AlbumStore, ApiKeyStore, FileRecordStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    files: Vec<FileRecord>,
    albums: Vec<Album>,
    api_keys: HashMap<String, i32>,
    next_file_id: i32,
    next_album_id: i32,
}

/// Shared fake backing every store trait.
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
    /// `insert_batch` fails without persisting anything
    pub fail_insert: AtomicBool,
    /// `insert_batch` persists every record but the last and reports success
    pub short_insert: AtomicBool,
    /// `remove_by_public_ids` fails
    pub fail_remove: AtomicBool,
    /// `ping` fails
    pub fail_ping: AtomicBool,
    pub insert_calls: AtomicUsize,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_api_key(&self, key: &str, user_id: i32) {
        self.tables
            .lock()
            .unwrap()
            .api_keys
            .insert(hash_api_key(key), user_id);
    }

    pub fn add_album(&self, owner_id: i32, is_public: bool) -> Album {
        let mut tables = self.tables.lock().unwrap();
        tables.next_album_id += 1;
        let album = Album {
            id: tables.next_album_id,
            is_public,
            name: format!("album-{}", tables.next_album_id),
            date_added: Utc::now(),
            owner_id,
        };
        tables.albums.push(album.clone());
        album
    }

    pub fn set_file_count(&self, owner_id: i32, count: usize) {
        for _ in 0..count {
            let record = NewFileRecord {
                public_id: seed_id(),
                is_public: true,
                file_extension: ".txt".to_string(),
                content_type: "text/plain".to_string(),
                name: "seed".to_string(),
                date_added: Utc::now(),
                owner_id,
                album_id: None,
            };
            self.persist(&record);
        }
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.tables.lock().unwrap().files.clone()
    }

    pub fn file(&self, public_id: &str) -> Option<FileRecord> {
        self.tables
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|f| f.public_id == public_id)
            .cloned()
    }

    pub fn albums(&self) -> Vec<Album> {
        self.tables.lock().unwrap().albums.clone()
    }

    fn persist(&self, record: &NewFileRecord) -> FileRecord {
        let mut tables = self.tables.lock().unwrap();
        tables.next_file_id += 1;
        let saved = record.clone().into_record(tables.next_file_id);
        tables.files.push(saved.clone());
        saved
    }
}

fn seed_id() -> String {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    format!("seed-{}", NEXT.fetch_add(1, Ordering::SeqCst))
}

fn database_down() -> AppError {
    AppError::Internal("database unavailable".to_string())
}

#[async_trait]
impl FileRecordStore for InMemoryDb {
    async fn insert_batch(&self, records: &[NewFileRecord]) -> Result<Vec<FileRecord>, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(database_down());
        }

        let keep = if self.short_insert.load(Ordering::SeqCst) {
            records.len().saturating_sub(1)
        } else {
            records.len()
        };

        Ok(records[..keep].iter().map(|r| self.persist(r)).collect())
    }

    async fn remove_by_public_ids(
        &self,
        public_ids: &[String],
    ) -> Result<Vec<FileRecord>, AppError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(database_down());
        }

        let mut tables = self.tables.lock().unwrap();
        let (removed, kept): (Vec<_>, Vec<_>) = tables
            .files
            .drain(..)
            .partition(|f| public_ids.contains(&f.public_id));
        tables.files = kept;
        Ok(removed)
    }

    async fn count_for_owner(&self, owner_id: i32) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.files.iter().filter(|f| f.owner_id == owner_id).count() as i64)
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<FileRecord>, AppError> {
        Ok(self.file(public_id))
    }

    async fn find_by_public_ids(
        &self,
        public_ids: &[String],
    ) -> Result<Vec<FileRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .files
            .iter()
            .filter(|f| public_ids.contains(&f.public_id))
            .cloned()
            .collect())
    }

    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<FileRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut files: Vec<FileRecord> = tables
            .files
            .iter()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.date_added.cmp(&a.date_added).then(b.id.cmp(&a.id)));
        Ok(files)
    }

    async fn list_for_album(&self, album_id: i32) -> Result<Vec<FileRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .files
            .iter()
            .filter(|f| f.album_id == Some(album_id))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(database_down());
        }
        Ok(())
    }
}

#[async_trait]
impl AlbumStore for InMemoryDb {
    async fn find_by_id(&self, id: i32) -> Result<Option<Album>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.albums.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, owner_id: i32, name: &str, is_public: bool) -> Result<Album, AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_album_id += 1;
        let album = Album {
            id: tables.next_album_id,
            is_public,
            name: name.to_string(),
            date_added: Utc::now(),
            owner_id,
        };
        tables.albums.push(album.clone());
        Ok(album)
    }

    async fn count_for_owner(&self, owner_id: i32) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.albums.iter().filter(|a| a.owner_id == owner_id).count() as i64)
    }

    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Album>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .albums
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        for file in tables.files.iter_mut().filter(|f| f.album_id == Some(id)) {
            file.album_id = None;
        }
        let before = tables.albums.len();
        tables.albums.retain(|a| a.id != id);
        Ok(tables.albums.len() < before)
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryDb {
    async fn find_user_id(&self, key_hash: &str) -> Result<Option<i32>, AppError> {
        Ok(self.tables.lock().unwrap().api_keys.get(key_hash).copied())
    }
}
