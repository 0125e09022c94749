//! Test helpers: build the upload coordinator and the router on top of
//! in-memory stores and a temporary content root.
//!
//! Run from workspace root: `cargo test -p argonaut-api`. No database is
//! needed; record stores are faked in [`memory`].

#![allow(dead_code)]

pub mod memory;
pub mod storage;

use argonaut_api::setup::routes::setup_routes;
use argonaut_api::{AppState, UploadCoordinator, UploadPart};
use argonaut_core::config::parse_extension_list;
use argonaut_core::constants::DEFAULT_BLOCKED_EXTENSIONS;
use argonaut_core::models::FileResponse;
use argonaut_core::{BaseConfig, Config, UploadLimits};
use axum_test::TestServer;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::io::StreamReader;

use memory::InMemoryDb;
use storage::FaultyStorage;

pub const OWNER_ID: i32 = 1;
pub const OWNER_KEY: &str = "owner-test-key";
pub const OTHER_ID: i32 = 2;
pub const OTHER_KEY: &str = "other-test-key";

pub const MAX_FILE_SIZE: u64 = 1024;
pub const MAX_FILES: usize = 3;

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        base: BaseConfig {
            server_port: 5000,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 5,
            environment: "test".to_string(),
        },
        database_url: "postgres://localhost/argonaut_test".to_string(),
        content_root: dir.path().to_path_buf(),
        public_base_url: "http://files.test".to_string(),
        upload: UploadLimits {
            max_file_size_bytes: MAX_FILE_SIZE,
            max_files_per_request: MAX_FILES,
            blocked_extensions: parse_extension_list(DEFAULT_BLOCKED_EXTENSIONS),
            max_files_per_account: 0,
        },
        max_albums_per_account: 0,
    }
}

/// Stores, coordinator and router sharing one temporary content root.
pub struct TestContext {
    pub db: Arc<InMemoryDb>,
    pub storage: Arc<FaultyStorage>,
    pub state: Arc<AppState>,
    pub config: Config,
    _dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut config = test_config(&dir);
        adjust(&mut config);

        let db = Arc::new(InMemoryDb::new());
        db.add_api_key(OWNER_KEY, OWNER_ID);
        db.add_api_key(OTHER_KEY, OTHER_ID);

        let storage = Arc::new(FaultyStorage::new(dir.path()).await);

        let state = Arc::new(AppState::new(
            config.clone(),
            db.clone(),
            db.clone(),
            db.clone(),
            storage.clone(),
        ));

        Self {
            db,
            storage,
            state,
            config,
            _dir: dir,
        }
    }

    pub fn coordinator(&self) -> &UploadCoordinator {
        &self.state.uploads
    }

    pub fn server(&self) -> TestServer {
        let app = setup_routes(&self.config, self.state.clone());
        TestServer::new(app.into_make_service()).expect("Failed to create test server")
    }

    pub fn blob_exists(&self, file: &FileResponse) -> bool {
        self.storage
            .base_path()
            .join(format!("{}{}", file.public_id, file.file_extension))
            .exists()
    }

    pub fn blob_count(&self) -> usize {
        self.storage.blob_count()
    }
}

pub fn part(name: &str, data: &'static [u8]) -> UploadPart {
    UploadPart::from_bytes(name, "text/plain", Bytes::from_static(data))
}

pub fn sized_part(name: &str, len: usize) -> UploadPart {
    UploadPart::from_bytes(name, "application/octet-stream", Bytes::from(vec![b'x'; len]))
}

/// Part whose bytes arrive after `delay`. The flag is set once they have
/// been handed to the reader.
pub fn slow_part(
    name: &str,
    data: &'static [u8],
    delay: Duration,
) -> (UploadPart, Arc<AtomicBool>) {
    let delivered = Arc::new(AtomicBool::new(false));
    let flag = delivered.clone();
    let chunks = stream::once(async move {
        tokio::time::sleep(delay).await;
        flag.store(true, Ordering::SeqCst);
        Ok::<Bytes, io::Error>(Bytes::from_static(data))
    })
    .boxed();

    let part = UploadPart::from_reader(
        name,
        "text/plain",
        data.len() as u64,
        Box::new(StreamReader::new(chunks)),
    );
    (part, delivered)
}

/// Part whose body fails after yielding `data`
pub fn broken_part(name: &str, data: &'static [u8]) -> UploadPart {
    let chunks = stream::iter(vec![
        Ok(Bytes::from_static(data)),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
    ])
    .boxed();

    UploadPart::from_reader(
        name,
        "text/plain",
        (data.len() * 2) as u64,
        Box::new(StreamReader::new(chunks)),
    )
}

/// Poll `check` until it holds or roughly one second has passed.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
