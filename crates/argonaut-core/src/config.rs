//! Configuration module
//!
//! This module provides the configuration structures for the API: server and
//! database settings plus the upload limits handed to the upload coordinator.

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_BLOCKED_EXTENSIONS;
use crate::filename::is_safe_extension;

// Common constants
const DEFAULT_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_FILES_PER_REQUEST: usize = 20;

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Limits enforced on every upload batch before any byte is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size_bytes: u64,
    pub max_files_per_request: usize,
    /// Lowercased, dot-prefixed extensions (".exe")
    pub blocked_extensions: HashSet<String>,
    /// 0 = unlimited
    pub max_files_per_account: i64,
}

impl UploadLimits {
    /// Whether `extension` (dot-prefixed, as returned by
    /// [`crate::filename::file_extension`]) may not be stored.
    ///
    /// Extensions that could not be embedded verbatim in a storage path are
    /// treated as blocked.
    pub fn is_blocked(&self, extension: &str) -> bool {
        if !is_safe_extension(extension) {
            return true;
        }
        self.blocked_extensions
            .contains(&extension.to_ascii_lowercase())
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_files_per_request: MAX_FILES_PER_REQUEST,
            blocked_extensions: parse_extension_list(DEFAULT_BLOCKED_EXTENSIONS),
            max_files_per_account: 0,
        }
    }
}

/// Parse a comma separated extension list into the normalized form stored in
/// [`UploadLimits::blocked_extensions`]. Entries may omit the leading dot.
pub fn parse_extension_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty() && s != ".")
        .map(|s| {
            if s.starts_with('.') {
                s
            } else {
                format!(".{}", s)
            }
        })
        .collect()
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    /// Root folder; blobs live under `{content_root}/fileStorage`
    pub content_root: PathBuf,
    /// Prefix of every file URL handed to clients, without trailing slash
    pub public_base_url: String,
    pub upload: UploadLimits,
    /// 0 = unlimited
    pub max_albums_per_account: i64,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let upload = UploadLimits {
            max_file_size_bytes: env::var("MAX_FILE_SIZE_BYTES")
                .unwrap_or_else(|_| MAX_FILE_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_FILE_SIZE_BYTES),
            max_files_per_request: env::var("MAX_FILES_PER_REQUEST")
                .unwrap_or_else(|_| MAX_FILES_PER_REQUEST.to_string())
                .parse()
                .unwrap_or(MAX_FILES_PER_REQUEST),
            blocked_extensions: parse_extension_list(
                &env::var("BLOCKED_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_BLOCKED_EXTENSIONS.to_string()),
            ),
            max_files_per_account: env::var("MAX_FILES_PER_ACCOUNT")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            content_root: PathBuf::from(
                env::var("CONTENT_ROOT").unwrap_or_else(|_| "./content".to_string()),
            ),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port))
                .trim_end_matches('/')
                .to_string(),
            max_albums_per_account: env::var("MAX_ALBUMS_PER_ACCOUNT")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            base,
            upload,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.upload.max_files_per_request == 0 {
            return Err(anyhow::anyhow!("MAX_FILES_PER_REQUEST must be at least 1"));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_BYTES must be at least 1"));
        }

        if self.upload.max_files_per_account < 0 || self.max_albums_per_account < 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILES_PER_ACCOUNT and MAX_ALBUMS_PER_ACCOUNT must not be negative"
            ));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn content_root(&self) -> &PathBuf {
        &self.content_root
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn upload_limits(&self) -> &UploadLimits {
        &self.upload
    }

    pub fn max_albums_per_account(&self) -> i64 {
        self.max_albums_per_account
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            base: BaseConfig {
                server_port: 5000,
                cors_origins: vec!["*".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 30,
                environment: "development".to_string(),
            },
            database_url: "postgres://localhost/argonaut".to_string(),
            content_root: PathBuf::from("./content"),
            public_base_url: "http://localhost:5000".to_string(),
            upload: UploadLimits::default(),
            max_albums_per_account: 0,
        }
    }

    #[test]
    fn parses_extension_list_with_and_without_dots() {
        let set = parse_extension_list(" .EXE, bat ,,.");
        assert_eq!(set.len(), 2);
        assert!(set.contains(".exe"));
        assert!(set.contains(".bat"));
    }

    #[test]
    fn blocked_extension_check_is_case_insensitive() {
        let limits = UploadLimits::default();
        assert!(limits.is_blocked(".EXE"));
        assert!(limits.is_blocked(".Sh"));
        assert!(!limits.is_blocked(".png"));
        assert!(!limits.is_blocked(""));
    }

    #[test]
    fn unsafe_extensions_are_blocked() {
        let limits = UploadLimits::default();
        assert!(limits.is_blocked("./x"));
        assert!(limits.is_blocked(".p g"));
    }

    #[test]
    fn validate_rejects_non_postgres_url() {
        let mut config = sample_config();
        assert!(config.validate().is_ok());
        config.database_url = "mysql://localhost/db".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_request_limit() {
        let mut config = sample_config();
        config.upload.max_files_per_request = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_detection() {
        let mut config = sample_config();
        assert!(!config.is_production());
        config.base.environment = "Prod".to_string();
        assert!(config.is_production());
    }
}
