use argonaut_core::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

/// Resolves API key digests to the owning user
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// `key_hash` is the lowercase hex SHA-256 digest of the presented key.
    async fn find_user_id(&self, key_hash: &str) -> Result<Option<i32>, AppError>;
}

/// Postgres-backed [`ApiKeyStore`]
#[derive(Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PostgresApiKeyRepository {
    #[tracing::instrument(skip(self, key_hash), fields(db.table = "api_keys", db.operation = "select"))]
    async fn find_user_id(&self, key_hash: &str) -> Result<Option<i32>, AppError> {
        let user_id = sqlx::query_scalar::<Postgres, i32>(
            "SELECT user_id FROM api_keys WHERE key_hash = $1",
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }
}
