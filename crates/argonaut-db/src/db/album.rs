use argonaut_core::models::Album;
use argonaut_core::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::transaction::TransactionGuard;

/// Album lookups and lifecycle
#[async_trait]
pub trait AlbumStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Album>, AppError>;

    async fn create(&self, owner_id: i32, name: &str, is_public: bool) -> Result<Album, AppError>;

    async fn count_for_owner(&self, owner_id: i32) -> Result<i64, AppError>;

    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Album>, AppError>;

    /// Detach the album's files (`album_id` becomes null) and delete the album.
    /// Returns `false` when no album with `id` existed.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

/// Postgres-backed [`AlbumStore`]
#[derive(Clone)]
pub struct PostgresAlbumRepository {
    pool: PgPool,
}

impl PostgresAlbumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumStore for PostgresAlbumRepository {
    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select", db.record_id = id))]
    async fn find_by_id(&self, id: i32) -> Result<Option<Album>, AppError> {
        let album = sqlx::query_as::<Postgres, Album>(
            "SELECT id, is_public, name, date_added, owner_id FROM albums WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(album)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "insert"))]
    async fn create(&self, owner_id: i32, name: &str, is_public: bool) -> Result<Album, AppError> {
        let album = sqlx::query_as::<Postgres, Album>(
            r#"
            INSERT INTO albums (is_public, name, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, is_public, name, date_added, owner_id
            "#,
        )
        .bind(is_public)
        .bind(name)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(album)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "count"))]
    async fn count_for_owner(&self, owner_id: i32) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM albums WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select"))]
    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Album>, AppError> {
        let albums = sqlx::query_as::<Postgres, Album>(
            r#"
            SELECT id, is_public, name, date_added, owner_id
            FROM albums
            WHERE owner_id = $1
            ORDER BY date_added DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "delete", db.record_id = id))]
    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query("UPDATE files SET album_id = NULL WHERE album_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
