use argonaut_core::models::{FileRecord, NewFileRecord};
use argonaut_core::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::transaction::TransactionGuard;

/// Persistence of file metadata rows.
///
/// Batch operations are atomic: either every row in the batch is written
/// (or removed) or none is.
#[async_trait]
pub trait FileRecordStore: Send + Sync {
    /// Insert all records in a single transaction and return the persisted
    /// rows in input order.
    async fn insert_batch(&self, records: &[NewFileRecord]) -> Result<Vec<FileRecord>, AppError>;

    /// Delete every row whose `public_id` is listed, in a single transaction.
    /// Unknown ids are ignored. Returns the removed rows.
    async fn remove_by_public_ids(
        &self,
        public_ids: &[String],
    ) -> Result<Vec<FileRecord>, AppError>;

    async fn count_for_owner(&self, owner_id: i32) -> Result<i64, AppError>;

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<FileRecord>, AppError>;

    async fn find_by_public_ids(&self, public_ids: &[String])
        -> Result<Vec<FileRecord>, AppError>;

    /// Files owned by `owner_id`, newest first
    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<FileRecord>, AppError>;

    async fn list_for_album(&self, album_id: i32) -> Result<Vec<FileRecord>, AppError>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> Result<(), AppError>;
}

/// Postgres-backed [`FileRecordStore`]
#[derive(Clone)]
pub struct PostgresFileRepository {
    pool: PgPool,
}

impl PostgresFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRecordStore for PostgresFileRepository {
    #[tracing::instrument(skip(self, records), fields(db.table = "files", db.operation = "insert", batch_size = records.len()))]
    async fn insert_batch(&self, records: &[NewFileRecord]) -> Result<Vec<FileRecord>, AppError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        let mut saved = Vec::with_capacity(records.len());

        for record in records {
            let row = sqlx::query_as::<Postgres, FileRecord>(
                r#"
                INSERT INTO files (public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id
                "#,
            )
            .bind(&record.public_id)
            .bind(record.is_public)
            .bind(&record.file_extension)
            .bind(&record.content_type)
            .bind(&record.name)
            .bind(record.date_added)
            .bind(record.owner_id)
            .bind(record.album_id)
            .fetch_one(&mut **tx)
            .await?;

            saved.push(row);
        }

        tx.commit().await?;

        Ok(saved)
    }

    #[tracing::instrument(skip(self, public_ids), fields(db.table = "files", db.operation = "delete", batch_size = public_ids.len()))]
    async fn remove_by_public_ids(
        &self,
        public_ids: &[String],
    ) -> Result<Vec<FileRecord>, AppError> {
        if public_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let removed = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            DELETE FROM files
            WHERE public_id = ANY($1)
            RETURNING id, public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id
            "#,
        )
        .bind(public_ids)
        .fetch_all(&mut **tx)
        .await?;

        tx.commit().await?;

        Ok(removed)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "count"))]
    async fn count_for_owner(&self, owner_id: i32) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM files WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<FileRecord>, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            SELECT id, public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id
            FROM files
            WHERE public_id = $1
            "#,
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self, public_ids), fields(db.table = "files", db.operation = "select"))]
    async fn find_by_public_ids(
        &self,
        public_ids: &[String],
    ) -> Result<Vec<FileRecord>, AppError> {
        let files = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            SELECT id, public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id
            FROM files
            WHERE public_id = ANY($1)
            "#,
        )
        .bind(public_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<FileRecord>, AppError> {
        let files = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            SELECT id, public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id
            FROM files
            WHERE owner_id = $1
            ORDER BY date_added DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn list_for_album(&self, album_id: i32) -> Result<Vec<FileRecord>, AppError> {
        let files = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            SELECT id, public_id, is_public, file_extension, content_type, name, date_added, owner_id, album_id
            FROM files
            WHERE album_id = $1
            ORDER BY date_added DESC, id DESC
            "#,
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
