use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, FileRow, NewFile};

/// Persistence for `files` rows
#[async_trait]
pub trait FileRepository: Send + Sync + 'static {
    async fn insert(&self, file: NewFile) -> Result<File>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>>;

    /// All files of an org, soft-deleted ones included
    async fn list_by_org(&self, org_id: &str) -> Result<Vec<File>>;

    async fn set_should_delete(&self, id: Uuid, should_delete: bool) -> Result<File>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn insert(&self, file: NewFile) -> Result<File> {
        let row = sqlx::query_as::<_, FileRow>(
            r#"
            INSERT INTO files (id, name, file_type, org_id, storage_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, file_type, org_id, storage_id, user_id, should_delete, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&file.name)
        .bind(file.file_type.as_str())
        .bind(&file.org_id)
        .bind(file.storage_id)
        .bind(file.user_id)
        .fetch_one(&self.pool)
        .await?;

        File::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>> {
        let row = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT id, name, file_type, org_id, storage_id, user_id, should_delete, created_at, updated_at
            FROM files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(File::try_from).transpose()
    }

    async fn list_by_org(&self, org_id: &str) -> Result<Vec<File>> {
        let rows = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT id, name, file_type, org_id, storage_id, user_id, should_delete, created_at, updated_at
            FROM files
            WHERE org_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list files for org {}: {:?}", org_id, e);
            AppError::Database(e)
        })?;

        rows.into_iter().map(File::try_from).collect()
    }

    async fn set_should_delete(&self, id: Uuid, should_delete: bool) -> Result<File> {
        let row = sqlx::query_as::<_, FileRow>(
            r#"
            UPDATE files
            SET should_delete = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, file_type, org_id, storage_id, user_id, should_delete, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(should_delete)
        .fetch_optional(&self.pool)
        .await?;

        row.map(File::try_from)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))
    }
}
