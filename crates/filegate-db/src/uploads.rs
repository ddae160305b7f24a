use chrono::Utc;
use filegate_core::models::{
    SortDir, Upload, UploadFilter, UploadStatus, INVALIDATION_IN_PROGRESS,
};
use filegate_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for upload records.
#[derive(Clone)]
pub struct UploadRepository {
    pool: PgPool,
}

/// Sort columns exposed to callers. Anything else falls back to
/// submission time, which also guards the ORDER BY against injection.
fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("file_name") => "file_name",
        Some("file_size") => "file_size",
        Some("status") => "status",
        Some("reviewed_at") => "reviewed_at",
        _ => "uploaded_at",
    }
}

impl UploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, upload), fields(db.table = "uploads", db.operation = "insert"))]
    pub async fn create(&self, upload: &Upload) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO uploads (
                id, file_name, file_size, content_type, checksum,
                uploaded_by, uploaded_at, status, temp_key, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(upload.id)
        .bind(&upload.file_name)
        .bind(upload.file_size)
        .bind(&upload.content_type)
        .bind(&upload.checksum)
        .bind(&upload.uploaded_by)
        .bind(upload.uploaded_at)
        .bind(upload.status)
        .bind(&upload.temp_key)
        .bind(upload.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        let upload: Option<Upload> =
            sqlx::query_as::<Postgres, Upload>("SELECT * FROM uploads WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(upload)
    }

    /// Transition a pending upload to approved.
    ///
    /// The `status = 'pending'` guard makes the transition conditional:
    /// returns false when the record was not pending anymore, so a lost
    /// race surfaces as `InvalidState` instead of a silent double write.
    /// The temp key is cleared here; the staging copy must never be
    /// referenced after a terminal transition.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "update"))]
    pub async fn update_approved(
        &self,
        id: Uuid,
        reviewed_by: &str,
        destination_key: &str,
        backup_key: Option<&str>,
        invalidation_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let invalidation_status = invalidation_id.map(|_| INVALIDATION_IN_PROGRESS);

        let result = sqlx::query(
            r#"
            UPDATE uploads
            SET status = $2,
                reviewed_by = $3,
                reviewed_at = $4,
                destination_key = $5,
                backup_key = $6,
                invalidation_id = $7,
                invalidation_status = $8,
                temp_key = NULL,
                expires_at = NULL
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(UploadStatus::Approved)
        .bind(reviewed_by)
        .bind(Utc::now())
        .bind(destination_key)
        .bind(backup_key)
        .bind(invalidation_id)
        .bind(invalidation_status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition a pending upload to rejected; conditional like
    /// `update_approved`.
    #[tracing::instrument(skip(self, reason), fields(db.table = "uploads", db.operation = "update"))]
    pub async fn update_rejected(
        &self,
        id: Uuid,
        reviewed_by: &str,
        reason: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE uploads
            SET status = $2,
                reviewed_by = $3,
                reviewed_at = $4,
                rejection_reason = $5,
                temp_key = NULL,
                expires_at = NULL
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(UploadStatus::Rejected)
        .bind(reviewed_by)
        .bind(Utc::now())
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_invalidation_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE uploads SET invalidation_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List uploads with optional status filter, sorting, and pagination.
    /// Returns the page of records plus the total matching count.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select"))]
    pub async fn list(&self, filter: &UploadFilter) -> Result<(Vec<Upload>, i64), AppError> {
        let column = sort_column(filter.sort_by.as_deref());
        let direction = match filter.sort_dir {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        };
        let offset = (filter.page - 1) * filter.page_size;

        let (total, uploads) = if let Some(status) = filter.status {
            let total: (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM uploads WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?;

            let uploads: Vec<Upload> = sqlx::query_as::<Postgres, Upload>(&format!(
                "SELECT * FROM uploads WHERE status = $1 ORDER BY {} {} LIMIT $2 OFFSET $3",
                column, direction
            ))
            .bind(status)
            .bind(filter.page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            (total.0, uploads)
        } else {
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM uploads")
                .fetch_one(&self.pool)
                .await?;

            let uploads: Vec<Upload> = sqlx::query_as::<Postgres, Upload>(&format!(
                "SELECT * FROM uploads ORDER BY {} {} LIMIT $1 OFFSET $2",
                column, direction
            ))
            .bind(filter.page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            (total.0, uploads)
        };

        Ok((uploads, total))
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
