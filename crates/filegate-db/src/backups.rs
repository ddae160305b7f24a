use filegate_core::models::BackupMetadata;
use filegate_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for backup metadata written before a destination
/// overwrite.
#[derive(Clone)]
pub struct BackupRepository {
    pool: PgPool,
}

impl BackupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, backup), fields(db.table = "backups", db.operation = "insert"))]
    pub async fn save(&self, backup: &BackupMetadata) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO backups (id, upload_id, original_key, backup_key, size, backed_up_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(backup.id)
        .bind(backup.upload_id)
        .bind(&backup.original_key)
        .bind(&backup.backup_key)
        .bind(backup.size)
        .bind(backup.backed_up_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_upload(&self, upload_id: Uuid) -> Result<Vec<BackupMetadata>, AppError> {
        let backups: Vec<BackupMetadata> = sqlx::query_as::<Postgres, BackupMetadata>(
            "SELECT * FROM backups WHERE upload_id = $1 ORDER BY backed_up_at DESC",
        )
        .bind(upload_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(backups)
    }
}
