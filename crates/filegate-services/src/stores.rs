//! Postgres-backed implementations of the record-store contracts,
//! delegating to the `filegate-db` repositories.

use async_trait::async_trait;
use filegate_core::models::{
    AuditLog, AuditLogFilter, BackupMetadata, Upload, UploadFilter,
};
use filegate_core::AppError;
use filegate_db::{AuditRepository, BackupRepository, UploadRepository};
use uuid::Uuid;

use crate::traits::{AuditSink, BackupStore, UploadStore};

#[async_trait]
impl UploadStore for UploadRepository {
    async fn create(&self, upload: &Upload) -> Result<(), AppError> {
        UploadRepository::create(self, upload).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        UploadRepository::get(self, id).await
    }

    async fn update_approved(
        &self,
        id: Uuid,
        reviewed_by: &str,
        destination_key: &str,
        backup_key: Option<&str>,
        invalidation_id: Option<&str>,
    ) -> Result<bool, AppError> {
        UploadRepository::update_approved(
            self,
            id,
            reviewed_by,
            destination_key,
            backup_key,
            invalidation_id,
        )
        .await
    }

    async fn update_rejected(
        &self,
        id: Uuid,
        reviewed_by: &str,
        reason: &str,
    ) -> Result<bool, AppError> {
        UploadRepository::update_rejected(self, id, reviewed_by, reason).await
    }

    async fn update_invalidation_status(&self, id: Uuid, status: &str) -> Result<(), AppError> {
        UploadRepository::update_invalidation_status(self, id, status).await
    }

    async fn list(&self, filter: &UploadFilter) -> Result<(Vec<Upload>, i64), AppError> {
        UploadRepository::list(self, filter).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        UploadRepository::health_check(self).await
    }
}

#[async_trait]
impl BackupStore for BackupRepository {
    async fn save(&self, backup: &BackupMetadata) -> Result<(), AppError> {
        BackupRepository::save(self, backup).await
    }
}

#[async_trait]
impl AuditSink for AuditRepository {
    async fn append(&self, entry: &AuditLog) -> Result<(), AppError> {
        AuditRepository::append(self, entry).await
    }

    async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLog>, i64), AppError> {
        AuditRepository::list(self, filter).await
    }
}
