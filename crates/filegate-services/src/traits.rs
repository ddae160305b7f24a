//! Record-store and audit contracts consumed by the review orchestrator.
//!
//! The orchestrator never talks to Postgres directly; it goes through
//! these traits so tests can substitute in-memory fakes and so the
//! lifecycle logic stays independent of the persistence layer.

use async_trait::async_trait;
use filegate_core::models::{
    AuditLog, AuditLogFilter, BackupMetadata, Upload, UploadFilter,
};
use filegate_core::AppError;
use uuid::Uuid;

/// Persistence contract for upload records.
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn create(&self, upload: &Upload) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError>;

    /// Conditional transition to approved; returns false when the record
    /// was no longer pending.
    async fn update_approved(
        &self,
        id: Uuid,
        reviewed_by: &str,
        destination_key: &str,
        backup_key: Option<&str>,
        invalidation_id: Option<&str>,
    ) -> Result<bool, AppError>;

    /// Conditional transition to rejected; returns false when the record
    /// was no longer pending.
    async fn update_rejected(
        &self,
        id: Uuid,
        reviewed_by: &str,
        reason: &str,
    ) -> Result<bool, AppError>;

    async fn update_invalidation_status(&self, id: Uuid, status: &str) -> Result<(), AppError>;

    async fn list(&self, filter: &UploadFilter) -> Result<(Vec<Upload>, i64), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Persistence contract for backup metadata.
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn save(&self, backup: &BackupMetadata) -> Result<(), AppError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditLog) -> Result<(), AppError>;

    async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLog>, i64), AppError>;
}

/// Authorization decision point, invoked once per operation by the HTTP
/// layer with a named permission. The orchestrator itself never branches
/// on roles.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check(&self, actor: &str, permission: &str) -> Result<bool, AppError>;
}

/// Permission checker that admits every resolved identity. Used when no
/// authorization backend is configured.
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn check(&self, _actor: &str, _permission: &str) -> Result<bool, AppError> {
        Ok(true)
    }
}
