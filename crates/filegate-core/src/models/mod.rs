//! Domain models for the upload review lifecycle.

pub mod audit;
pub mod backup;
pub mod upload;

pub use audit::{AuditAction, AuditLog, AuditOutcome, AuditLogFilter, ListAuditLogsResponse};
pub use backup::BackupMetadata;
pub use upload::{
    ApprovalResult, ApproveResponse, HealthCheckResponse, ListUploadsResponse, RejectRequest,
    RejectResponse, SortDir, Upload, UploadFilter, UploadResponse, UploadStatus,
    INVALIDATION_COMPLETED, INVALIDATION_IN_PROGRESS,
};

/// Pagination arithmetic shared by the list endpoints:
/// `total_pages = ceil(total / page_size)`.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}
