//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use filegate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Filegate API",
        version = "0.1.0",
        description = "File upload review service: submissions land in ephemeral staging, \
                       reviewers approve or reject them, and approved files are promoted to \
                       the durable store with backup-before-overwrite and edge-cache \
                       invalidation."
    ),
    paths(
        handlers::uploads::submit_upload,
        handlers::uploads::list_uploads,
        handlers::uploads::get_upload_status,
        handlers::uploads::approve_upload,
        handlers::uploads::reject_upload,
        handlers::uploads::purge_cache,
        handlers::audit::list_audit_logs,
        handlers::health::health_check,
    ),
    components(schemas(
        models::Upload,
        models::UploadStatus,
        models::UploadResponse,
        models::ApproveResponse,
        models::RejectRequest,
        models::RejectResponse,
        models::ListUploadsResponse,
        models::ListAuditLogsResponse,
        models::AuditLog,
        models::AuditAction,
        models::AuditOutcome,
        models::HealthCheckResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload submission and review"),
        (name = "audit", description = "Audit trail"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
