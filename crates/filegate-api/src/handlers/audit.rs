//! Audit trail handlers.

use axum::extract::{Query, State};
use axum::Json;
use filegate_core::models::{AuditAction, AuditLogFilter, ListAuditLogsResponse};
use filegate_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{require_permission, with_deadline, DEFAULT_TIMEOUT};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAuditLogsQuery {
    pub upload_id: Option<Uuid>,
    pub action: Option<String>,
    pub actor: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
}

fn parse_action(raw: &str) -> Result<AuditAction, AppError> {
    match raw {
        "upload" => Ok(AuditAction::Upload),
        "approve" => Ok(AuditAction::Approve),
        "reject" => Ok(AuditAction::Reject),
        "purge_cache" => Ok(AuditAction::PurgeCache),
        _ => Err(AppError::InvalidInput(format!(
            "unknown audit action '{}'",
            raw
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/audit-logs",
    tag = "audit",
    params(
        ("upload_id" = Option<Uuid>, Query, description = "Filter by upload"),
        ("action" = Option<String>, Query, description = "Filter by action"),
        ("actor" = Option<String>, Query, description = "Filter by actor"),
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("page_size" = Option<i64>, Query, description = "Page size, capped at 200")
    ),
    responses(
        (status = 200, description = "Page of audit entries", body = ListAuditLogsResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    UserIdentity(actor): UserIdentity,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<ListAuditLogsResponse>, HttpAppError> {
    require_permission(&state, &actor, "read").await?;

    let action = match query.action.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_action(raw)?),
    };

    let filter = AuditLogFilter {
        upload_id: query.upload_id,
        action,
        actor: query.actor,
        page: query.page,
        page_size: query.page_size,
    };

    let response = with_deadline(
        DEFAULT_TIMEOUT,
        "list_audit_logs",
        state.review.list_audit_logs(filter),
    )
    .await?;

    Ok(Json(response))
}
