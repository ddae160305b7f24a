//! Upload lifecycle handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use filegate_core::models::{
    ApproveResponse, ListUploadsResponse, RejectRequest, RejectResponse, SortDir, Upload,
    UploadFilter, UploadResponse, UploadStatus,
};
use filegate_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{
    require_permission, with_deadline, APPROVE_TIMEOUT, DEFAULT_TIMEOUT, SUBMIT_TIMEOUT,
};
use crate::state::AppState;

/// Multipart form field carrying the file content.
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/uploads",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload accepted into staging", body = UploadResponse),
        (status = 400, description = "Invalid or disallowed content", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
pub async fn submit_upload(
    State(state): State<AppState>,
    UserIdentity(actor): UserIdentity,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    require_permission(&state, &actor, "upload").await?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::InvalidInput("file part must carry a file name".to_string()))?;
        let content_type = field
            .content_type()
            .map(String::from)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("failed to read file content: {}", e)))?;
        file = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) = file.ok_or_else(|| {
        AppError::InvalidInput(format!("multipart field '{}' is required", FILE_FIELD))
    })?;

    let response = with_deadline(
        SUBMIT_TIMEOUT,
        "submit",
        state.review.submit(&actor, &file_name, &content_type, data),
    )
    .await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/uploads/{id}/approve",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Upload id")),
    responses(
        (status = 200, description = "Upload approved and published", body = ApproveResponse),
        (status = 404, description = "Unknown upload", body = ErrorResponse),
        (status = 409, description = "Upload is not pending", body = ErrorResponse),
        (status = 500, description = "Published but invalidation failed", body = ErrorResponse),
        (status = 502, description = "A collaborator failed before publication", body = ErrorResponse)
    )
)]
pub async fn approve_upload(
    State(state): State<AppState>,
    UserIdentity(reviewer): UserIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApproveResponse>, HttpAppError> {
    require_permission(&state, &reviewer, "approve").await?;

    let result = with_deadline(
        APPROVE_TIMEOUT,
        "approve",
        state.review.approve(id, &reviewer),
    )
    .await?;

    Ok(Json(ApproveResponse::from_result(id, result)))
}

#[utoipa::path(
    post,
    path = "/uploads/{id}/reject",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Upload id")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Upload rejected", body = RejectResponse),
        (status = 400, description = "Missing rejection reason", body = ErrorResponse),
        (status = 404, description = "Unknown upload", body = ErrorResponse),
        (status = 409, description = "Upload is not pending", body = ErrorResponse)
    )
)]
pub async fn reject_upload(
    State(state): State<AppState>,
    UserIdentity(reviewer): UserIdentity,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<RejectResponse>, HttpAppError> {
    require_permission(&state, &reviewer, "reject").await?;

    with_deadline(
        DEFAULT_TIMEOUT,
        "reject",
        state.review.reject(id, &reviewer, &request.reason),
    )
    .await?;

    Ok(Json(RejectResponse {
        status: UploadStatus::Rejected,
        reason: request.reason,
    }))
}

#[utoipa::path(
    get,
    path = "/uploads/{id}",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Upload id")),
    responses(
        (status = 200, description = "Upload record", body = Upload),
        (status = 404, description = "Unknown upload", body = ErrorResponse)
    )
)]
pub async fn get_upload_status(
    State(state): State<AppState>,
    UserIdentity(actor): UserIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Upload>, HttpAppError> {
    require_permission(&state, &actor, "read").await?;

    let upload = with_deadline(DEFAULT_TIMEOUT, "get_status", state.review.get_status(id)).await?;
    Ok(Json(upload))
}

#[utoipa::path(
    post,
    path = "/uploads/{id}/purge-cache",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Upload id")),
    responses(
        (status = 200, description = "Cache purged"),
        (status = 404, description = "Unknown upload", body = ErrorResponse),
        (status = 409, description = "Upload is not approved", body = ErrorResponse),
        (status = 502, description = "Purge backend failed", body = ErrorResponse)
    )
)]
pub async fn purge_cache(
    State(state): State<AppState>,
    UserIdentity(actor): UserIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    require_permission(&state, &actor, "purge").await?;

    with_deadline(
        DEFAULT_TIMEOUT,
        "purge_cache",
        state.review.purge_cache(id, &actor),
    )
    .await?;

    Ok(Json(serde_json::json!({
        "message": "cache purged successfully"
    })))
}

#[derive(Debug, Deserialize)]
pub struct ListUploadsQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDir>,
}

#[utoipa::path(
    get,
    path = "/uploads",
    tag = "uploads",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("page_size" = Option<i64>, Query, description = "Page size, capped at 100"),
        ("sort_by" = Option<String>, Query, description = "Sort column, default uploaded_at"),
        ("sort_dir" = Option<String>, Query, description = "asc or desc, default desc")
    ),
    responses(
        (status = 200, description = "Page of uploads", body = ListUploadsResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
pub async fn list_uploads(
    State(state): State<AppState>,
    UserIdentity(actor): UserIdentity,
    Query(query): Query<ListUploadsQuery>,
) -> Result<Json<ListUploadsResponse>, HttpAppError> {
    require_permission(&state, &actor, "read").await?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<UploadStatus>().map_err(|_| {
            AppError::InvalidInput(format!("unknown upload status '{}'", raw))
        })?),
    };

    let filter = UploadFilter {
        status,
        page: query.page,
        page_size: query.page_size,
        sort_by: query.sort_by,
        sort_dir: query.sort_dir.unwrap_or_default(),
    };

    let response = with_deadline(
        DEFAULT_TIMEOUT,
        "list_uploads",
        state.review.list_uploads(filter),
    )
    .await?;

    Ok(Json(response))
}
