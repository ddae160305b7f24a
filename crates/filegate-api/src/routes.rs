//! Route table.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{audit, health, uploads};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // Multipart framing overhead on top of the configured file cap.
    let body_limit = (state.config.max_upload_size as usize).saturating_add(1024 * 1024);

    Router::new()
        .route("/uploads", post(uploads::submit_upload).get(uploads::list_uploads))
        .route("/uploads/{id}", get(uploads::get_upload_status))
        .route("/uploads/{id}/approve", post(uploads::approve_upload))
        .route("/uploads/{id}/reject", post(uploads::reject_upload))
        .route("/uploads/{id}/purge-cache", post(uploads::purge_cache))
        .route("/audit-logs", get(audit::list_audit_logs))
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
