//! HTTP handlers.
//!
//! Handlers stay thin: extract and check the identity, enforce the
//! per-operation deadline, and delegate to the review orchestrator.

pub mod audit;
pub mod health;
pub mod uploads;

use filegate_core::AppError;
use std::future::Future;
use std::time::Duration;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Per-operation deadlines. Submission and approval move file content
/// around; everything else is record-store work.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);
pub const APPROVE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Check a named permission for the actor; `Forbidden` on denial.
pub(crate) async fn require_permission(
    state: &AppState,
    actor: &str,
    permission: &'static str,
) -> Result<(), HttpAppError> {
    if state.permissions.check(actor, permission).await? {
        Ok(())
    } else {
        Err(HttpAppError(AppError::Forbidden(format!(
            "permission '{}' required",
            permission
        ))))
    }
}

/// Run an operation under its deadline. A hit deadline abandons the
/// remaining steps; nothing already done is rolled back.
pub(crate) async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, HttpAppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            tracing::error!(operation, limit_secs = limit.as_secs(), "Operation deadline exceeded");
            Err(HttpAppError(AppError::Internal(format!(
                "{} timed out after {}s",
                operation,
                limit.as_secs()
            ))))
        }
    }
}
