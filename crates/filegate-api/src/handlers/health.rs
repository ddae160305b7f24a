//! Health check handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use filegate_core::models::HealthCheckResponse;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use filegate_storage::{StorageResult, TempStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::HEALTH_TIMEOUT;
use crate::state::AppState;

/// Run an async check with a timeout; returns "healthy", "timeout", or
/// "unhealthy: {error}".
async fn run_check<F, E>(timeout: Duration, f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("unhealthy: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

/// Write-then-delete probe of the staging store. The key carries a fresh
/// UUID so concurrent probes cannot delete each other's objects.
async fn staging_probe(temp: Arc<dyn TempStore>) -> StorageResult<()> {
    let key = format!("health/probe/{}", Uuid::new_v4());
    temp.store(&key, b"ok".to_vec()).await?;
    temp.delete(&key).await
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies healthy", body = HealthCheckResponse),
        (status = 503, description = "A critical dependency is unhealthy", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut dependencies = HashMap::new();

    let database = run_check(HEALTH_TIMEOUT, state.review.record_store_healthy()).await;
    dependencies.insert("database".to_string(), database.clone());

    let temp_status = run_check(HEALTH_TIMEOUT, staging_probe(state.temp.clone())).await;
    dependencies.insert("temp_storage".to_string(), temp_status.clone());

    let overall_healthy = database == "healthy" && temp_status == "healthy";
    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthCheckResponse {
        status: if overall_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies,
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filegate_storage::InMemoryTempStore;

    #[tokio::test]
    async fn concurrent_staging_probes_do_not_interfere() {
        let temp: Arc<dyn TempStore> = Arc::new(InMemoryTempStore::new());
        let (a, b) = tokio::join!(staging_probe(temp.clone()), staging_probe(temp.clone()));
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn run_check_reports_errors_and_success() {
        let ok = run_check(Duration::from_secs(1), async { Ok::<(), String>(()) }).await;
        assert_eq!(ok, "healthy");

        let err = run_check(Duration::from_secs(1), async {
            Err::<(), String>("connection refused".to_string())
        })
        .await;
        assert_eq!(err, "unhealthy: connection refused");
    }
}
