//! Application assembly: database, storage backends, orchestrator,
//! router, and server startup.

use anyhow::Result;
use axum::Router;
use filegate_core::validation::FileValidator;
use filegate_core::Config;
use filegate_db::{AuditRepository, BackupRepository, UploadRepository};
use filegate_services::{
    AllowAll, NoopNotifier, Notifier, ReviewDeps, ReviewService, SlackNotifier,
};
use filegate_storage::{
    CachePurger, CdnInvalidator, CloudFrontInvalidator, DurableStore, HttpCachePurger,
    InMemoryTempStore, S3Store, TempStore,
};
use std::sync::Arc;
use std::time::Duration;

use crate::routes;
use crate::state::AppState;

pub async fn initialize_app(config: Config) -> Result<(AppState, Router)> {
    let pool = filegate_db::connect(
        &config.database_url,
        config.db_max_connections,
        Duration::from_secs(config.db_timeout_seconds),
    )
    .await?;

    let uploads = Arc::new(UploadRepository::new(pool.clone()));
    let backups = Arc::new(BackupRepository::new(pool.clone()));
    let audit = Arc::new(AuditRepository::new(pool));

    let destination: Arc<dyn DurableStore> = Arc::new(S3Store::new(
        config.storage.bucket.clone(),
        config.storage.region.clone(),
        config.storage.prefix.clone(),
        config.storage.endpoint_url.clone(),
    )?);
    let temp: Arc<dyn TempStore> = Arc::new(InMemoryTempStore::new());

    let invalidator: Option<Arc<dyn CdnInvalidator>> = match &config.cdn.distribution_id {
        Some(distribution_id) => {
            tracing::info!(distribution_id = %distribution_id, "CDN invalidation enabled");
            Some(Arc::new(
                CloudFrontInvalidator::new(config.storage.region.clone()).await,
            ))
        }
        None => {
            tracing::info!("No CDN distribution configured, invalidation disabled");
            None
        }
    };

    let purger: Option<Arc<dyn CachePurger>> = if config.purge.is_configured() {
        let purge = &config.purge;
        Some(Arc::new(HttpCachePurger::new(
            purge.api_base_url.clone(),
            purge.zone_id.clone().unwrap_or_default(),
            purge.api_token.clone().unwrap_or_default(),
        )?))
    } else {
        tracing::info!("No purge backend configured, zone purge disabled");
        None
    };

    let notifier: Arc<dyn Notifier> = if config.slack.enabled {
        Arc::new(SlackNotifier::new(config.slack.clone()))
    } else {
        Arc::new(NoopNotifier)
    };

    let validator = config
        .validation
        .enabled
        .then(|| FileValidator::new(config.max_upload_size, &config.validation));

    let review = Arc::new(ReviewService::new(
        ReviewDeps {
            uploads,
            backups,
            audit,
            destination,
            temp: temp.clone(),
            invalidator,
            purger,
            notifier,
        },
        validator,
        config.cdn.clone(),
        config.max_upload_size,
        config.temp_ttl,
    ));

    let state = AppState {
        config: config.clone(),
        review,
        permissions: Arc::new(AllowAll),
        temp,
    };

    let router = routes::router(state.clone());
    Ok((state, router))
}

/// Start the server with graceful shutdown.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    tracing::info!(addr = %config.bind_addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!(
        max_upload_mb = config.max_upload_size / 1024 / 1024,
        temp_ttl_secs = config.temp_ttl.as_secs(),
        bucket = %config.storage.bucket,
        cdn_enabled = config.cdn.distribution_id.is_some(),
        purge_enabled = config.purge.is_configured(),
        slack_enabled = config.slack.enabled,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Listens for Ctrl+C (SIGINT) and SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
