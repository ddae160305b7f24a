//! Postgres repositories for the upload review service.
//!
//! Repositories use runtime-checked `sqlx` queries so the crate builds
//! without a live database. Every state transition on the uploads table
//! is a conditional update: the `pending` check travels with the UPDATE
//! so concurrent reviews resolve at the storage layer rather than by
//! last-write-wins.

pub mod audit;
pub mod backups;
pub mod uploads;

pub use audit::AuditRepository;
pub use backups::BackupRepository;
pub use uploads::UploadRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connect a pool and apply migrations.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    timeout: Duration,
) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(timeout)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
