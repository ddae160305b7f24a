//! Collaborator contracts consumed by the review orchestrator.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Invalidation error: {0}")]
    InvalidationError(String),

    #[error("Purge error: {0}")]
    PurgeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The durable, published destination for approved files.
///
/// Keys are logical file names; implementations apply any configured
/// bucket prefix internally.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Check whether an object exists at the given key.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Write an object, replacing any prior content at the key.
    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Copy an object to another key (used for backup-before-overwrite).
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Ephemeral staging store holding unreviewed file content.
///
/// Entries expire on their own; the lifecycle never depends on explicit
/// cleanup succeeding. `get` on a missing or expired key fails with
/// [`StorageError::NotFound`].
#[async_trait]
pub trait TempStore: Send + Sync {
    async fn store(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn set_ttl(&self, key: &str, ttl: Duration) -> StorageResult<()>;
}

/// Asynchronous edge-cache invalidation, tracked by id and polled for
/// completion.
#[async_trait]
pub trait CdnInvalidator: Send + Sync {
    /// Request invalidation of the given paths; returns the invalidation id.
    async fn invalidate(&self, distribution_id: &str, paths: &[String]) -> StorageResult<String>;

    /// Current status of an invalidation (`InProgress`, `Completed`, ...).
    async fn invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> StorageResult<String>;
}

/// Secondary zone-level cache purge. Best-effort from the orchestrator's
/// perspective during approval; independently retriable via the purge
/// operation.
#[async_trait]
pub trait CachePurger: Send + Sync {
    async fn purge(&self, path: &str) -> StorageResult<()>;
}
