//! Storage backends for the upload review service.
//!
//! Four collaborator contracts live here, each consumed by the review
//! orchestrator through a trait object:
//!
//! - [`DurableStore`] - the published destination (S3 via `object_store`)
//! - [`TempStore`] - ephemeral staging with per-key expiry
//! - [`CdnInvalidator`] - asynchronous edge-cache invalidation (CloudFront)
//! - [`CachePurger`] - secondary zone-level cache purge over HTTP
//!
//! In-memory implementations of the two stores back local development
//! and the service-level tests.

pub mod cloudfront;
pub mod memory;
pub mod purge;
pub mod s3;
pub mod traits;

pub use cloudfront::CloudFrontInvalidator;
pub use memory::{InMemoryDurableStore, InMemoryTempStore};
pub use purge::HttpCachePurger;
pub use s3::S3Store;
pub use traits::{CachePurger, CdnInvalidator, DurableStore, StorageError, StorageResult, TempStore};

/// Backup key convention: `backup/<unix-timestamp>/<original-file-name>`.
///
/// The timestamp makes each approval's backup distinct; re-running an
/// approval produces a new backup rather than overwriting the previous one.
pub fn backup_key(file_name: &str, unix_ts: i64) -> String {
    format!("backup/{}/{}", unix_ts, file_name)
}
