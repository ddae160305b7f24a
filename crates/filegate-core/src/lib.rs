//! Core types for the filegate upload review service.
//!
//! This crate holds the pieces every other crate depends on: the
//! configuration loaded at startup, the unified `AppError` taxonomy,
//! the domain models (uploads, backups, audit entries), and the
//! content validation predicate applied before a file enters staging.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};

/// Compute the SHA-256 checksum of file content as lowercase hex.
///
/// Recorded at submission and used as an integrity fingerprint, not
/// a security boundary.
pub fn content_checksum(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
