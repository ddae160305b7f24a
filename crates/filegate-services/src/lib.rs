//! Business service layer for the filegate upload review service.
//!
//! Hosts the review orchestrator behind record-store, audit, and
//! notification contracts, plus the Slack webhook notifier. The API
//! crate depends on this facade; thin HTTP handling stays there.

pub mod notify;
pub mod review;
pub mod stores;
pub mod traits;

pub use notify::{format_bytes, NoopNotifier, Notifier, SlackNotifier};
pub use review::{ReviewDeps, ReviewService};
pub use traits::{AllowAll, AuditSink, BackupStore, PermissionChecker, UploadStore};
