//! Shared application state, built once at startup.

use filegate_core::Config;
use filegate_services::{PermissionChecker, ReviewService};
use filegate_storage::TempStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub review: Arc<ReviewService>,
    pub permissions: Arc<dyn PermissionChecker>,
    /// Held separately from the orchestrator for the health probe.
    pub temp: Arc<dyn TempStore>,
}
