use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Upload,
    Approve,
    Reject,
    PurgeCache,
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuditAction::Upload => write!(f, "upload"),
            AuditAction::Approve => write!(f, "approve"),
            AuditAction::Reject => write!(f, "reject"),
            AuditAction::PurgeCache => write!(f, "purge_cache"),
        }
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Append-only audit trail entry. Never mutated after creation;
/// retention is a store-level concern, not the lifecycle's.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLog {
    pub id: Uuid,
    pub upload_id: Uuid,
    pub action: AuditAction,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: AuditOutcome,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AuditLog {
    pub fn success(
        upload_id: Uuid,
        action: AuditAction,
        actor: impl Into<String>,
        details: HashMap<String, String>,
    ) -> Self {
        AuditLog {
            id: Uuid::new_v4(),
            upload_id,
            action,
            actor: actor.into(),
            timestamp: Utc::now(),
            outcome: AuditOutcome::Success,
            details,
            error_message: None,
        }
    }

    pub fn failure(
        upload_id: Uuid,
        action: AuditAction,
        actor: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        AuditLog {
            id: Uuid::new_v4(),
            upload_id,
            action,
            actor: actor.into(),
            timestamp: Utc::now(),
            outcome: AuditOutcome::Failure,
            details: HashMap::new(),
            error_message: Some(error_message.into()),
        }
    }
}

/// Filter and pagination parameters for listing audit entries.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub upload_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub actor: Option<String>,
    pub page: i64,
    pub page_size: i64,
}

impl AuditLogFilter {
    pub const DEFAULT_PAGE_SIZE: i64 = 50;
    pub const MAX_PAGE_SIZE: i64 = 200;

    /// Clamp pagination to sane bounds; page is 1-based.
    pub fn normalized(mut self) -> Self {
        if self.page < 1 {
            self.page = 1;
        }
        if self.page_size < 1 {
            self.page_size = Self::DEFAULT_PAGE_SIZE;
        }
        if self.page_size > Self::MAX_PAGE_SIZE {
            self.page_size = Self::MAX_PAGE_SIZE;
        }
        self
    }
}

/// Paginated list of audit entries.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListAuditLogsResponse {
    pub logs: Vec<AuditLog>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}
