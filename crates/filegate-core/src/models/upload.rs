use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// CDN invalidation status strings as reported by the invalidation service.
pub const INVALIDATION_IN_PROGRESS: &str = "InProgress";
pub const INVALIDATION_COMPLETED: &str = "Completed";

/// Lifecycle state of an upload.
///
/// The only permitted transitions are `pending -> approved` and
/// `pending -> rejected`. `Failed` is reserved for operator-driven
/// correction of records whose side effects could not complete
/// consistently; neither primary review action ever sets it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Approved,
    Rejected,
    Failed,
}

impl UploadStatus {
    /// Terminal states admit no further review action.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Pending)
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStatus::Pending => write!(f, "pending"),
            UploadStatus::Approved => write!(f, "approved"),
            UploadStatus::Rejected => write!(f, "rejected"),
            UploadStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for UploadStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(UploadStatus::Pending),
            "approved" => Ok(UploadStatus::Approved),
            "rejected" => Ok(UploadStatus::Rejected),
            "failed" => Ok(UploadStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid upload status: {}", s)),
        }
    }
}

/// An upload record, from submission through review.
///
/// `temp_key` references the ephemeral staging copy and is only
/// meaningful while the upload is `pending`; `destination_key` is set
/// exactly when the upload is `approved`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Upload {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub checksum: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of a successful approval, as returned by the orchestrator.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApprovalResult {
    pub destination_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation_id: Option<String>,
    /// Whether the secondary cache purge completed. Reporting only;
    /// a failed purge never blocks the approval.
    pub purge_ready: bool,
}

/// Response returned after submitting a file.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
    pub file_name: String,
    pub status: UploadStatus,
    pub exists_in_destination: bool,
    pub checksum: String,
    pub message: String,
}

/// Response returned after approving an upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApproveResponse {
    pub id: Uuid,
    pub status: UploadStatus,
    pub destination_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation_id: Option<String>,
    pub purge_ready: bool,
}

impl ApproveResponse {
    pub fn from_result(id: Uuid, result: ApprovalResult) -> Self {
        ApproveResponse {
            id,
            status: UploadStatus::Approved,
            destination_key: result.destination_key,
            backup_key: result.backup_key,
            invalidation_id: result.invalidation_id,
            purge_ready: result.purge_ready,
        }
    }
}

/// Request body for rejecting an upload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

/// Response returned after rejecting an upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct RejectResponse {
    pub status: UploadStatus,
    pub reason: String,
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

/// Filter and pagination parameters for listing uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadFilter {
    pub status: Option<UploadStatus>,
    pub page: i64,
    pub page_size: i64,
    pub sort_by: Option<String>,
    pub sort_dir: SortDir,
}

impl UploadFilter {
    pub const DEFAULT_PAGE_SIZE: i64 = 20;
    pub const MAX_PAGE_SIZE: i64 = 100;

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

/// Paginated list of uploads.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListUploadsResponse {
    pub uploads: Vec<Upload>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Response for the health check endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub dependencies: std::collections::HashMap<String, String>,
}
