use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a destination object copied aside before an approval
/// overwrote it. At most one per approval, created only when the
/// destination key already held an object.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BackupMetadata {
    pub id: Uuid,
    pub upload_id: Uuid,
    pub original_key: String,
    pub backup_key: String,
    pub size: i64,
    pub backed_up_at: DateTime<Utc>,
}

impl BackupMetadata {
    pub fn new(upload_id: Uuid, original_key: String, backup_key: String, size: i64) -> Self {
        BackupMetadata {
            id: Uuid::new_v4(),
            upload_id,
            original_key,
            backup_key,
            size,
            backed_up_at: Utc::now(),
        }
    }
}
