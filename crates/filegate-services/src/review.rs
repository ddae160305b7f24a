//! The review orchestrator: the upload lifecycle state machine and its
//! side-effect sequencing.
//!
//! Every operation runs in the caller's task; the orchestrator holds no
//! mutable state of its own, so concurrent reviews of the same upload
//! are arbitrated solely by the record store's conditional updates.
//!
//! The approval sequence distinguishes three failure classes:
//! fatal before the destination write (`Dependency`, nothing published),
//! fatal after it (`PartialCompletion`, the object stays published and
//! the record stays pending for a retry), and best-effort steps (temp
//! cleanup, secondary purge, audit, notify) that never fail the caller.

use chrono::Utc;
use filegate_core::config::CdnConfig;
use filegate_core::models::{
    AuditAction, AuditLog, AuditLogFilter, ApprovalResult, BackupMetadata, ListAuditLogsResponse,
    ListUploadsResponse, Upload, UploadFilter, UploadResponse, UploadStatus,
    INVALIDATION_COMPLETED, INVALIDATION_IN_PROGRESS,
};
use filegate_core::validation::FileValidator;
use filegate_core::{content_checksum, AppError};
use filegate_storage::{CachePurger, CdnInvalidator, DurableStore, TempStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::notify::Notifier;
use crate::traits::{AuditSink, BackupStore, UploadStore};

/// External collaborators wired into the orchestrator at startup.
pub struct ReviewDeps {
    pub uploads: Arc<dyn UploadStore>,
    pub backups: Arc<dyn BackupStore>,
    pub audit: Arc<dyn AuditSink>,
    pub destination: Arc<dyn DurableStore>,
    pub temp: Arc<dyn TempStore>,
    pub invalidator: Option<Arc<dyn CdnInvalidator>>,
    pub purger: Option<Arc<dyn CachePurger>>,
    pub notifier: Arc<dyn Notifier>,
}

/// Orchestrates the upload review lifecycle.
pub struct ReviewService {
    deps: ReviewDeps,
    validator: Option<FileValidator>,
    cdn: CdnConfig,
    max_upload_size: i64,
    temp_ttl: Duration,
}

impl ReviewService {
    pub fn new(
        deps: ReviewDeps,
        validator: Option<FileValidator>,
        cdn: CdnConfig,
        max_upload_size: i64,
        temp_ttl: Duration,
    ) -> Self {
        ReviewService {
            deps,
            validator,
            cdn,
            max_upload_size,
            temp_ttl,
        }
    }

    /// Accept a file into staging and create a `pending` record.
    ///
    /// The temp write happens before the record insert; if the insert
    /// fails the orphaned staging entry simply expires on its own.
    #[tracing::instrument(skip(self, data), fields(file_name = %file_name, actor = %actor, size = data.len()))]
    pub async fn submit(
        &self,
        actor: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadResponse, AppError> {
        if file_name.is_empty() {
            return Err(AppError::InvalidInput("file name is required".to_string()));
        }
        if file_name.contains('/') || file_name.contains("..") {
            return Err(AppError::InvalidInput(
                "file name must not contain path separators".to_string(),
            ));
        }
        if data.len() as i64 > self.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "file size {} exceeds the {} byte limit",
                data.len(),
                self.max_upload_size
            )));
        }

        if let Some(validator) = &self.validator {
            let result = validator.validate(file_name, &data);
            if !result.valid {
                self.deps
                    .notifier
                    .operation_failed("validation", file_name, &result.error_message())
                    .await;
                return Err(AppError::Validation(result.error_message()));
            }
        }

        let id = Uuid::new_v4();
        let checksum = content_checksum(&data);
        let file_size = data.len() as i64;
        let temp_key = format!("temp/{}/{}", id, file_name);

        self.deps
            .temp
            .store(&temp_key, data)
            .await
            .map_err(|e| AppError::dependency("staging_write", e))?;
        if let Err(e) = self.deps.temp.set_ttl(&temp_key, self.temp_ttl).await {
            tracing::warn!(error = %e, temp_key = %temp_key, "Failed to set staging TTL");
        }

        // Existence hint for the reviewer; a probe failure degrades to
        // "unknown" rather than blocking the submission.
        let exists_in_destination = match self.deps.destination.exists(file_name).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(error = %e, file_name = %file_name, "Destination existence probe failed");
                false
            }
        };

        let upload = Upload {
            id,
            file_name: file_name.to_string(),
            file_size,
            content_type: content_type.to_string(),
            checksum: checksum.clone(),
            uploaded_by: actor.to_string(),
            uploaded_at: Utc::now(),
            status: UploadStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            destination_key: None,
            backup_key: None,
            invalidation_id: None,
            invalidation_status: None,
            rejection_reason: None,
            temp_key: Some(temp_key),
            expires_at: Some(Utc::now() + chrono::Duration::from_std(self.temp_ttl).unwrap_or(chrono::Duration::hours(24))),
        };
        self.deps.uploads.create(&upload).await?;

        let mut details = HashMap::new();
        details.insert("file_size".to_string(), file_size.to_string());
        details.insert("content_type".to_string(), content_type.to_string());
        details.insert("checksum".to_string(), checksum.clone());
        details.insert(
            "exists_in_destination".to_string(),
            exists_in_destination.to_string(),
        );
        self.append_audit(AuditLog::success(id, AuditAction::Upload, actor, details))
            .await;

        self.deps
            .notifier
            .upload_received(&upload, exists_in_destination)
            .await;

        tracing::info!(upload_id = %id, file_name = %file_name, "Upload accepted into staging");

        Ok(UploadResponse {
            id,
            file_name: file_name.to_string(),
            status: UploadStatus::Pending,
            exists_in_destination,
            checksum,
            message: "upload pending review".to_string(),
        })
    }

    /// Approve a pending upload: promote the staged bytes to the durable
    /// store (backing up any object already at the destination key),
    /// invalidate edge caches, then commit the record transition.
    #[tracing::instrument(skip(self), fields(upload_id = %upload_id, reviewer = %reviewer))]
    pub async fn approve(
        &self,
        upload_id: Uuid,
        reviewer: &str,
    ) -> Result<ApprovalResult, AppError> {
        let upload = self.get_upload(upload_id).await?;
        if upload.status != UploadStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "only pending uploads can be approved (current status: {})",
                upload.status
            )));
        }

        let temp_key = upload.temp_key.clone().unwrap_or_default();
        let data = match self.deps.temp.get(&temp_key).await {
            Ok(data) => data,
            Err(e) => {
                let message = format!("staging copy unavailable: {}", e);
                self.append_audit(AuditLog::failure(
                    upload_id,
                    AuditAction::Approve,
                    reviewer,
                    &message,
                ))
                .await;
                self.deps
                    .notifier
                    .operation_failed("staging_read", &upload.file_name, &message)
                    .await;
                return Err(AppError::dependency("staging_read", message));
            }
        };

        // Backup-before-overwrite: the destination object, if any, is
        // copied aside before it can be replaced. An existence probe
        // failure is fatal here; overwriting without a backup is worse
        // than failing the approval.
        let destination_key = upload.file_name.clone();
        let exists = self
            .deps
            .destination
            .exists(&destination_key)
            .await
            .map_err(|e| AppError::dependency("destination_check", e))?;

        let backup_key = if exists {
            let backup_key =
                filegate_storage::backup_key(&upload.file_name, Utc::now().timestamp());
            if let Err(e) = self
                .deps
                .destination
                .copy(&destination_key, &backup_key)
                .await
            {
                self.deps
                    .notifier
                    .operation_failed("backup_copy", &upload.file_name, &e.to_string())
                    .await;
                return Err(AppError::dependency("backup_copy", e));
            }
            self.deps
                .backups
                .save(&BackupMetadata::new(
                    upload_id,
                    destination_key.clone(),
                    backup_key.clone(),
                    upload.file_size,
                ))
                .await?;
            tracing::info!(upload_id = %upload_id, backup_key = %backup_key, "Backed up existing destination object");
            Some(backup_key)
        } else {
            None
        };

        if let Err(e) = self.deps.destination.put(&destination_key, data).await {
            self.deps
                .notifier
                .operation_failed("destination_write", &upload.file_name, &e.to_string())
                .await;
            return Err(AppError::dependency("destination_write", e));
        }

        // The object is published from this point on. A failed
        // invalidation leaves the record pending so the approval can be
        // retried, but nothing is rolled back.
        let invalidation_id = match (&self.deps.invalidator, &self.cdn.distribution_id) {
            (Some(invalidator), Some(distribution_id)) => {
                let path = self.cdn.invalidation_path(&upload.file_name);
                match invalidator.invalidate(distribution_id, &[path]).await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        self.deps
                            .notifier
                            .operation_failed(
                                "cache_invalidation",
                                &upload.file_name,
                                &e.to_string(),
                            )
                            .await;
                        return Err(AppError::partial_completion("cache_invalidation", e));
                    }
                }
            }
            _ => None,
        };

        // Secondary zone purge never blocks the approval.
        let purge_ready = match &self.deps.purger {
            Some(purger) => {
                let path = self.cdn.purge_path(&upload.file_name);
                match purger.purge(&path).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, upload_id = %upload_id, "Secondary cache purge failed");
                        self.deps
                            .notifier
                            .operation_failed("cache_purge", &upload.file_name, &e.to_string())
                            .await;
                        false
                    }
                }
            }
            None => true,
        };

        let updated = self
            .deps
            .uploads
            .update_approved(
                upload_id,
                reviewer,
                &destination_key,
                backup_key.as_deref(),
                invalidation_id.as_deref(),
            )
            .await?;
        if !updated {
            // Lost the review race after publishing. The destination
            // write is idempotent, so the object matches whichever
            // review committed first only if contents agree; surface
            // the conflict instead of pretending this review won.
            return Err(AppError::InvalidState(
                "upload was reviewed concurrently; this approval did not commit".to_string(),
            ));
        }

        if let Err(e) = self.deps.temp.delete(&temp_key).await {
            tracing::debug!(error = %e, temp_key = %temp_key, "Failed to delete staging copy, it will expire");
        }

        let mut details = HashMap::new();
        details.insert("destination_key".to_string(), destination_key.clone());
        if let Some(backup_key) = &backup_key {
            details.insert("backup_key".to_string(), backup_key.clone());
        }
        if let Some(invalidation_id) = &invalidation_id {
            details.insert("invalidation_id".to_string(), invalidation_id.clone());
        }
        details.insert("purge_ready".to_string(), purge_ready.to_string());
        self.append_audit(AuditLog::success(
            upload_id,
            AuditAction::Approve,
            reviewer,
            details,
        ))
        .await;

        let result = ApprovalResult {
            destination_key,
            backup_key,
            invalidation_id,
            purge_ready,
        };
        self.deps
            .notifier
            .upload_approved(&upload, reviewer, &result)
            .await;

        tracing::info!(
            upload_id = %upload_id,
            destination_key = %result.destination_key,
            backed_up = result.backup_key.is_some(),
            "Upload approved and published"
        );

        Ok(result)
    }

    /// Reject a pending upload with a non-empty reason.
    #[tracing::instrument(skip(self, reason), fields(upload_id = %upload_id, reviewer = %reviewer))]
    pub async fn reject(
        &self,
        upload_id: Uuid,
        reviewer: &str,
        reason: &str,
    ) -> Result<(), AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "a rejection reason is required".to_string(),
            ));
        }

        let upload = self.get_upload(upload_id).await?;
        if upload.status != UploadStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "only pending uploads can be rejected (current status: {})",
                upload.status
            )));
        }

        let updated = self
            .deps
            .uploads
            .update_rejected(upload_id, reviewer, reason)
            .await?;
        if !updated {
            return Err(AppError::InvalidState(
                "upload was reviewed concurrently; this rejection did not commit".to_string(),
            ));
        }

        if let Some(temp_key) = &upload.temp_key {
            if let Err(e) = self.deps.temp.delete(temp_key).await {
                tracing::debug!(error = %e, temp_key = %temp_key, "Failed to delete staging copy, it will expire");
            }
        }

        let mut details = HashMap::new();
        details.insert("reason".to_string(), reason.to_string());
        self.append_audit(AuditLog::success(
            upload_id,
            AuditAction::Reject,
            reviewer,
            details,
        ))
        .await;

        self.deps
            .notifier
            .upload_rejected(&upload, reviewer, reason)
            .await;

        tracing::info!(upload_id = %upload_id, "Upload rejected");

        Ok(())
    }

    /// Fetch an upload, lazily refreshing an in-progress CDN
    /// invalidation and persisting the completed status.
    #[tracing::instrument(skip(self), fields(upload_id = %upload_id))]
    pub async fn get_status(&self, upload_id: Uuid) -> Result<Upload, AppError> {
        let mut upload = self.get_upload(upload_id).await?;

        if let (Some(invalidator), Some(distribution_id), Some(invalidation_id)) = (
            &self.deps.invalidator,
            &self.cdn.distribution_id,
            upload.invalidation_id.clone(),
        ) {
            if upload.invalidation_status.as_deref() == Some(INVALIDATION_IN_PROGRESS) {
                match invalidator
                    .invalidation_status(distribution_id, &invalidation_id)
                    .await
                {
                    Ok(status) => {
                        if status == INVALIDATION_COMPLETED {
                            self.deps
                                .uploads
                                .update_invalidation_status(upload_id, INVALIDATION_COMPLETED)
                                .await?;
                        }
                        upload.invalidation_status = Some(status);
                    }
                    Err(e) => {
                        // Status refresh is advisory; keep the stored value.
                        tracing::warn!(error = %e, upload_id = %upload_id, "Invalidation status refresh failed");
                    }
                }
            }
        }

        Ok(upload)
    }

    /// Manually purge the secondary cache for an approved upload.
    #[tracing::instrument(skip(self), fields(upload_id = %upload_id, actor = %actor))]
    pub async fn purge_cache(&self, upload_id: Uuid, actor: &str) -> Result<(), AppError> {
        let upload = self.get_upload(upload_id).await?;
        if upload.status != UploadStatus::Approved {
            return Err(AppError::InvalidState(format!(
                "only approved uploads can have their cache purged (current status: {})",
                upload.status
            )));
        }

        let purger = self.deps.purger.as_ref().ok_or_else(|| {
            AppError::InvalidState("no cache purge backend is configured".to_string())
        })?;

        let path = self.cdn.purge_path(&upload.file_name);
        if let Err(e) = purger.purge(&path).await {
            self.append_audit(AuditLog::failure(
                upload_id,
                AuditAction::PurgeCache,
                actor,
                e.to_string(),
            ))
            .await;
            self.deps
                .notifier
                .operation_failed("cache_purge", &upload.file_name, &e.to_string())
                .await;
            return Err(AppError::dependency("cache_purge", e));
        }

        let mut details = HashMap::new();
        details.insert("path".to_string(), path);
        self.append_audit(AuditLog::success(
            upload_id,
            AuditAction::PurgeCache,
            actor,
            details,
        ))
        .await;

        Ok(())
    }

    pub async fn list_uploads(
        &self,
        filter: UploadFilter,
    ) -> Result<ListUploadsResponse, AppError> {
        let filter = filter.normalized();
        let (uploads, total) = self.deps.uploads.list(&filter).await?;

        Ok(ListUploadsResponse {
            uploads,
            total,
            page: filter.page,
            page_size: filter.page_size,
            total_pages: filegate_core::models::total_pages(total, filter.page_size),
        })
    }

    pub async fn list_audit_logs(
        &self,
        filter: AuditLogFilter,
    ) -> Result<ListAuditLogsResponse, AppError> {
        let filter = filter.normalized();
        let (logs, total) = self.deps.audit.list(&filter).await?;

        Ok(ListAuditLogsResponse {
            logs,
            total,
            page: filter.page,
            page_size: filter.page_size,
            total_pages: filegate_core::models::total_pages(total, filter.page_size),
        })
    }

    pub async fn record_store_healthy(&self) -> Result<(), AppError> {
        self.deps.uploads.health_check().await
    }

    async fn get_upload(&self, upload_id: Uuid) -> Result<Upload, AppError> {
        self.deps
            .uploads
            .get(upload_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("upload {} not found", upload_id)))
    }

    /// The audit trail is written best-effort: a failed append is an
    /// operational problem to alert on, never a reason to fail the
    /// user-visible operation it records.
    async fn append_audit(&self, entry: AuditLog) {
        if let Err(e) = self.deps.audit.append(&entry).await {
            tracing::error!(error = %e, upload_id = %entry.upload_id, action = %entry.action, "Failed to append audit entry");
        }
    }
}
