//! Service-level tests for the review lifecycle, run against in-memory
//! stores and recording fakes for the side-effect collaborators.

use async_trait::async_trait;
use filegate_core::config::{CdnConfig, ValidationConfig};
use filegate_core::models::{
    AuditAction, AuditLog, AuditLogFilter, AuditOutcome, ApprovalResult, BackupMetadata, Upload,
    UploadFilter, UploadStatus, INVALIDATION_COMPLETED, INVALIDATION_IN_PROGRESS,
};
use filegate_core::validation::FileValidator;
use filegate_core::{content_checksum, AppError};
use filegate_services::notify::Notifier;
use filegate_services::review::{ReviewDeps, ReviewService};
use filegate_services::traits::{AuditSink, BackupStore, UploadStore};
use filegate_storage::{
    CachePurger, CdnInvalidator, InMemoryDurableStore, InMemoryTempStore, StorageError,
    StorageResult, TempStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const PDF_BYTES: &[u8] = b"%PDF-1.7 test document content";

// ---------------------------------------------------------------------
// Fakes

#[derive(Default)]
struct FakeUploadStore {
    uploads: Mutex<HashMap<Uuid, Upload>>,
}

#[async_trait]
impl UploadStore for FakeUploadStore {
    async fn create(&self, upload: &Upload) -> Result<(), AppError> {
        self.uploads
            .lock()
            .unwrap()
            .insert(upload.id, upload.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        Ok(self.uploads.lock().unwrap().get(&id).cloned())
    }

    async fn update_approved(
        &self,
        id: Uuid,
        reviewed_by: &str,
        destination_key: &str,
        backup_key: Option<&str>,
        invalidation_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut uploads = self.uploads.lock().unwrap();
        match uploads.get_mut(&id) {
            Some(upload) if upload.status == UploadStatus::Pending => {
                upload.status = UploadStatus::Approved;
                upload.reviewed_by = Some(reviewed_by.to_string());
                upload.reviewed_at = Some(chrono::Utc::now());
                upload.destination_key = Some(destination_key.to_string());
                upload.backup_key = backup_key.map(String::from);
                upload.invalidation_id = invalidation_id.map(String::from);
                upload.invalidation_status =
                    invalidation_id.map(|_| INVALIDATION_IN_PROGRESS.to_string());
                upload.temp_key = None;
                upload.expires_at = None;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn update_rejected(
        &self,
        id: Uuid,
        reviewed_by: &str,
        reason: &str,
    ) -> Result<bool, AppError> {
        let mut uploads = self.uploads.lock().unwrap();
        match uploads.get_mut(&id) {
            Some(upload) if upload.status == UploadStatus::Pending => {
                upload.status = UploadStatus::Rejected;
                upload.reviewed_by = Some(reviewed_by.to_string());
                upload.reviewed_at = Some(chrono::Utc::now());
                upload.rejection_reason = Some(reason.to_string());
                upload.temp_key = None;
                upload.expires_at = None;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn update_invalidation_status(&self, id: Uuid, status: &str) -> Result<(), AppError> {
        if let Some(upload) = self.uploads.lock().unwrap().get_mut(&id) {
            upload.invalidation_status = Some(status.to_string());
        }
        Ok(())
    }

    async fn list(&self, filter: &UploadFilter) -> Result<(Vec<Upload>, i64), AppError> {
        let uploads = self.uploads.lock().unwrap();
        let mut matching: Vec<Upload> = uploads
            .values()
            .filter(|u| filter.status.map(|s| u.status == s).unwrap_or(true))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        let total = matching.len() as i64;

        let start = ((filter.page - 1) * filter.page_size) as usize;
        let page: Vec<Upload> = matching
            .into_iter()
            .skip(start)
            .take(filter.page_size as usize)
            .collect();
        Ok((page, total))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeBackupStore {
    backups: Mutex<Vec<BackupMetadata>>,
}

#[async_trait]
impl BackupStore for FakeBackupStore {
    async fn save(&self, backup: &BackupMetadata) -> Result<(), AppError> {
        self.backups.lock().unwrap().push(backup.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeAuditSink {
    entries: Mutex<Vec<AuditLog>>,
}

impl FakeAuditSink {
    fn entries_for(&self, action: AuditAction) -> Vec<AuditLog> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for FakeAuditSink {
    async fn append(&self, entry: &AuditLog) -> Result<(), AppError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLog>, i64), AppError> {
        let entries = self.entries.lock().unwrap();
        let mut matching: Vec<AuditLog> = entries
            .iter()
            .filter(|e| filter.upload_id.map(|id| e.upload_id == id).unwrap_or(true))
            .filter(|e| filter.action.map(|a| e.action == a).unwrap_or(true))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total = matching.len() as i64;

        let start = ((filter.page - 1) * filter.page_size) as usize;
        let page: Vec<AuditLog> = matching
            .into_iter()
            .skip(start)
            .take(filter.page_size as usize)
            .collect();
        Ok((page, total))
    }
}

/// Records every event it receives.
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn upload_received(&self, upload: &Upload, exists: bool) {
        self.events
            .lock()
            .unwrap()
            .push(format!("upload:{}:{}", upload.file_name, exists));
    }

    async fn upload_approved(&self, upload: &Upload, reviewer: &str, _result: &ApprovalResult) {
        self.events
            .lock()
            .unwrap()
            .push(format!("approve:{}:{}", upload.file_name, reviewer));
    }

    async fn upload_rejected(&self, upload: &Upload, _reviewer: &str, reason: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("reject:{}:{}", upload.file_name, reason));
    }

    async fn operation_failed(&self, operation: &str, file_name: &str, _error: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("error:{}:{}", operation, file_name));
    }
}

/// CDN invalidator with a switchable failure mode and a status it
/// reports for every invalidation.
struct FakeInvalidator {
    fail: AtomicBool,
    status: Mutex<String>,
    calls: AtomicUsize,
}

impl FakeInvalidator {
    fn new() -> Self {
        FakeInvalidator {
            fail: AtomicBool::new(false),
            status: Mutex::new(INVALIDATION_IN_PROGRESS.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn set_status(&self, status: &str) {
        *self.status.lock().unwrap() = status.to_string();
    }
}

#[async_trait]
impl CdnInvalidator for FakeInvalidator {
    async fn invalidate(&self, _distribution_id: &str, paths: &[String]) -> StorageResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::InvalidationError("throttled".to_string()));
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("INV-{}-{}", n, paths.len()))
    }

    async fn invalidation_status(
        &self,
        _distribution_id: &str,
        _invalidation_id: &str,
    ) -> StorageResult<String> {
        Ok(self.status.lock().unwrap().clone())
    }
}

struct FakePurger {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakePurger {
    fn new() -> Self {
        FakePurger {
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CachePurger for FakePurger {
    async fn purge(&self, _path: &str) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::PurgeError("zone unavailable".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Harness

struct Harness {
    service: ReviewService,
    uploads: Arc<FakeUploadStore>,
    backups: Arc<FakeBackupStore>,
    audit: Arc<FakeAuditSink>,
    destination: Arc<InMemoryDurableStore>,
    temp: Arc<InMemoryTempStore>,
    invalidator: Arc<FakeInvalidator>,
    purger: Arc<FakePurger>,
    notifier: Arc<RecordingNotifier>,
}

fn harness() -> Harness {
    let uploads = Arc::new(FakeUploadStore::default());
    let backups = Arc::new(FakeBackupStore::default());
    let audit = Arc::new(FakeAuditSink::default());
    let destination = Arc::new(InMemoryDurableStore::new());
    let temp = Arc::new(InMemoryTempStore::new());
    let invalidator = Arc::new(FakeInvalidator::new());
    let purger = Arc::new(FakePurger::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let service = ReviewService::new(
        ReviewDeps {
            uploads: uploads.clone(),
            backups: backups.clone(),
            audit: audit.clone(),
            destination: destination.clone(),
            temp: temp.clone(),
            invalidator: Some(invalidator.clone()),
            purger: Some(purger.clone()),
            notifier: notifier.clone(),
        },
        Some(FileValidator::new(1024 * 1024, &ValidationConfig::default())),
        CdnConfig {
            distribution_id: Some("E1TESTDIST".to_string()),
            public_prefix: "/files".to_string(),
        },
        1024 * 1024,
        Duration::from_secs(3600),
    );

    Harness {
        service,
        uploads,
        backups,
        audit,
        destination,
        temp,
        invalidator,
        purger,
        notifier,
    }
}

async fn submit_pdf(h: &Harness, name: &str) -> Uuid {
    h.service
        .submit("author@example.com", name, "application/pdf", PDF_BYTES.to_vec())
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------
// Submission

#[tokio::test]
async fn submit_creates_pending_record_and_staging_copy() {
    let h = harness();
    let response = h
        .service
        .submit(
            "author@example.com",
            "report.pdf",
            "application/pdf",
            PDF_BYTES.to_vec(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, UploadStatus::Pending);
    assert!(!response.exists_in_destination);
    assert_eq!(response.checksum, content_checksum(PDF_BYTES));

    let upload = h.uploads.get(response.id).await.unwrap().unwrap();
    assert_eq!(upload.uploaded_by, "author@example.com");
    assert!(upload.expires_at.is_some());
    let temp_key = upload.temp_key.expect("staging key recorded");
    assert!(h.temp.contains(&temp_key));

    // Nothing published yet.
    assert!(h.destination.get_object("report.pdf").is_none());

    let audit = h.audit.entries_for(AuditAction::Upload);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].outcome, AuditOutcome::Success);
    assert_eq!(audit[0].details["checksum"], response.checksum);

    assert_eq!(h.notifier.events(), vec!["upload:report.pdf:false"]);
}

#[tokio::test]
async fn submit_flags_existing_destination_object() {
    let h = harness();
    h.destination.set_object("report.pdf", b"old version".to_vec());

    let response = h
        .service
        .submit(
            "author@example.com",
            "report.pdf",
            "application/pdf",
            PDF_BYTES.to_vec(),
        )
        .await
        .unwrap();

    assert!(response.exists_in_destination);
}

#[tokio::test]
async fn submit_rejects_oversize_payload() {
    let h = harness();
    let err = h
        .service
        .submit(
            "author@example.com",
            "big.pdf",
            "application/pdf",
            vec![b'a'; 2 * 1024 * 1024],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PayloadTooLarge(_)));
    assert!(h.uploads.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn submit_rejects_disallowed_content() {
    let h = harness();
    let err = h
        .service
        .submit(
            "author@example.com",
            "script.exe",
            "application/octet-stream",
            b"MZ\x90\x00".to_vec(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    // Nothing persisted, but the failure was notified.
    assert!(h.uploads.uploads.lock().unwrap().is_empty());
    assert_eq!(h.notifier.events(), vec!["error:validation:script.exe"]);
}

#[tokio::test]
async fn submit_rejects_path_traversal_names() {
    let h = harness();
    for name in ["../etc/passwd", "a/b.pdf", ""] {
        let err = h
            .service
            .submit("author@example.com", name, "application/pdf", PDF_BYTES.to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "name: {:?}", name);
    }
}

// ---------------------------------------------------------------------
// Approval

#[tokio::test]
async fn approve_publishes_and_commits_record() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    let temp_key = h.uploads.get(id).await.unwrap().unwrap().temp_key.unwrap();

    let result = h.service.approve(id, "reviewer@example.com").await.unwrap();

    assert_eq!(result.destination_key, "report.pdf");
    assert!(result.backup_key.is_none(), "no overwrite, no backup");
    assert!(result.invalidation_id.is_some());
    assert!(result.purge_ready);

    // Published bytes are the staged bytes.
    assert_eq!(h.destination.get_object("report.pdf").unwrap(), PDF_BYTES);
    // Staging copy cleaned up.
    assert!(!h.temp.contains(&temp_key));

    let upload = h.uploads.get(id).await.unwrap().unwrap();
    assert_eq!(upload.status, UploadStatus::Approved);
    assert_eq!(upload.reviewed_by.as_deref(), Some("reviewer@example.com"));
    assert_eq!(upload.destination_key.as_deref(), Some("report.pdf"));
    assert_eq!(
        upload.invalidation_status.as_deref(),
        Some(INVALIDATION_IN_PROGRESS)
    );
    assert!(upload.temp_key.is_none());

    let audit = h.audit.entries_for(AuditAction::Approve);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].details["destination_key"], "report.pdf");
    assert_eq!(audit[0].details["purge_ready"], "true");

    assert_eq!(h.purger.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn approve_backs_up_before_overwrite() {
    let h = harness();
    h.destination.set_object("report.pdf", b"old version".to_vec());
    let id = submit_pdf(&h, "report.pdf").await;

    let result = h.service.approve(id, "reviewer@example.com").await.unwrap();

    let backup_key = result.backup_key.expect("overwrite requires a backup");
    assert!(backup_key.starts_with("backup/"));
    assert!(backup_key.ends_with("/report.pdf"));

    // Old bytes preserved at the backup key, new bytes published.
    assert_eq!(h.destination.get_object(&backup_key).unwrap(), b"old version");
    assert_eq!(h.destination.get_object("report.pdf").unwrap(), PDF_BYTES);

    let backups = h.backups.backups.lock().unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].upload_id, id);
    assert_eq!(backups[0].original_key, "report.pdf");
    assert_eq!(backups[0].backup_key, backup_key);
}

#[tokio::test]
async fn approve_fails_when_staging_copy_expired() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    let temp_key = h.uploads.get(id).await.unwrap().unwrap().temp_key.unwrap();
    h.temp.delete(&temp_key).await.unwrap();

    let err = h
        .service
        .approve(id, "reviewer@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Dependency { step: "staging_read", .. }));
    // Record untouched; a resubmission is still possible.
    let upload = h.uploads.get(id).await.unwrap().unwrap();
    assert_eq!(upload.status, UploadStatus::Pending);
    assert!(h.destination.get_object("report.pdf").is_none());

    let audit = h.audit.entries_for(AuditAction::Approve);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].outcome, AuditOutcome::Failure);
    assert!(h
        .notifier
        .events()
        .iter()
        .any(|e| e.starts_with("error:staging_read:")));
}

#[tokio::test]
async fn approve_invalidation_failure_leaves_object_published_and_record_pending() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    h.invalidator.fail.store(true, Ordering::SeqCst);

    let err = h
        .service
        .approve(id, "reviewer@example.com")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::PartialCompletion { step: "cache_invalidation", .. }
    ));
    // The destination write is not rolled back.
    assert_eq!(h.destination.get_object("report.pdf").unwrap(), PDF_BYTES);
    // The record stays pending so the approval can be retried.
    let upload = h.uploads.get(id).await.unwrap().unwrap();
    assert_eq!(upload.status, UploadStatus::Pending);

    // Retry succeeds once the CDN recovers.
    h.invalidator.fail.store(false, Ordering::SeqCst);
    let result = h.service.approve(id, "reviewer@example.com").await.unwrap();
    assert!(result.invalidation_id.is_some());
    assert_eq!(
        h.uploads.get(id).await.unwrap().unwrap().status,
        UploadStatus::Approved
    );
}

#[tokio::test]
async fn approve_purge_failure_is_non_fatal() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    h.purger.fail.store(true, Ordering::SeqCst);

    let result = h.service.approve(id, "reviewer@example.com").await.unwrap();

    assert!(!result.purge_ready);
    assert_eq!(
        h.uploads.get(id).await.unwrap().unwrap().status,
        UploadStatus::Approved
    );
    assert!(h
        .notifier
        .events()
        .iter()
        .any(|e| e.starts_with("error:cache_purge:")));
}

#[tokio::test]
async fn approve_is_terminal() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    h.service.approve(id, "reviewer@example.com").await.unwrap();

    let err = h
        .service
        .approve(id, "reviewer@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = h
        .service
        .reject(id, "reviewer@example.com", "changed my mind")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn approve_unknown_upload_is_not_found() {
    let h = harness();
    let err = h
        .service
        .approve(Uuid::new_v4(), "reviewer@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn approve_without_cdn_configured_skips_invalidation() {
    let h = harness();
    let uploads = Arc::new(FakeUploadStore::default());
    let service = ReviewService::new(
        ReviewDeps {
            uploads: uploads.clone(),
            backups: Arc::new(FakeBackupStore::default()),
            audit: h.audit.clone(),
            destination: h.destination.clone(),
            temp: h.temp.clone(),
            invalidator: None,
            purger: None,
            notifier: Arc::new(RecordingNotifier::default()),
        },
        None,
        CdnConfig {
            distribution_id: None,
            public_prefix: "/files".to_string(),
        },
        1024 * 1024,
        Duration::from_secs(3600),
    );

    let id = service
        .submit("author@example.com", "plain.pdf", "application/pdf", PDF_BYTES.to_vec())
        .await
        .unwrap()
        .id;
    let result = service.approve(id, "reviewer@example.com").await.unwrap();

    assert!(result.invalidation_id.is_none());
    assert!(result.purge_ready, "no purge backend means nothing to wait for");
    let upload = uploads.get(id).await.unwrap().unwrap();
    assert!(upload.invalidation_status.is_none());
}

// ---------------------------------------------------------------------
// Rejection

#[tokio::test]
async fn reject_requires_reason_and_pending_status() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;

    let err = h
        .service
        .reject(id, "reviewer@example.com", "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    h.service
        .reject(id, "reviewer@example.com", "wrong quarter figures")
        .await
        .unwrap();

    let upload = h.uploads.get(id).await.unwrap().unwrap();
    assert_eq!(upload.status, UploadStatus::Rejected);
    assert_eq!(
        upload.rejection_reason.as_deref(),
        Some("wrong quarter figures")
    );
    assert!(upload.temp_key.is_none());

    // Nothing was published.
    assert!(h.destination.get_object("report.pdf").is_none());

    // A second rejection hits the terminal state.
    let err = h
        .service
        .reject(id, "reviewer@example.com", "again")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let audit = h.audit.entries_for(AuditAction::Reject);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].details["reason"], "wrong quarter figures");
}

#[tokio::test]
async fn reject_cleans_up_staging_copy() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    let temp_key = h.uploads.get(id).await.unwrap().unwrap().temp_key.unwrap();
    assert!(h.temp.contains(&temp_key));

    h.service
        .reject(id, "reviewer@example.com", "not needed")
        .await
        .unwrap();

    assert!(!h.temp.contains(&temp_key));
    assert!(h
        .notifier
        .events()
        .iter()
        .any(|e| e == "reject:report.pdf:not needed"));
}

// ---------------------------------------------------------------------
// Status and invalidation refresh

#[tokio::test]
async fn get_status_refreshes_completed_invalidation() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    h.service.approve(id, "reviewer@example.com").await.unwrap();

    // Still in progress: stored status unchanged.
    let upload = h.service.get_status(id).await.unwrap();
    assert_eq!(
        upload.invalidation_status.as_deref(),
        Some(INVALIDATION_IN_PROGRESS)
    );

    // CDN reports completion: the refresh persists it.
    h.invalidator.set_status(INVALIDATION_COMPLETED);
    let upload = h.service.get_status(id).await.unwrap();
    assert_eq!(
        upload.invalidation_status.as_deref(),
        Some(INVALIDATION_COMPLETED)
    );
    let stored = h.uploads.get(id).await.unwrap().unwrap();
    assert_eq!(
        stored.invalidation_status.as_deref(),
        Some(INVALIDATION_COMPLETED)
    );
}

// ---------------------------------------------------------------------
// Manual cache purge

#[tokio::test]
async fn purge_cache_requires_approved_status() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;

    let err = h
        .service
        .purge_cache(id, "reviewer@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    h.service.approve(id, "reviewer@example.com").await.unwrap();
    h.service
        .purge_cache(id, "reviewer@example.com")
        .await
        .unwrap();

    let audit = h.audit.entries_for(AuditAction::PurgeCache);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].outcome, AuditOutcome::Success);
    assert_eq!(audit[0].details["path"], "/files/report.pdf");
}

#[tokio::test]
async fn purge_cache_failure_is_audited() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    h.service.approve(id, "reviewer@example.com").await.unwrap();

    h.purger.fail.store(true, Ordering::SeqCst);
    let err = h
        .service
        .purge_cache(id, "reviewer@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Dependency { step: "cache_purge", .. }));

    let audit = h.audit.entries_for(AuditAction::PurgeCache);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].outcome, AuditOutcome::Failure);
}

// ---------------------------------------------------------------------
// Listing

#[tokio::test]
async fn list_uploads_filters_and_paginates() {
    let h = harness();
    for i in 0..5 {
        submit_pdf(&h, &format!("doc{}.pdf", i)).await;
    }
    let approved_id = submit_pdf(&h, "approved.pdf").await;
    h.service
        .approve(approved_id, "reviewer@example.com")
        .await
        .unwrap();

    let all = h
        .service
        .list_uploads(UploadFilter::default())
        .await
        .unwrap();
    assert_eq!(all.total, 6);
    assert_eq!(all.total_pages, 1);

    let pending = h
        .service
        .list_uploads(UploadFilter {
            status: Some(UploadStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.total, 5);

    let paged = h
        .service
        .list_uploads(UploadFilter {
            page: 2,
            page_size: 4,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paged.total, 6);
    assert_eq!(paged.uploads.len(), 2);
    assert_eq!(paged.total_pages, 2);
}

#[tokio::test]
async fn list_audit_logs_covers_full_history() {
    let h = harness();
    let id = submit_pdf(&h, "report.pdf").await;
    h.service.approve(id, "reviewer@example.com").await.unwrap();
    h.service
        .purge_cache(id, "reviewer@example.com")
        .await
        .unwrap();

    let logs = h
        .service
        .list_audit_logs(AuditLogFilter {
            upload_id: Some(id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(logs.total, 3);

    let approvals = h
        .service
        .list_audit_logs(AuditLogFilter {
            upload_id: Some(id),
            action: Some(AuditAction::Approve),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(approvals.total, 1);
}
