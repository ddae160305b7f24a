//! Review-event notifications.
//!
//! All notifications are best-effort: the orchestrator calls the sink
//! and moves on; a delivery failure is logged and never surfaces to the
//! caller.

use async_trait::async_trait;
use chrono::Utc;
use filegate_core::config::{parse_list, SlackConfig};
use filegate_core::models::{ApprovalResult, Upload};
use serde::Serialize;
use std::time::Duration;

/// Sink for review lifecycle events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn upload_received(&self, upload: &Upload, exists_in_destination: bool);

    async fn upload_approved(&self, upload: &Upload, reviewer: &str, result: &ApprovalResult);

    async fn upload_rejected(&self, upload: &Upload, reviewer: &str, reason: &str);

    /// A lifecycle step failed. `operation` names the step for operators.
    async fn operation_failed(&self, operation: &str, file_name: &str, error: &str);
}

/// Notifier that drops every event. Used when Slack is disabled.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn upload_received(&self, _upload: &Upload, _exists: bool) {}
    async fn upload_approved(&self, _upload: &Upload, _reviewer: &str, _result: &ApprovalResult) {}
    async fn upload_rejected(&self, _upload: &Upload, _reviewer: &str, _reason: &str) {}
    async fn operation_failed(&self, _operation: &str, _file_name: &str, _error: &str) {}
}

#[derive(Serialize)]
struct SlackMessage {
    username: String,
    channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    attachments: Vec<Attachment>,
}

#[derive(Serialize)]
struct Attachment {
    color: &'static str,
    title: &'static str,
    fields: Vec<Field>,
    footer: String,
    ts: i64,
}

#[derive(Serialize)]
struct Field {
    title: &'static str,
    value: String,
    short: bool,
}

impl Field {
    fn new(title: &'static str, value: impl Into<String>, short: bool) -> Self {
        Field {
            title,
            value: value.into(),
            short,
        }
    }
}

/// Incoming-webhook Slack notifier with per-event enable flags.
pub struct SlackNotifier {
    client: reqwest::Client,
    config: SlackConfig,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        SlackNotifier { client, config }
    }

    /// "<@id> <@id>" mention prefix built from the configured
    /// comma-separated reviewer list.
    fn mentions(&self) -> String {
        parse_list(&self.config.reviewer_mentions)
            .iter()
            .map(|id| format!("<@{}>", id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn message(&self, text: Option<String>, attachment: Attachment) -> SlackMessage {
        SlackMessage {
            username: self.config.bot_name.clone(),
            channel: self.config.channel.clone(),
            text,
            attachments: vec![attachment],
        }
    }

    async fn send(&self, message: SlackMessage) {
        let result = self
            .client
            .post(&self.config.webhook_url)
            .json(&message)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Slack webhook rejected notification");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to deliver Slack notification");
            }
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn upload_received(&self, upload: &Upload, exists_in_destination: bool) {
        if !self.config.enabled || !self.config.notify_on_upload {
            return;
        }

        let mut fields = vec![
            Field::new("File Name", &upload.file_name, true),
            Field::new("File Size", format_bytes(upload.file_size), true),
            Field::new("Uploaded By", &upload.uploaded_by, true),
        ];
        if exists_in_destination {
            fields.push(Field::new(
                "Warning",
                "A published file with this name already exists and will be backed up on approval",
                false,
            ));
        }

        let mentions = self.mentions();
        let text = if mentions.is_empty() {
            "New file upload pending review".to_string()
        } else {
            format!("{} New file upload pending review", mentions)
        };

        self.send(self.message(
            Some(text),
            Attachment {
                color: "#3366FF",
                title: "New File Upload Pending Review",
                fields,
                footer: self.config.bot_name.clone(),
                ts: Utc::now().timestamp(),
            },
        ))
        .await;
    }

    async fn upload_approved(&self, upload: &Upload, reviewer: &str, result: &ApprovalResult) {
        if !self.config.enabled || !self.config.notify_on_approve {
            return;
        }

        let mut fields = vec![
            Field::new("File Name", &upload.file_name, true),
            Field::new("Approved By", reviewer, true),
            Field::new(
                "Destination Key",
                format!("`{}`", result.destination_key),
                false,
            ),
        ];
        if let Some(backup_key) = &result.backup_key {
            fields.push(Field::new("Backup Key", format!("`{}`", backup_key), false));
        }

        self.send(self.message(
            None,
            Attachment {
                color: "#36a64f",
                title: "File Upload Approved",
                fields,
                footer: self.config.bot_name.clone(),
                ts: Utc::now().timestamp(),
            },
        ))
        .await;
    }

    async fn upload_rejected(&self, upload: &Upload, reviewer: &str, reason: &str) {
        if !self.config.enabled || !self.config.notify_on_reject {
            return;
        }

        self.send(self.message(
            None,
            Attachment {
                color: "#FF6B6B",
                title: "File Upload Rejected",
                fields: vec![
                    Field::new("File Name", &upload.file_name, true),
                    Field::new("Rejected By", reviewer, true),
                    Field::new("Reason", reason, false),
                ],
                footer: self.config.bot_name.clone(),
                ts: Utc::now().timestamp(),
            },
        ))
        .await;
    }

    async fn operation_failed(&self, operation: &str, file_name: &str, error: &str) {
        if !self.config.enabled || !self.config.notify_on_error {
            return;
        }

        self.send(self.message(
            None,
            Attachment {
                color: "#FF0000",
                title: "Upload Processing Error",
                fields: vec![
                    Field::new("File Name", file_name, true),
                    Field::new("Operation", operation, true),
                    Field::new("Error", format!("`{}`", error), false),
                ],
                footer: self.config.bot_name.clone(),
                ts: Utc::now().timestamp(),
            },
        ))
        .await;
    }
}

/// "2.5 MB"-style size rendering for human-facing notifications.
pub fn format_bytes(bytes: i64) -> String {
    const UNIT: i64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let suffixes = ["KB", "MB", "GB", "TB", "PB", "EB"];
    format!("{:.1} {}", bytes as f64 / div as f64, suffixes[exp])
}
