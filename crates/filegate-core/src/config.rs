//! Configuration module
//!
//! Configuration is loaded once at startup with `Config::from_env()` and
//! passed by reference into the services that need it. There is no
//! process-wide configuration singleton.

use std::env;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:30200";
const DEFAULT_MAX_UPLOAD_SIZE: i64 = 500 * 1024 * 1024;
const DEFAULT_TEMP_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;

/// Durable object store settings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    /// Key prefix applied to every destination and backup key.
    pub prefix: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, localstack).
    pub endpoint_url: Option<String>,
}

/// CDN invalidation settings. Invalidation is skipped entirely when no
/// distribution is configured.
#[derive(Clone, Debug)]
pub struct CdnConfig {
    pub distribution_id: Option<String>,
    /// Public path prefix under which approved files are served, used to
    /// build invalidation and purge paths.
    pub public_prefix: String,
}

impl CdnConfig {
    pub fn invalidation_path(&self, file_name: &str) -> String {
        format!("{}/{}*", self.public_prefix.trim_end_matches('/'), file_name)
    }

    pub fn purge_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name)
    }
}

/// Secondary cache purge settings (zone-level HTTP purge API).
/// The purge layer is best-effort during approval and manually
/// retriable through the purge endpoint.
#[derive(Clone, Debug)]
pub struct PurgeConfig {
    pub api_token: Option<String>,
    pub zone_id: Option<String>,
    pub api_base_url: String,
}

impl PurgeConfig {
    pub fn is_configured(&self) -> bool {
        self.api_token.is_some() && self.zone_id.is_some()
    }
}

/// Slack notification settings. All notifications are best-effort.
#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub enabled: bool,
    pub webhook_url: String,
    pub channel: String,
    pub bot_name: String,
    pub notify_on_upload: bool,
    pub notify_on_approve: bool,
    pub notify_on_reject: bool,
    pub notify_on_error: bool,
    /// Comma-separated user IDs mentioned on new uploads.
    pub reviewer_mentions: String,
}

/// Content validation settings.
#[derive(Clone, Debug)]
pub struct ValidationConfig {
    pub enabled: bool,
    pub allowed_extensions: Vec<String>,
    pub allowed_mime_types: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            enabled: true,
            allowed_extensions: [".pdf", ".xlsx", ".xls", ".csv", ".doc", ".docx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_mime_types: [
                "application/pdf",
                "application/vnd.ms-excel",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "text/csv",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                // Container and fallback types reported by content sniffing
                // for the office formats above.
                "application/zip",
                "application/x-ole-storage",
                "text/plain",
                "application/octet-stream",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Service configuration, assembled from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Maximum accepted file size in bytes.
    pub max_upload_size: i64,
    /// TTL for the ephemeral staging copy.
    pub temp_ttl: Duration,
    pub storage: StorageConfig,
    pub cdn: CdnConfig,
    pub purge: PurgeConfig,
    pub slack: SlackConfig,
    pub validation: ValidationConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env::var(key).ok().map(|v| parse_list(&v))
}

/// Split a comma-separated env value, trimming whitespace and dropping
/// empty items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // .env is optional; real deployments set the environment directly.
        dotenvy::dotenv().ok();

        let defaults = ValidationConfig::default();
        let config = Config {
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS),
            max_upload_size: env_parse("MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE),
            temp_ttl: Duration::from_secs(env_parse("TEMP_STORAGE_TTL_SECS", DEFAULT_TEMP_TTL_SECS)),
            storage: StorageConfig {
                bucket: env_or("S3_BUCKET", "filegate-local"),
                prefix: env_or("S3_PREFIX", ""),
                region: env_or("S3_REGION", "eu-west-2"),
                endpoint_url: env::var("S3_ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            },
            cdn: CdnConfig {
                distribution_id: env::var("CDN_DISTRIBUTION_ID").ok().filter(|s| !s.is_empty()),
                public_prefix: env_or("CDN_PUBLIC_PREFIX", "/files"),
            },
            purge: PurgeConfig {
                api_token: env::var("PURGE_API_TOKEN").ok().filter(|s| !s.is_empty()),
                zone_id: env::var("PURGE_ZONE_ID").ok().filter(|s| !s.is_empty()),
                api_base_url: env_or("PURGE_API_BASE_URL", "https://api.cloudflare.com/client/v4"),
            },
            slack: SlackConfig {
                enabled: env_bool("SLACK_ENABLED", false),
                webhook_url: env_or("SLACK_WEBHOOK_URL", ""),
                channel: env_or("SLACK_CHANNEL", ""),
                bot_name: env_or("SLACK_BOT_NAME", "File Upload Service"),
                notify_on_upload: env_bool("SLACK_NOTIFY_ON_UPLOAD", true),
                notify_on_approve: env_bool("SLACK_NOTIFY_ON_APPROVE", true),
                notify_on_reject: env_bool("SLACK_NOTIFY_ON_REJECT", true),
                notify_on_error: env_bool("SLACK_NOTIFY_ON_ERROR", true),
                reviewer_mentions: env_or("SLACK_REVIEWERS_MENTIONS", ""),
            },
            validation: ValidationConfig {
                enabled: env_bool("VALIDATION_ENABLED", true),
                allowed_extensions: env_list("ALLOWED_EXTENSIONS")
                    .unwrap_or(defaults.allowed_extensions),
                allowed_mime_types: env_list("ALLOWED_MIME_TYPES")
                    .unwrap_or(defaults.allowed_mime_types),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.is_empty() {
            return Err(anyhow::anyhow!("DATABASE_URL must be set"));
        }
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }
        if self.max_upload_size <= 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE must be positive"));
        }
        if self.slack.enabled && self.slack.webhook_url.is_empty() {
            return Err(anyhow::anyhow!(
                "SLACK_ENABLED=true requires SLACK_WEBHOOK_URL to be set"
            ));
        }
        Ok(())
    }
}
