//! Secondary cache purge over the zone purge HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::traits::{CachePurger, StorageError, StorageResult};

const PURGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PurgeResponse {
    success: bool,
}

/// Zone-level cache purge client (Cloudflare-style API).
pub struct HttpCachePurger {
    client: Client,
    api_base_url: String,
    zone_id: String,
    api_token: String,
}

impl HttpCachePurger {
    pub fn new(api_base_url: String, zone_id: String, api_token: String) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(PURGE_TIMEOUT)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(HttpCachePurger {
            client,
            api_base_url,
            zone_id,
            api_token,
        })
    }
}

#[async_trait]
impl CachePurger for HttpCachePurger {
    async fn purge(&self, path: &str) -> StorageResult<()> {
        let url = format!(
            "{}/zones/{}/purge_cache",
            self.api_base_url.trim_end_matches('/'),
            self.zone_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "files": [path] }))
            .send()
            .await
            .map_err(|e| StorageError::PurgeError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::PurgeError(format!(
                "purge API returned {}",
                response.status()
            )));
        }

        let body: PurgeResponse = response
            .json()
            .await
            .map_err(|e| StorageError::PurgeError(e.to_string()))?;

        if !body.success {
            return Err(StorageError::PurgeError(
                "purge API reported failure".to_string(),
            ));
        }

        tracing::info!(path = %path, "cache purge successful");
        Ok(())
    }
}
