//! CloudFront-backed CDN invalidation client.

use async_trait::async_trait;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_cloudfront::Client;
use chrono::Utc;

use crate::traits::{CdnInvalidator, StorageError, StorageResult};

/// Edge-cache invalidation through the CloudFront API.
pub struct CloudFrontInvalidator {
    client: Client,
}

impl CloudFrontInvalidator {
    /// Build a client from the ambient AWS environment.
    pub async fn new(region: String) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .load()
            .await;
        CloudFrontInvalidator {
            client: Client::new(&aws_config),
        }
    }
}

#[async_trait]
impl CdnInvalidator for CloudFrontInvalidator {
    async fn invalidate(&self, distribution_id: &str, paths: &[String]) -> StorageResult<String> {
        if distribution_id.is_empty() {
            return Err(StorageError::ConfigError(
                "distribution ID is required".to_string(),
            ));
        }

        let batch = InvalidationBatch::builder()
            .caller_reference(format!("{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()))
            .paths(
                Paths::builder()
                    .quantity(paths.len() as i32)
                    .set_items(Some(paths.to_vec()))
                    .build()
                    .map_err(|e| StorageError::InvalidationError(e.to_string()))?,
            )
            .build()
            .map_err(|e| StorageError::InvalidationError(e.to_string()))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| StorageError::InvalidationError(e.to_string()))?;

        let id = output
            .invalidation()
            .map(|inv| inv.id().to_string())
            .ok_or_else(|| {
                StorageError::InvalidationError("invalidation response missing id".to_string())
            })?;

        tracing::info!(
            distribution_id = %distribution_id,
            invalidation_id = %id,
            path_count = paths.len(),
            "CDN invalidation requested"
        );

        Ok(id)
    }

    async fn invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> StorageResult<String> {
        let output = self
            .client
            .get_invalidation()
            .distribution_id(distribution_id)
            .id(invalidation_id)
            .send()
            .await
            .map_err(|e| StorageError::InvalidationError(e.to_string()))?;

        output
            .invalidation()
            .map(|inv| inv.status().to_string())
            .ok_or_else(|| {
                StorageError::InvalidationError("invalidation response missing status".to_string())
            })
    }
}
