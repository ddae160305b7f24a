//! In-memory store implementations for local development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::traits::{DurableStore, StorageError, StorageResult, TempStore};

/// In-memory durable store.
#[derive(Default)]
pub struct InMemoryDurableStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object (test setup).
    pub fn set_object(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    /// Read back an object (test assertions).
    pub fn get_object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let mut objects = self.objects.lock().unwrap();
        let data = objects
            .get(from_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from_key.to_string()))?;
        objects.insert(to_key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

struct TempEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

/// In-memory ephemeral store with per-key expiry.
///
/// Expiry is enforced lazily on access, which matches what the lifecycle
/// relies on: an expired key is indistinguishable from a deleted one.
#[derive(Default)]
pub struct InMemoryTempStore {
    entries: Mutex<HashMap<String, TempEntry>>,
}

impl InMemoryTempStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live (non-expired) entry exists (test assertions).
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) => entry.expires_at.map(|at| at > Instant::now()).unwrap_or(true),
            None => false,
        }
    }

    /// Drop expired entries. The service can run this from a periodic
    /// sweep; correctness never depends on it.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap()
            .retain(|_, e| e.expires_at.map(|at| at > now).unwrap_or(true));
    }
}

#[async_trait]
impl TempStore for InMemoryTempStore {
    async fn store(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            TempEntry {
                data,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) => {
                if let Some(at) = entry.expires_at {
                    if at <= Instant::now() {
                        return Err(StorageError::NotFound(key.to_string()));
                    }
                }
                Ok(entry.data.clone())
            }
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(())
            }
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_store_round_trip_and_delete() {
        let store = InMemoryTempStore::new();
        store.store("k", b"data".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"data");

        store.delete("k").await.unwrap();
        assert!(matches!(
            store.get("k").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_temp_store_expiry() {
        let store = InMemoryTempStore::new();
        store.store("k", b"data".to_vec()).await.unwrap();
        store.set_ttl("k", Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(matches!(
            store.get("k").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!store.contains("k"));

        store.evict_expired();
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_durable_store_copy_then_overwrite() {
        let store = InMemoryDurableStore::new();
        store.put("report.pdf", b"v1".to_vec()).await.unwrap();
        assert!(store.exists("report.pdf").await.unwrap());

        store
            .copy("report.pdf", "backup/1700000000/report.pdf")
            .await
            .unwrap();
        store.put("report.pdf", b"v2".to_vec()).await.unwrap();

        assert_eq!(
            store.get_object("backup/1700000000/report.pdf").unwrap(),
            b"v1"
        );
        assert_eq!(store.get_object("report.pdf").unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_durable_store_copy_missing_source() {
        let store = InMemoryDurableStore::new();
        assert!(matches!(
            store.copy("missing", "elsewhere").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
