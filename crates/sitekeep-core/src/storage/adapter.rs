//! Unified get/save over the local cache and the remote document store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::cache::LocalCache;
use crate::error::{Result, StoreError};
use crate::remote::document::{is_truthy, unwrap_document};
use crate::remote::{RemoteError, RemoteStore, StoredDocument};

use super::SyncStatus;

/// Remote collection path holding every site document.
pub const DEFAULT_COLLECTION_PATH: &str = "site_data";

/// Per-call limit on remote requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Cache,
    Remote,
    Empty,
}

/// Result of a read, with a non-fatal notice when the remote read failed.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub value: Value,
    pub source: ReadSource,
    pub notice: Option<String>,
}

impl Loaded {
    fn empty(notice: Option<String>) -> Self {
        Self {
            value: Value::Array(Vec::new()),
            source: ReadSource::Empty,
            notice,
        }
    }
}

#[derive(Clone)]
struct RemoteBinding {
    store: Arc<dyn RemoteStore>,
    collection_path: Arc<str>,
    timeout: Duration,
}

impl RemoteBinding {
    /// Fetch and unwrap the document for `key`. Falsy payloads count as no data.
    async fn fetch(&self, key: &str) -> std::result::Result<Option<Value>, RemoteError> {
        let document = tokio::time::timeout(
            self.timeout,
            self.store.get_document(&self.collection_path, key),
        )
        .await
        .map_err(|_| RemoteError::Timeout(self.timeout))??;

        Ok(document.map(unwrap_document).filter(is_truthy))
    }

    async fn store(&self, key: &str, value: &Value) -> std::result::Result<(), RemoteError> {
        let document = StoredDocument::wrap(value.clone()).into_value();
        tokio::time::timeout(
            self.timeout,
            self.store.set_document(&self.collection_path, key, document),
        )
        .await
        .map_err(|_| RemoteError::Timeout(self.timeout))?
    }
}

/// Storage adapter with a cache-first read policy.
///
/// Reads answer from the local cache when it holds the key and refresh the
/// entry from the remote store in the background, so a caller may observe
/// data one write behind the remote store. Only a cold cache waits on the
/// network. Writes go to the remote store first and are mirrored locally
/// once they succeed.
///
/// Clone is cheap; clones share the cache, the remote client and the sync
/// status.
#[derive(Clone)]
pub struct StorageAdapter {
    local: Arc<dyn LocalCache>,
    remote: Option<RemoteBinding>,
    sync: Arc<Mutex<SyncStatus>>,
    // Bumped around every save so late remote reads can be discarded.
    generations: Arc<Mutex<HashMap<String, u64>>>,
    refreshes: Arc<Mutex<JoinSet<()>>>,
}

impl StorageAdapter {
    /// Adapter backed by the local cache alone (offline mode).
    pub fn local_only(local: Arc<dyn LocalCache>) -> Self {
        Self {
            local,
            remote: None,
            sync: Arc::new(Mutex::new(SyncStatus::default())),
            generations: Arc::new(Mutex::new(HashMap::new())),
            refreshes: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Adapter backed by a remote store, with the local cache as read-through
    /// cache and offline fallback.
    pub fn with_remote(
        local: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteStore>,
        collection_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let collection_path: String = collection_path.into();
        Self {
            remote: Some(RemoteBinding {
                store: remote,
                collection_path: Arc::from(collection_path),
                timeout,
            }),
            ..Self::local_only(local)
        }
    }

    /// Whether a remote store is configured. When false every read and write
    /// is a pure local cache operation.
    pub fn is_connected(&self) -> bool {
        self.remote.is_some()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.lock().map(|s| *s).unwrap_or_default()
    }

    fn mark_synced(&self) -> DateTime<Utc> {
        let now = Utc::now();
        if let Ok(mut status) = self.sync.lock() {
            *status = SyncStatus::synced_at(now);
        }
        now
    }

    fn generation(&self, key: &str) -> u64 {
        self.generations
            .lock()
            .map(|g| g.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn bump_generation(&self, key: &str) {
        if let Ok(mut generations) = self.generations.lock() {
            *generations.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    /// Parsed cache entry. Unreadable or corrupt entries count as absent.
    fn read_cached(&self, key: &str) -> Option<Value> {
        let raw = match self.local.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read local cache");
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding corrupt local cache entry");
                None
            }
        }
    }

    fn write_cache(&self, key: &str, value: &Value) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.local.set(key, &raw)
    }

    /// Best-effort local mirror of a value the remote store already holds.
    fn mirror(&self, key: &str, value: &Value) {
        if let Err(e) = self.write_cache(key, value) {
            warn!(key = %key, error = %e, "Failed to mirror value to local cache");
        }
    }

    /// Mirror a remote read unless a save or sync for `key` happened since
    /// the read started. Returns whether the cache was updated.
    fn mirror_if_current(&self, key: &str, started_at: u64, value: &Value) -> bool {
        if self.generation(key) != started_at {
            debug!(key = %key, "Discarding remote read superseded by a local save");
            return false;
        }
        self.mirror(key, value);
        self.mark_synced();
        true
    }

    /// Read `key`, resolving "no data" to an empty list.
    pub async fn get(&self, key: &str) -> Value {
        self.load(key).await.value
    }

    /// Read `key` with its provenance.
    pub async fn load(&self, key: &str) -> Loaded {
        let cached = self.read_cached(key);

        let remote = match &self.remote {
            Some(remote) => remote.clone(),
            None => {
                return match cached {
                    Some(value) => Loaded {
                        value,
                        source: ReadSource::Cache,
                        notice: None,
                    },
                    None => Loaded::empty(None),
                };
            }
        };

        if let Some(value) = cached {
            self.spawn_refresh(remote, key);
            return Loaded {
                value,
                source: ReadSource::Cache,
                notice: None,
            };
        }

        let started_at = self.generation(key);
        match remote.fetch(key).await {
            Ok(Some(value)) => {
                if self.mirror_if_current(key, started_at, &value) {
                    debug!(key = %key, "Cold cache filled from remote store");
                }
                Loaded {
                    value,
                    source: ReadSource::Remote,
                    notice: None,
                }
            }
            Ok(None) => {
                debug!(key = %key, "No remote document");
                Loaded::empty(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Remote read failed, treating as no data");
                Loaded::empty(Some(format!("Could not load {} from the database: {}", key, e)))
            }
        }
    }

    /// Refresh the cache entry for `key` without making the caller wait.
    fn spawn_refresh(&self, remote: RemoteBinding, key: &str) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!(key = %key, "No async runtime, skipping background refresh");
                return;
            }
        };

        let adapter = self.clone();
        let key = key.to_string();
        let started_at = self.generation(&key);

        let task = async move {
            match remote.fetch(&key).await {
                Ok(Some(value)) => {
                    if adapter.mirror_if_current(&key, started_at, &value) {
                        debug!(key = %key, "Background refresh updated cache");
                    }
                }
                Ok(None) => debug!(key = %key, "Background refresh found no remote document"),
                Err(e) => warn!(key = %key, error = %e, "Background refresh failed"),
            }
        };

        if let Ok(mut refreshes) = self.refreshes.lock() {
            // Reap finished refreshes so the set only holds live tasks.
            while refreshes.try_join_next().is_some() {}
            refreshes.spawn_on(task, &handle);
        }
    }

    /// Wait up to `limit` for background refreshes still in flight.
    ///
    /// Refreshes are detached tasks and die with the runtime; a short-lived
    /// process calls this before exiting so they can reach the cache.
    /// Returns how many were still running when the limit expired.
    pub async fn wait_for_refreshes(&self, limit: Duration) -> usize {
        let mut pending = match self.refreshes.lock() {
            Ok(mut refreshes) => std::mem::take(&mut *refreshes),
            Err(_) => return 0,
        };

        let drained = tokio::time::timeout(limit, async {
            while pending.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(pending = pending.len(), "Gave up waiting for background refreshes");
        }
        pending.len()
    }

    /// Read `key` as the base of a read-modify-write.
    ///
    /// With a remote store the cache-first shortcut is skipped: the value
    /// comes from the remote store and is mirrored locally, and a failed
    /// remote read is an error. Offline this is a plain cache read.
    pub async fn load_latest(&self, key: &str) -> Result<Value> {
        let remote = match &self.remote {
            Some(remote) => remote,
            None => return Ok(self.read_cached(key).unwrap_or_else(|| Value::Array(Vec::new()))),
        };

        let started_at = self.generation(key);
        let fetched = remote
            .fetch(key)
            .await
            .map_err(|source| StoreError::RemoteRead {
                key: key.to_string(),
                source,
            })?;

        match fetched {
            Some(value) => {
                self.mirror_if_current(key, started_at, &value);
                Ok(value)
            }
            None => Ok(Value::Array(Vec::new())),
        }
    }

    /// Persist `value` under `key`.
    ///
    /// With a remote store the write must succeed remotely; on failure the
    /// error is returned and the local cache is left as it was.
    pub async fn save(&self, key: &str, value: &Value) -> Result<()> {
        self.bump_generation(key);

        match &self.remote {
            Some(remote) => {
                let result = remote.store(key, value).await;
                self.bump_generation(key);
                if let Err(source) = result {
                    error!(key = %key, error = %source, "Remote save failed");
                    return Err(StoreError::RemoteWrite {
                        key: key.to_string(),
                        source,
                    });
                }
                info!(key = %key, "Saved to remote store");
                self.mark_synced();
                self.mirror(key, value);
            }
            None => {
                self.write_cache(key, value).map_err(StoreError::LocalCache)?;
                debug!(key = %key, "Saved to local cache");
            }
        }
        Ok(())
    }

    /// Fetch every key from the remote store, bypassing the cache-first
    /// shortcut, and refresh the cache with the results.
    pub async fn force_sync(&self, keys: &[&str]) -> Result<DateTime<Utc>> {
        let remote = self.remote.as_ref().ok_or(StoreError::Offline)?;

        let fetched = try_join_all(keys.iter().map(|key| async move {
            remote
                .fetch(key)
                .await
                .map(|value| (*key, value))
                .map_err(|source| StoreError::RemoteRead {
                    key: key.to_string(),
                    source,
                })
        }))
        .await?;

        for (key, value) in fetched {
            match value {
                Some(value) => {
                    self.bump_generation(key);
                    self.mirror(key, &value);
                }
                None => debug!(key = %key, "Nothing to sync"),
            }
        }

        let at = self.mark_synced();
        info!(keys = keys.len(), "Forced sync complete");
        Ok(at)
    }

    /// Drop every local cache entry.
    pub fn clear_local(&self) -> Result<()> {
        self.local.clear().map_err(StoreError::LocalCache)?;
        info!("Local cache cleared");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::remote::MemoryDocumentStore;
    use serde_json::json;

    fn offline() -> (Arc<MemoryCache>, StorageAdapter) {
        let cache = Arc::new(MemoryCache::new());
        let adapter = StorageAdapter::local_only(cache.clone());
        (cache, adapter)
    }

    fn online() -> (Arc<MemoryCache>, Arc<MemoryDocumentStore>, StorageAdapter) {
        let cache = Arc::new(MemoryCache::new());
        let remote = Arc::new(MemoryDocumentStore::new());
        let adapter = StorageAdapter::with_remote(
            cache.clone(),
            remote.clone(),
            DEFAULT_COLLECTION_PATH,
            DEFAULT_REQUEST_TIMEOUT,
        );
        (cache, remote, adapter)
    }

    #[tokio::test]
    async fn test_offline_get_missing_is_empty_list() {
        let (_, adapter) = offline();
        assert!(!adapter.is_connected());
        let loaded = adapter.load("dewabars_services").await;
        assert_eq!(loaded.value, json!([]));
        assert_eq!(loaded.source, ReadSource::Empty);
    }

    #[tokio::test]
    async fn test_offline_save_then_get() {
        let (cache, adapter) = offline();
        let value = json!([{ "id": 1, "title": "3D Animation" }]);
        adapter.save("dewabars_services", &value).await.unwrap();

        assert_eq!(adapter.get("dewabars_services").await, value);
        assert!(cache.get("dewabars_services").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_ignored() {
        let (cache, adapter) = offline();
        cache.set("dewabars_pricing", "{not json").unwrap();
        assert_eq!(adapter.get("dewabars_pricing").await, json!([]));
    }

    #[tokio::test]
    async fn test_save_wraps_payload_and_mirrors() {
        let (cache, remote, adapter) = online();
        let value = json!({ "aboutTitle": "Creativity" });
        adapter.save("dewabars_content", &value).await.unwrap();

        let doc = remote.document(DEFAULT_COLLECTION_PATH, "dewabars_content").unwrap();
        assert_eq!(doc["payload"], value);
        assert!(doc.get("updatedAt").is_some());

        let mirrored: Value =
            serde_json::from_str(&cache.get("dewabars_content").unwrap().unwrap()).unwrap();
        assert_eq!(mirrored, value);
        assert!(adapter.sync_status().last_synced.is_some());
    }

    #[tokio::test]
    async fn test_cold_cache_reads_remote_and_fills_cache() {
        let (cache, remote, adapter) = online();
        remote.insert_raw(
            DEFAULT_COLLECTION_PATH,
            "dewabars_comments",
            json!({ "items": [{ "id": 7 }] }),
        );

        let loaded = adapter.load("dewabars_comments").await;
        assert_eq!(loaded.source, ReadSource::Remote);
        assert_eq!(loaded.value, json!([{ "id": 7 }]));
        assert_eq!(
            cache.get("dewabars_comments").unwrap().as_deref(),
            Some("[{\"id\":7}]")
        );
    }

    #[tokio::test]
    async fn test_remote_absent_document_is_empty() {
        let (_, _, adapter) = online();
        let loaded = adapter.load("dewabars_process").await;
        assert_eq!(loaded.source, ReadSource::Empty);
        assert!(loaded.notice.is_none());
        assert_eq!(loaded.value, json!([]));
    }

    #[tokio::test]
    async fn test_force_sync_requires_remote() {
        let (_, adapter) = offline();
        let err = adapter.force_sync(&["dewabars_services"]).await.unwrap_err();
        assert!(matches!(err, StoreError::Offline));
    }

    #[tokio::test]
    async fn test_force_sync_overwrites_cache() {
        let (cache, remote, adapter) = online();
        cache.set("dewabars_services", "[]").unwrap();
        remote.insert_raw(
            DEFAULT_COLLECTION_PATH,
            "dewabars_services",
            json!({ "payload": [{ "id": 1 }] }),
        );

        let at = adapter.force_sync(&["dewabars_services", "dewabars_pricing"]).await.unwrap();
        assert_eq!(adapter.sync_status().last_synced, Some(at));
        assert_eq!(
            cache.get("dewabars_services").unwrap().as_deref(),
            Some("[{\"id\":1}]")
        );
    }

    #[tokio::test]
    async fn test_clear_local() {
        let (cache, adapter) = offline();
        cache.set("dewabars_admin_logged_in", "true").unwrap();
        adapter.clear_local().unwrap();
        assert!(cache.get("dewabars_admin_logged_in").unwrap().is_none());
    }
}
