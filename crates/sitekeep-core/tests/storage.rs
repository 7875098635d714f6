//! Storage adapter behavior against misbehaving remote stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use sitekeep_core::cache::{LocalCache, MemoryCache};
use sitekeep_core::remote::{MemoryDocumentStore, RemoteError, RemoteStore};
use sitekeep_core::models::{Comment, NewComment};
use sitekeep_core::{Collection, ContentStore, ReadSource, StorageAdapter, StoreError};

const PATH: &str = "site_data";
const KEY: &str = "dewabars_services";

/// Never answers.
struct StalledStore;

#[async_trait]
impl RemoteStore for StalledStore {
    async fn get_document(&self, _: &str, _: &str) -> Result<Option<Value>, RemoteError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn set_document(&self, _: &str, _: &str, _: Value) -> Result<(), RemoteError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Answers every call with a server error.
struct FailingStore;

#[async_trait]
impl RemoteStore for FailingStore {
    async fn get_document(&self, _: &str, _: &str) -> Result<Option<Value>, RemoteError> {
        Err(RemoteError::Server("boom".to_string()))
    }

    async fn set_document(&self, _: &str, _: &str, _: Value) -> Result<(), RemoteError> {
        Err(RemoteError::Server("boom".to_string()))
    }
}

/// Reads what the inner store holds when the call starts, but answers late.
struct SlowReadStore {
    inner: Arc<MemoryDocumentStore>,
    delay: Duration,
}

#[async_trait]
impl RemoteStore for SlowReadStore {
    async fn get_document(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, RemoteError> {
        let snapshot = self.inner.get_document(collection, doc_id).await?;
        tokio::time::sleep(self.delay).await;
        Ok(snapshot)
    }

    async fn set_document(&self, collection: &str, doc_id: &str, document: Value) -> Result<(), RemoteError> {
        self.inner.set_document(collection, doc_id, document).await
    }
}

fn cached(value: &Value) -> Arc<MemoryCache> {
    let cache = Arc::new(MemoryCache::new());
    cache.set(KEY, &value.to_string()).unwrap();
    cache
}

fn cached_value(cache: &MemoryCache) -> Option<Value> {
    cache
        .get(KEY)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_cached_read_does_not_wait_on_stalled_remote() {
    let value = json!([{ "id": 1, "title": "3D Animation" }]);
    let adapter = StorageAdapter::with_remote(
        cached(&value),
        Arc::new(StalledStore),
        PATH,
        Duration::from_secs(15),
    );

    let loaded = tokio::time::timeout(Duration::from_millis(10), adapter.load(KEY))
        .await
        .expect("cached read must not wait for the remote store");
    assert_eq!(loaded.value, value);
    assert_eq!(loaded.source, ReadSource::Cache);
}

#[tokio::test(start_paused = true)]
async fn test_cold_read_times_out_to_empty_with_notice() {
    let adapter = StorageAdapter::with_remote(
        Arc::new(MemoryCache::new()),
        Arc::new(StalledStore),
        PATH,
        Duration::from_millis(50),
    );

    let loaded = adapter.load(KEY).await;
    assert_eq!(loaded.value, json!([]));
    assert_eq!(loaded.source, ReadSource::Empty);
    assert!(loaded.notice.is_some_and(|n| n.contains(KEY)));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_write_fails_with_timeout() {
    let old = json!([{ "id": 1 }]);
    let cache = cached(&old);
    let adapter = StorageAdapter::with_remote(
        cache.clone(),
        Arc::new(StalledStore),
        PATH,
        Duration::from_millis(50),
    );

    let err = adapter.save(KEY, &json!([{ "id": 2 }])).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::RemoteWrite {
            source: RemoteError::Timeout(_),
            ..
        }
    ));
    assert_eq!(cached_value(&cache), Some(old));
}

#[tokio::test]
async fn test_failed_write_leaves_cache_untouched() {
    let old = json!([{ "id": 1 }]);
    let cache = cached(&old);
    let adapter = StorageAdapter::with_remote(
        cache.clone(),
        Arc::new(FailingStore),
        PATH,
        Duration::from_secs(1),
    );

    let err = adapter.save(KEY, &json!([])).await.unwrap_err();
    assert!(matches!(err, StoreError::RemoteWrite { ref key, .. } if key == KEY));
    assert_eq!(cached_value(&cache), Some(old));
    assert!(adapter.sync_status().last_synced.is_none());
}

#[tokio::test]
async fn test_failed_cold_read_is_empty_not_error() {
    let adapter = StorageAdapter::with_remote(
        Arc::new(MemoryCache::new()),
        Arc::new(FailingStore),
        PATH,
        Duration::from_secs(1),
    );

    let loaded = adapter.load(KEY).await;
    assert_eq!(loaded.value, json!([]));
    assert!(loaded.notice.is_some());
}

#[tokio::test]
async fn test_force_sync_surfaces_remote_errors() {
    let adapter = StorageAdapter::with_remote(
        Arc::new(MemoryCache::new()),
        Arc::new(FailingStore),
        PATH,
        Duration::from_secs(1),
    );

    let err = adapter.force_sync(&[KEY]).await.unwrap_err();
    assert!(matches!(err, StoreError::RemoteRead { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_background_refresh_updates_stale_cache() {
    let remote = Arc::new(MemoryDocumentStore::new());
    remote
        .set_document(PATH, KEY, json!({ "payload": [{ "id": 2 }] }))
        .await
        .unwrap();
    let cache = cached(&json!([{ "id": 1 }]));
    let adapter = StorageAdapter::with_remote(cache.clone(), remote, PATH, Duration::from_secs(1));

    // First read is answered from the stale cache.
    assert_eq!(adapter.get(KEY).await, json!([{ "id": 1 }]));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(cached_value(&cache), Some(json!([{ "id": 2 }])));
    assert!(adapter.sync_status().last_synced.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_late_refresh_does_not_overwrite_newer_save() {
    let inner = Arc::new(MemoryDocumentStore::new());
    inner
        .set_document(PATH, KEY, json!({ "payload": [{ "id": 1 }] }))
        .await
        .unwrap();
    let remote = Arc::new(SlowReadStore {
        inner: inner.clone(),
        delay: Duration::from_millis(100),
    });
    let cache = cached(&json!([{ "id": 1 }]));
    let adapter = StorageAdapter::with_remote(cache.clone(), remote, PATH, Duration::from_secs(1));

    adapter.get(KEY).await;
    // Let the refresh take its snapshot of the old document.
    tokio::task::yield_now().await;

    let newer = json!([{ "id": 1 }, { "id": 2 }]);
    adapter.save(KEY, &newer).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(cached_value(&cache), Some(newer));
}

#[tokio::test(start_paused = true)]
async fn test_late_cold_read_does_not_overwrite_newer_save() {
    let inner = Arc::new(MemoryDocumentStore::new());
    inner
        .set_document(PATH, KEY, json!({ "payload": [{ "id": 1 }] }))
        .await
        .unwrap();
    let remote = Arc::new(SlowReadStore {
        inner,
        delay: Duration::from_millis(100),
    });
    let cache = Arc::new(MemoryCache::new());
    let adapter = StorageAdapter::with_remote(cache.clone(), remote, PATH, Duration::from_secs(1));

    let reader = adapter.clone();
    let read = tokio::spawn(async move { reader.get(KEY).await });
    // Let the cold read take its snapshot of the old document.
    tokio::task::yield_now().await;

    let newer = json!([{ "id": 1 }, { "id": 2 }]);
    adapter.save(KEY, &newer).await.unwrap();

    // The caller still gets what the remote returned, but the cache keeps the save.
    assert_eq!(read.await.unwrap(), json!([{ "id": 1 }]));
    assert_eq!(cached_value(&cache), Some(newer));
}

#[tokio::test]
async fn test_load_latest_bypasses_stale_cache() {
    let remote = Arc::new(MemoryDocumentStore::new());
    remote
        .set_document(PATH, KEY, json!({ "payload": [{ "id": 1 }, { "id": 2 }] }))
        .await
        .unwrap();
    let cache = cached(&json!([{ "id": 1 }]));
    let adapter = StorageAdapter::with_remote(cache.clone(), remote, PATH, Duration::from_secs(1));

    let latest = adapter.load_latest(KEY).await.unwrap();
    assert_eq!(latest, json!([{ "id": 1 }, { "id": 2 }]));
    assert_eq!(cached_value(&cache), Some(latest));
}

#[tokio::test]
async fn test_load_latest_fails_instead_of_using_cache() {
    let adapter = StorageAdapter::with_remote(
        cached(&json!([{ "id": 1 }])),
        Arc::new(FailingStore),
        PATH,
        Duration::from_secs(1),
    );

    let err = adapter.load_latest(KEY).await.unwrap_err();
    assert!(matches!(err, StoreError::RemoteRead { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_refreshes() {
    let stalled = StorageAdapter::with_remote(
        cached(&json!([{ "id": 1 }])),
        Arc::new(StalledStore),
        PATH,
        Duration::from_secs(15),
    );
    stalled.get(KEY).await;
    assert_eq!(stalled.wait_for_refreshes(Duration::from_millis(100)).await, 1);
    // Nothing left to wait for afterwards.
    assert_eq!(stalled.wait_for_refreshes(Duration::from_millis(100)).await, 0);
}

const COMMENTS: &str = "dewabars_comments";

fn comment(id: i64, status: &str) -> Value {
    json!({ "id": id, "user": "Visitor", "text": "Nice", "rating": 5, "status": status })
}

fn comment_ids(remote: &MemoryDocumentStore) -> Vec<i64> {
    let document = remote.document(PATH, COMMENTS).unwrap();
    let comments: Vec<Comment> = serde_json::from_value(document["payload"].clone()).unwrap();
    comments.into_iter().map(|c| c.id).collect()
}

/// Each CLI invocation is its own process with its own runtime; only the
/// cache and the remote store outlive it.
fn run_once<T>(future: impl std::future::Future<Output = T>) -> T {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(future)
}

#[test]
fn test_separate_runs_write_on_top_of_remote_changes() {
    let inner = Arc::new(MemoryDocumentStore::new());
    inner.insert_raw(
        PATH,
        COMMENTS,
        json!({ "payload": [comment(1, "approved"), comment(2, "pending")] }),
    );
    let cache = Arc::new(MemoryCache::new());
    cache.set(COMMENTS, &json!([comment(1, "approved")]).to_string()).unwrap();

    let open = || {
        let remote = Arc::new(SlowReadStore {
            inner: inner.clone(),
            delay: Duration::from_millis(20),
        });
        ContentStore::new(StorageAdapter::with_remote(
            cache.clone(),
            remote,
            PATH,
            Duration::from_secs(1),
        ))
    };

    let approved = run_once(async {
        let store = open();
        let approved = store.approve_comment(2).await.unwrap();
        store.settle(Duration::from_secs(1)).await;
        approved
    });
    assert!(approved.is_some_and(|c| c.is_approved()));

    let submitted = run_once(async {
        let store = open();
        let comment = store
            .submit_public_comment(NewComment::new("Ann", "Lovely", None))
            .await
            .unwrap();
        store.settle(Duration::from_secs(1)).await;
        comment
    });

    assert_eq!(comment_ids(&inner), vec![1, 2, submitted.id]);
}

#[test]
fn test_settled_refresh_outlives_the_run() {
    let inner = Arc::new(MemoryDocumentStore::new());
    inner.insert_raw(
        PATH,
        COMMENTS,
        json!({ "payload": [comment(1, "approved"), comment(2, "approved")] }),
    );
    let cache = Arc::new(MemoryCache::new());
    cache.set(COMMENTS, &json!([comment(1, "approved")]).to_string()).unwrap();

    let shown = run_once(async {
        let store = ContentStore::new(StorageAdapter::with_remote(
            cache.clone(),
            Arc::new(SlowReadStore {
                inner: inner.clone(),
                delay: Duration::from_millis(20),
            }),
            PATH,
            Duration::from_secs(1),
        ));
        let shown = store.get_collection(Collection::Comments).await;
        store.settle(Duration::from_secs(1)).await;
        shown
    });

    // Answered from the stale cache, refreshed before the run ended.
    assert_eq!(shown.as_array().map(Vec::len), Some(1));
    let cached: Value = serde_json::from_str(&cache.get(COMMENTS).unwrap().unwrap()).unwrap();
    assert_eq!(cached.as_array().map(Vec::len), Some(2));
}
