//! In-memory query cache.
//!
//! Maps a [`QueryKey`] to a cached JSON value with a fetch timestamp.
//! Reads go through [`QueryCache::fetch`], which serves fresh entries,
//! deduplicates concurrent fetches for the same key (single network call
//! in flight per key) and runs the fetcher under the retry policy.
//! Mutation success handlers reconcile the cache through `set`, `update`
//! and the prefix-based `invalidate` family.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::util::{with_retry, RetryPolicy};

use super::key::QueryKey;

#[derive(Debug, Clone)]
struct Entry {
  value: serde_json::Value,
  fetched_at: Instant,
  stale: bool,
}

impl Entry {
  fn is_fresh(&self, stale_after: Duration) -> bool {
    !self.stale && self.fetched_at.elapsed() < stale_after
  }
}

/// Process-wide cache of read results.
pub struct QueryCache {
  entries: Mutex<HashMap<QueryKey, Entry>>,
  in_flight: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
  retry: RetryPolicy,
}

impl Default for QueryCache {
  fn default() -> Self {
    Self::new(RetryPolicy::default())
  }
}

impl QueryCache {
  pub fn new(retry: RetryPolicy) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      in_flight: Mutex::new(HashMap::new()),
      retry,
    }
  }

  /// Fetch the value under `key`, revalidating when stale.
  ///
  /// 1. A fresh cached value is returned without a network call.
  /// 2. Otherwise a per-key guard ensures only one fetch is in flight;
  ///    waiters re-check the cache once the leader finishes.
  /// 3. The fetcher runs under the cache's retry policy.
  /// 4. On success the result replaces the entry (last write wins);
  ///    on failure the error propagates and any stale entry is left as-is.
  pub async fn fetch<T, F, Fut>(
    &self,
    key: &QueryKey,
    stale_after: Duration,
    fetcher: F,
  ) -> ApiResult<T>
  where
    T: Serialize + DeserializeOwned,
    F: Fn() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
  {
    if let Some(value) = self.read_fresh(key, stale_after)? {
      return Ok(value);
    }

    let guard = self.flight_guard(key)?;
    let _held = guard.lock().await;

    // Another flight may have revalidated this key while we waited.
    if let Some(value) = self.read_fresh(key, stale_after)? {
      return Ok(value);
    }

    tracing::debug!(key = %key, "cache miss, fetching");
    let result = with_retry(self.retry, fetcher).await;
    // Waiters already hold a clone of the guard; dropping the map entry
    // keeps the guard map from growing one entry per key ever fetched.
    self.drop_flight_guard(key);
    let value = result?;
    self.set(key, &value)?;
    Ok(value)
  }

  /// Place a value directly into the cache (direct-write reconciliation).
  pub fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> ApiResult<()> {
    let value = serde_json::to_value(value)
      .map_err(|e| ApiError::local(format!("Failed to serialize cached value: {}", e)))?;

    let mut entries = self.lock_entries()?;
    entries.insert(
      key.clone(),
      Entry {
        value,
        fetched_at: Instant::now(),
        stale: false,
      },
    );
    Ok(())
  }

  /// Apply `f` to the cached value under `key`, if present (optimistic
  /// update helper). Returns whether an entry was updated.
  pub fn update<T, F>(&self, key: &QueryKey, f: F) -> ApiResult<bool>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce(T) -> T,
  {
    let mut entries = self.lock_entries()?;
    let Some(entry) = entries.get_mut(key) else {
      return Ok(false);
    };

    let current: T = serde_json::from_value(entry.value.clone())
      .map_err(|e| ApiError::local(format!("Failed to decode cached value: {}", e)))?;
    entry.value = serde_json::to_value(f(current))
      .map_err(|e| ApiError::local(format!("Failed to serialize cached value: {}", e)))?;
    Ok(true)
  }

  /// Read the cached value under `key` regardless of staleness.
  pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
    let entries = self.entries.lock().ok()?;
    let entry = entries.get(key)?;
    serde_json::from_value(entry.value.clone()).ok()
  }

  /// Mark every key nested under `prefix` (inclusive) as stale, so the
  /// next read of any matching key revalidates.
  pub fn invalidate(&self, prefix: &QueryKey) {
    if let Ok(mut entries) = self.entries.lock() {
      for (key, entry) in entries.iter_mut() {
        if key.starts_with(prefix) {
          entry.stale = true;
        }
      }
    }
  }

  /// Invalidate several key prefixes at once.
  pub fn invalidate_many(&self, prefixes: &[QueryKey]) {
    for prefix in prefixes {
      self.invalidate(prefix);
    }
  }

  /// Drop every entry nested under `prefix` (inclusive).
  pub fn remove(&self, prefix: &QueryKey) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.retain(|key, _| !key.starts_with(prefix));
    }
  }

  /// Drop every entry. Models the full session boundary on logout.
  pub fn clear(&self) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.clear();
    }
    if let Ok(mut in_flight) = self.in_flight.lock() {
      in_flight.clear();
    }
  }

  /// Number of cached entries.
  pub fn len(&self) -> usize {
    self.entries.lock().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn read_fresh<T: DeserializeOwned>(
    &self,
    key: &QueryKey,
    stale_after: Duration,
  ) -> ApiResult<Option<T>> {
    let entries = self.lock_entries()?;
    let Some(entry) = entries.get(key) else {
      return Ok(None);
    };
    if !entry.is_fresh(stale_after) {
      return Ok(None);
    }

    serde_json::from_value(entry.value.clone())
      .map(Some)
      .map_err(|e| ApiError::local(format!("Failed to decode cached value: {}", e)))
  }

  fn drop_flight_guard(&self, key: &QueryKey) {
    if let Ok(mut in_flight) = self.in_flight.lock() {
      in_flight.remove(key);
    }
  }

  #[cfg(test)]
  fn flight_guard_count(&self) -> usize {
    self.in_flight.lock().map(|g| g.len()).unwrap_or(0)
  }

  fn flight_guard(&self, key: &QueryKey) -> ApiResult<Arc<tokio::sync::Mutex<()>>> {
    let mut in_flight = self
      .in_flight
      .lock()
      .map_err(|_| ApiError::local("Cache lock poisoned"))?;
    Ok(
      in_flight
        .entry(key.clone())
        .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
        .clone(),
    )
  }

  fn lock_entries(&self) -> ApiResult<std::sync::MutexGuard<'_, HashMap<QueryKey, Entry>>> {
    self
      .entries
      .lock()
      .map_err(|_| ApiError::local("Cache lock poisoned"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};

  const MINUTE: Duration = Duration::from_secs(60);

  fn cache() -> Arc<QueryCache> {
    Arc::new(QueryCache::new(RetryPolicy::none()))
  }

  fn counting_fetcher(calls: Arc<AtomicU32>, value: u32) -> impl Fn() -> futures::future::Ready<ApiResult<u32>> {
    move || {
      calls.fetch_add(1, Ordering::SeqCst);
      futures::future::ready(Ok(value))
    }
  }

  #[tokio::test]
  async fn test_fresh_hit_skips_network() {
    let cache = cache();
    let key = QueryKey::root("staff").push("list");
    let calls = Arc::new(AtomicU32::new(0));

    let first = cache
      .fetch(&key, MINUTE, counting_fetcher(calls.clone(), 7))
      .await
      .unwrap();
    let second = cache
      .fetch(&key, MINUTE, counting_fetcher(calls.clone(), 8))
      .await
      .unwrap();

    assert_eq!(first, 7);
    assert_eq!(second, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_staleness_window_triggers_revalidation() {
    let cache = cache();
    let key = QueryKey::root("jobs").push("list");
    let calls = Arc::new(AtomicU32::new(0));

    cache
      .fetch(&key, Duration::from_secs(30), counting_fetcher(calls.clone(), 1))
      .await
      .unwrap();

    tokio::time::advance(Duration::from_secs(31)).await;

    let revalidated = cache
      .fetch(&key, Duration::from_secs(30), counting_fetcher(calls.clone(), 2))
      .await
      .unwrap();

    assert_eq!(revalidated, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_prefix_invalidation_hits_arbitrary_filters() {
    let cache = cache();
    let lists = QueryKey::root("staff").push("list");
    let keys: Vec<QueryKey> = (0..4)
      .map(|i| lists.clone().push(format!("{{\"page\":{}}}", i)))
      .collect();
    let detail = QueryKey::root("staff").push("detail").push("9");

    let calls = Arc::new(AtomicU32::new(0));
    for key in &keys {
      cache
        .fetch(key, MINUTE, counting_fetcher(calls.clone(), 1))
        .await
        .unwrap();
    }
    cache
      .fetch(&detail, MINUTE, counting_fetcher(calls.clone(), 1))
      .await
      .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    // Invalidating the list scope must not require knowing the filters.
    cache.invalidate(&lists);

    for key in &keys {
      cache
        .fetch(key, MINUTE, counting_fetcher(calls.clone(), 2))
        .await
        .unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 9);

    // The detail entry was outside the invalidated scope.
    cache
      .fetch(&detail, MINUTE, counting_fetcher(calls.clone(), 2))
      .await
      .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 9);
  }

  #[tokio::test]
  async fn test_direct_write_satisfies_next_read() {
    let cache = cache();
    let key = QueryKey::root("auth").push("user");
    cache.set(&key, &"alice".to_string()).unwrap();

    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();
    let user: String = cache
      .fetch(&key, MINUTE, move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(Ok("network".to_string()))
      })
      .await
      .unwrap();

    assert_eq!(user, "alice");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_update_applies_in_place() {
    let cache = cache();
    let key = QueryKey::root("notifications").push("count");
    cache.set(&key, &10u32).unwrap();

    let updated = cache.update(&key, |count: u32| count + 1).unwrap();
    assert!(updated);
    assert_eq!(cache.peek::<u32>(&key), Some(11));

    let missing = QueryKey::root("notifications").push("unread");
    assert!(!cache.update(&missing, |count: u32| count).unwrap());
  }

  #[tokio::test]
  async fn test_failure_propagates_and_leaves_no_entry() {
    let cache = cache();
    let key = QueryKey::root("loans").push("terms");

    let result: ApiResult<u32> = cache
      .fetch(&key, MINUTE, || {
        futures::future::ready(Err(ApiError::network()))
      })
      .await;

    assert_eq!(result.unwrap_err().status, 0);
    assert!(cache.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_concurrent_fetches_deduplicate() {
    let cache = cache();
    let key = QueryKey::root("staff").push("list");
    let calls = Arc::new(AtomicU32::new(0));

    let fetch = |cache: Arc<QueryCache>, key: QueryKey, calls: Arc<AtomicU32>| async move {
      cache
        .fetch(&key, MINUTE, move || {
          let calls = calls.clone();
          async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(99u32)
          }
        })
        .await
        .unwrap()
    };

    let a = tokio::spawn(fetch(cache.clone(), key.clone(), calls.clone()));
    let b = tokio::spawn(fetch(cache.clone(), key.clone(), calls.clone()));

    assert_eq!(a.await.unwrap(), 99);
    assert_eq!(b.await.unwrap(), 99);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_flight_guards_are_pruned_after_fetch() {
    let cache = cache();
    let calls = Arc::new(AtomicU32::new(0));

    for i in 0..8 {
      let key = QueryKey::root("staff").push("search").push(format!("q{}", i));
      cache
        .fetch(&key, MINUTE, counting_fetcher(calls.clone(), i))
        .await
        .unwrap();
    }

    // Every fetch completed, so no per-key guard may remain.
    assert_eq!(cache.flight_guard_count(), 0);

    // Failed fetches must not leave a guard behind either.
    let failing = QueryKey::root("loans").push("terms");
    let result: ApiResult<u32> = cache
      .fetch(&failing, MINUTE, || {
        futures::future::ready(Err(ApiError::network()))
      })
      .await;
    assert!(result.is_err());
    assert_eq!(cache.flight_guard_count(), 0);
  }

  #[tokio::test]
  async fn test_clear_drops_everything() {
    let cache = cache();
    cache.set(&QueryKey::root("staff"), &1u32).unwrap();
    cache.set(&QueryKey::root("jobs"), &2u32).unwrap();
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
  }

  #[tokio::test]
  async fn test_remove_drops_scope_only() {
    let cache = cache();
    let docs = QueryKey::root("loans").push("documents").push("7");
    cache.set(&docs, &1u32).unwrap();
    cache.set(&QueryKey::root("loans").push("terms"), &2u32).unwrap();

    cache.remove(&QueryKey::root("loans").push("documents"));
    assert_eq!(cache.peek::<u32>(&docs), None);
    assert_eq!(cache.len(), 1);
  }
}
