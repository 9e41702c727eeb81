//! Cross-cutting helpers shared by the resource modules: query-string
//! building, retry with exponential backoff, debouncing for search input,
//! and pagination cursor math.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::api::types::Pagination;
use crate::error::ApiResult;

// ============================================================================
// Query-string building
// ============================================================================

/// Flatten a filter object into query pairs.
///
/// `None` fields, empty strings and empty arrays are skipped; array fields
/// repeat the key once per element (`skills=a&skills=b`), which is the
/// convention the backend expects.
pub fn query_pairs<F: Serialize>(filter: &F) -> Vec<(String, String)> {
  let value = match serde_json::to_value(filter) {
    Ok(serde_json::Value::Object(map)) => map,
    _ => return Vec::new(),
  };

  let mut pairs = Vec::new();
  for (key, value) in value {
    match value {
      serde_json::Value::Null => {}
      serde_json::Value::String(s) if s.is_empty() => {}
      serde_json::Value::String(s) => pairs.push((key, s)),
      serde_json::Value::Array(items) => {
        for item in items {
          pairs.push((key.clone(), scalar_to_string(&item)));
        }
      }
      other => pairs.push((key, scalar_to_string(&other))),
    }
  }

  pairs
}

fn scalar_to_string(value: &serde_json::Value) -> String {
  match value {
    serde_json::Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

// ============================================================================
// Retry policy
// ============================================================================

/// Retry policy for read operations.
///
/// Failed fetches are retried with exponential backoff unless the error is
/// a client error (4xx) - those are deterministic, retrying cannot help.
/// Mutations are never run under a retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  pub max_retries: u32,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_retries: 3 }
  }
}

impl RetryPolicy {
  /// Policy that never retries.
  pub fn none() -> Self {
    Self { max_retries: 0 }
  }

  /// Backoff before retry `attempt` (0-based): `min(1000 * 2^attempt, 30000)` ms.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    let ms = 1000u64.saturating_mul(1 << attempt.min(15)).min(30_000);
    Duration::from_millis(ms)
  }
}

/// Run `op` under the given retry policy.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, op: F) -> ApiResult<T>
where
  F: Fn() -> Fut,
  Fut: Future<Output = ApiResult<T>>,
{
  let mut attempt = 0u32;
  loop {
    match op().await {
      Ok(value) => return Ok(value),
      Err(err) if attempt < policy.max_retries && err.is_retryable() => {
        let delay = policy.delay_for(attempt);
        tracing::warn!(
          status = err.status,
          attempt = attempt + 1,
          delay_ms = delay.as_millis() as u64,
          "retrying failed request"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(err) => return Err(err),
    }
  }
}

// ============================================================================
// Debounce
// ============================================================================

/// Collapses rapid repeated calls into the last one.
///
/// Each `call` aborts the previously scheduled task and schedules the new
/// closure to run after `delay`. Used to throttle search-input-driven
/// reads so a request fires once typing pauses, not per keystroke.
pub struct Debouncer {
  delay: Duration,
  pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: Mutex::new(None),
    }
  }

  /// Schedule `f` to run after the delay, cancelling any pending call.
  pub fn call<F, Fut>(&self, f: F)
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let delay = self.delay;
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      f().await;
    });

    if let Ok(mut pending) = self.pending.lock() {
      if let Some(previous) = pending.replace(handle) {
        previous.abort();
      }
    }
  }

  /// Cancel any pending call without scheduling a new one.
  pub fn cancel(&self) {
    if let Ok(mut pending) = self.pending.lock() {
      if let Some(previous) = pending.take() {
        previous.abort();
      }
    }
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}

// ============================================================================
// Pagination
// ============================================================================

/// Next page number, or `None` when the current page is the last.
pub fn next_page(pagination: &Pagination) -> Option<u32> {
  if pagination.page < pagination.total_pages {
    Some(pagination.page + 1)
  } else {
    None
  }
}

/// Previous page number, or `None` on the first page.
pub fn previous_page(pagination: &Pagination) -> Option<u32> {
  if pagination.page > 1 {
    Some(pagination.page - 1)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ApiError;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  #[derive(Serialize)]
  #[serde(rename_all = "camelCase")]
  struct SampleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
  }

  #[test]
  fn test_query_pairs_repeats_array_keys_and_skips_unset() {
    let filter = SampleFilter {
      location: Some("NY".to_string()),
      skills: vec!["a".to_string(), "b".to_string()],
      min_rating: None,
      page: Some(2),
    };

    let pairs = query_pairs(&filter);
    assert!(pairs.contains(&("location".to_string(), "NY".to_string())));
    assert!(pairs.contains(&("skills".to_string(), "a".to_string())));
    assert!(pairs.contains(&("skills".to_string(), "b".to_string())));
    assert!(pairs.contains(&("page".to_string(), "2".to_string())));
    assert!(!pairs.iter().any(|(k, _)| k == "minRating"));
  }

  #[test]
  fn test_query_pairs_skips_empty_strings() {
    let filter = SampleFilter {
      location: Some(String::new()),
      skills: Vec::new(),
      min_rating: None,
      page: None,
    };

    assert!(query_pairs(&filter).is_empty());
  }

  #[test]
  fn test_backoff_caps_at_thirty_seconds() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
    assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
    assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    assert_eq!(policy.delay_for(10), Duration::from_millis(30_000));
  }

  #[tokio::test(start_paused = true)]
  async fn test_client_errors_are_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result: ApiResult<()> = with_retry(RetryPolicy::default(), move || {
      let calls = calls_clone.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(ApiError::from_response(404, "Not Found", ""))
      }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_server_errors_retry_three_times() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result: ApiResult<()> = with_retry(RetryPolicy::default(), move || {
      let calls = calls_clone.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(ApiError::from_response(500, "Internal Server Error", ""))
      }
    })
    .await;

    assert!(result.is_err());
    // 1 initial + 3 retries
    assert_eq!(calls.load(Ordering::SeqCst), 4);
  }

  #[tokio::test(start_paused = true)]
  async fn test_retry_succeeds_after_transient_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result = with_retry(RetryPolicy::default(), move || {
      let calls = calls_clone.clone();
      async move {
        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
          Err(ApiError::network())
        } else {
          Ok(42)
        }
      }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_debounce_collapses_to_last_call() {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let debouncer = Debouncer::new(Duration::from_millis(300));

    for i in 0..5 {
      let fired = fired.clone();
      debouncer.call(move || async move {
        fired.lock().unwrap().push(i);
      });
      tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tokio::time::sleep(Duration::from_millis(500)).await;

    let fired = fired.lock().unwrap();
    assert_eq!(*fired, vec![4]);
  }

  #[test]
  fn test_pagination_termination() {
    let last = Pagination {
      page: 3,
      limit: 10,
      total: 30,
      total_pages: 3,
    };
    assert_eq!(next_page(&last), None);
    assert_eq!(previous_page(&last), Some(2));

    let middle = Pagination {
      page: 2,
      limit: 10,
      total: 30,
      total_pages: 3,
    };
    assert_eq!(next_page(&middle), Some(3));

    let first = Pagination {
      page: 1,
      limit: 10,
      total: 30,
      total_pages: 3,
    };
    assert_eq!(previous_page(&first), None);
  }
}
