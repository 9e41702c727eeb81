//! Activity feed operations.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::util::query_pairs;

use super::types::{Ack, Activity, ActivityDraft, ActivityFilters, ActivityStats, Paginated};
use super::DEFAULT_STALE;

/// Feeds move quickly, so lists go stale fast.
const LIST_STALE: Duration = Duration::from_secs(30);

/// Cache-key taxonomy for the activity feed.
pub mod keys {
  use crate::api::types::ActivityFilters;
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("activities")
  }

  pub fn lists() -> QueryKey {
    all().push("list")
  }

  pub fn list(filters: &ActivityFilters) -> QueryKey {
    lists().push_filter(filters)
  }

  pub fn user(user_id: &str) -> QueryKey {
    all().push("user").push(user_id)
  }

  pub fn stats(user_id: &str) -> QueryKey {
    all().push("stats").push(user_id)
  }
}

#[derive(Clone)]
pub struct ActivitiesApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
}

impl ActivitiesApi {
  pub(crate) fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
    Self { client, cache }
  }

  /// One page of the platform-wide feed under the given filters.
  pub async fn list(&self, filters: &ActivityFilters) -> ApiResult<Paginated<Activity>> {
    let key = keys::list(filters);
    let client = self.client.clone();
    let params = query_pairs(filters);

    self
      .cache
      .fetch(&key, LIST_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/activities", &params).await }
      })
      .await
  }

  /// One user's activity, optionally filtered. Gated on a non-empty id.
  pub async fn for_user(
    &self,
    user_id: &str,
    filters: &ActivityFilters,
  ) -> ApiResult<Option<Vec<Activity>>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    // Nested under the per-user scope so invalidating the user hits
    // every filtered variant.
    let key = keys::user(user_id).push_filter(filters);
    let client = self.client.clone();
    let endpoint = format!("/activities/user/{}", user_id);
    let params = query_pairs(filters);

    self
      .cache
      .fetch(&key, LIST_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        let params = params.clone();
        async move { client.get(&endpoint, &params).await }
      })
      .await
      .map(Some)
  }

  /// Aggregate feed statistics for one user. Gated on a non-empty id.
  pub async fn stats(&self, user_id: &str) -> ApiResult<Option<ActivityStats>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    let key = keys::stats(user_id);
    let client = self.client.clone();
    let endpoint = format!("/activities/stats/{}", user_id);

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Record a new activity.
  pub async fn create(&self, draft: &ActivityDraft) -> ApiResult<Activity> {
    let activity = self.client.post("/activities", draft).await?;
    self.cache.invalidate(&keys::lists());
    Ok(activity)
  }

  /// Mark one activity read. Read state shows up in lists, per-user feeds
  /// and stats alike, so the whole scope is invalidated.
  pub async fn mark_read(&self, id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .patch_empty(&format!("/activities/{}/read", id))
      .await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }

  /// Mark the caller's whole feed read.
  pub async fn mark_all_read(&self) -> ApiResult<Ack> {
    let ack = self.client.patch_empty("/activities/read-all").await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }

  /// Delete an activity.
  pub async fn delete(&self, id: &str) -> ApiResult<Ack> {
    let ack = self.client.delete(&format!("/activities/{}", id)).await?;
    self.cache.invalidate(&keys::lists());
    Ok(ack)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::ActivityType;

  #[test]
  fn test_filtered_list_keys_stay_under_lists_scope() {
    let filtered = ActivityFilters {
      activity_type: Some(ActivityType::Loan),
      ..ActivityFilters::default()
    };
    assert!(keys::list(&filtered).starts_with(&keys::lists()));
    assert_ne!(keys::list(&filtered), keys::list(&ActivityFilters::default()));
  }

  #[test]
  fn test_user_feed_keys_scope_per_user() {
    assert!(keys::user("u1").starts_with(&keys::all()));
    assert_ne!(keys::user("u1"), keys::user("u2"));
    assert!(!keys::user("u1").starts_with(&keys::lists()));
  }
}
