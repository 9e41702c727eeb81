//! Notification operations.
//!
//! Counts are the freshest data on the platform (they drive the badge in
//! the header), so they carry the shortest staleness window and can also be
//! polled as a stream via [`NotificationsApi::watch_count`].

use std::sync::Arc;
use std::time::Duration;

use futures::stream::Stream;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::util::query_pairs;

use super::types::{
  Ack, Notification, NotificationCounts, NotificationFilters, NotificationPreferences, Paginated,
};
use super::DEFAULT_STALE;

const LIST_STALE: Duration = Duration::from_secs(30);
const UNREAD_STALE: Duration = Duration::from_secs(15);
const COUNT_STALE: Duration = Duration::from_secs(10);

/// Cache-key taxonomy for notifications.
pub mod keys {
  use crate::api::types::NotificationFilters;
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("notifications")
  }

  pub fn lists() -> QueryKey {
    all().push("list")
  }

  pub fn list(filters: &NotificationFilters) -> QueryKey {
    lists().push_filter(filters)
  }

  pub fn unread() -> QueryKey {
    all().push("unread")
  }

  pub fn count() -> QueryKey {
    all().push("count")
  }

  pub fn preferences() -> QueryKey {
    all().push("preferences")
  }
}

#[derive(Clone)]
pub struct NotificationsApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
}

impl NotificationsApi {
  pub(crate) fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
    Self { client, cache }
  }

  /// One page of the caller's notifications.
  pub async fn list(&self, filters: &NotificationFilters) -> ApiResult<Paginated<Notification>> {
    let key = keys::list(filters);
    let client = self.client.clone();
    let params = query_pairs(filters);

    self
      .cache
      .fetch(&key, LIST_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/notifications", &params).await }
      })
      .await
  }

  /// Unread notifications only.
  pub async fn unread(&self) -> ApiResult<Vec<Notification>> {
    let key = keys::unread();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, UNREAD_STALE, move || {
        let client = client.clone();
        async move { client.get("/notifications/unread", &[]).await }
      })
      .await
  }

  /// Total and unread counts, for the badge.
  pub async fn count(&self) -> ApiResult<NotificationCounts> {
    let key = keys::count();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, COUNT_STALE, move || {
        let client = client.clone();
        async move { client.get("/notifications/count", &[]).await }
      })
      .await
  }

  /// Poll the counts endpoint on a fixed cadence, yielding each result.
  ///
  /// Errors are yielded rather than terminating the stream, so a blip in
  /// connectivity does not kill the badge. Dropping the stream stops the
  /// polling.
  pub fn watch_count(
    &self,
    every: Duration,
  ) -> impl Stream<Item = ApiResult<NotificationCounts>> + '_ {
    futures::stream::unfold(tokio::time::interval(every), move |mut ticker| async move {
      ticker.tick().await;
      Some((self.count().await, ticker))
    })
  }

  /// Notification delivery preferences.
  pub async fn preferences(&self) -> ApiResult<NotificationPreferences> {
    let key = keys::preferences();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        async move { client.get("/notifications/preferences", &[]).await }
      })
      .await
  }

  /// Replace the delivery preferences.
  pub async fn update_preferences(
    &self,
    preferences: &NotificationPreferences,
  ) -> ApiResult<NotificationPreferences> {
    let updated = self
      .client
      .put("/notifications/preferences", preferences)
      .await?;
    self.cache.set(&keys::preferences(), &updated)?;
    Ok(updated)
  }

  /// Mark one notification read. Lists, the unread view and the counts all
  /// change, so the whole scope is invalidated.
  pub async fn mark_read(&self, id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .patch_empty(&format!("/notifications/{}/read", id))
      .await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }

  /// Mark everything read.
  pub async fn mark_all_read(&self) -> ApiResult<Ack> {
    let ack = self.client.patch_empty("/notifications/read-all").await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }

  /// Delete a notification.
  pub async fn delete(&self, id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .delete(&format!("/notifications/{}", id))
      .await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }
}
