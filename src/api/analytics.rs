//! Analytics reads.
//!
//! Everything here is derived data recomputed server-side on its own
//! schedule, so the windows are long and there are no mutations.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::ApiResult;

use super::types::{DashboardStats, EarningsPoint, SkillDemand, TrendPoint};

const DASHBOARD_STALE: Duration = Duration::from_secs(5 * 60);
const TREND_STALE: Duration = Duration::from_secs(10 * 60);

/// Cache-key taxonomy for analytics.
pub mod keys {
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("analytics")
  }

  pub fn dashboard(user_id: &str) -> QueryKey {
    all().push("dashboard").push(user_id)
  }

  pub fn earnings(user_id: &str, period: &str) -> QueryKey {
    all().push("earnings").push(user_id).push(period)
  }

  pub fn performance(user_id: &str) -> QueryKey {
    all().push("performance").push(user_id)
  }

  pub fn trends(kind: &str, period: &str) -> QueryKey {
    all().push("trends").push(kind).push(period)
  }

  pub fn skill_demand() -> QueryKey {
    all().push("skill-demand")
  }

  pub fn company(company_id: &str) -> QueryKey {
    all().push("company").push(company_id)
  }

  pub fn staff(staff_id: &str) -> QueryKey {
    all().push("staff").push(staff_id)
  }

  pub fn platform() -> QueryKey {
    all().push("platform")
  }
}

#[derive(Clone)]
pub struct AnalyticsApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
}

impl AnalyticsApi {
  pub(crate) fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
    Self { client, cache }
  }

  /// Headline dashboard numbers for one user. Gated on a non-empty id.
  pub async fn dashboard_stats(&self, user_id: &str) -> ApiResult<Option<DashboardStats>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    let key = keys::dashboard(user_id);
    let client = self.client.clone();
    let endpoint = format!("/analytics/dashboard/{}", user_id);

    self
      .cache
      .fetch(&key, DASHBOARD_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Earnings series for one user over a period (`month`, `year`, ...).
  pub async fn earnings(
    &self,
    user_id: &str,
    period: &str,
  ) -> ApiResult<Option<Vec<EarningsPoint>>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    let key = keys::earnings(user_id, period);
    let client = self.client.clone();
    let endpoint = format!("/analytics/earnings/{}", user_id);
    let params = vec![("period".to_string(), period.to_string())];

    self
      .cache
      .fetch(&key, DASHBOARD_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        let params = params.clone();
        async move { client.get(&endpoint, &params).await }
      })
      .await
      .map(Some)
  }

  /// Performance series for one user.
  pub async fn performance(&self, user_id: &str) -> ApiResult<Option<Vec<TrendPoint>>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    let key = keys::performance(user_id);
    let client = self.client.clone();
    let endpoint = format!("/analytics/performance/{}", user_id);

    self
      .cache
      .fetch(&key, DASHBOARD_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Platform-wide market trends of one kind (`hiring`, `rates`, ...)
  /// over a period.
  pub async fn market_trends(&self, kind: &str, period: &str) -> ApiResult<Vec<TrendPoint>> {
    let key = keys::trends(kind, period);
    let client = self.client.clone();
    let params = vec![
      ("type".to_string(), kind.to_string()),
      ("period".to_string(), period.to_string()),
    ];

    self
      .cache
      .fetch(&key, TREND_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/analytics/trends", &params).await }
      })
      .await
  }

  /// Which skills the market is asking for.
  pub async fn skill_demand(&self) -> ApiResult<Vec<SkillDemand>> {
    let key = keys::skill_demand();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, TREND_STALE, move || {
        let client = client.clone();
        async move { client.get("/analytics/skill-demand", &[]).await }
      })
      .await
  }

  /// Per-company analytics snapshot (shape owned by the reporting
  /// service).
  pub async fn company(&self, company_id: &str) -> ApiResult<Option<serde_json::Value>> {
    if company_id.is_empty() {
      return Ok(None);
    }

    let key = keys::company(company_id);
    let client = self.client.clone();
    let endpoint = format!("/analytics/company/{}", company_id);

    self
      .cache
      .fetch(&key, DASHBOARD_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Per-staff analytics snapshot.
  pub async fn staff(&self, staff_id: &str) -> ApiResult<Option<serde_json::Value>> {
    if staff_id.is_empty() {
      return Ok(None);
    }

    let key = keys::staff(staff_id);
    let client = self.client.clone();
    let endpoint = format!("/analytics/staff/{}", staff_id);

    self
      .cache
      .fetch(&key, DASHBOARD_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Platform totals (admin surface).
  pub async fn platform(&self) -> ApiResult<serde_json::Value> {
    let key = keys::platform();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, TREND_STALE, move || {
        let client = client.clone();
        async move { client.get("/analytics/platform", &[]).await }
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::session::MemoryTokenStore;
  use crate::util::RetryPolicy;

  fn api() -> AnalyticsApi {
    let mut config = Config::default();
    config.api.base_url = "http://127.0.0.1:9".to_string();
    let client = ApiClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap();
    AnalyticsApi::new(
      Arc::new(client),
      Arc::new(QueryCache::new(RetryPolicy::none())),
    )
  }

  #[tokio::test]
  async fn test_per_user_reads_are_gated_on_an_id() {
    let api = api();
    assert!(api.dashboard_stats("").await.unwrap().is_none());
    assert!(api.earnings("", "month").await.unwrap().is_none());
    assert!(api.performance("").await.unwrap().is_none());
    assert!(api.company("").await.unwrap().is_none());
    assert!(api.staff("").await.unwrap().is_none());
  }

  #[test]
  fn test_keys_scope_per_user_and_period() {
    assert!(keys::dashboard("u1").starts_with(&keys::all()));
    assert_ne!(keys::dashboard("u1"), keys::dashboard("u2"));
    assert_ne!(keys::earnings("u1", "month"), keys::earnings("u1", "year"));
    assert_ne!(keys::trends("hiring", "q1"), keys::trends("rates", "q1"));
    assert_ne!(keys::company("c1"), keys::staff("c1"));
  }
}
