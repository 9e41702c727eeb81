//! Staff directory operations.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::util::{next_page, query_pairs};

use super::types::{
  Ack, Availability, ContactRequest, HireRequest, Paginated, StaffFilters, StaffProfile,
};
use super::{DEFAULT_STALE, MIN_SEARCH_LEN};

const LIST_STALE: Duration = Duration::from_secs(2 * 60);
const SEARCH_STALE: Duration = Duration::from_secs(30);

/// Cache-key taxonomy for the staff resource.
pub mod keys {
  use crate::api::types::StaffFilters;
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("staff")
  }

  pub fn lists() -> QueryKey {
    all().push("list")
  }

  pub fn list(filters: &StaffFilters) -> QueryKey {
    lists().push_filter(filters)
  }

  pub fn details() -> QueryKey {
    all().push("detail")
  }

  pub fn detail(id: &str) -> QueryKey {
    details().push(id)
  }

  pub fn search(query: &str) -> QueryKey {
    all().push("search").push(query)
  }

  pub fn recommendations(company_id: &str) -> QueryKey {
    all().push("recommendations").push(company_id)
  }

  pub fn saved() -> QueryKey {
    all().push("saved")
  }
}

#[derive(Clone)]
pub struct StaffApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
}

impl StaffApi {
  pub(crate) fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
    Self { client, cache }
  }

  /// One page of the staff directory under the given filters.
  pub async fn list(&self, filters: &StaffFilters) -> ApiResult<Paginated<StaffProfile>> {
    let filters = filters.clone().normalized();
    let key = keys::list(&filters);
    let client = self.client.clone();
    let params = query_pairs(&filters);

    self
      .cache
      .fetch(&key, LIST_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/staff", &params).await }
      })
      .await
  }

  /// Every page of the directory, walked with the next-page rule.
  pub async fn list_all(&self, filters: &StaffFilters) -> ApiResult<Vec<StaffProfile>> {
    let filters = filters.clone().normalized();
    let mut page = filters.page.unwrap_or(1);
    let mut profiles = Vec::new();

    loop {
      let result = self.list(&filters.clone().with_page(page)).await?;
      profiles.extend(result.data);
      // A backend stuck reporting the same page must not loop forever.
      match next_page(&result.pagination) {
        Some(next) if next > page => page = next,
        _ => break,
      }
    }

    Ok(profiles)
  }

  /// Staff profile by id. Returns `None` without a network call when the
  /// id is empty.
  pub async fn by_id(&self, id: &str) -> ApiResult<Option<StaffProfile>> {
    if id.is_empty() {
      return Ok(None);
    }

    let key = keys::detail(id);
    let client = self.client.clone();
    let endpoint = format!("/staff/{}", id);

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

  /// Search the directory. Queries shorter than three characters never
  /// issue a network call; pair with [`crate::util::Debouncer`] at the
  /// input boundary.
  pub async fn search(
    &self,
    query: &str,
    filters: &StaffFilters,
  ) -> ApiResult<Option<Paginated<StaffProfile>>> {
    if query.chars().count() < MIN_SEARCH_LEN {
      return Ok(None);
    }

    let filters = filters.clone().normalized();
    let key = keys::search(query);
    let client = self.client.clone();
    let mut params = vec![("q".to_string(), query.to_string())];
    params.extend(query_pairs(&filters));

    self
      .cache
      .fetch(&key, SEARCH_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/staff/search", &params).await }
      })
      .await
      .map(Some)
  }

  /// Staff recommended for a company. Gated on a non-empty company id.
  pub async fn recommended(&self, company_id: &str) -> ApiResult<Option<Vec<StaffProfile>>> {
    if company_id.is_empty() {
      return Ok(None);
    }

    let key = keys::recommendations(company_id);
    let client = self.client.clone();
    let endpoint = format!("/staff/recommendations/{}", company_id);

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

  /// Lookup staff matching a skill set. POST read-style endpoint, not
  /// cached.
  pub async fn by_skills(&self, skills: &[String]) -> ApiResult<Vec<StaffProfile>> {
    self
      .client
      .post("/staff/by-skills", &serde_json::json!({ "skills": skills }))
      .await
  }

  /// The caller's saved (favorited) staff.
  pub async fn saved(&self) -> ApiResult<Vec<StaffProfile>> {
    let key = keys::saved();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        async move { client.get("/staff/saved", &[]).await }
      })
      .await
  }

  /// Per-staff analytics snapshot (shape owned by the analytics service).
  pub async fn analytics(&self, staff_id: &str) -> ApiResult<serde_json::Value> {
    self
      .client
      .get(&format!("/staff/{}/analytics", staff_id), &[])
      .await
  }

  /// Hire a staff member. The write affects an unknown set of cached
  /// lists and recommendations, so the whole staff scope is invalidated.
  pub async fn hire(&self, request: &HireRequest) -> ApiResult<Ack> {
    let ack = self.client.post("/staff/hire", request).await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }

  /// Send a message to a staff member. Nothing cached depends on it.
  pub async fn contact(&self, request: &ContactRequest) -> ApiResult<Ack> {
    self.client.post("/staff/contact", request).await
  }

  /// Update a staff member's availability. Targeted invalidation: the
  /// detail entry plus every cached list.
  pub async fn update_availability(
    &self,
    staff_id: &str,
    availability: Availability,
  ) -> ApiResult<Ack> {
    let ack = self
      .client
      .patch(
        &format!("/staff/{}/availability", staff_id),
        &serde_json::json!({ "availability": availability }),
      )
      .await?;

    self
      .cache
      .invalidate_many(&[keys::detail(staff_id), keys::lists()]);
    Ok(ack)
  }

  /// Save a staff member to favorites.
  pub async fn save(&self, staff_id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .post_empty(&format!("/staff/{}/save", staff_id))
      .await?;
    self.cache.invalidate(&keys::saved());
    Ok(ack)
  }

  /// Remove a staff member from favorites.
  pub async fn unsave(&self, staff_id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .delete(&format!("/staff/{}/save", staff_id))
      .await?;
    self.cache.invalidate(&keys::saved());
    Ok(ack)
  }
}
