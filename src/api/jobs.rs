//! Job postings and applications.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::util::{next_page, query_pairs};

use super::types::{
  Ack, ApplicationStatus, Job, JobApplication, JobApplicationRequest, JobDraft, JobFilters,
  Paginated,
};
use super::{DEFAULT_STALE, MIN_SEARCH_LEN};

const LIST_STALE: Duration = Duration::from_secs(2 * 60);
const SEARCH_STALE: Duration = Duration::from_secs(30);

/// Cache-key taxonomy for the jobs resource.
pub mod keys {
  use crate::api::types::JobFilters;
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("jobs")
  }

  pub fn lists() -> QueryKey {
    all().push("list")
  }

  pub fn list(filters: &JobFilters) -> QueryKey {
    lists().push_filter(filters)
  }

  pub fn details() -> QueryKey {
    all().push("detail")
  }

  pub fn detail(id: &str) -> QueryKey {
    details().push(id)
  }

  pub fn applications() -> QueryKey {
    all().push("applications")
  }

  pub fn application(id: &str) -> QueryKey {
    applications().push(id)
  }

  pub fn my_jobs(user_id: &str) -> QueryKey {
    all().push("my-jobs").push(user_id)
  }

  pub fn my_applications(user_id: &str) -> QueryKey {
    all().push("my-applications").push(user_id)
  }

  pub fn search(query: &str) -> QueryKey {
    all().push("search").push(query)
  }

  pub fn recommendations(staff_id: &str) -> QueryKey {
    all().push("recommendations").push(staff_id)
  }

  pub fn company(company_id: &str) -> QueryKey {
    all().push("company").push(company_id)
  }
}

#[derive(Clone)]
pub struct JobsApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
}

impl JobsApi {
  pub(crate) fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
    Self { client, cache }
  }

  /// One page of job postings under the given filters.
  pub async fn list(&self, filters: &JobFilters) -> ApiResult<Paginated<Job>> {
    let key = keys::list(filters);
    let client = self.client.clone();
    let params = query_pairs(filters);

    self
      .cache
      .fetch(&key, LIST_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/jobs", &params).await }
      })
      .await
  }

  /// Every page of job postings, walked with the next-page rule.
  pub async fn list_all(&self, filters: &JobFilters) -> ApiResult<Vec<Job>> {
    let mut page = filters.page.unwrap_or(1);
    let mut jobs = Vec::new();

    loop {
      let result = self.list(&filters.clone().with_page(page)).await?;
      jobs.extend(result.data);
      // A backend stuck reporting the same page must not loop forever.
      match next_page(&result.pagination) {
        Some(next) if next > page => page = next,
        _ => break,
      }
    }

    Ok(jobs)
  }

  /// Job by id. Gated on a non-empty id.
  pub async fn by_id(&self, id: &str) -> ApiResult<Option<Job>> {
    if id.is_empty() {
      return Ok(None);
    }

    let key = keys::detail(id);
    let client = self.client.clone();
    let endpoint = format!("/jobs/{}", id);

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

  /// Search job postings, gated at three characters.
  pub async fn search(
    &self,
    query: &str,
    filters: &JobFilters,
  ) -> ApiResult<Option<Paginated<Job>>> {
    if query.chars().count() < MIN_SEARCH_LEN {
      return Ok(None);
    }

    let key = keys::search(query);
    let client = self.client.clone();
    let mut params = vec![("q".to_string(), query.to_string())];
    params.extend(query_pairs(filters));

    self
      .cache
      .fetch(&key, SEARCH_STALE, move || {
        let client = client.clone();
        let params = params.clone();
        async move { client.get("/jobs/search", &params).await }
      })
      .await
      .map(Some)
  }

  /// Applications submitted for one job posting. Gated on a non-empty id.
  pub async fn applications(&self, job_id: &str) -> ApiResult<Option<Vec<JobApplication>>> {
    if job_id.is_empty() {
      return Ok(None);
    }

    let key = keys::application(job_id);
    let client = self.client.clone();
    let endpoint = format!("/jobs/{}/applications", job_id);

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

  /// Postings created by the caller (company side), scoped per user id.
  pub async fn my_jobs(&self, user_id: &str) -> ApiResult<Option<Vec<Job>>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    let key = keys::my_jobs(user_id);
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        async move { client.get("/jobs/my-jobs", &[]).await }
      })
      .await
      .map(Some)
  }

  /// The caller's own applications, scoped per user id.
  pub async fn my_applications(&self, user_id: &str) -> ApiResult<Option<Vec<JobApplication>>> {
    if user_id.is_empty() {
      return Ok(None);
    }

    let key = keys::my_applications(user_id);
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        async move { client.get("/jobs/my-applications", &[]).await }
      })
      .await
      .map(Some)
  }

  /// Jobs recommended for a staff member. Gated on a non-empty id.
  pub async fn recommended(&self, staff_id: &str) -> ApiResult<Option<Vec<Job>>> {
    if staff_id.is_empty() {
      return Ok(None);
    }

    let key = keys::recommendations(staff_id);
    let client = self.client.clone();
    let endpoint = format!("/jobs/recommendations/{}", staff_id);

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

  /// All postings belonging to one company.
  pub async fn company_jobs(&self, company_id: &str) -> ApiResult<Option<Vec<Job>>> {
    if company_id.is_empty() {
      return Ok(None);
    }

    let key = keys::company(company_id);
    let client = self.client.clone();
    let endpoint = format!("/jobs/company/{}", company_id);

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

  /// Post a new job. Invalidates every cached list; which lists the new
  /// posting lands in depends on their filters.
  pub async fn create(&self, draft: &JobDraft) -> ApiResult<Job> {
    let job = self.client.post("/jobs", draft).await?;
    self.cache.invalidate(&keys::lists());
    Ok(job)
  }

  /// Update a posting. Targeted invalidation: its detail entry plus lists.
  pub async fn update(&self, id: &str, draft: &JobDraft) -> ApiResult<Job> {
    let job = self.client.put(&format!("/jobs/{}", id), draft).await?;
    self.cache.invalidate_many(&[keys::detail(id), keys::lists()]);
    Ok(job)
  }

  /// Delete a posting.
  pub async fn delete(&self, id: &str) -> ApiResult<Ack> {
    let ack = self.client.delete(&format!("/jobs/{}", id)).await?;
    self.cache.invalidate_many(&[keys::detail(id), keys::lists()]);
    Ok(ack)
  }

  /// Close an open posting.
  pub async fn close(&self, id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .patch_empty(&format!("/jobs/{}/close", id))
      .await?;
    self.cache.invalidate_many(&[keys::detail(id), keys::lists()]);
    Ok(ack)
  }

  /// Reopen a closed posting.
  pub async fn reopen(&self, id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .patch_empty(&format!("/jobs/{}/reopen", id))
      .await?;
    self.cache.invalidate_many(&[keys::detail(id), keys::lists()]);
    Ok(ack)
  }

  /// Apply to a job. Invalidates the whole applications scope (the new
  /// application shows up under both the job's and the caller's lists).
  pub async fn apply(&self, request: &JobApplicationRequest) -> ApiResult<JobApplication> {
    let application = self.client.post("/jobs/apply", request).await?;
    self
      .cache
      .invalidate_many(&[keys::applications(), keys::all().push("my-applications")]);
    Ok(application)
  }

  /// Accept or reject an application.
  pub async fn update_application_status(
    &self,
    application_id: &str,
    status: ApplicationStatus,
  ) -> ApiResult<Ack> {
    let ack = self
      .client
      .patch(
        &format!("/jobs/applications/{}", application_id),
        &serde_json::json!({ "status": status }),
      )
      .await?;
    self.cache.invalidate(&keys::applications());
    Ok(ack)
  }

  /// Withdraw the caller's application.
  pub async fn withdraw_application(&self, application_id: &str) -> ApiResult<Ack> {
    let ack = self
      .client
      .delete(&format!("/jobs/applications/{}", application_id))
      .await?;
    self
      .cache
      .invalidate_many(&[keys::applications(), keys::all().push("my-applications")]);
    Ok(ack)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_application_keys_nest_under_applications_scope() {
    assert!(keys::application("a1").starts_with(&keys::applications()));
    assert!(keys::applications().starts_with(&keys::all()));
    assert!(!keys::application("a1").starts_with(&keys::lists()));
  }

  #[test]
  fn test_list_keys_differ_per_filter() {
    let open = JobFilters {
      status: Some(crate::api::types::JobStatus::Open),
      ..JobFilters::default()
    };
    assert_ne!(keys::list(&JobFilters::default()), keys::list(&open));
  }
}
