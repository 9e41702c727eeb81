//! Resource operations.
//!
//! Each resource module owns its slice of the cache-key taxonomy (a
//! `keys` submodule) and an `*Api` handle whose reads go through the
//! shared [`QueryCache`] and whose writes reconcile it. [`Staffhub`]
//! bundles one handle per resource over a shared transport and cache.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::ApiResult;
use crate::session::TokenStore;
use crate::util::RetryPolicy;

pub mod activities;
pub mod analytics;
pub mod auth;
pub mod jobs;
pub mod loans;
pub mod notifications;
pub mod staff;
pub mod types;

pub use activities::ActivitiesApi;
pub use analytics::AnalyticsApi;
pub use auth::AuthApi;
pub use jobs::JobsApi;
pub use loans::LoansApi;
pub use notifications::NotificationsApi;
pub use staff::StaffApi;

/// Staleness window applied when a resource declares nothing shorter.
pub(crate) const DEFAULT_STALE: Duration = Duration::from_secs(60);

/// Search queries shorter than this never issue a network call.
pub(crate) const MIN_SEARCH_LEN: usize = 3;

/// One handle per resource, sharing a transport, token store and cache.
#[derive(Clone)]
pub struct Staffhub {
  pub auth: AuthApi,
  pub staff: StaffApi,
  pub jobs: JobsApi,
  pub loans: LoansApi,
  pub activities: ActivitiesApi,
  pub notifications: NotificationsApi,
  pub analytics: AnalyticsApi,
}

impl Staffhub {
  /// Wire up the full client from configuration and a token store.
  pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
    Self::with_retry(config, tokens, RetryPolicy::default())
  }

  /// Same as [`Staffhub::new`] with an explicit retry policy, mainly for
  /// tests that must not back off.
  pub fn with_retry(
    config: &Config,
    tokens: Arc<dyn TokenStore>,
    retry: RetryPolicy,
  ) -> ApiResult<Self> {
    let client = Arc::new(ApiClient::new(config, tokens.clone())?);
    let cache = Arc::new(QueryCache::new(retry));

    Ok(Self {
      auth: AuthApi::new(client.clone(), cache.clone(), tokens),
      staff: StaffApi::new(client.clone(), cache.clone()),
      jobs: JobsApi::new(client.clone(), cache.clone()),
      loans: LoansApi::new(client.clone(), cache.clone()),
      activities: ActivitiesApi::new(client.clone(), cache.clone()),
      notifications: NotificationsApi::new(client.clone(), cache.clone()),
      analytics: AnalyticsApi::new(client, cache),
    })
  }
}
