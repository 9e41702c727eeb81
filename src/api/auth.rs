//! Authentication and the session lifecycle.
//!
//! The session moves through three states: signed out (no tokens), signed
//! in (token pair stored, requests carry the bearer token) and expired
//! (backend answered 401). Login, register and refresh all converge on
//! [`AuthApi::apply_session`]; logout and forced sign-out converge on
//! [`AuthApi::clear_session`], which also drops the whole query cache so
//! nothing from the previous session can leak across the boundary.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::session::TokenStore;

use super::types::{Ack, AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, User};

const USER_STALE: Duration = Duration::from_secs(5 * 60);

/// Cache-key taxonomy for the auth resource.
pub mod keys {
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("auth")
  }

  pub fn user() -> QueryKey {
    all().push("user")
  }

  pub fn profile(user_id: &str) -> QueryKey {
    all().push("profile").push(user_id)
  }
}

#[derive(Clone)]
pub struct AuthApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
  tokens: Arc<dyn TokenStore>,
}

impl AuthApi {
  pub(crate) fn new(
    client: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    tokens: Arc<dyn TokenStore>,
  ) -> Self {
    Self {
      client,
      cache,
      tokens,
    }
  }

  /// Whether a session is currently stored.
  pub fn is_signed_in(&self) -> bool {
    self.tokens.access_token().is_some()
  }

  /// Sign in with email and password.
  pub async fn login(&self, request: &LoginRequest) -> ApiResult<User> {
    let response: AuthResponse = self.client.post("/auth/login", request).await?;
    self.apply_session(response)
  }

  /// Create an account. The backend signs the new user in immediately.
  pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
    let response: AuthResponse = self.client.post("/auth/register", request).await?;
    self.apply_session(response)
  }

  /// Rotate the session using the stored refresh token.
  pub async fn refresh(&self) -> ApiResult<User> {
    let refresh = self
      .tokens
      .refresh_token()
      .ok_or_else(|| ApiError::local("No refresh token stored"))?;

    let response: AuthResponse = self
      .client
      .post("/auth/refresh", &serde_json::json!({ "refreshToken": refresh }))
      .await?;
    self.apply_session(response)
  }

  /// Sign out. The local session is torn down only once the backend has
  /// acknowledged the logout; on failure tokens and cache stay intact so
  /// the caller can retry. [`AuthApi::handle_unauthorized`] covers forced
  /// teardown when the backend no longer honors the session.
  pub async fn logout(&self) -> ApiResult<()> {
    self.client.post_empty::<Ack>("/auth/logout").await?;
    self.clear_session()
  }

  /// The authenticated user's account record.
  pub async fn current_user(&self) -> ApiResult<User> {
    let key = keys::user();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, USER_STALE, move || {
        let client = client.clone();
        async move { client.get("/auth/me", &[]).await }
      })
      .await
  }

  /// Update the caller's profile. The response is the fresh user record,
  /// written straight into the cache.
  pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
    let user: User = self.client.patch("/auth/profile", update).await?;
    self.cache.set(&keys::user(), &user)?;
    self.cache.invalidate(&keys::profile(&user.id));
    Ok(user)
  }

  pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<Ack> {
    self
      .client
      .post(
        "/auth/change-password",
        &serde_json::json!({ "currentPassword": current, "newPassword": new }),
      )
      .await
  }

  pub async fn forgot_password(&self, email: &str) -> ApiResult<Ack> {
    self
      .client
      .post("/auth/forgot-password", &serde_json::json!({ "email": email }))
      .await
  }

  pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<Ack> {
    self
      .client
      .post(
        "/auth/reset-password",
        &serde_json::json!({ "token": token, "password": new_password }),
      )
      .await
  }

  pub async fn verify_email(&self, token: &str) -> ApiResult<Ack> {
    self
      .client
      .post("/auth/verify-email", &serde_json::json!({ "token": token }))
      .await
  }

  /// Forced sign-out for callers that observed a 401: tears the session
  /// down without a logout call. A no-op for other errors.
  pub fn handle_unauthorized(&self, error: &ApiError) -> ApiResult<bool> {
    if !error.is_unauthorized() {
      return Ok(false);
    }
    self.clear_session()?;
    Ok(true)
  }

  /// Store the token pair and seed the user cache. Fails closed: if the
  /// tokens cannot be persisted the session is torn down rather than left
  /// half-applied.
  fn apply_session(&self, response: AuthResponse) -> ApiResult<User> {
    if let Err(e) = self
      .tokens
      .store(&response.token, &response.refresh_token)
    {
      self.clear_session()?;
      return Err(e);
    }

    self.cache.set(&keys::user(), &response.user)?;
    tracing::debug!(user = %response.user.id, "session established");
    Ok(response.user)
  }

  /// Remove the token pair and drop every cached query.
  fn clear_session(&self) -> ApiResult<()> {
    self.tokens.clear()?;
    self.cache.clear();
    tracing::debug!("session cleared");
    Ok(())
  }
}
