//! HTTP transport wrapper.
//!
//! Builds URLs with query parameters, attaches the bearer token from the
//! session store when one is present, serializes JSON bodies, and
//! normalizes failures into [`ApiError`]. This layer performs no retries
//! and imposes no timeout; both are the caller's concern.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::session::TokenStore;

/// Typed HTTP client for the backend.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
  pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| ApiError::local(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url: config.api.base_url.trim_end_matches('/').to_string(),
      tokens,
    })
  }

  /// Perform a request and decode the response.
  pub async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    endpoint: &str,
    params: &[(String, String)],
    body: Option<serde_json::Value>,
  ) -> ApiResult<T> {
    let url = self.build_url(endpoint, params)?;
    tracing::debug!(%method, %url, "api request");

    let mut request = self
      .http
      .request(method, url)
      .header(CONTENT_TYPE, "application/json");

    if let Some(token) = self.tokens.access_token() {
      request = request.bearer_auth(token);
    }

    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request.send().await.map_err(|_| ApiError::network())?;
    Self::handle_response(response).await
  }

  // Convenience operations, each fixing the method.

  pub async fn get<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    params: &[(String, String)],
  ) -> ApiResult<T> {
    self.request(Method::GET, endpoint, params, None).await
  }

  pub async fn post<T: DeserializeOwned, B: Serialize>(
    &self,
    endpoint: &str,
    body: &B,
  ) -> ApiResult<T> {
    self
      .request(Method::POST, endpoint, &[], Some(to_body(body)?))
      .await
  }

  /// POST with no body (acknowledgement-style endpoints).
  pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
    self.request(Method::POST, endpoint, &[], None).await
  }

  pub async fn put<T: DeserializeOwned, B: Serialize>(
    &self,
    endpoint: &str,
    body: &B,
  ) -> ApiResult<T> {
    self
      .request(Method::PUT, endpoint, &[], Some(to_body(body)?))
      .await
  }

  pub async fn patch<T: DeserializeOwned, B: Serialize>(
    &self,
    endpoint: &str,
    body: &B,
  ) -> ApiResult<T> {
    self
      .request(Method::PATCH, endpoint, &[], Some(to_body(body)?))
      .await
  }

  /// PATCH with no body (status-flip endpoints like close/reopen).
  pub async fn patch_empty<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
    self.request(Method::PATCH, endpoint, &[], None).await
  }

  pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
    self.request(Method::DELETE, endpoint, &[], None).await
  }

  pub(crate) fn build_url(&self, endpoint: &str, params: &[(String, String)]) -> ApiResult<Url> {
    let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
      .map_err(|e| ApiError::local(format!("Invalid URL for {}: {}", endpoint, e)))?;

    if !params.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Ok(url)
  }

  pub(crate) fn bearer_token(&self) -> Option<String> {
    self.tokens.access_token()
  }

  pub(crate) fn http(&self) -> &reqwest::Client {
    &self.http
  }

  pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
  ) -> ApiResult<T> {
    let status = response.status();

    if status.as_u16() >= 400 {
      let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
      let body = response.text().await.unwrap_or_default();
      return Err(ApiError::from_response(status.as_u16(), &reason, &body));
    }

    let is_json = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(|v| v.contains("application/json"))
      .unwrap_or(false);

    let text = response.text().await.map_err(|_| ApiError::network())?;

    if is_json {
      serde_json::from_str(&text).map_err(|e| ApiError::decode(status.as_u16(), e))
    } else {
      // Non-JSON success bodies surface as a plain string value.
      serde_json::from_value(serde_json::Value::String(text))
        .map_err(|e| ApiError::decode(status.as_u16(), e))
    }
  }
}

fn to_body<B: Serialize>(body: &B) -> ApiResult<serde_json::Value> {
  serde_json::to_value(body)
    .map_err(|e| ApiError::local(format!("Failed to serialize request body: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::MemoryTokenStore;

  fn client() -> ApiClient {
    let config = Config::default();
    ApiClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap()
  }

  #[test]
  fn test_build_url_appends_params() {
    let url = client()
      .build_url(
        "/staff",
        &[
          ("location".to_string(), "NY".to_string()),
          ("skills".to_string(), "a".to_string()),
          ("skills".to_string(), "b".to_string()),
        ],
      )
      .unwrap();

    assert_eq!(
      url.as_str(),
      "http://localhost:3000/api/staff?location=NY&skills=a&skills=b"
    );
  }

  #[test]
  fn test_build_url_without_params_has_no_query() {
    let url = client().build_url("/jobs/42", &[]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/api/jobs/42");
    assert_eq!(url.query(), None);
  }
}
