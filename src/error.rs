//! Typed error surface for the API access layer.
//!
//! Every failure, whether a transport problem or an HTTP error status,
//! resolves to an [`ApiError`] carrying the HTTP status (0 for failures
//! before a response was obtained), an optional machine-readable code from
//! the server, and a human message.

use serde::Deserialize;

/// Result alias used throughout the library.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error produced by the API access layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
  /// HTTP status of the failed response, or 0 for transport failures.
  pub status: u16,
  /// Server-supplied machine-readable code, when present.
  pub code: Option<String>,
  /// Human-readable message.
  pub message: String,
}

/// Shape of an error body returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: Option<String>,
  code: Option<String>,
}

impl ApiError {
  /// Connectivity/DNS/TLS failure before any response was obtained.
  pub fn network() -> Self {
    Self {
      status: 0,
      code: None,
      message: "Network error occurred".to_string(),
    }
  }

  /// Build an error from an HTTP status and the raw response body.
  ///
  /// A JSON parse failure on the body is tolerated; the error falls back
  /// to a generic `HTTP {status}: {reason}` message.
  pub fn from_response(status: u16, reason: &str, body: &str) -> Self {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (message, code) = match parsed {
      Some(ErrorBody {
        message: Some(message),
        code,
      }) => (message, code),
      Some(ErrorBody { message: None, code }) => (format!("HTTP {}: {}", status, reason), code),
      None => (format!("HTTP {}: {}", status, reason), None),
    };

    Self {
      status,
      code,
      message,
    }
  }

  /// A successful response whose body could not be decoded into the
  /// expected type.
  pub fn decode(status: u16, err: impl std::fmt::Display) -> Self {
    Self {
      status,
      code: None,
      message: format!("Failed to decode response: {}", err),
    }
  }

  /// A local failure (config, token persistence) with no HTTP status.
  pub fn local(message: impl Into<String>) -> Self {
    Self {
      status: 0,
      code: None,
      message: message.into(),
    }
  }

  /// Client errors (4xx) are deterministic; retrying cannot help.
  pub fn is_client_error(&self) -> bool {
    (400..500).contains(&self.status)
  }

  /// Whether the operation that produced this error may be retried.
  /// Network failures and server errors are retryable, client errors never.
  pub fn is_retryable(&self) -> bool {
    self.status == 0 || self.status >= 500
  }

  /// Whether this error signals a dead session (forced sign-out path).
  pub fn is_unauthorized(&self) -> bool {
    self.status == 401
  }
}
