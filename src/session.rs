//! Token persistence for the authenticated session.
//!
//! The backend hands out an access token and a refresh token on
//! login/register. The access token is attached to every request; both are
//! removed on logout or forced sign-out. Storage is pluggable so tests and
//! embedders can keep tokens in memory.

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Storage for the session's token pair.
pub trait TokenStore: Send + Sync {
  /// The access token attached as `Authorization: Bearer <token>`.
  fn access_token(&self) -> Option<String>;

  /// The refresh token used to rotate the session.
  fn refresh_token(&self) -> Option<String>;

  /// Persist both tokens. Called on login/register/refresh success.
  fn store(&self, access: &str, refresh: &str) -> ApiResult<()>;

  /// Remove both tokens. Called on logout and forced sign-out.
  fn clear(&self) -> ApiResult<()>;
}

/// Serialized session file contents.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SessionFile {
  auth_token: Option<String>,
  refresh_token: Option<String>,
}

/// Token store backed by a JSON file in the platform data directory.
pub struct FileTokenStore {
  path: PathBuf,
  cached: RwLock<SessionFile>,
}

impl FileTokenStore {
  /// Open the store at the default location
  /// (`<data_dir>/staffhub/session.json`), loading any existing session.
  pub fn open() -> ApiResult<Self> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| ApiError::local("Could not determine data directory"))?;

    Self::open_at(data_dir.join("staffhub").join("session.json"))
  }

  /// Open the store at an explicit path.
  pub fn open_at(path: PathBuf) -> ApiResult<Self> {
    let cached = match std::fs::read_to_string(&path) {
      Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
      Err(_) => SessionFile::default(),
    };

    Ok(Self {
      path,
      cached: RwLock::new(cached),
    })
  }

  fn write_file(&self, session: &SessionFile) -> ApiResult<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| ApiError::local(format!("Failed to create session directory: {}", e)))?;
    }

    let contents = serde_json::to_string_pretty(session)
      .map_err(|e| ApiError::local(format!("Failed to serialize session: {}", e)))?;

    std::fs::write(&self.path, contents)
      .map_err(|e| ApiError::local(format!("Failed to write session file: {}", e)))
  }
}

impl TokenStore for FileTokenStore {
  fn access_token(&self) -> Option<String> {
    self.cached.read().ok()?.auth_token.clone()
  }

  fn refresh_token(&self) -> Option<String> {
    self.cached.read().ok()?.refresh_token.clone()
  }

  fn store(&self, access: &str, refresh: &str) -> ApiResult<()> {
    let session = SessionFile {
      auth_token: Some(access.to_string()),
      refresh_token: Some(refresh.to_string()),
    };
    self.write_file(&session)?;

    let mut cached = self
      .cached
      .write()
      .map_err(|_| ApiError::local("Session lock poisoned"))?;
    *cached = session;
    Ok(())
  }

  fn clear(&self) -> ApiResult<()> {
    if self.path.exists() {
      std::fs::remove_file(&self.path)
        .map_err(|e| ApiError::local(format!("Failed to remove session file: {}", e)))?;
    }

    let mut cached = self
      .cached
      .write()
      .map_err(|_| ApiError::local("Session lock poisoned"))?;
    *cached = SessionFile::default();
    Ok(())
  }
}

/// In-memory token store for tests and embedders.
#[derive(Default)]
pub struct MemoryTokenStore {
  session: RwLock<SessionFile>,
}

impl MemoryTokenStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl TokenStore for MemoryTokenStore {
  fn access_token(&self) -> Option<String> {
    self.session.read().ok()?.auth_token.clone()
  }

  fn refresh_token(&self) -> Option<String> {
    self.session.read().ok()?.refresh_token.clone()
  }

  fn store(&self, access: &str, refresh: &str) -> ApiResult<()> {
    let mut session = self
      .session
      .write()
      .map_err(|_| ApiError::local("Session lock poisoned"))?;
    session.auth_token = Some(access.to_string());
    session.refresh_token = Some(refresh.to_string());
    Ok(())
  }

  fn clear(&self) -> ApiResult<()> {
    let mut session = self
      .session
      .write()
      .map_err(|_| ApiError::local("Session lock poisoned"))?;
    *session = SessionFile::default();
    Ok(())
  }
}
