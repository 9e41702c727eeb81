use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, ApiResult};

/// Base URL used when no config file or environment override is present.
/// Points at the bundled mock backend of the demo product.
const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the backend, e.g. `https://api.staffhub.example/api`.
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
    }
  }
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./staffhub.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/staffhub/config.yaml
  ///
  /// The `STAFFHUB_API_URL` environment variable overrides the base URL
  /// from any of the above; with no file present the default mock-backend
  /// URL is used.
  pub fn load(explicit_path: Option<&Path>) -> ApiResult<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ApiError::local(format!(
          "Config file not found: {}",
          p.display()
        )));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("STAFFHUB_API_URL") {
      if !url.is_empty() {
        config.api.base_url = url;
      }
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("staffhub.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("staffhub").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> ApiResult<Self> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
      ApiError::local(format!(
        "Failed to read config file {}: {}",
        path.display(),
        e
      ))
    })?;

    serde_yaml::from_str(&contents).map_err(|e| {
      ApiError::local(format!(
        "Failed to parse config file {}: {}",
        path.display(),
        e
      ))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_points_at_mock_backend() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "http://localhost:3000/api");
  }

  #[test]
  fn test_load_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffhub.yaml");
    std::fs::write(&path, "api:\n  base_url: https://api.example.com/v1\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.api.base_url, "https://api.example.com/v1");
  }

  #[test]
  fn test_missing_explicit_path_errors() {
    let err = Config::load(Some(Path::new("/nonexistent/staffhub.yaml"))).unwrap_err();
    assert!(err.message.contains("Config file not found"));
  }
}
