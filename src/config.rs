use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  #[serde(default)]
  pub cache: CacheTuning,
  /// Directory for the news database and snapshot files
  /// (defaults to the platform data dir).
  pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the remote data backend.
  pub url: String,
}

/// Cache behavior knobs. The defaults are the contract; the config file may
/// tighten or loosen them per deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheTuning {
  /// Seconds a fetched collection counts as fresh.
  pub ttl_secs: u64,
  /// Hard cap on cached entries per type, front-preserving.
  pub max_items: usize,
  /// Maximum characters of article body kept in the in-memory cache.
  pub content_preview: usize,
  /// Serialized-size ceiling for one snapshot file, in bytes.
  pub snapshot_ceiling_bytes: usize,
}

impl Default for CacheTuning {
  fn default() -> Self {
    Self {
      ttl_secs: 60,
      max_items: 50,
      content_preview: 50,
      snapshot_ceiling_bytes: 4 * 1024 * 1024,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./carecache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/carecache/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Config(format!("config file not found: {}", p.display())));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(Error::Config(
        "no configuration file found; create one at ~/.config/carecache/config.yaml".into(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("carecache.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("carecache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("failed to read config file {}: {}", path.display(), e)))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| Error::Config(format!("failed to parse config file {}: {}", path.display(), e)))?;

    Ok(config)
  }

  /// Get the backend API key from the environment.
  pub fn get_backend_key() -> Result<String> {
    std::env::var("CARECACHE_BACKEND_KEY").map_err(|_| {
      Error::Config("backend key not found; set the CARECACHE_BACKEND_KEY environment variable".into())
    })
  }

  /// Resolve the data directory, creating nothing.
  pub fn data_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.data_dir {
      return Ok(dir.clone());
    }

    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|p| p.join("carecache"))
      .ok_or_else(|| Error::Config("could not determine data directory".into()))
  }
}
