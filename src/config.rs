//! Bridge configuration.
//!
//! Loaded from a `config.toml` next to the executable, falling back to the
//! platform config directory. There is no merging; the first file found is
//! the one used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("no config file found (searched: {0})")]
  NotFound(String),
  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    source: std::io::Error,
  },
  #[error("failed to parse {path}: {source}")]
  Parse {
    path: String,
    source: toml::de::Error,
  },
  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Progress reporting interval in seconds.
  #[serde(default = "default_reporting_interval")]
  pub reporting_interval: u64,

  /// Custom PotPlayer executable path (None = auto-detect).
  #[serde(default)]
  pub pot_player_path: Option<String>,

  pub jellyfin: JellyfinConfig,
}

/// Server connection section.
#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinConfig {
  pub server_url: String,
  pub username: String,
  pub password: String,

  /// Stable device id reported to the server (None = random per run).
  #[serde(default)]
  pub device_id: Option<String>,
}

fn default_reporting_interval() -> u64 {
  10
}

impl AppConfig {
  /// Load from the first config file found in [`search_paths`].
  ///
  /// [`search_paths`]: AppConfig::search_paths
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_first(&Self::search_paths())
  }

  fn load_first(paths: &[PathBuf]) -> Result<Self, ConfigError> {
    for path in paths {
      if path.is_file() {
        log::debug!("loading config from {}", path.display());
        return Self::load_from(path);
      }
    }
    let searched = paths
      .iter()
      .map(|p| p.display().to_string())
      .collect::<Vec<_>>()
      .join(", ");
    Err(ConfigError::NotFound(searched))
  }

  /// Candidate config locations, most specific first.
  pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
      if let Some(dir) = exe.parent() {
        paths.push(dir.join(CONFIG_FILE_NAME));
      }
    }
    if let Some(dir) = dirs::config_dir() {
      paths.push(dir.join("jellypot").join(CONFIG_FILE_NAME));
    }
    paths
  }

  /// Load and validate a specific file.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.display().to_string(),
      source,
    })?;
    let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
      path: path.display().to_string(),
      source,
    })?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
  }

  /// Validate configuration values.
  pub fn validate(&self) -> Result<(), String> {
    let url = self.jellyfin.server_url.trim();
    if url.is_empty() {
      return Err("jellyfin.server_url cannot be empty".to_string());
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
      return Err("jellyfin.server_url must start with http:// or https://".to_string());
    }
    if self.jellyfin.username.trim().is_empty() {
      return Err("jellyfin.username cannot be empty".to_string());
    }
    if self.reporting_interval < 1 || self.reporting_interval > 60 {
      return Err("reporting_interval must be between 1 and 60 seconds".to_string());
    }
    Ok(())
  }

  /// Reporting interval as a duration.
  pub fn reporting_interval(&self) -> Duration {
    Duration::from_secs(self.reporting_interval)
  }
}
