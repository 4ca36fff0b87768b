//! Jellyfin error types.

use thiserror::Error;

/// Errors that can occur when interacting with Jellyfin.
#[derive(Debug, Error)]
pub enum JellyfinError {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Authentication failed: {0}")]
  AuthFailed(String),

  #[error("Item lookup failed: {0}")]
  ItemLookup(String),

  #[error("Progress report failed: {0}")]
  ReportFailed(String),

  #[error("Not authenticated")]
  NotAuthenticated,

  #[error("Invalid server URL: {0}")]
  InvalidUrl(String),
}
