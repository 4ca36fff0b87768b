//! Jellyfin API types.
//!
//! These types mirror the Jellyfin API responses and requests used by the
//! bridge.

use serde::{Deserialize, Serialize};

/// Authentication response from Jellyfin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
  pub access_token: String,
  pub session_info: SessionInfo,
}

/// Session block of the authentication response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionInfo {
  pub id: String,
  pub user_id: String,
}

/// Media item (movie, episode, etc.).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaItem {
  pub id: String,
  pub name: String,
  #[serde(rename = "Type")]
  pub item_type: String,
  #[serde(default)]
  pub user_data: UserData,
}

/// Per-user playback state attached to an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserData {
  #[serde(default)]
  pub playback_position_ticks: i64,
  #[serde(default)]
  pub item_id: String,
}

/// Playback progress report (sent periodically to Jellyfin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackProgress {
  pub position_ticks: i64,
  pub playback_start_time_ticks: i64,
  pub play_method: String,
  pub media_source_id: String,
  pub can_seek: bool,
  pub item_id: String,
  pub event_name: String,
}

/// Ticks conversion helpers (1 tick = 100 nanoseconds).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks per millisecond.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Play method reported with every progress event.
pub const PLAY_METHOD_DIRECT: &str = "DirectPlay";

/// Convert ticks to whole seconds, truncating.
pub fn ticks_to_seconds(ticks: i64) -> i64 {
  ticks / TICKS_PER_SECOND
}

/// Current wall-clock time expressed in ticks since the Unix epoch.
pub fn unix_time_ticks() -> i64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|d| (d.as_nanos() / 100) as i64)
    .unwrap_or(0)
}
