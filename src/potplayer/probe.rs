//! Playback state sampling.
//!
//! One probe cycle locates the player window and asks it for status and
//! position. Every failure along the way means the same thing to callers:
//! the player is no longer reachable, which the monitor loop treats as a
//! normal end of playback rather than an error to retry.

use thiserror::Error;

use super::protocol::{PlaybackSample, POT_GET_CURRENT_TIME, POT_GET_PLAY_STATUS};
use super::transport::PlayerWindow;

/// Errors raised while probing the player.
#[derive(Debug, Error)]
pub enum ProbeError {
  #[error("PotPlayer window not found")]
  WindowNotFound,

  #[error("query {request:#06x} failed: {source}")]
  Query {
    request: u32,
    source: std::io::Error,
  },
}

/// Delivery of query messages to the player window.
///
/// Splitting this from the probe keeps the Win32 message plumbing behind a
/// seam the tests can script.
pub trait PlayerTransport: Send + Sync {
  /// Find the player's main window.
  fn locate(&self) -> Result<PlayerWindow, ProbeError>;

  /// Send one query message and return the raw reply value.
  fn query(&self, window: PlayerWindow, request: u32) -> Result<isize, ProbeError>;
}

/// Samples playback state through a [`PlayerTransport`].
pub struct PlayerProbe<T> {
  transport: T,
}

impl<T: PlayerTransport> PlayerProbe<T> {
  pub fn new(transport: T) -> Self {
    Self { transport }
  }

  /// Take one playback sample.
  ///
  /// The window is located fresh on every call so a player restart between
  /// cycles cannot leave the probe pointed at a dead handle.
  pub fn probe(&self) -> Result<PlaybackSample, ProbeError> {
    let window = self.transport.locate()?;
    let status = self.transport.query(window, POT_GET_PLAY_STATUS)?;
    let position_ms = self.transport.query(window, POT_GET_CURRENT_TIME)?;
    Ok(PlaybackSample::new(status as i32, position_ms.max(0) as u64))
  }
}
