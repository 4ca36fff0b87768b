//! PotPlayer window-message protocol.
//!
//! PotPlayer exposes playback state to other processes through `WM_USER`
//! messages sent to its main window; the reply value carries the answer.

use crate::jellyfin::TICKS_PER_MILLISECOND;

/// Base value for application-defined window messages.
pub const WM_USER: u32 = 0x0400;

/// Request code for the current position in milliseconds.
pub const POT_GET_CURRENT_TIME: u32 = 0x5004;

/// Request code for the playback status.
pub const POT_GET_PLAY_STATUS: u32 = 0x5006;

/// Status reply: playback stopped.
pub const POT_STATUS_STOPPED: i32 = -1;

/// Status reply: playback paused.
pub const POT_STATUS_PAUSED: i32 = 1;

/// Status reply: actively playing.
pub const POT_STATUS_PLAYING: i32 = 2;

/// Progress event derived from a raw status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
  TimeUpdate,
  Pause,
  Stop,
  Unknown,
}

impl PlaybackEvent {
  /// Map a raw status reply to the event reported to the server.
  /// Unrecognized codes still produce a reportable event.
  pub fn from_status(status: i32) -> Self {
    match status {
      POT_STATUS_PLAYING => PlaybackEvent::TimeUpdate,
      POT_STATUS_PAUSED => PlaybackEvent::Pause,
      POT_STATUS_STOPPED => PlaybackEvent::Stop,
      _ => PlaybackEvent::Unknown,
    }
  }

  /// Event name as sent in progress reports.
  pub fn as_str(&self) -> &'static str {
    match self {
      PlaybackEvent::TimeUpdate => "timeupdate",
      PlaybackEvent::Pause => "pause",
      PlaybackEvent::Stop => "stop",
      PlaybackEvent::Unknown => "unknown",
    }
  }
}

/// One observation of the player, taken by a probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSample {
  pub status: i32,
  pub event: PlaybackEvent,
  pub position_ms: u64,
  pub position_ticks: i64,
}

impl PlaybackSample {
  /// Build a sample from the two raw replies of a probe cycle.
  pub fn new(status: i32, position_ms: u64) -> Self {
    Self {
      status,
      event: PlaybackEvent::from_status(status),
      position_ms,
      position_ticks: position_ms as i64 * TICKS_PER_MILLISECOND,
    }
  }
}
