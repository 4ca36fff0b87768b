//! Steady-state playback monitoring.
//!
//! After the player is launched, the monitor polls it on a fixed interval
//! and reports each sample to the server. It ends in one of two expected
//! ways: the player goes away (probe failure) or a newer bridge instance
//! takes over (cancellation token). Report failures are transient and never
//! stop the loop; the client re-authenticates by itself on the next report
//! when the session was invalidated.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::jellyfin::{unix_time_ticks, JellyfinClient, PlaybackProgress, PLAY_METHOD_DIRECT};
use crate::potplayer::{PlayerProbe, PlayerTransport};

/// Delay between player launch and the first probe, giving PotPlayer time
/// to create its window.
pub const PLAYER_WARMUP: Duration = Duration::from_secs(3);

/// What ended a monitor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
  /// The player became unreachable; playback is over.
  PlayerExited,
  /// A newer instance requested this one to stop.
  Superseded,
}

/// Parameters of one monitoring session.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
  pub item_id: String,
  pub interval: Duration,
  pub warmup: Duration,
}

/// Poll-and-report loop for one playback session.
pub struct MonitorLoop<T> {
  probe: PlayerProbe<T>,
  client: Arc<JellyfinClient>,
  settings: MonitorSettings,
  cancel: CancellationToken,
}

impl<T: PlayerTransport> MonitorLoop<T> {
  pub fn new(
    probe: PlayerProbe<T>,
    client: Arc<JellyfinClient>,
    settings: MonitorSettings,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      probe,
      client,
      settings,
      cancel,
    }
  }

  /// Run until the player exits or this instance is superseded.
  pub async fn run(self) -> MonitorExit {
    tokio::select! {
      _ = self.cancel.cancelled() => {
        log::info!("superseded during warm-up, stopping");
        return MonitorExit::Superseded;
      }
      _ = tokio::time::sleep(self.settings.warmup) => {}
    }

    // Anchor for PlaybackStartTimeTicks, captured once per session.
    let start_ticks = unix_time_ticks();

    let mut ticker = tokio::time::interval_at(
      tokio::time::Instant::now() + self.settings.interval,
      self.settings.interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
      tokio::select! {
        _ = self.cancel.cancelled() => {
          log::info!("superseded by a newer instance, stopping progress reports");
          return MonitorExit::Superseded;
        }
        _ = ticker.tick() => {
          let sample = match self.probe.probe() {
            Ok(sample) => sample,
            Err(e) => {
              log::info!("PotPlayer has exited ({})", e);
              return MonitorExit::PlayerExited;
            }
          };

          let progress = PlaybackProgress {
            position_ticks: sample.position_ticks,
            playback_start_time_ticks: start_ticks,
            play_method: PLAY_METHOD_DIRECT.to_string(),
            media_source_id: self.settings.item_id.clone(),
            can_seek: true,
            item_id: self.settings.item_id.clone(),
            event_name: sample.event.as_str().to_string(),
          };

          match self.client.report_progress(&progress).await {
            Ok(()) => log::info!(
              "status updated: {}, position {} ticks",
              sample.event.as_str(),
              sample.position_ticks
            ),
            Err(e) => log::warn!("failed to report progress: {}", e),
          }
        }
      }
    }
  }
}
