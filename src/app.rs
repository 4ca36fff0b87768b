//! One playback session, end to end.
//!
//! Wires configuration, the Jellyfin session, single-instance takeover, the
//! PotPlayer launch and the progress monitor together for a single
//! `jellypot://` invocation.

use crate::config::AppConfig;
use crate::instance::InstanceCoordinator;
use crate::jellyfin::{redact_url, ticks_to_seconds, ClientIdentity, Credentials, JellyfinClient};
use crate::monitor::{MonitorExit, MonitorLoop, MonitorSettings, PLAYER_WARMUP};
use crate::potplayer::{launch, PlayerProbe, Win32Transport};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Play one media item and report progress until the player exits.
pub async fn run(item_id: &str) -> anyhow::Result<()> {
  let config = AppConfig::load().context("could not load configuration")?;

  let mut identity = ClientIdentity::default();
  if let Some(device_id) = &config.jellyfin.device_id {
    identity.device_id = device_id.clone();
  }
  let credentials = Credentials {
    username: config.jellyfin.username.clone(),
    password: config.jellyfin.password.clone(),
  };
  let client = Arc::new(
    JellyfinClient::new(&config.jellyfin.server_url, credentials, identity)
      .context("invalid Jellyfin server URL")?,
  );

  client
    .authenticate()
    .await
    .context("could not sign in to Jellyfin")?;

  let item = client
    .get_item(item_id)
    .await
    .context("could not fetch the media item")?;
  log::info!("Retrieved media info: {} ({})", item.name, item.item_type);

  let guard = InstanceCoordinator::new()
    .take_over()
    .await
    .context("could not become the active bridge instance")?;

  let url = client.download_url(item_id)?;
  log::info!("Playback URL: {}", redact_url(&url));

  let seek_seconds = ticks_to_seconds(item.user_data.playback_position_ticks);
  let player = launch(
    config.pot_player_path.as_deref().map(Path::new),
    &url,
    &item.name,
    seek_seconds,
  )
  .context("could not launch PotPlayer")?;
  log::info!(
    "PotPlayer started (pid {}), reporting every {}s",
    player.id(),
    config.reporting_interval
  );

  hide_console();

  let settings = MonitorSettings {
    item_id: item_id.to_string(),
    interval: config.reporting_interval(),
    warmup: PLAYER_WARMUP,
  };
  let monitor = MonitorLoop::new(
    PlayerProbe::new(Win32Transport::new()),
    client,
    settings,
    guard.cancel_token(),
  );
  match monitor.run().await {
    MonitorExit::PlayerExited => log::info!("playback session finished"),
    MonitorExit::Superseded => log::info!("handing over to the newer instance"),
  }
  Ok(())
}

/// Hide the console window the shell spawned for the protocol handler.
fn hide_console() {
  use windows::Win32::System::Console::GetConsoleWindow;
  use windows::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE};

  unsafe {
    let console = GetConsoleWindow();
    if !console.0.is_null() {
      let _ = ShowWindow(console, SW_HIDE);
    }
  }
}
