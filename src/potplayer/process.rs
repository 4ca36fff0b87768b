//! PotPlayer detection and spawning.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;

use crate::jellyfin::redact_url;

#[derive(Error, Debug)]
pub enum LaunchError {
  #[error("PotPlayer executable not found")]
  NotFound,
  #[error("Failed to spawn PotPlayer: {0}")]
  SpawnFailed(#[from] std::io::Error),
}

/// Find the PotPlayer executable in common locations.
pub fn find_potplayer() -> Option<PathBuf> {
  // Check PATH first
  for name in ["PotPlayerMini64.exe", "PotPlayerMini.exe"] {
    if let Ok(path) = which::which(name) {
      return Some(path);
    }
  }

  #[cfg(windows)]
  {
    let common_paths = [
      r"C:\Program Files\DAUM\PotPlayer\PotPlayerMini64.exe",
      r"C:\Program Files (x86)\DAUM\PotPlayer\PotPlayerMini.exe",
    ];
    for path in common_paths {
      let p = PathBuf::from(path);
      if p.exists() {
        return Some(p);
      }
    }
  }

  None
}

/// Command-line arguments for playing one item.
///
/// `/seek=` takes whole seconds and `/current` reuses a running PotPlayer
/// window instead of opening a second one.
pub fn launch_args(url: &str, title: &str, seek_seconds: i64) -> [String; 4] {
  [
    url.to_string(),
    format!("/title={}", title),
    format!("/seek={}", seek_seconds),
    "/current".to_string(),
  ]
}

/// Spawn PotPlayer on the given URL.
///
/// `player_path` overrides executable discovery when set (it comes from the
/// config file). The child's stdio is detached; the player outlives any
/// console the bridge runs in.
pub fn launch(
  player_path: Option<&Path>,
  url: &str,
  title: &str,
  seek_seconds: i64,
) -> Result<Child, LaunchError> {
  let exe = player_path
    .map(Path::to_path_buf)
    .or_else(find_potplayer)
    .ok_or(LaunchError::NotFound)?;

  log::info!(
    "Spawning PotPlayer: {:?} url={} seek={}s",
    exe,
    redact_url(url),
    seek_seconds
  );

  let child = Command::new(&exe)
    .args(launch_args(url, title, seek_seconds))
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()?;

  Ok(child)
}
