//! PotPlayer integration - spawns the player and samples it via window messages.
//!
//! Architecture:
//! - `process.rs` - PotPlayer binary detection and process spawning
//! - `transport.rs` - window lookup (direct class query, then full enumeration)
//! - `protocol.rs` - WM_USER request codes and the status/position sample
//! - `probe.rs` - one-shot playback sampling over a transport seam
//! - `win32.rs` - Win32-backed enumerator and transport

mod probe;
mod process;
mod protocol;
mod transport;
#[cfg(windows)]
mod win32;

pub use probe::{PlayerProbe, PlayerTransport, ProbeError};
pub use process::{find_potplayer, launch, launch_args, LaunchError};
pub use protocol::{
  PlaybackEvent, PlaybackSample, POT_GET_CURRENT_TIME, POT_GET_PLAY_STATUS, WM_USER,
};
pub use transport::{PlayerWindow, WindowEnumerator, WindowLocator, POTPLAYER_CLASSES};
#[cfg(windows)]
pub use win32::{Win32Transport, Win32Windows};
