//! Bridge between Jellyfin and PotPlayer.
//!
//! Plays a server item in PotPlayer via a `jellypot://` link and feeds the
//! player's position back to the server as playback progress.

pub mod cli;
pub mod config;
pub mod instance;
pub mod jellyfin;
pub mod monitor;
pub mod potplayer;

#[cfg(windows)]
pub mod app;
#[cfg(windows)]
pub mod registry;
