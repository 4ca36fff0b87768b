//! Command line interface.

use clap::{Parser, Subcommand};
use thiserror::Error;

/// Scheme the bridge registers as a protocol handler.
pub const PROTOCOL_SCHEME: &str = "jellypot";

#[derive(Parser, Debug)]
#[command(
  name = "jellypot",
  version,
  about = "Plays Jellyfin media in PotPlayer and reports progress back",
  args_conflicts_with_subcommands = true
)]
pub struct Cli {
  /// A jellypot:// link naming the media item to play.
  pub url: Option<String>,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Register the jellypot:// protocol handler for the current executable.
  Register,
  /// Remove the jellypot:// protocol handler registration.
  Unregister,
}

#[derive(Debug, Error)]
pub enum LinkError {
  #[error("not a jellypot:// link: {0}")]
  WrongScheme(String),
  #[error("jellypot:// link carries no item id")]
  EmptyItemId,
}

/// Extract the media item id from a `jellypot://<item-id>` link.
///
/// Browsers append a trailing slash to custom-scheme links; it is not part
/// of the id.
pub fn parse_item_id(url: &str) -> Result<String, LinkError> {
  let rest = url
    .strip_prefix("jellypot://")
    .ok_or_else(|| LinkError::WrongScheme(url.to_string()))?;
  let item_id = rest.trim_end_matches('/');
  if item_id.is_empty() {
    return Err(LinkError::EmptyItemId);
  }
  Ok(item_id.to_string())
}
