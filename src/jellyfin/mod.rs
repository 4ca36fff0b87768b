//! Jellyfin API client module.
//!
//! Handles authentication, item lookup, and playback progress reporting.

mod client;
mod error;
mod types;

pub use client::{redact_url, ClientIdentity, Credentials, JellyfinClient};
pub use error::JellyfinError;
pub use types::*;
