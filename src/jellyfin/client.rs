//! Jellyfin HTTP client for REST API calls.

use parking_lot::RwLock;
use reqwest::{header, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::error::JellyfinError;
use super::types::*;

/// Device info for Jellyfin client identification.
const CLIENT_NAME: &str = "JellyPot";
const DEFAULT_DEVICE_NAME: &str = "PotPlayer";
const DEVICE_ID_PREFIX: &str = "jellypot-";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-request timeout for all server calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Login credentials for the configured server.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

/// Identity reported in the MediaBrowser authorization header.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
  pub client: String,
  pub device: String,
  pub device_id: String,
  pub version: String,
}

impl Default for ClientIdentity {
  fn default() -> Self {
    Self {
      client: CLIENT_NAME.to_string(),
      device: DEFAULT_DEVICE_NAME.to_string(),
      device_id: format!("{}{}", DEVICE_ID_PREFIX, Uuid::new_v4()),
      version: CLIENT_VERSION.to_string(),
    }
  }
}

/// Jellyfin HTTP API client.
///
/// Holds the session state for one configured server. Authentication is
/// explicit at startup and happens again lazily inside [`report_progress`]
/// whenever the stored token has been cleared.
///
/// [`report_progress`]: JellyfinClient::report_progress
pub struct JellyfinClient {
  http: Client,
  base_url: String,
  credentials: Credentials,
  identity: ClientIdentity,
  state: Arc<RwLock<SessionState>>,
}

/// Internal session state.
#[derive(Default)]
struct SessionState {
  access_token: Option<String>,
  session_id: Option<String>,
  user_id: Option<String>,
}

impl JellyfinClient {
  /// Create a new client for the given server.
  pub fn new(
    server_url: &str,
    credentials: Credentials,
    identity: ClientIdentity,
  ) -> Result<Self, JellyfinError> {
    let base_url = server_url.trim_end_matches('/').to_string();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
      return Err(JellyfinError::InvalidUrl(
        "URL must start with http:// or https://".to_string(),
      ));
    }

    Ok(Self {
      http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
      base_url,
      credentials,
      identity,
      state: Arc::new(RwLock::new(SessionState::default())),
    })
  }

  /// Build the MediaBrowser authorization header value.
  ///
  /// The token, when present, comes first so the server can pick it up
  /// without scanning the full key list.
  fn auth_header(&self, token: Option<&str>) -> String {
    match token {
      Some(token) => format!(
        r#"MediaBrowser Token="{}", Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
        token, self.identity.client, self.identity.device, self.identity.device_id,
        self.identity.version
      ),
      None => format!(
        r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
        self.identity.client, self.identity.device, self.identity.device_id,
        self.identity.version
      ),
    }
  }

  /// Authorization header reflecting the current session state.
  fn current_auth_header(&self) -> String {
    let token = self.state.read().access_token.clone();
    self.auth_header(token.as_deref())
  }

  /// Authenticate with the Jellyfin server.
  ///
  /// On success the access token, session id and user id are stored for
  /// subsequent calls. On any failure the session is left unauthenticated.
  pub async fn authenticate(&self) -> Result<(), JellyfinError> {
    let url = format!("{}/Users/AuthenticateByName", self.base_url);

    let body = serde_json::json!({
      "Username": self.credentials.username,
      "Pw": self.credentials.password
    });

    let response = self
      .http
      .post(&url)
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::AUTHORIZATION, self.current_auth_header())
      .json(&body)
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status();
      let text = response.text().await.unwrap_or_default();
      self.clear_token();
      return Err(JellyfinError::AuthFailed(format!(
        "HTTP {}: {}",
        status, text
      )));
    }

    let auth: AuthResponse = match response.json().await {
      Ok(auth) => auth,
      Err(e) => {
        self.clear_token();
        return Err(JellyfinError::AuthFailed(format!(
          "malformed response: {}",
          e
        )));
      }
    };

    if auth.access_token.is_empty() {
      self.clear_token();
      return Err(JellyfinError::AuthFailed(
        "server returned an empty access token".to_string(),
      ));
    }

    {
      let mut state = self.state.write();
      state.access_token = Some(auth.access_token);
      state.session_id = Some(auth.session_info.id);
      state.user_id = Some(auth.session_info.user_id);
    }

    log::debug!(
      "authenticated as user {} (session {})",
      self.user_id().unwrap_or_default(),
      self.session_id().unwrap_or_default()
    );
    Ok(())
  }

  /// Get a media item by ID.
  ///
  /// Requires a prior successful [`authenticate`]; this call never
  /// authenticates on its own.
  ///
  /// [`authenticate`]: JellyfinClient::authenticate
  pub async fn get_item(&self, item_id: &str) -> Result<MediaItem, JellyfinError> {
    let user_id = self.user_id()?;
    let url = format!("{}/Users/{}/Items/{}", self.base_url, user_id, item_id);

    let response = self
      .http
      .get(&url)
      .header(header::AUTHORIZATION, self.current_auth_header())
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status();
      let text = response.text().await.unwrap_or_default();
      return Err(JellyfinError::ItemLookup(format!(
        "HTTP {}: {}",
        status, text
      )));
    }

    match response.json().await {
      Ok(item) => Ok(item),
      Err(e) => {
        // A 2xx body we cannot read means the session is no longer
        // trustworthy, so force a fresh login before the next call.
        self.clear_token();
        Err(JellyfinError::ItemLookup(format!(
          "malformed response: {}",
          e
        )))
      }
    }
  }

  /// Report playback progress.
  ///
  /// Authenticates first when the session holds no token, so a report
  /// that follows a cleared session transparently re-establishes it.
  /// Anything other than HTTP 200 or 204 clears the token; the retry
  /// then happens on the next report, not here.
  pub async fn report_progress(&self, progress: &PlaybackProgress) -> Result<(), JellyfinError> {
    if !self.is_authenticated() {
      self.authenticate().await?;
    }

    let url = format!("{}/Sessions/Playing/Progress", self.base_url);
    log::debug!(
      "POST /Sessions/Playing/Progress event={} position={}",
      progress.event_name,
      progress.position_ticks
    );

    let response = self
      .http
      .post(&url)
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::AUTHORIZATION, self.current_auth_header())
      .json(progress)
      .send()
      .await?;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
      self.clear_token();
      return Err(JellyfinError::ReportFailed(format!("HTTP {}", status)));
    }

    Ok(())
  }

  /// Build the direct download URL for an item, carrying the access token
  /// as a query parameter so the player can fetch it unassisted.
  pub fn download_url(&self, item_id: &str) -> Result<String, JellyfinError> {
    let token = self.access_token()?;
    Ok(format!(
      "{}/Items/{}/Download?api_key={}",
      self.base_url, item_id, token
    ))
  }

  /// Check if a session token is held.
  pub fn is_authenticated(&self) -> bool {
    self.state.read().access_token.is_some()
  }

  /// Get the authenticated user ID.
  pub fn user_id(&self) -> Result<String, JellyfinError> {
    self
      .state
      .read()
      .user_id
      .clone()
      .ok_or(JellyfinError::NotAuthenticated)
  }

  /// Get the server-assigned session ID, if authenticated.
  pub fn session_id(&self) -> Option<String> {
    self.state.read().session_id.clone()
  }

  /// Get the access token or error if not authenticated.
  fn access_token(&self) -> Result<String, JellyfinError> {
    self
      .state
      .read()
      .access_token
      .clone()
      .ok_or(JellyfinError::NotAuthenticated)
  }

  /// Drop the stored token, forcing re-authentication on the next report.
  fn clear_token(&self) {
    self.state.write().access_token = None;
  }
}

/// Redact sensitive query parameters from URLs for logging.
/// Replaces api_key=XXX with api_key=[REDACTED].
pub fn redact_url(url: &str) -> String {
  if let Some(idx) = url.find("api_key=") {
    let start = idx + 8; // length of "api_key="
    let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
    format!("{}[REDACTED]{}", &url[..start], &url[end..])
  } else {
    url.to_string()
  }
}
