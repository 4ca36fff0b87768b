//! Single-instance coordination over a local rendezvous channel.
//!
//! Only one bridge may report progress at a time. A starting instance first
//! connects to the well-known channel as a client and sends `EXIT`; a running
//! predecessor picks that up, cancels its monitor loop and winds down. The
//! starter then claims the channel itself and serves it until it is evicted
//! the same way. Claiming uses a named pipe on Windows (creation fails while
//! another process holds the name, which is the mutual exclusion) and a Unix
//! socket elsewhere.

use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Command understood by the acceptor; anything else is discarded.
const EXIT_COMMAND: &str = "EXIT";

/// How long an evicted predecessor gets to release the channel.
const TAKEOVER_GRACE: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum InstanceError {
  #[error("could not claim the single-instance channel: {0}")]
  Listen(#[source] std::io::Error),
}

/// Well-known rendezvous endpoint.
pub fn rendezvous_path() -> String {
  #[cfg(windows)]
  {
    r"\\.\pipe\JellyPotBridge_39AC4C3F".to_string()
  }
  #[cfg(not(windows))]
  {
    std::env::temp_dir()
      .join("jellypot-bridge.sock")
      .to_string_lossy()
      .into_owned()
  }
}

/// Coordinates the "one reporting bridge at a time" rule.
pub struct InstanceCoordinator {
  endpoint: String,
  grace: Duration,
}

impl InstanceCoordinator {
  /// Coordinator on the well-known endpoint with the default grace period.
  pub fn new() -> Self {
    Self::with_endpoint(rendezvous_path(), TAKEOVER_GRACE)
  }

  /// Coordinator on an explicit endpoint, used by tests.
  pub fn with_endpoint(endpoint: impl Into<String>, grace: Duration) -> Self {
    Self {
      endpoint: endpoint.into(),
      grace,
    }
  }

  /// Evict any predecessor and claim the channel.
  ///
  /// Failure to notify a predecessor is never fatal; failure to claim the
  /// channel afterwards is, since it means mutual exclusion cannot be
  /// guaranteed.
  pub async fn take_over(&self) -> Result<InstanceGuard, InstanceError> {
    match self.notify_predecessor().await {
      Ok(true) => {
        log::info!("asked the previous instance to exit");
        tokio::time::sleep(self.grace).await;
      }
      Ok(false) => {}
      Err(e) => {
        log::warn!("could not notify the previous instance: {}", e);
        tokio::time::sleep(self.grace).await;
      }
    }

    let token = CancellationToken::new();
    let acceptor = self.spawn_acceptor(token.clone())?;
    log::debug!("claimed rendezvous channel {}", self.endpoint);

    Ok(InstanceGuard {
      token,
      _acceptor: acceptor,
    })
  }

  /// Send `EXIT` to a running predecessor.
  ///
  /// `Ok(false)` means nobody is listening. An error means a predecessor
  /// accepted the connection but the message could not be delivered.
  #[cfg(windows)]
  async fn notify_predecessor(&self) -> std::io::Result<bool> {
    use tokio::io::AsyncWriteExt;
    use tokio::net::windows::named_pipe::ClientOptions;

    let mut client = match ClientOptions::new().open(&self.endpoint) {
      Ok(client) => client,
      Err(_) => return Ok(false),
    };
    client.write_all(EXIT_COMMAND.as_bytes()).await?;
    Ok(true)
  }

  #[cfg(not(windows))]
  async fn notify_predecessor(&self) -> std::io::Result<bool> {
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixStream;

    let mut stream = match UnixStream::connect(&self.endpoint).await {
      Ok(stream) => stream,
      Err(_) => return Ok(false),
    };
    stream.write_all(EXIT_COMMAND.as_bytes()).await?;
    Ok(true)
  }

  /// Claim the endpoint and serve it until an `EXIT` arrives.
  #[cfg(windows)]
  fn spawn_acceptor(&self, token: CancellationToken) -> Result<JoinHandle<()>, InstanceError> {
    use tokio::net::windows::named_pipe::{PipeMode, ServerOptions};

    let mut server = ServerOptions::new()
      .first_pipe_instance(true)
      .pipe_mode(PipeMode::Message)
      .create(&self.endpoint)
      .map_err(InstanceError::Listen)?;

    Ok(tokio::spawn(async move {
      // One pipe instance, reused: connect, read one command, disconnect.
      loop {
        if let Err(e) = server.connect().await {
          log::error!("rendezvous accept failed: {}", e);
          break;
        }
        let mut buf = [0u8; 256];
        let n = server.read(&mut buf).await.unwrap_or(0);
        if is_exit_command(&buf[..n]) {
          log::info!("exit requested by a newer instance");
          token.cancel();
          break;
        }
        if let Err(e) = server.disconnect() {
          log::warn!("rendezvous disconnect failed: {}", e);
          break;
        }
      }
    }))
  }

  #[cfg(not(windows))]
  fn spawn_acceptor(&self, token: CancellationToken) -> Result<JoinHandle<()>, InstanceError> {
    use tokio::net::UnixListener;

    // A socket file left behind by a dead instance would block the bind;
    // the challenger step just proved nobody live is listening on it.
    let _ = std::fs::remove_file(&self.endpoint);
    let listener = UnixListener::bind(&self.endpoint).map_err(InstanceError::Listen)?;

    Ok(tokio::spawn(async move {
      loop {
        let (mut stream, _) = match listener.accept().await {
          Ok(conn) => conn,
          Err(e) => {
            log::error!("rendezvous accept failed: {}", e);
            break;
          }
        };
        let mut buf = [0u8; 256];
        let n = stream.read(&mut buf).await.unwrap_or(0);
        if is_exit_command(&buf[..n]) {
          log::info!("exit requested by a newer instance");
          token.cancel();
          break;
        }
      }
    }))
  }
}

impl Default for InstanceCoordinator {
  fn default() -> Self {
    Self::new()
  }
}

/// Ownership of the rendezvous channel for the lifetime of this instance.
pub struct InstanceGuard {
  token: CancellationToken,
  _acceptor: JoinHandle<()>,
}

impl InstanceGuard {
  /// Token cancelled when a newer instance asks this one to exit.
  pub fn cancel_token(&self) -> CancellationToken {
    self.token.clone()
  }

  /// Whether eviction has already been requested.
  pub fn is_superseded(&self) -> bool {
    self.token.is_cancelled()
  }
}

/// Match one received message against the exit command, tolerating NUL
/// padding and stray whitespace from the wire.
fn is_exit_command(buf: &[u8]) -> bool {
  let text = String::from_utf8_lossy(buf);
  text.trim_matches(|c: char| c == '\0' || c.is_whitespace()) == EXIT_COMMAND
}
