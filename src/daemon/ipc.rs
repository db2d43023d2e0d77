//! IPC Server for the Pomodoro Timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket, one JSON request per connection
//! - Forwarding of requests to the daemon loop, which owns the engine
//! - Request handling that maps wire commands to engine operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::sound::AudioController;
use crate::types::{ConfigParams, IpcRequest, IpcResponse, ResponseData, TimerState};

use super::scheduler::Scheduler;
use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "~/.pomobar/pomobar.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Expands [`DEFAULT_SOCKET_PATH`] against the home directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    let relative = DEFAULT_SOCKET_PATH.trim_start_matches("~/");
    Ok(home.join(relative))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// The daemon loop is gone
    #[error("Daemon is shutting down")]
    ShuttingDown,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }
        if n == MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accepts connections forever, forwarding each request to `calls`.
    ///
    /// Every connection is served on its own task. Returns once the
    /// receiving side of `calls` is dropped.
    pub async fn serve(self, calls: mpsc::Sender<IpcCall>) {
        loop {
            let stream = tokio::select! {
                accepted = self.accept() => accepted,
                _ = calls.closed() => break,
            };
            match stream {
                Ok(stream) => {
                    let calls = calls.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, &calls).await {
                            debug!(error = %e, "IPC connection ended with error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "Failed to accept IPC connection"),
            }
        }
        debug!("IPC server stopped");
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// Forwarding
// ============================================================================

/// A request waiting for the daemon loop to answer it.
#[derive(Debug)]
pub struct IpcCall {
    pub request: IpcRequest,
    pub reply: oneshot::Sender<IpcResponse>,
}

/// Reads one request, hands it to the daemon loop and writes the answer.
///
/// Malformed requests are answered with an error response.
///
/// # Errors
///
/// Returns an error if the stream fails or the daemon loop is gone.
pub async fn serve_connection(mut stream: UnixStream, calls: &mpsc::Sender<IpcCall>) -> Result<()> {
    let request = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => request,
        Err(e) => {
            let response = IpcResponse::error(format!("Invalid request: {e:#}"));
            IpcServer::send_response(&mut stream, &response).await?;
            return Err(e);
        }
    };
    debug!(?request, "IPC request received");

    let (reply, answer) = oneshot::channel();
    calls
        .send(IpcCall { request, reply })
        .await
        .map_err(|_| IpcError::ShuttingDown)?;
    let response = answer.await.map_err(|_| IpcError::ShuttingDown)?;

    IpcServer::send_response(&mut stream, &response).await
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the engine.
///
/// Borrowed from the daemon loop for one request at a time. Audio fields of
/// a configure request need an [`AudioController`].
pub struct RequestHandler<'a, S: Scheduler> {
    engine: &'a mut TimerEngine<S>,
    audio: Option<&'a mut AudioController>,
}

impl<'a, S: Scheduler> RequestHandler<'a, S> {
    /// Creates a new request handler for the given timer engine.
    pub fn new(engine: &'a mut TimerEngine<S>) -> Self {
        Self {
            engine,
            audio: None,
        }
    }

    /// Also serves the audio settings held by `audio`.
    pub fn with_audio(mut self, audio: &'a mut AudioController) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// Operations the engine ignores are reported as errors.
    pub fn handle(&mut self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start => self.handle_start(),
            IpcRequest::Pause => self.apply(
                TimerEngine::pause,
                "Timer paused",
                "Timer is not running",
            ),
            IpcRequest::Stop => self.apply(
                TimerEngine::stop,
                "Timer stopped",
                "Timer is already stopped",
            ),
            IpcRequest::Skip => self.apply(
                TimerEngine::skip,
                "Phase skipped",
                "Nothing to skip; start the timer first",
            ),
            IpcRequest::Reset => self.apply(
                TimerEngine::reset,
                "Timer reset",
                "Timer could not be reset",
            ),
            IpcRequest::Toggle => self.handle_toggle(),
            IpcRequest::Status => self.respond(""),
            IpcRequest::Configure { params } => self.handle_configure(params),
        }
    }

    fn handle_start(&mut self) -> IpcResponse {
        let resuming = self.engine.state() == TimerState::Paused;
        if !self.engine.start() {
            return IpcResponse::error("Timer is already running");
        }
        let message = if resuming {
            "Timer resumed".to_string()
        } else {
            format!("{} started", self.engine.phase().display_name())
        };
        self.respond(message)
    }

    fn handle_toggle(&mut self) -> IpcResponse {
        match self.engine.state() {
            TimerState::Running => self.apply(
                TimerEngine::pause,
                "Timer paused",
                "Timer is not running",
            ),
            TimerState::Idle | TimerState::Paused | TimerState::Completed => self.handle_start(),
        }
    }

    fn handle_configure(&mut self, params: ConfigParams) -> IpcResponse {
        if params.is_empty() {
            return IpcResponse::error("No configuration values given");
        }

        let configuration = params.apply_to(*self.engine.configuration());
        if let Err(e) = configuration.validate() {
            return IpcResponse::error(e.to_string());
        }

        let audio = if params.audio.is_empty() {
            None
        } else {
            let Some(controller) = self.audio.as_deref() else {
                return IpcResponse::error("Audio settings are not available");
            };
            let audio = params.audio.apply_to(*controller.settings());
            if let Err(e) = audio.validate() {
                return IpcResponse::error(e.to_string());
            }
            Some(audio)
        };

        // Both halves are validated before either is applied.
        if !params.timer_is_empty() {
            self.engine.set_configuration(configuration);
        }
        if let (Some(audio), Some(controller)) = (audio, self.audio.as_deref_mut()) {
            if let Err(e) = controller.update(audio) {
                return IpcResponse::error(e.to_string());
            }
        }
        self.respond("Configuration updated")
    }

    fn apply(
        &mut self,
        operation: fn(&mut TimerEngine<S>) -> bool,
        success: &str,
        no_op: &str,
    ) -> IpcResponse {
        if operation(self.engine) {
            self.respond(success)
        } else {
            IpcResponse::error(no_op)
        }
    }

    fn respond(&self, message: impl Into<String>) -> IpcResponse {
        let mut data = ResponseData::from_snapshot(&self.engine.snapshot());
        data.audio = self.audio.as_deref().map(|audio| *audio.settings());
        IpcResponse::success(message, Some(data))
    }
}

// ============================================================================
// Tests
// ============================================================================
