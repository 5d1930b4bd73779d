//! Line-framed transport loop.
//!
//! Sits between the caller's channel (stdin/stdout in production) and the
//! rmcp protocol engine. Every inbound line is decoded before it reaches the
//! engine so that a bad frame gets an error response instead of tearing down
//! the session. Requests are handled in lockstep: the next line is not read
//! until the response to the current request has been written.

use futures::{SinkExt, StreamExt};
use rmcp::model::ClientJsonRpcMessage;
use rmcp::ErrorData as McpError;
use rmcp::ServiceExt;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walker_mcp_core::{Error, Result};

use super::errors;
use super::server::WalkerMcpServer;

/// Buffer size of the in-process pipe to the protocol engine.
const ENGINE_BUFFER: usize = 64 * 1024;

const INITIALIZE: &str = "initialize";
const INITIALIZED: &str = "notifications/initialized";

/// Transport loop settings.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Longest accepted inbound line, in bytes
    pub max_frame_bytes: usize,
    /// Cancelled on termination signals
    pub shutdown: CancellationToken,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            max_frame_bytes: 1024 * 1024,
            shutdown: CancellationToken::new(),
        }
    }
}

/// One decoded inbound line.
#[derive(Debug)]
pub enum Frame {
    /// Request expecting a response
    Request {
        /// JSON-RPC id, echoed in the response
        id: Value,
        /// Method name
        method: String,
    },
    /// Notification, no response expected
    Notification {
        /// Method name
        method: String,
    },
    /// Response to a server-initiated request
    Response,
    /// Undecodable line, answered directly
    Rejected {
        /// Request id if one could be recovered, otherwise null
        id: Value,
        /// Error to report
        error: McpError,
    },
}

impl Frame {
    /// Decode one line.
    pub fn classify(line: &str) -> Self {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Self::Rejected {
                    id: Value::Null,
                    error: errors::parse_error(e),
                }
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        if let Err(e) = serde_json::from_value::<ClientJsonRpcMessage>(value.clone()) {
            return Self::Rejected {
                id,
                error: errors::invalid_request(e),
            };
        }

        match value.get("method").and_then(Value::as_str) {
            Some(method) if value.get("id").is_some() => Self::Request {
                id,
                method: method.to_string(),
            },
            Some(method) => Self::Notification {
                method: method.to_string(),
            },
            None => Self::Response,
        }
    }
}

/// Where the client is in the MCP handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingInitialize,
    AwaitingInitialized,
    Ready,
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    EndOfStream,
    Cancelled,
}

enum Flow {
    Continue,
    Cancelled,
}

enum Event {
    Shutdown,
    Engine(Option<std::result::Result<String, LinesCodecError>>),
    Inbound(Option<std::result::Result<String, LinesCodecError>>),
}

/// Serve `server` over a line-framed channel until end of stream or until
/// `options.shutdown` is cancelled.
pub async fn serve<R, W>(
    server: WalkerMcpServer,
    reader: R,
    writer: W,
    options: TransportOptions,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (engine_io, bridge_io) = tokio::io::duplex(ENGINE_BUFFER);
    let engine = tokio::spawn(run_engine(server, engine_io));
    let (bridge_read, bridge_write) = tokio::io::split(bridge_io);

    let mut session = Session {
        inbound: FramedRead::new(
            reader,
            LinesCodec::new_with_max_length(options.max_frame_bytes),
        ),
        outbound: FramedWrite::new(writer, LinesCodec::new()),
        engine_rx: FramedRead::new(bridge_read, LinesCodec::new()),
        engine_tx: bridge_write,
        phase: Phase::AwaitingInitialize,
        max_frame_bytes: options.max_frame_bytes,
        resuming: false,
        shutdown: options.shutdown,
    };

    let exit = session.run().await;
    match exit {
        Ok(Exit::EndOfStream) => {
            info!("Inbound stream closed, shutting down");
            session.drain_engine(engine).await
        }
        Ok(Exit::Cancelled) => {
            info!("Shutdown requested, abandoning in-flight work");
            engine.abort();
            Ok(())
        }
        Err(e) => {
            engine.abort();
            Err(e)
        }
    }
}

/// Run the rmcp service on its end of the in-process pipe.
async fn run_engine(server: WalkerMcpServer, io: DuplexStream) -> Result<()> {
    let running = server
        .serve(io)
        .await
        .map_err(|e| Error::Transport(format!("MCP session setup failed: {e}")))?;
    let reason = running
        .waiting()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    debug!("Protocol engine stopped: {:?}", reason);
    Ok(())
}

struct Session<R, W> {
    inbound: FramedRead<R, LinesCodec>,
    outbound: FramedWrite<W, LinesCodec>,
    engine_rx: FramedRead<ReadHalf<DuplexStream>, LinesCodec>,
    engine_tx: WriteHalf<DuplexStream>,
    phase: Phase,
    max_frame_bytes: usize,
    /// Set after an inbound decode error until reading resumes
    resuming: bool,
    shutdown: CancellationToken,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn run(&mut self) -> Result<Exit> {
        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => Event::Shutdown,
                line = self.engine_rx.next() => Event::Engine(line),
                line = self.inbound.next() => Event::Inbound(line),
            };

            match event {
                Event::Shutdown => return Ok(Exit::Cancelled),
                Event::Engine(Some(line)) => {
                    // Unsolicited engine output, e.g. a notification
                    let line = line.map_err(codec_error)?;
                    self.emit(&line).await?;
                }
                Event::Engine(None) => {
                    return Err(Error::Transport("protocol engine stopped".to_string()));
                }
                Event::Inbound(None) if self.resuming => {
                    // FramedRead yields a single None after a decode error
                    self.resuming = false;
                }
                Event::Inbound(None) => return Ok(Exit::EndOfStream),
                Event::Inbound(Some(Err(LinesCodecError::MaxLineLengthExceeded))) => {
                    warn!("Dropping inbound frame over {} bytes", self.max_frame_bytes);
                    self.resuming = true;
                    let error = errors::frame_too_large(self.max_frame_bytes);
                    self.reply_error(Value::Null, &error).await?;
                }
                Event::Inbound(Some(Err(LinesCodecError::Io(e)))) => return Err(e.into()),
                Event::Inbound(Some(Ok(line))) => {
                    self.resuming = false;
                    if let Flow::Cancelled = self.handle_line(line.trim()).await? {
                        return Ok(Exit::Cancelled);
                    }
                }
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        debug!(bytes = line.len(), "Inbound frame");

        match Frame::classify(line) {
            Frame::Rejected { id, error } => {
                warn!("Rejected inbound frame: {}", error.message);
                self.reply_error(id, &error).await?;
            }
            Frame::Notification { method } => match self.phase {
                Phase::Ready => self.forward(line).await?,
                Phase::AwaitingInitialized if method == INITIALIZED => {
                    self.forward(line).await?;
                    self.phase = Phase::Ready;
                    info!("Client initialized");
                }
                _ => debug!("Dropping '{}' received before initialization", method),
            },
            Frame::Response => {
                if self.phase == Phase::Ready {
                    self.forward(line).await?;
                }
            }
            Frame::Request { id, method } => {
                let admitted = match self.phase {
                    Phase::Ready => true,
                    Phase::AwaitingInitialize => method == INITIALIZE,
                    Phase::AwaitingInitialized => false,
                };
                if !admitted {
                    warn!("Rejecting '{}' before initialization", method);
                    self.reply_error(id, &errors::not_initialized(&method))
                        .await?;
                    return Ok(Flow::Continue);
                }

                self.forward(line).await?;
                match self.await_response(&id).await? {
                    None => return Ok(Flow::Cancelled),
                    Some(succeeded) => {
                        if self.phase == Phase::AwaitingInitialize && succeeded {
                            self.phase = Phase::AwaitingInitialized;
                        }
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Pass engine output through until the response to `id` has been
    /// written. Returns whether it was a success, or `None` on shutdown.
    async fn await_response(&mut self, id: &Value) -> Result<Option<bool>> {
        loop {
            let line = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Ok(None),
                line = self.engine_rx.next() => line,
            };

            match line {
                Some(line) => {
                    let line = line.map_err(codec_error)?;
                    let outcome = response_outcome(&line, id);
                    self.emit(&line).await?;
                    if let Some(succeeded) = outcome {
                        return Ok(Some(succeeded));
                    }
                }
                None => {
                    self.reply_error(id.clone(), &errors::engine_stopped())
                        .await?;
                    return Err(Error::Transport(
                        "protocol engine stopped before responding".to_string(),
                    ));
                }
            }
        }
    }

    /// Close the engine's input and flush whatever it still writes.
    async fn drain_engine(&mut self, engine: JoinHandle<Result<()>>) -> Result<()> {
        self.engine_tx.shutdown().await?;
        while let Some(line) = self.engine_rx.next().await {
            let line = line.map_err(codec_error)?;
            self.emit(&line).await?;
        }
        match engine.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Protocol engine ended with: {}", e),
            Err(e) => warn!("Protocol engine task failed: {}", e),
        }
        Ok(())
    }

    async fn forward(&mut self, line: &str) -> Result<()> {
        self.engine_tx.write_all(line.as_bytes()).await?;
        self.engine_tx.write_all(b"\n").await?;
        self.engine_tx.flush().await?;
        Ok(())
    }

    async fn emit(&mut self, line: &str) -> Result<()> {
        debug!(bytes = line.len(), "Outbound frame");
        self.outbound.send(line).await.map_err(codec_error)
    }

    async fn reply_error(&mut self, id: Value, error: &McpError) -> Result<()> {
        let frame = errors::error_frame(id, error);
        self.emit(&frame).await
    }
}

/// If `line` is the response to `id`, whether it carries a result rather
/// than an error.
fn response_outcome(line: &str, id: &Value) -> Option<bool> {
    let value: Value = serde_json::from_str(line).ok()?;
    if value.get("method").is_some() || value.get("id") != Some(id) {
        return None;
    }
    Some(value.get("error").is_none())
}

fn codec_error(e: LinesCodecError) -> Error {
    match e {
        LinesCodecError::Io(e) => Error::Io(e),
        LinesCodecError::MaxLineLengthExceeded => {
            Error::Transport("line length limit exceeded".to_string())
        }
    }
}
