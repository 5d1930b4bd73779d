//! Error types for the walker MCP server.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for walker MCP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested operation is not registered
    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    /// Inbound message or its arguments could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Handler returned an error, panicked or timed out
    #[error("Operation '{operation}' failed: {message}")]
    HandlerFailure {
        /// Operation that was being invoked
        operation: String,
        /// Failure description
        message: String,
    },

    /// An operation with the same name is already registered
    #[error("Operation already registered: {0}")]
    DuplicateOperation(String),

    /// Descriptor rejected at registration time
    #[error("Invalid operation descriptor: {0}")]
    InvalidDescriptor(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport or protocol engine failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a handler failure on `operation`.
    pub fn handler_failure(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerFailure {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Classify this error for structured error responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OperationNotFound(_) => ErrorKind::OperationNotFound,
            Self::MalformedRequest(_) | Self::Serialization(_) => ErrorKind::MalformedRequest,
            Self::HandlerFailure { .. } => ErrorKind::HandlerFailure,
            Self::DuplicateOperation(_) => ErrorKind::DuplicateOperation,
            Self::InvalidDescriptor(_) => ErrorKind::InvalidDescriptor,
            Self::Config(_) => ErrorKind::Config,
            Self::Transport(_) | Self::Io(_) => ErrorKind::Transport,
        }
    }

    /// Whether the error can only occur while the process is starting up.
    ///
    /// Startup errors abort the process; everything else is reported back to
    /// the caller and the serving loop keeps going.
    pub fn is_startup(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DuplicateOperation | ErrorKind::InvalidDescriptor | ErrorKind::Config
        )
    }
}

/// Stable names for the error taxonomy, used in the `data.kind` field of
/// error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown operation name
    OperationNotFound,
    /// Undecodable request or invalid arguments
    MalformedRequest,
    /// Handler-side failure
    HandlerFailure,
    /// Registration conflict
    DuplicateOperation,
    /// Rejected descriptor
    InvalidDescriptor,
    /// Bad configuration
    Config,
    /// Channel failure
    Transport,
}

impl ErrorKind {
    /// Name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OperationNotFound => "OperationNotFound",
            Self::MalformedRequest => "MalformedRequest",
            Self::HandlerFailure => "HandlerFailure",
            Self::DuplicateOperation => "DuplicateOperation",
            Self::InvalidDescriptor => "InvalidDescriptor",
            Self::Config => "Config",
            Self::Transport => "Transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
