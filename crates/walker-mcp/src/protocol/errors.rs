//! Conversion of walker errors into JSON-RPC error objects.

use rmcp::model::ErrorCode;
use rmcp::ErrorData as McpError;
use serde_json::{json, Value};
use walker_mcp_core::{Error, ErrorKind};

/// Invalid JSON was received.
pub const PARSE_ERROR: ErrorCode = ErrorCode(-32700);
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: ErrorCode = ErrorCode(-32600);
/// Unknown method or operation.
pub const METHOD_NOT_FOUND: ErrorCode = ErrorCode(-32601);
/// Invalid method parameters.
pub const INVALID_PARAMS: ErrorCode = ErrorCode(-32602);
/// Internal error.
pub const INTERNAL_ERROR: ErrorCode = ErrorCode(-32603);
/// Request received before the MCP handshake completed.
pub const SERVER_NOT_INITIALIZED: ErrorCode = ErrorCode(-32002);

fn kind_data(kind: ErrorKind) -> Option<Value> {
    Some(json!({ "kind": kind }))
}

/// Map a dispatch error onto the JSON-RPC error reported to the caller.
pub fn to_error_data(err: &Error) -> McpError {
    let kind = err.kind();
    let code = match kind {
        ErrorKind::OperationNotFound => METHOD_NOT_FOUND,
        ErrorKind::MalformedRequest => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    };
    McpError::new(code, err.to_string(), kind_data(kind))
}

/// Inbound line is not valid JSON.
pub fn parse_error(detail: impl std::fmt::Display) -> McpError {
    McpError::new(
        PARSE_ERROR,
        format!("Parse error: {detail}"),
        kind_data(ErrorKind::MalformedRequest),
    )
}

/// Inbound line is JSON but not a valid MCP client message.
pub fn invalid_request(detail: impl std::fmt::Display) -> McpError {
    McpError::new(
        INVALID_REQUEST,
        format!("Invalid request: {detail}"),
        kind_data(ErrorKind::MalformedRequest),
    )
}

/// Inbound line exceeded the configured frame size.
pub fn frame_too_large(max_frame_bytes: usize) -> McpError {
    McpError::new(
        PARSE_ERROR,
        format!("Message exceeds the maximum frame size of {max_frame_bytes} bytes"),
        kind_data(ErrorKind::MalformedRequest),
    )
}

/// Request arrived before `initialize` / `notifications/initialized`.
pub fn not_initialized(method: &str) -> McpError {
    McpError::new(
        SERVER_NOT_INITIALIZED,
        format!("Server not initialized, cannot handle '{method}'"),
        kind_data(ErrorKind::MalformedRequest),
    )
}

/// Protocol engine went away before answering.
pub fn engine_stopped() -> McpError {
    McpError::new(
        INTERNAL_ERROR,
        "Server stopped before responding",
        kind_data(ErrorKind::Transport),
    )
}

/// Serialize a standalone JSON-RPC error response line.
pub fn error_frame(id: Value, error: &McpError) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error,
    })
    .to_string()
}
