//! Walker MCP Server Library
//!
//! This library contains the MCP protocol layer, the stdio transport loop and
//! the tool handlers. The actual server binary is in main.rs.

pub mod cli;
pub mod protocol;
pub mod tools;
pub mod transcript;

// Re-export commonly used types
pub use protocol::{serve, Dispatcher, TransportOptions, WalkerMcpServer};
pub use tools::{build_registry, register_tools, WatchSshWindow, WatchSshWindowParams};
