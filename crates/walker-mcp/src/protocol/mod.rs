//! MCP Protocol Layer
//!
//! This module adapts the capability registry to the Model Context Protocol
//! using rmcp 0.9, and runs it over a line-framed channel.

pub mod dispatch;
pub mod errors;
pub mod server;
pub mod transport;

pub use dispatch::Dispatcher;
pub use server::WalkerMcpServer;
pub use transport::{serve, Frame, TransportOptions};
