//! # walker-mcp-core
//!
//! Core types for the walker MCP server.
//!
//! This crate has **no internal dependencies** on other walker crates. It
//! provides:
//!
//! - Operation descriptors and the async handler contract
//! - The capability registry (register once, resolve by name)
//! - Parameter schemas derived from typed structs
//! - Server configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is the leaf layer. The `walker-mcp` crate builds the protocol
//! adapter and stdio transport loop on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod schema;

// Re-export commonly used types
pub use config::{ServerConfig, ServerSettings};
pub use descriptor::{
    Arguments, JsonObject, OperationDescriptor, OperationHandler, ParameterSpec, ParameterType,
};
pub use error::{Error, ErrorKind, Result};
pub use registry::CapabilityRegistry;
