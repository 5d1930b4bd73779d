//! Walker MCP Server Implementation
//!
//! Implements `rmcp::ServerHandler` on top of the capability registry: the
//! tool list is rendered from registered descriptors and tool calls go through
//! the [`Dispatcher`].

use std::sync::Arc;

use rmcp::{
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use tracing::{info, warn};
use walker_mcp_core::{Arguments, CapabilityRegistry, ErrorKind, ServerSettings};

use super::dispatch::Dispatcher;
use super::errors::to_error_data;

/// Walker MCP Server
///
/// Exposes every operation of a frozen [`CapabilityRegistry`] as an MCP tool.
#[derive(Debug, Clone)]
pub struct WalkerMcpServer {
    /// Routes tool calls to handlers
    dispatcher: Dispatcher,
    /// Name advertised in the initialize response
    name: String,
}

impl WalkerMcpServer {
    /// Create a server with default settings.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self::with_settings(registry, &ServerSettings::default())
    }

    /// Create a server using the name and handler timeout from `settings`.
    pub fn with_settings(registry: Arc<CapabilityRegistry>, settings: &ServerSettings) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry).with_timeout(settings.handler_timeout()),
            name: settings.name.clone(),
        }
    }

    /// The dispatcher used for tool calls.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Tool catalog, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .descriptors()
            .map(|descriptor| {
                Tool::new(
                    descriptor.name().to_string(),
                    descriptor.description().to_string(),
                    Arc::new(descriptor.input_schema()),
                )
            })
            .collect()
    }
}

impl rmcp::ServerHandler for WalkerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Walker MCP Server - use watch_ssh_window with a session id to read the \
                 content of an agent ssh window."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.tools();
        info!("Listing {} tool(s)", tools.len());
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        info!("Calling tool: {}", name);

        match self
            .dispatcher
            .invoke(&name, Arguments::from(request.arguments))
            .await
        {
            Ok(output) => Ok(CallToolResult::success(vec![Content::text(output)])),
            Err(e) => {
                if e.kind() != ErrorKind::HandlerFailure {
                    warn!("Rejected call to '{}': {}", name, e);
                }
                Err(to_error_data(&e))
            }
        }
    }
}
