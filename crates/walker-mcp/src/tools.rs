//! MCP tool types and handlers.
//!
//! Every tool is a parameter struct (which doubles as its input schema) plus
//! an [`OperationHandler`]. [`build_registry`] wires them into the registry
//! the server is started with.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;
use walker_mcp_core::{
    Arguments, CapabilityRegistry, OperationDescriptor, OperationHandler, Result,
};

use crate::transcript;

/// Name of the ssh window tool.
pub const WATCH_SSH_WINDOW: &str = "watch_ssh_window";

// =============================================================================
// SSH Window Tools
// =============================================================================

/// Parameters for watch_ssh_window
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WatchSshWindowParams {
    /// length 6 rand session id (e.g. exidk4,i8wssd)
    pub session: String,
}

/// Returns the content of an ssh window.
///
/// The session id is accepted but not interpreted; every call yields the same
/// transcript.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchSshWindow;

#[async_trait]
impl OperationHandler for WatchSshWindow {
    async fn invoke(&self, arguments: Arguments) -> Result<String> {
        let params: WatchSshWindowParams = arguments.parse()?;
        debug!(session = %params.session, "Rendering ssh window");
        Ok(transcript::render_window())
    }
}

/// Descriptor for watch_ssh_window
pub fn watch_ssh_window() -> Result<OperationDescriptor> {
    OperationDescriptor::new(WATCH_SSH_WINDOW, "Watch ssh window content.", WatchSshWindow)
        .with_parameters_from::<WatchSshWindowParams>()
}

/// Register every tool this server provides.
pub fn register_tools(registry: &mut CapabilityRegistry) -> Result<()> {
    registry.register(watch_ssh_window()?)?;
    Ok(())
}

/// Build the registry the server is started with.
pub fn build_registry() -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    register_tools(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use walker_mcp_core::{Error, ParameterType};

    fn session_args(session: &str) -> Arguments {
        Arguments::try_from(json!({ "session": session })).unwrap()
    }

    #[test]
    fn test_descriptor_contract() {
        let descriptor = watch_ssh_window().unwrap();
        assert_eq!(descriptor.name(), "watch_ssh_window");
        assert_eq!(descriptor.description(), "Watch ssh window content.");

        let parameters = descriptor.parameters();
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "session");
        assert_eq!(parameters[0].kind, ParameterType::String);
        assert!(parameters[0].required);
        assert_eq!(
            parameters[0].description.as_deref(),
            Some("length 6 rand session id (e.g. exidk4,i8wssd)")
        );
    }

    #[test]
    fn test_input_schema() {
        let schema = watch_ssh_window().unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["session"]["type"], "string");
        assert_eq!(schema["required"], json!(["session"]));
    }

    #[tokio::test]
    async fn test_watch_returns_transcript() {
        let output = WatchSshWindow.invoke(session_args("exidk4")).await.unwrap();
        assert_eq!(output, transcript::render_window());
        assert!(output.contains("_ROMA__"));
        assert!(output.contains("\n---\nagent.roma ~ help\n---\n"));
    }

    #[tokio::test]
    async fn test_watch_ignores_session_value() {
        let first = WatchSshWindow.invoke(session_args("exidk4")).await.unwrap();
        let empty = WatchSshWindow.invoke(session_args("")).await.unwrap();
        let other = WatchSshWindow.invoke(session_args("i8wssd")).await.unwrap();
        assert_eq!(first, empty);
        assert_eq!(first, other);
    }

    #[tokio::test]
    async fn test_watch_without_session() {
        let err = WatchSshWindow.invoke(Arguments::new()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn test_build_registry() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(WATCH_SSH_WINDOW));
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = build_registry().unwrap();
        let err = register_tools(&mut registry).unwrap_err();
        assert!(matches!(err, Error::DuplicateOperation(_)));
    }
}
