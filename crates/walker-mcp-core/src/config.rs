//! Configuration types for the walker MCP server.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Log levels accepted in `server.log_level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Server configuration loaded from a YAML file.
///
/// Every field has a default, so an empty file (or no file at all) gives the
/// stock behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: ServerSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document, treat it as all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ServerConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(Error::Config("server.name cannot be empty".to_string()));
        }

        if !LOG_LEVELS.contains(&self.server.log_level.as_str()) {
            return Err(Error::Config(format!(
                "server.log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.server.log_level
            )));
        }

        if self.server.max_frame_bytes == 0 {
            return Err(Error::Config(
                "server.max_frame_bytes must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    /// Name advertised during the MCP handshake
    pub name: String,
    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    pub log_level: String,
    /// Per-invocation handler timeout in milliseconds (0 = no timeout)
    pub handler_timeout_ms: u64,
    /// Longest accepted inbound line, in bytes
    pub max_frame_bytes: usize,
}

impl ServerSettings {
    /// Handler timeout, if one is configured.
    pub fn handler_timeout(&self) -> Option<Duration> {
        (self.handler_timeout_ms > 0).then(|| Duration::from_millis(self.handler_timeout_ms))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: "walker".to_string(),
            log_level: "info".to_string(),
            handler_timeout_ms: 0,
            max_frame_bytes: 1024 * 1024,
        }
    }
}
