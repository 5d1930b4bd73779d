//! Resolution and invocation of registered operations.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument};
use walker_mcp_core::{Arguments, CapabilityRegistry, Error, ErrorKind, Result};

/// Routes invocation requests to registered handlers.
///
/// Handlers run on their own task so a panic inside one is reported as a
/// [`Error::HandlerFailure`] instead of unwinding through the serving loop.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher over a frozen registry.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Bound every invocation by `timeout` (`None` = unbounded).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The registry operations are resolved against.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Resolve `name`, validate `arguments` and run the handler.
    #[instrument(skip_all, fields(operation = %name))]
    pub async fn invoke(&self, name: &str, arguments: Arguments) -> Result<String> {
        let descriptor = self.registry.resolve(name)?;
        descriptor.validate(&arguments)?;

        debug!(arguments = arguments.len(), "Invoking handler");

        let handler = descriptor.handler();
        let mut task = tokio::spawn(async move { handler.invoke(arguments).await });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    error!("Handler timed out after {}ms", limit.as_millis());
                    return Err(Error::handler_failure(
                        name,
                        format!("timed out after {}ms", limit.as_millis()),
                    ));
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(output)) => {
                debug!(bytes = output.len(), "Handler completed");
                Ok(output)
            }
            Ok(Err(e)) => {
                error!("Handler returned an error: {}", e);
                Err(match e.kind() {
                    ErrorKind::MalformedRequest | ErrorKind::HandlerFailure => e,
                    _ => Error::handler_failure(name, e.to_string()),
                })
            }
            Err(e) if e.is_panic() => {
                error!("Handler panicked");
                Err(Error::handler_failure(name, "handler panicked"))
            }
            Err(e) => {
                error!("Handler task failed: {}", e);
                Err(Error::handler_failure(name, format!("handler task failed: {e}")))
            }
        }
    }
}
