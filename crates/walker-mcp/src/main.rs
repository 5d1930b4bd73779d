//! # Walker MCP Server
//!
//! Model Context Protocol server exposing the `watch_ssh_window` tool.
//!
//! ## Overview
//!
//! The process registers its tools once at startup, then serves MCP requests
//! on stdin/stdout until the input stream closes or a termination signal
//! arrives. Logs go to stderr since stdout carries the protocol.
//!
//! ## Architecture
//!
//! - walker-mcp-core: descriptors, registry, errors, config
//! - walker-mcp: protocol adapter, transport loop, tools (this binary)

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use walker_mcp::cli::{Command, USAGE};
use walker_mcp::{build_registry, serve, TransportOptions, WalkerMcpServer};
use walker_mcp_core::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = match Command::parse(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Version => {
            println!("walker-mcp {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Run(options) => options,
    };

    let config = match &options.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!(
        "Walker MCP Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let registry = build_registry()?.into_shared();
    info!("Registered {} tool(s)", registry.len());

    let server = WalkerMcpServer::with_settings(registry, &config.server);

    if options.list_tools {
        println!("{}", serde_json::to_string_pretty(&server.tools())?);
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    info!("Server initialized, serving on stdio...");

    serve(
        server,
        tokio::io::stdin(),
        tokio::io::stdout(),
        TransportOptions {
            max_frame_bytes: config.server.max_frame_bytes,
            shutdown: shutdown.clone(),
        },
    )
    .await
    .map_err(|e| {
        tracing::error!("Transport failed: {}", e);
        e
    })?;

    info!("Walker MCP Server shutting down");

    if shutdown.is_cancelled() {
        // The blocking stdin reader would otherwise hold up runtime shutdown
        std::process::exit(0);
    }

    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}
