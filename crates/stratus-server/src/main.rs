//! Stratus bridges a file-storage portal's management API to tool-calling
//! clients over stdio JSON-RPC, SSE, and plain HTTP.

mod http;
mod jsonrpc;
mod service;
mod stdio;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use stratus_config::{CliOverrides, StratusConfig};
use stratus_portal::{PortalClient, SessionManager};
use stratus_tools::{Dispatcher, ToolRegistry};

use crate::http::HttpState;
use crate::service::McpService;

#[derive(Parser)]
#[command(name = "stratus", version, about = "Tool server for a file-storage portal")]
struct Cli {
    /// Serve HTTP + SSE on this address (e.g. 127.0.0.1:8000) instead of stdio
    #[arg(long)]
    bind: Option<String>,

    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Portal hostname (overrides STRATUS_HOST / PORTAL_ADDR)
    #[arg(long)]
    host: Option<String>,

    /// Portal port
    #[arg(long)]
    port: Option<u16>,

    /// Portal user (overrides STRATUS_USER / PORTAL_USER)
    #[arg(long)]
    user: Option<String>,

    /// Portal password (overrides STRATUS_PASSWORD / PORTAL_PASS)
    #[arg(long)]
    password: Option<String>,

    /// Session scope: user or admin
    #[arg(long)]
    scope: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Per-request timeout for portal calls, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stdout is the stdio transport's wire; all logging goes to stderr.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let env: HashMap<String, String> = std::env::vars().collect();
    let overrides = CliOverrides {
        scope: cli.scope,
        host: cli.host,
        port: cli.port,
        user: cli.user,
        password: cli.password,
        ssl: cli.insecure.then_some(false),
        timeout_ms: cli.timeout_ms,
    };
    // Incomplete credentials fail startup; everything past this point can
    // recover at runtime.
    let config = StratusConfig::resolve(overrides, &env, cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let client = PortalClient::new(&config.credentials, config.timeout_ms)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to create portal client")?;
    let sessions = Arc::new(SessionManager::new(Arc::new(client), config.credentials));

    // Eager login, matching the portal's expected lifecycle. A failure here
    // only warns: the session manager re-establishes lazily on the next
    // call, and the liveness probe is healthy either way.
    match sessions.ensure_session().await {
        Ok(handle) => tracing::info!(scope = %handle.scope, "Portal session established"),
        Err(e) => tracing::warn!("Initial login failed, will retry on first call: {e}"),
    }

    let dispatcher = Arc::new(Dispatcher::new(ToolRegistry::with_builtins(), sessions.clone()));
    let service = Arc::new(McpService::new(dispatcher));
    tracing::info!(
        tools = service.dispatcher().registry().len(),
        "Stratus v{} ready",
        env!("CARGO_PKG_VERSION")
    );

    match cli.bind {
        Some(addr) => serve_http(&addr, service).await?,
        None => stdio::run(service).await?,
    }

    sessions.shutdown().await;
    Ok(())
}

async fn serve_http(addr: &str, service: Arc<McpService>) -> Result<()> {
    let state = Arc::new(HttpState::new(service));
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Serving HTTP + SSE on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
