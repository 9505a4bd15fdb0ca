//! Tinify MCP Server
//!
//! Model Context Protocol server for the Tinify service
//! Run with: TINIFY_API_URL=xxx tinify-mcp

use anyhow::Context;
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tinify_core::TinifyConfig;
use tinify_mcp::{Optimizer, TinifyService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = TinifyConfig::from_env().context("Invalid Tinify configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        session_dir = %config.session_dir.display(),
        "Starting tinify-mcp"
    );

    let optimizer = Optimizer::from_config(&config).context("Failed to create API client")?;

    let service = TinifyService::new(optimizer);
    let running = service.serve(stdio()).await.context("MCP transport failed")?;
    running.waiting().await.context("MCP server error")?;

    Ok(())
}
