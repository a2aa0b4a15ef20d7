//! s3mcp server
//!
//! MCP server exposing S3 bucket and object operations over SSE.
//! Run with: S3_ENDPOINT_URL=http://localhost:9000 AWS_ACCESS_KEY_ID=xxx AWS_SECRET_ACCESS_KEY=xxx s3mcp-server

use anyhow::Context;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use s3mcp_core::AppConfig;
use s3mcp_server::{S3McpService, S3Operations};
use s3mcp_storage::create_storage;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %storage.backend_type(), "Storage backend ready");

    let operations = S3Operations::new(storage, &config.storage);
    let service = S3McpService::new(operations);

    let bind = config.server.bind_address()?;
    let sse_config = SseServerConfig {
        bind,
        sse_path: config.server.sse_path.clone(),
        post_path: config.server.message_path.clone(),
        ct: CancellationToken::new(),
        sse_keep_alive: None,
    };

    let server = SseServer::serve_with_config(sse_config)
        .await
        .with_context(|| format!("Failed to bind SSE server on {}", bind))?;
    tracing::info!(
        "Starting S3 MCP server on http://{}{}",
        bind,
        config.server.sse_path
    );

    // every SSE session gets its own handle onto the shared storage client
    let ct = server.with_service(move || service.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");
    ct.cancel();

    Ok(())
}
