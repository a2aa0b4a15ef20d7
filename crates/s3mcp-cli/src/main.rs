//! s3mcp: interactive client for the s3mcp server.
//!
//! Connects over SSE, lists the server's tools and then runs a numbered menu
//! on stdin/stdout.

use clap::Parser;
use s3mcp_cli::{init_tracing, render, McpToolClient, Prompter, DEFAULT_SERVER_URL};

#[derive(Parser)]
#[command(name = "s3mcp", about = "Interactive client for the S3 MCP server")]
struct Cli {
    /// SSE endpoint of the server
    #[arg(long, env = "S3MCP_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    tracing::info!(url = %cli.url, "Connecting to S3 MCP server");
    let client = McpToolClient::connect(&cli.url).await?;
    tracing::info!("Connection initialized");

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());

    match client.tool_summaries().await {
        Ok(tools) => prompter.say(render::tool_list(&tools))?,
        Err(e) => {
            prompter.say(format!("Error retrieving tools: {}", e))?;
            prompter.say("\nContinuing with known operations...")?;
        }
    }

    let outcome = s3mcp_cli::run(&mut prompter, &client).await;
    client.close().await?;
    outcome
}
