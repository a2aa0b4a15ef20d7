//! s3mcp interactive client
//!
//! A numbered menu over the seven S3 tools exposed by `s3mcp-server`.

pub mod app;
pub mod client;
pub mod menu;
pub mod prompt;
pub mod render;
pub mod requests;

pub use app::run;
pub use client::{McpToolClient, ToolCallError, ToolClient};
pub use prompt::Prompter;
pub use requests::ToolRequest;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:9999/sse";

/// Keep the first `max_chars` characters of `s`, appending "..." if anything was cut.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so they stay out of the menu.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
