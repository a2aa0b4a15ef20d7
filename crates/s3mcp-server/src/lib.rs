//! s3mcp server
//!
//! Exposes bucket and object operations on an S3-compatible service as MCP
//! tools served over Server-Sent Events.

pub mod operations;
pub mod resources;
pub mod server;
pub mod tools;

pub use operations::{PutOptions, S3Operations};
pub use server::S3McpService;
