//! s3mcp core library
//!
//! Configuration, domain models and input validation shared by the storage
//! adapter, the MCP server and the interactive client.

pub mod config;
pub mod constants;
pub mod content;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, S3Settings, ServerSettings, StorageSettings};
pub use models::{
    BucketInfo, ContentEncoding, ListBucketsResponse, ListObjectsResponse, ObjectContentResponse,
    ObjectInfo, OperationReceipt,
};
pub use storage_types::StorageBackend;
