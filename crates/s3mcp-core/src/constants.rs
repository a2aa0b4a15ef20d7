//! Defaults shared by the server, the storage adapter and the client.

/// Region used when neither the request nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-1";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9999;

/// Path of the SSE stream endpoint.
pub const SSE_PATH: &str = "/sse";
/// Path clients POST JSON-RPC messages to.
pub const MESSAGE_PATH: &str = "/message";

/// S3 never returns more than 1000 keys per listing page.
pub const MAX_KEYS_LIMIT: i32 = 1000;

/// Longest object key S3 accepts, in UTF-8 bytes.
pub const MAX_OBJECT_KEY_BYTES: usize = 1024;

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

pub const DEFAULT_LOCAL_STORAGE_PATH: &str = "./data";
