//! Storage abstraction trait
//!
//! This module defines the `ObjectStorage` trait that all storage backends must
//! implement, together with the normalized error kinds callers see.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3mcp_core::{BucketInfo, ObjectInfo};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Bucket not empty: {0}")]
    NotEmpty(String),

    #[error("Storage service unavailable: {0}")]
    Unavailable(String),

    /// The service rejected the call for a reason outside the other kinds,
    /// e.g. access denied.
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Machine-readable error kind surfaced to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::InvalidArgument(_) => "InvalidArgument",
            StorageError::NotFound(_) => "NotFound",
            StorageError::AlreadyExists(_) => "AlreadyExists",
            StorageError::NotEmpty(_) => "NotEmpty",
            StorageError::Unavailable(_) => "StorageUnavailable",
            StorageError::Backend(_) => "BackendError",
            StorageError::Io(_) => "IoError",
            StorageError::Config(_) => "ConfigError",
        }
    }

    /// Whether retrying the same call later could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::Io(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object bytes plus the metadata the service returned with them.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct PutReceipt {
    pub size_bytes: u64,
    pub etag: Option<String>,
}

/// One page of keys, in ascending key order.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    pub objects: Vec<ObjectInfo>,
    pub truncated: bool,
}

/// Storage client adapter
///
/// Every method is a single round trip to the backing service (except
/// `empty_bucket`, which pages through the bucket). Implementations hold no
/// mutable state, so one handle can be shared across all sessions.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// All buckets visible to the configured credentials, sorted by name.
    async fn list_buckets(&self) -> StorageResult<Vec<BucketInfo>>;

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Create a bucket. `region` is the location constraint to request.
    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Delete every object (and object version) in a bucket, returning how
    /// many entries were removed.
    async fn empty_bucket(&self, bucket: &str) -> StorageResult<usize>;

    /// List up to `max_keys` objects, optionally restricted to a prefix.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> StorageResult<ObjectListing>;

    /// Metadata for a single object without its body.
    async fn head_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectInfo>;

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<StoredObject>;

    /// Upload (or overwrite) an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<PutReceipt>;

    /// Delete an object. Deleting an absent key succeeds, matching S3.
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
