//! Operation dispatcher
//!
//! The seven bucket/object operations, each validating its input and then
//! delegating to a shared `ObjectStorage` handle. No state is kept between
//! calls; concurrent callers race at the storage service.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use s3mcp_core::constants::{BINARY_CONTENT_TYPE, DEFAULT_CONTENT_TYPE, DEFAULT_REGION};
use s3mcp_core::content::{content_type_for_name, is_text_like};
use s3mcp_core::validation::{
    normalize_prefix, validate_bucket_name, validate_max_keys, validate_object_key,
};
use s3mcp_core::{
    ContentEncoding, ListBucketsResponse, ListObjectsResponse, ObjectContentResponse,
    OperationReceipt, StorageSettings,
};
use s3mcp_storage::{ObjectStorage, StorageError, StorageResult, StoredObject};
use std::sync::Arc;

/// Optional parameters of `put_object`.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Defaults to `text/plain`.
    pub content_type: Option<String>,
    /// `content` is base64 and must be decoded before upload.
    pub is_base64: bool,
}

#[derive(Clone)]
pub struct S3Operations {
    storage: Arc<dyn ObjectStorage>,
    default_region: String,
    max_buckets: Option<usize>,
    idempotent_delete: bool,
}

impl S3Operations {
    pub fn new(storage: Arc<dyn ObjectStorage>, settings: &StorageSettings) -> Self {
        Self {
            storage,
            default_region: settings.s3.region.clone(),
            max_buckets: settings.max_buckets,
            idempotent_delete: settings.idempotent_delete,
        }
    }

    /// Dispatcher with default policy: `us-east-1`, no bucket cap, strict deletes.
    pub fn with_storage(storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            storage,
            default_region: DEFAULT_REGION.to_string(),
            max_buckets: None,
            idempotent_delete: false,
        }
    }

    pub fn idempotent_delete(mut self, enabled: bool) -> Self {
        self.idempotent_delete = enabled;
        self
    }

    pub fn max_buckets(mut self, limit: Option<usize>) -> Self {
        self.max_buckets = limit;
        self
    }

    pub async fn list_buckets(&self) -> StorageResult<ListBucketsResponse> {
        let mut buckets = self.storage.list_buckets().await?;
        if let Some(limit) = self.max_buckets {
            buckets.truncate(limit);
        }
        Ok(ListBucketsResponse { buckets })
    }

    pub async fn create_bucket(
        &self,
        name: &str,
        region: Option<&str>,
    ) -> StorageResult<OperationReceipt> {
        let name = validate_bucket_name(name).map_err(StorageError::InvalidArgument)?;
        let region = region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(self.default_region.as_str());

        // us-east-1 answers 200 for a bucket you already own, so check first
        if self.storage.bucket_exists(name).await? {
            return Err(StorageError::AlreadyExists(format!(
                "bucket {} already exists",
                name
            )));
        }

        self.storage.create_bucket(name, region).await?;

        Ok(OperationReceipt::success(
            name,
            format!("Bucket {} created in {}", name, region),
        ))
    }

    pub async fn delete_bucket(&self, name: &str, force: bool) -> StorageResult<OperationReceipt> {
        let name = validate_bucket_name(name).map_err(StorageError::InvalidArgument)?;

        if !self.storage.bucket_exists(name).await? {
            return Err(StorageError::NotFound(format!(
                "bucket {} does not exist",
                name
            )));
        }

        let removed = if force {
            let removed = self.storage.empty_bucket(name).await?;
            tracing::info!(bucket = %name, removed, "Emptied bucket before deletion");
            Some(removed)
        } else {
            None
        };

        self.storage.delete_bucket(name).await?;

        let mut receipt = OperationReceipt::success(name, format!("Bucket {} deleted", name));
        receipt.objects_removed = removed;
        Ok(receipt)
    }

    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: Option<i32>,
    ) -> StorageResult<ListObjectsResponse> {
        let bucket = validate_bucket_name(bucket).map_err(StorageError::InvalidArgument)?;
        let max_keys = validate_max_keys(max_keys).map_err(StorageError::InvalidArgument)?;
        let prefix = normalize_prefix(prefix);

        let listing = self.storage.list_objects(bucket, prefix, max_keys).await?;

        Ok(ListObjectsResponse {
            bucket: bucket.to_string(),
            prefix: prefix.map(String::from),
            objects: listing.objects,
            truncated: listing.truncated,
        })
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectContentResponse> {
        let bucket = validate_bucket_name(bucket).map_err(StorageError::InvalidArgument)?;
        let key = validate_object_key(key).map_err(StorageError::InvalidArgument)?;

        let object = self.storage.get_object(bucket, key).await?;
        let content_type = object
            .content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| content_type_for_name(key).to_string());
        let (encoding, content) = encode_for_transport(key, Some(&content_type), &object);

        Ok(ObjectContentResponse {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type,
            size_bytes: object.size_bytes,
            last_modified: object.last_modified,
            encoding,
            content,
        })
    }

    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: &str,
        options: PutOptions,
    ) -> StorageResult<OperationReceipt> {
        let bucket = validate_bucket_name(bucket).map_err(StorageError::InvalidArgument)?;
        let key = validate_object_key(key).map_err(StorageError::InvalidArgument)?;

        let data = if options.is_base64 {
            Bytes::from(BASE64.decode(content.trim()).map_err(|e| {
                StorageError::InvalidArgument(format!("content is not valid base64: {}", e))
            })?)
        } else {
            Bytes::copy_from_slice(content.as_bytes())
        };
        let content_type = options
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(if options.is_base64 {
                BINARY_CONTENT_TYPE
            } else {
                DEFAULT_CONTENT_TYPE
            });

        let receipt = self.storage.put_object(bucket, key, data, content_type).await?;

        let mut result = OperationReceipt::success(
            bucket,
            format!("Uploaded {} bytes to {}/{}", receipt.size_bytes, bucket, key),
        )
        .with_key(key);
        result.size_bytes = Some(receipt.size_bytes);
        result.etag = receipt.etag;
        Ok(result)
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<OperationReceipt> {
        let bucket = validate_bucket_name(bucket).map_err(StorageError::InvalidArgument)?;
        let key = validate_object_key(key).map_err(StorageError::InvalidArgument)?;

        if !self.idempotent_delete {
            // S3 deletes are silent for absent keys; surface NotFound instead
            self.storage.head_object(bucket, key).await?;
        }

        self.storage.delete_object(bucket, key).await?;

        Ok(
            OperationReceipt::success(bucket, format!("Object {}/{} deleted", bucket, key))
                .with_key(key),
        )
    }

    /// Object body as a single string: UTF-8 text when textual, base64 otherwise.
    pub async fn read_object_text(&self, bucket: &str, key: &str) -> StorageResult<String> {
        Ok(self.get_object(bucket, key).await?.content)
    }
}

/// Pick the wire encoding for an object body.
fn encode_for_transport(
    key: &str,
    content_type: Option<&str>,
    object: &StoredObject,
) -> (ContentEncoding, String) {
    if is_text_like(key, content_type) {
        if let Ok(text) = std::str::from_utf8(&object.data) {
            return (ContentEncoding::Utf8, text.to_string());
        }
    }
    (ContentEncoding::Base64, BASE64.encode(&object.data))
}
