//! `s3://{bucket}/{key}` resource URIs.

use s3mcp_storage::{StorageError, StorageResult};

pub const URI_SCHEME: &str = "s3://";
pub const URI_TEMPLATE: &str = "s3://{bucket}/{key}";

/// Split an `s3://bucket/key` URI into its percent-decoded parts.
pub fn parse_object_uri(uri: &str) -> StorageResult<(String, String)> {
    let rest = uri.strip_prefix(URI_SCHEME).ok_or_else(|| {
        StorageError::InvalidArgument(format!("Resource URI must start with s3://: {}", uri))
    })?;

    let (bucket, key) = rest.split_once('/').ok_or_else(|| {
        StorageError::InvalidArgument(format!("Resource URI has no object key: {}", uri))
    })?;
    if bucket.is_empty() || key.is_empty() {
        return Err(StorageError::InvalidArgument(format!(
            "Resource URI needs both bucket and key: {}",
            uri
        )));
    }

    let decode = |part: &str| {
        urlencoding::decode(part)
            .map(|s| s.into_owned())
            .map_err(|e| StorageError::InvalidArgument(format!("Invalid escape in {}: {}", uri, e)))
    };

    Ok((decode(bucket)?, decode(key)?))
}
