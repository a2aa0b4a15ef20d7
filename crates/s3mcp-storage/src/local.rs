use crate::traits::{ObjectListing, ObjectStorage, PutReceipt, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3mcp_core::{BucketInfo, ObjectInfo};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

const BUCKET_META_FILE: &str = ".bucket.json";
const OBJECT_SUFFIX: &str = ".obj";
const META_SUFFIX: &str = ".meta";

/// Longest percent-encoded key used verbatim as a file stem. Longer keys are
/// stored under a digest so the file name stays below NAME_MAX.
const MAX_ENCODED_STEM: usize = 200;
/// Marks digest stems. Percent-encoding always escapes `+`, so no encoded key
/// starts with it.
const DIGEST_PREFIX: &str = "+";

#[derive(Debug, Serialize, Deserialize)]
struct BucketMeta {
    region: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
    /// Original key, required for digest-named objects.
    #[serde(default)]
    key: Option<String>,
}

/// Local filesystem storage implementation
///
/// Layout under `base_path`:
///
/// ```text
/// {bucket}/.bucket.json          region and creation time
/// {bucket}/{encoded key}.obj     object bytes
/// {bucket}/{encoded key}.meta    content type and key
/// ```
///
/// Keys are percent-encoded into a single file name, so `a/b.txt` never
/// creates directories and cannot escape the bucket. Keys whose encoding is
/// too long for a file name are stored as `+{sha256 hex}` and listed from
/// the key recorded in their `.meta` file.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Resolve a bucket directory, rejecting names that could leave the root.
    fn bucket_path(&self, bucket: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty()
            || bucket.starts_with('.')
            || bucket.contains('/')
            || bucket.contains('\\')
        {
            return Err(StorageError::InvalidArgument(format!(
                "Invalid bucket name: {}",
                bucket
            )));
        }
        Ok(self.base_path.join(bucket))
    }

    async fn existing_bucket_path(&self, bucket: &str) -> StorageResult<PathBuf> {
        let path = self.bucket_path(bucket)?;
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(format!(
                "bucket {} does not exist",
                bucket
            )));
        }
        Ok(path)
    }

    fn file_stem(key: &str) -> String {
        let encoded = urlencoding::encode(key);
        if encoded.len() <= MAX_ENCODED_STEM {
            encoded.into_owned()
        } else {
            format!("{}{}", DIGEST_PREFIX, hex::encode(Sha256::digest(key.as_bytes())))
        }
    }

    fn object_paths(bucket_path: &std::path::Path, key: &str) -> (PathBuf, PathBuf) {
        let stem = Self::file_stem(key);
        (
            bucket_path.join(format!("{}{}", stem, OBJECT_SUFFIX)),
            bucket_path.join(format!("{}{}", stem, META_SUFFIX)),
        )
    }

    /// Recover the key of a digest-named object from its sidecar.
    async fn key_from_meta(bucket_path: &std::path::Path, stem: &str) -> Option<String> {
        let raw = fs::read(bucket_path.join(format!("{}{}", stem, META_SUFFIX)))
            .await
            .ok()?;
        serde_json::from_slice::<ObjectMeta>(&raw).ok()?.key
    }

    /// Decoded keys of every object in a bucket directory, unsorted.
    async fn object_keys(bucket_path: &std::path::Path) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(bucket_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(OBJECT_SUFFIX) else {
                continue;
            };
            if stem.starts_with(DIGEST_PREFIX) {
                match Self::key_from_meta(bucket_path, stem).await {
                    Some(key) => keys.push(key),
                    None => tracing::warn!(file = %name, "Skipping object without recorded key"),
                }
                continue;
            }
            match urlencoding::decode(stem) {
                Ok(key) => keys.push(key.into_owned()),
                Err(e) => tracing::warn!(file = %name, error = %e, "Skipping undecodable object file"),
            }
        }
        Ok(keys)
    }

    async fn object_info(bucket_path: &std::path::Path, key: &str) -> StorageResult<ObjectInfo> {
        let (data_path, _) = Self::object_paths(bucket_path, key);
        let metadata = fs::metadata(&data_path).await?;
        Ok(ObjectInfo {
            key: key.to_string(),
            size_bytes: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            etag: None,
        })
    }
}

fn object_not_found(bucket: &str, key: &str) -> StorageError {
    StorageError::NotFound(format!("object {}/{} does not exist", bucket, key))
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<BucketInfo>> {
        let mut buckets = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let meta = fs::read(entry.path().join(BUCKET_META_FILE))
                .await
                .ok()
                .and_then(|raw| serde_json::from_slice::<BucketMeta>(&raw).ok());
            buckets.push(BucketInfo {
                name,
                creation_date: meta.as_ref().map(|m| m.created_at),
                region: meta.map(|m| m.region),
            });
        }

        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        let path = self.bucket_path(bucket)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let path = self.bucket_path(bucket)?;

        match fs::create_dir(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(format!(
                    "bucket {} already exists",
                    bucket
                )))
            }
            Err(e) => return Err(e.into()),
        }

        let meta = BucketMeta {
            region: region.to_string(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_vec(&meta).map_err(|e| StorageError::Backend(e.to_string()))?;
        fs::write(path.join(BUCKET_META_FILE), raw).await?;

        tracing::info!(bucket = %bucket, region = %region, "Local create_bucket successful");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StorageResult<()> {
        let path = self.existing_bucket_path(bucket).await?;

        if !Self::object_keys(&path).await?.is_empty() {
            return Err(StorageError::NotEmpty(format!("bucket {} is not empty", bucket)));
        }

        fs::remove_dir_all(&path).await?;
        tracing::info!(bucket = %bucket, "Local delete_bucket successful");
        Ok(())
    }

    async fn empty_bucket(&self, bucket: &str) -> StorageResult<usize> {
        let path = self.existing_bucket_path(bucket).await?;
        let keys = Self::object_keys(&path).await?;

        for key in &keys {
            let (data_path, meta_path) = Self::object_paths(&path, key);
            fs::remove_file(&data_path).await?;
            if let Err(e) = fs::remove_file(&meta_path).await {
                if e.kind() != ErrorKind::NotFound {
                    return Err(e.into());
                }
            }
        }

        Ok(keys.len())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> StorageResult<ObjectListing> {
        let path = self.existing_bucket_path(bucket).await?;

        let mut keys: Vec<String> = Self::object_keys(&path)
            .await?
            .into_iter()
            .filter(|key| prefix.map_or(true, |p| key.starts_with(p)))
            .collect();
        keys.sort();

        let limit = max_keys.max(0) as usize;
        let truncated = keys.len() > limit;
        keys.truncate(limit);

        let mut objects = Vec::with_capacity(keys.len());
        for key in &keys {
            objects.push(Self::object_info(&path, key).await?);
        }

        Ok(ObjectListing { objects, truncated })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectInfo> {
        let path = self.existing_bucket_path(bucket).await?;
        Self::object_info(&path, key).await.map_err(|e| match e {
            StorageError::Io(io) if io.kind() == ErrorKind::NotFound => object_not_found(bucket, key),
            other => other,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let path = self.existing_bucket_path(bucket).await?;
        let (data_path, meta_path) = Self::object_paths(&path, key);

        let data = match fs::read(&data_path).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(object_not_found(bucket, key)),
            Err(e) => return Err(e.into()),
        };

        let content_type = fs::read(&meta_path)
            .await
            .ok()
            .and_then(|raw| serde_json::from_slice::<ObjectMeta>(&raw).ok())
            .map(|meta| meta.content_type);
        let last_modified = fs::metadata(&data_path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);

        tracing::debug!(bucket = %bucket, key = %key, size_bytes = data.len(), "Local download successful");

        Ok(StoredObject {
            size_bytes: data.len() as u64,
            data,
            content_type,
            last_modified,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<PutReceipt> {
        let path = self.existing_bucket_path(bucket).await?;
        let (data_path, meta_path) = Self::object_paths(&path, key);
        let size = data.len() as u64;

        // sidecar first: listing relies on it for digest-named objects
        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            key: Some(key.to_string()),
        };
        let raw = serde_json::to_vec(&meta).map_err(|e| StorageError::Backend(e.to_string()))?;
        fs::write(&meta_path, raw).await?;
        fs::write(&data_path, &data).await?;

        tracing::info!(bucket = %bucket, key = %key, size_bytes = size, "Local upload successful");

        Ok(PutReceipt {
            size_bytes: size,
            etag: None,
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let path = self.existing_bucket_path(bucket).await?;
        let (data_path, meta_path) = Self::object_paths(&path, key);

        for file in [data_path, meta_path] {
            if let Err(e) = fs::remove_file(&file).await {
                if e.kind() != ErrorKind::NotFound {
                    return Err(e.into());
                }
            }
        }

        tracing::info!(bucket = %bucket, key = %key, "Local delete successful");
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
