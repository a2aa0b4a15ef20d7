use crate::traits::{ObjectListing, ObjectStorage, PutReceipt, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3mcp_core::constants::DEFAULT_REGION;
use s3mcp_core::{BucketInfo, ObjectInfo, S3Settings};
use std::time::Instant;

/// S3 storage implementation
///
/// Wraps a single `aws_sdk_s3::Client` shared by every request.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    /// Create a new S3Storage instance from explicit connection settings.
    ///
    /// When no static credentials are configured the SDK default provider
    /// chain is used (environment, profile, web identity, instance metadata).
    pub async fn new(settings: &S3Settings) -> StorageResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "s3mcp-static",
            ));
        }

        if let Some(ref endpoint) = settings.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let shared_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(settings.force_path_style)
            .build();

        tracing::info!(
            region = %settings.region,
            endpoint = settings.endpoint_url.as_deref().unwrap_or("aws"),
            path_style = settings.force_path_style,
            static_credentials = settings.has_static_credentials(),
            "S3 client configured"
        );

        Ok(S3Storage {
            client: Client::from_conf(s3_config),
        })
    }

    /// Batch-delete up to 1000 object identifiers.
    async fn delete_batch(&self, bucket: &str, ids: Vec<ObjectIdentifier>) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let count = ids.len();

        let delete = Delete::builder()
            .set_objects(Some(ids))
            .quiet(true)
            .build()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("bucket {}", bucket)))?;

        if let Some(failed) = output.errors().first() {
            return Err(StorageError::Backend(format!(
                "Failed to delete {} from {}: {}",
                failed.key().unwrap_or("<unknown>"),
                bucket,
                failed.message().unwrap_or("unknown error")
            )));
        }

        Ok(count)
    }

    /// Remove every version and delete marker of a versioned bucket.
    async fn delete_versions(&self, bucket: &str) -> StorageResult<usize> {
        let mut removed = 0;
        let mut key_marker: Option<String> = None;
        let mut version_marker: Option<String> = None;

        loop {
            let page = self
                .client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.clone())
                .set_version_id_marker(version_marker.clone())
                .send()
                .await
                .map_err(|e| map_sdk_error(e, &format!("bucket {}", bucket)))?;

            let mut ids = Vec::new();
            let versions = page
                .versions()
                .iter()
                .map(|v| (v.key(), v.version_id()));
            let markers = page
                .delete_markers()
                .iter()
                .map(|m| (m.key(), m.version_id()));
            for (key, version_id) in versions.chain(markers) {
                if let Some(key) = key {
                    let id = ObjectIdentifier::builder()
                        .key(key)
                        .set_version_id(version_id.map(String::from))
                        .build()
                        .map_err(|e| StorageError::Backend(e.to_string()))?;
                    ids.push(id);
                }
            }

            removed += self.delete_batch(bucket, ids).await?;

            if !page.is_truncated().unwrap_or(false) {
                break;
            }
            key_marker = page.next_key_marker().map(String::from);
            version_marker = page.next_version_id_marker().map(String::from);
        }

        Ok(removed)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn list_buckets(&self) -> StorageResult<Vec<BucketInfo>> {
        let start = Instant::now();

        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| map_sdk_error(e, "bucket listing"))?;

        let mut buckets: Vec<BucketInfo> = output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name()?;
                Some(BucketInfo {
                    name: name.to_string(),
                    creation_date: bucket.creation_date().and_then(to_chrono),
                    region: bucket.bucket_region().map(String::from),
                })
            })
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            count = buckets.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list_buckets successful"
        );

        Ok(buckets)
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            // names are global; 403 means another account owns it
            Err(SdkError::ServiceError(service)) if service.raw().status().as_u16() == 403 => {
                tracing::debug!(bucket = %bucket, "head_bucket forbidden, bucket owned elsewhere");
                Ok(true)
            }
            Err(e) => match map_sdk_error(e, &format!("bucket {}", bucket)) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let start = Instant::now();
        let mut request = self.client.create_bucket().bucket(bucket);

        // us-east-1 is the implicit location and rejects an explicit constraint
        if region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request.send().await.map_err(|e| {
            let err = map_sdk_error(e, &format!("bucket {}", bucket));
            tracing::error!(error = %err, bucket = %bucket, region = %region, "S3 create_bucket failed");
            err
        })?;

        tracing::info!(
            bucket = %bucket,
            region = %region,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 create_bucket successful"
        );

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StorageResult<()> {
        let start = Instant::now();

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("bucket {}", bucket)))?;

        tracing::info!(
            bucket = %bucket,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete_bucket successful"
        );

        Ok(())
    }

    async fn empty_bucket(&self, bucket: &str) -> StorageResult<usize> {
        let start = Instant::now();
        let mut removed = 0;

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| map_sdk_error(e, &format!("bucket {}", bucket)))?;
            let ids = page
                .contents()
                .iter()
                .filter_map(|object| object.key())
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            removed += self.delete_batch(bucket, ids).await?;
        }

        // Buckets without versioning (or backends without the API) fail here
        match self.delete_versions(bucket).await {
            Ok(versions) => removed += versions,
            Err(e) => tracing::debug!(
                error = %e,
                bucket = %bucket,
                "Skipping version cleanup"
            ),
        }

        tracing::info!(
            bucket = %bucket,
            removed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 empty_bucket successful"
        );

        Ok(removed)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> StorageResult<ObjectListing> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(String::from))
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("bucket {}", bucket)))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectInfo {
                    key: object.key()?.to_string(),
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(to_chrono),
                    etag: object.e_tag().map(trim_etag),
                })
            })
            .collect();

        Ok(ObjectListing {
            objects,
            truncated: output.is_truncated().unwrap_or(false),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectInfo> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("object {}/{}", bucket, key)))?;

        Ok(ObjectInfo {
            key: key.to_string(),
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
            last_modified: output.last_modified().and_then(to_chrono),
            etag: output.e_tag().map(trim_etag),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let start = Instant::now();

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("object {}/{}", bucket, key)))?;

        let content_type = output.content_type().map(String::from);
        let last_modified = output.last_modified().and_then(to_chrono);

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::Unavailable(format!("Failed to read body of {}/{}: {}", bucket, key, e))
            })?
            .into_bytes();
        let size = data.len() as u64;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(StoredObject {
            data,
            content_type,
            size_bytes: size,
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
        let size = data.len() as u64;
        let start = Instant::now();

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                let err = map_sdk_error(e, &format!("bucket {}", bucket));
                tracing::error!(
                    error = %err,
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                err
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(PutReceipt {
            size_bytes: size,
            etag: output.e_tag().map(trim_etag),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let start = Instant::now();

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("object {}/{}", bucket, key)))?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Normalize an SDK failure into a `StorageError` kind.
fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, resource: &str) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    tracing::debug!(resource = %resource, error = %DisplayErrorContext(&err), "S3 request failed");
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StorageError::Unavailable(
            format!("could not reach the storage service for {} ({})", resource, err),
        ),
        SdkError::ConstructionFailure(_) => {
            StorageError::InvalidArgument(format!("invalid request for {}", resource))
        }
        SdkError::ServiceError(service) => {
            let status = service.raw().status().as_u16();
            let code = service.err().code();
            let detail = service_detail(resource, code, service.err().message(), status);
            classify_service_error(code, Some(status), resource, &detail)
        }
        _ => StorageError::Backend(format!("{} for {}", err, resource)),
    }
}

/// Caller-facing summary of a service error: code, HTTP status and message.
fn service_detail(resource: &str, code: Option<&str>, message: Option<&str>, status: u16) -> String {
    let mut detail = format!("{} failed with HTTP {}", resource, status);
    if let Some(code) = code {
        detail.push_str(&format!(" ({})", code));
    }
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        detail.push_str(&format!(": {}", message));
    }
    detail
}

/// Map an S3 error code (or, failing that, the HTTP status) to an error kind.
///
/// HEAD requests carry no body, so their failures only have a status code.
pub(crate) fn classify_service_error(
    code: Option<&str>,
    status: Option<u16>,
    resource: &str,
    detail: &str,
) -> StorageError {
    match code {
        Some("NoSuchBucket") | Some("NoSuchKey") | Some("NotFound") => {
            StorageError::NotFound(format!("{} does not exist", resource))
        }
        Some("BucketAlreadyExists") | Some("BucketAlreadyOwnedByYou") => {
            StorageError::AlreadyExists(format!("{} already exists", resource))
        }
        Some("BucketNotEmpty") => StorageError::NotEmpty(format!("{} is not empty", resource)),
        Some("InvalidBucketName")
        | Some("InvalidArgument")
        | Some("KeyTooLongError")
        | Some("InvalidLocationConstraint")
        | Some("IllegalLocationConstraintException") => {
            StorageError::InvalidArgument(detail.to_string())
        }
        Some("SlowDown") | Some("ServiceUnavailable") | Some("InternalError")
        | Some("RequestTimeout") => StorageError::Unavailable(detail.to_string()),
        _ => match status {
            Some(404) => StorageError::NotFound(format!("{} does not exist", resource)),
            Some(400) => StorageError::InvalidArgument(detail.to_string()),
            Some(s) if s >= 500 => StorageError::Unavailable(detail.to_string()),
            _ => StorageError::Backend(detail.to_string()),
        },
    }
}

fn to_chrono(timestamp: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

fn trim_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}
