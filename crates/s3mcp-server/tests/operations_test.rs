//! Dispatcher behaviour against the local filesystem backend.

use s3mcp_core::ContentEncoding;
use s3mcp_server::{PutOptions, S3Operations};
use s3mcp_storage::{LocalStorage, StorageError};
use std::sync::Arc;
use tempfile::TempDir;

async fn setup() -> (TempDir, S3Operations) {
    let dir = TempDir::new().expect("temp dir");
    let storage = LocalStorage::new(dir.path()).await.expect("local storage");
    (dir, S3Operations::with_storage(Arc::new(storage)))
}

async fn put_text(ops: &S3Operations, bucket: &str, key: &str, content: &str) {
    ops.put_object(bucket, key, content, PutOptions::default())
        .await
        .expect("put_object");
}

async fn bucket_names(ops: &S3Operations) -> Vec<String> {
    ops.list_buckets()
        .await
        .expect("list_buckets")
        .buckets
        .into_iter()
        .map(|b| b.name)
        .collect()
}

async fn object_keys(ops: &S3Operations, bucket: &str) -> Vec<String> {
    ops.list_objects(bucket, None, None)
        .await
        .expect("list_objects")
        .objects
        .into_iter()
        .map(|o| o.key)
        .collect()
}

#[tokio::test]
async fn created_bucket_is_listed_exactly_once() {
    let (_dir, ops) = setup().await;

    for name in ["alpha", "beta", "gamma"] {
        ops.create_bucket(name, None).await.unwrap();
    }

    let names = bucket_names(&ops).await;
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    assert_eq!(names.iter().filter(|n| *n == "beta").count(), 1);
}

#[tokio::test]
async fn create_bucket_validates_and_rejects_duplicates() {
    let (_dir, ops) = setup().await;

    let err = ops.create_bucket("  ", None).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));

    let receipt = ops.create_bucket("demo", Some("")).await.unwrap();
    assert_eq!(receipt.status, "success");
    assert!(receipt.message.contains("us-east-1"));

    let err = ops.create_bucket("demo", None).await.unwrap_err();
    assert!(matches!(err, StorageError::AlreadyExists(_)));
    assert_eq!(bucket_names(&ops).await, vec!["demo"]);
}

#[tokio::test]
async fn create_bucket_records_requested_region() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("eu", Some("eu-central-1")).await.unwrap();

    let buckets = ops.list_buckets().await.unwrap().buckets;
    assert_eq!(buckets[0].region.as_deref(), Some("eu-central-1"));
}

#[tokio::test]
async fn non_empty_bucket_requires_force() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("full", None).await.unwrap();
    put_text(&ops, "full", "a.txt", "a").await;
    put_text(&ops, "full", "b.txt", "b").await;

    let err = ops.delete_bucket("full", false).await.unwrap_err();
    assert!(matches!(err, StorageError::NotEmpty(_)));
    assert_eq!(err.kind(), "NotEmpty");
    assert_eq!(bucket_names(&ops).await, vec!["full"]);

    let receipt = ops.delete_bucket("full", true).await.unwrap();
    assert_eq!(receipt.objects_removed, Some(2));
    assert!(bucket_names(&ops).await.is_empty());
}

#[tokio::test]
async fn deleting_missing_bucket_is_not_found() {
    let (_dir, ops) = setup().await;
    for force in [false, true] {
        let err = ops.delete_bucket("ghost", force).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "force={}", force);
    }
}

#[tokio::test]
async fn put_then_get_round_trips_content() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();

    let receipt = ops
        .put_object("data", "notes/today.md", "# Notes\n- ship it", PutOptions::default())
        .await
        .unwrap();
    assert_eq!(receipt.size_bytes, Some(17));
    assert_eq!(receipt.key.as_deref(), Some("notes/today.md"));

    let object = ops.get_object("data", "notes/today.md").await.unwrap();
    assert_eq!(object.content, "# Notes\n- ship it");
    assert_eq!(object.encoding, ContentEncoding::Utf8);
    assert_eq!(object.size_bytes, 17);
    assert_eq!(object.content_type, "text/plain");
}

#[tokio::test]
async fn second_put_overwrites_first() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();

    put_text(&ops, "data", "config.txt", "version one").await;
    put_text(&ops, "data", "config.txt", "v2").await;

    let object = ops.get_object("data", "config.txt").await.unwrap();
    assert_eq!(object.content, "v2");
    assert_eq!(object.size_bytes, 2);
    assert_eq!(object_keys(&ops, "data").await, vec!["config.txt"]);
}

#[tokio::test]
async fn binary_upload_round_trips_as_base64() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("media", None).await.unwrap();

    // PNG signature bytes
    let encoded = "iVBORw0KGgo=";
    let receipt = ops
        .put_object(
            "media",
            "logo.png",
            encoded,
            PutOptions {
                content_type: Some("image/png".to_string()),
                is_base64: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.size_bytes, Some(8));

    let object = ops.get_object("media", "logo.png").await.unwrap();
    assert_eq!(object.encoding, ContentEncoding::Base64);
    assert_eq!(object.content, encoded);
    assert_eq!(object.content_type, "image/png");
}

#[tokio::test]
async fn put_rejects_empty_key_and_bad_base64() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();

    let err = ops
        .put_object("data", "", "content", PutOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));

    let err = ops
        .put_object(
            "data",
            "blob.bin",
            "not base64!!",
            PutOptions {
                content_type: None,
                is_base64: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));
    assert!(object_keys(&ops, "data").await.is_empty());
}

#[tokio::test]
async fn keys_up_to_the_service_limit_are_stored() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();

    let key = "k".repeat(1024);
    put_text(&ops, "data", &key, "long").await;
    assert_eq!(ops.get_object("data", &key).await.unwrap().content, "long");
    assert_eq!(object_keys(&ops, "data").await, vec![key.clone()]);

    let err = ops
        .put_object("data", &"k".repeat(1025), "x", PutOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));
}

#[tokio::test]
async fn put_into_missing_bucket_is_not_found() {
    let (_dir, ops) = setup().await;
    let err = ops
        .put_object("nowhere", "a.txt", "x", PutOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn get_missing_key_is_not_found() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();

    let err = ops.get_object("data", "nope.txt").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
    assert_eq!(err.kind(), "NotFound");
}

#[tokio::test]
async fn deleted_object_disappears_from_listing() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();
    put_text(&ops, "data", "keep.txt", "keep").await;
    put_text(&ops, "data", "drop.txt", "drop").await;

    ops.delete_object("data", "drop.txt").await.unwrap();
    assert_eq!(object_keys(&ops, "data").await, vec!["keep.txt"]);
}

#[tokio::test]
async fn strict_delete_reports_missing_object() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("data", None).await.unwrap();

    let err = ops.delete_object("data", "absent.txt").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn idempotent_delete_accepts_missing_object() {
    let (dir, _) = setup().await;
    let storage = LocalStorage::new(dir.path()).await.unwrap();
    let ops = S3Operations::with_storage(Arc::new(storage)).idempotent_delete(true);
    ops.create_bucket("data", None).await.unwrap();

    let receipt = ops.delete_object("data", "absent.txt").await.unwrap();
    assert_eq!(receipt.status, "success");
}

#[tokio::test]
async fn list_objects_filters_and_limits() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("logs", None).await.unwrap();
    for key in ["app/1.log", "app/2.log", "app/3.log", "db/1.log"] {
        put_text(&ops, "logs", key, "entry").await;
    }

    let listing = ops.list_objects("logs", Some("app/"), Some(2)).await.unwrap();
    let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["app/1.log", "app/2.log"]);
    assert!(listing.truncated);
    assert_eq!(listing.prefix.as_deref(), Some("app/"));

    let err = ops.list_objects("logs", None, Some(0)).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));

    let err = ops.list_objects("missing", None, None).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn bucket_cap_limits_listing() {
    let (dir, _) = setup().await;
    let storage = LocalStorage::new(dir.path()).await.unwrap();
    let ops = S3Operations::with_storage(Arc::new(storage)).max_buckets(Some(2));
    for name in ["a", "b", "c"] {
        ops.create_bucket(name, None).await.unwrap();
    }

    assert_eq!(bucket_names(&ops).await, vec!["a", "b"]);
}

#[tokio::test]
async fn concurrent_puts_to_distinct_keys_all_land() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("burst", None).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let ops = ops.clone();
        handles.push(tokio::spawn(async move {
            ops.put_object("burst", &format!("item-{}.txt", i), "x", PutOptions::default())
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(object_keys(&ops, "burst").await.len(), 8);
}

#[tokio::test]
async fn demo_bucket_end_to_end() {
    let (_dir, ops) = setup().await;

    ops.create_bucket("demo", None).await.unwrap();
    ops.put_object("demo", "hello.txt", "Hello, S3 world!", PutOptions::default())
        .await
        .unwrap();

    let object = ops.get_object("demo", "hello.txt").await.unwrap();
    assert_eq!(object.content, "Hello, S3 world!");

    ops.delete_object("demo", "hello.txt").await.unwrap();
    assert!(object_keys(&ops, "demo").await.is_empty());

    ops.delete_bucket("demo", false).await.unwrap();
    assert!(!bucket_names(&ops).await.contains(&"demo".to_string()));
}

#[tokio::test]
async fn object_reads_as_resource_text() {
    let (_dir, ops) = setup().await;
    ops.create_bucket("demo", None).await.unwrap();
    put_text(&ops, "demo", "readme.md", "hi").await;

    let (bucket, key) = s3mcp_server::resources::parse_object_uri("s3://demo/readme.md").unwrap();
    assert_eq!(ops.read_object_text(&bucket, &key).await.unwrap(), "hi");
}
