//! Tool call arguments for each menu entry.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use s3mcp_core::constants::DEFAULT_CONTENT_TYPE;
use s3mcp_core::content::content_type_for_name;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Page size used by the "List Objects" entry.
pub const LIST_PAGE_SIZE: i32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    pub tool: &'static str,
    pub arguments: Map<String, Value>,
}

impl ToolRequest {
    fn new(tool: &'static str, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { tool, arguments }
    }
}

pub fn list_buckets() -> ToolRequest {
    ToolRequest::new("ListBuckets", json!({}))
}

/// An empty `region` lets the server pick its default.
pub fn create_bucket(bucket: &str, region: &str) -> ToolRequest {
    ToolRequest::new("CreateBucket", json!({ "bucket": bucket, "region": region }))
}

pub fn delete_bucket(bucket: &str, force: bool) -> ToolRequest {
    ToolRequest::new("DeleteBucket", json!({ "bucket": bucket, "force": force }))
}

pub fn list_objects(bucket: &str, prefix: &str) -> ToolRequest {
    let mut request = ToolRequest::new(
        "ListObjects",
        json!({ "bucket": bucket, "max_keys": LIST_PAGE_SIZE }),
    );
    if !prefix.is_empty() {
        request
            .arguments
            .insert("prefix".to_string(), Value::from(prefix));
    }
    request
}

pub fn get_object(bucket: &str, key: &str) -> ToolRequest {
    ToolRequest::new("GetObject", json!({ "bucket": bucket, "key": key }))
}

pub fn delete_object(bucket: &str, key: &str) -> ToolRequest {
    ToolRequest::new("DeleteObject", json!({ "bucket": bucket, "key": key }))
}

pub fn put_text(bucket: &str, key: &str, content: &str) -> ToolRequest {
    ToolRequest::new(
        "PutObject",
        json!({
            "bucket": bucket,
            "key": key,
            "content": content,
            "content_type": DEFAULT_CONTENT_TYPE,
            "is_base64": false,
        }),
    )
}

/// Read a local file and upload it base64-encoded, typed by its extension.
pub fn put_file(bucket: &str, key: &str, path: &Path) -> std::io::Result<ToolRequest> {
    let data = std::fs::read(path)?;
    let content_type = content_type_for_name(&path.to_string_lossy());

    Ok(ToolRequest::new(
        "PutObject",
        json!({
            "bucket": bucket,
            "key": key,
            "content": BASE64.encode(&data),
            "content_type": content_type,
            "is_base64": true,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_bucket_keeps_empty_region() {
        let request = create_bucket("demo", "");
        assert_eq!(request.tool, "CreateBucket");
        assert_eq!(request.arguments["bucket"], "demo");
        assert_eq!(request.arguments["region"], "");
    }

    #[test]
    fn list_objects_omits_blank_prefix() {
        let request = list_objects("demo", "");
        assert_eq!(request.arguments["max_keys"], 50);
        assert!(!request.arguments.contains_key("prefix"));

        let request = list_objects("demo", "logs/");
        assert_eq!(request.arguments["prefix"], "logs/");
    }

    #[test]
    fn text_upload_is_plain() {
        let request = put_text("demo", "hello.txt", "Hello, S3 world!");
        assert_eq!(request.arguments["content"], "Hello, S3 world!");
        assert_eq!(request.arguments["content_type"], "text/plain");
        assert_eq!(request.arguments["is_base64"], false);
    }

    #[test]
    fn file_upload_is_base64_with_inferred_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.PDF");
        std::fs::write(&path, b"%PDF").unwrap();

        let request = put_file("demo", "docs/report.pdf", &path).unwrap();
        assert_eq!(request.arguments["content"], "JVBERg==");
        assert_eq!(request.arguments["content_type"], "application/pdf");
        assert_eq!(request.arguments["is_base64"], true);
    }

    #[test]
    fn file_upload_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(put_file("demo", "k", &dir.path().join("absent.bin")).is_err());
    }
}
