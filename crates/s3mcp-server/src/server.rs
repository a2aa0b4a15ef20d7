//! MCP server using rmcp SDK
//!
//! Exposes the bucket/object operations as MCP tools, plus the
//! `s3://{bucket}/{key}` resource template for reading objects.

use crate::operations::{PutOptions, S3Operations};
use crate::resources::{parse_object_uri, URI_TEMPLATE};
use crate::tools::*;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, RoleServer, ServerHandler};
use s3mcp_storage::StorageError;
use serde::Serialize;
use std::borrow::Cow;
use std::future::Future;

const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
const RESOURCE_NOT_FOUND: i32 = -32002;

/// Convert a storage failure into a JSON-RPC error carrying `{kind, message}`.
pub fn storage_error(err: StorageError) -> ErrorData {
    let code = match &err {
        StorageError::InvalidArgument(_) => INVALID_PARAMS,
        StorageError::NotFound(_) => RESOURCE_NOT_FOUND,
        _ => INTERNAL_ERROR,
    };
    let message = err.to_string();
    ErrorData {
        code: ErrorCode(code),
        data: Some(serde_json::json!({ "kind": err.kind(), "message": message })),
        message: Cow::from(message),
    }
}

fn json_result(value: &impl Serialize) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string(value).map_err(|e| ErrorData {
        code: ErrorCode(INTERNAL_ERROR),
        message: Cow::from(e.to_string()),
        data: None,
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Log a failed tool call and convert it for the wire.
fn tool_failure(tool: &'static str, err: StorageError) -> ErrorData {
    match &err {
        StorageError::InvalidArgument(_) | StorageError::NotFound(_) => {
            tracing::debug!(tool, kind = err.kind(), error = %err, "Tool call rejected")
        }
        e if e.is_recoverable() => {
            tracing::warn!(tool, kind = err.kind(), error = %err, "Storage service unavailable")
        }
        _ => tracing::error!(tool, kind = err.kind(), error = %err, "Tool call failed"),
    }
    storage_error(err)
}

/// The `s3://{bucket}/{key}` template advertised to clients.
pub fn object_template() -> ResourceTemplate {
    RawResourceTemplate {
        uri_template: URI_TEMPLATE.to_string(),
        name: "S3 Object".to_string(),
        description: Some("Access S3 objects using s3://bucket/key format".to_string()),
        mime_type: None,
    }
    .no_annotation()
}

#[derive(Clone)]
pub struct S3McpService {
    operations: S3Operations,
    tool_router: ToolRouter<S3McpService>,
}

#[tool_router]
impl S3McpService {
    pub fn new(operations: S3Operations) -> Self {
        Self {
            operations,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "ListBuckets",
        description = "List S3 buckets available to the authenticated user"
    )]
    async fn list_buckets(&self) -> Result<CallToolResult, ErrorData> {
        let result = self
            .operations
            .list_buckets()
            .await
            .map_err(|e| tool_failure("ListBuckets", e))?;
        json_result(&result)
    }

    #[tool(name = "CreateBucket", description = "Create a new S3 bucket")]
    async fn create_bucket(
        &self,
        Parameters(req): Parameters<CreateBucketRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .operations
            .create_bucket(&req.bucket, req.region.as_deref())
            .await
            .map_err(|e| tool_failure("CreateBucket", e))?;
        json_result(&result)
    }

    #[tool(
        name = "DeleteBucket",
        description = "Delete an S3 bucket (it must be empty unless force is set)"
    )]
    async fn delete_bucket(
        &self,
        Parameters(req): Parameters<DeleteBucketRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .operations
            .delete_bucket(&req.bucket, req.force)
            .await
            .map_err(|e| tool_failure("DeleteBucket", e))?;
        json_result(&result)
    }

    #[tool(
        name = "ListObjects",
        description = "List objects in an S3 bucket with optional prefix filtering"
    )]
    async fn list_objects(
        &self,
        Parameters(req): Parameters<ListObjectsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .operations
            .list_objects(&req.bucket, req.prefix.as_deref(), req.max_keys)
            .await
            .map_err(|e| tool_failure("ListObjects", e))?;
        json_result(&result)
    }

    #[tool(
        name = "GetObject",
        description = "Retrieve an object from S3 by bucket and key"
    )]
    async fn get_object(
        &self,
        Parameters(req): Parameters<ObjectRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .operations
            .get_object(&req.bucket, &req.key)
            .await
            .map_err(|e| tool_failure("GetObject", e))?;
        json_result(&result)
    }

    #[tool(name = "PutObject", description = "Upload content to an S3 object")]
    async fn put_object(
        &self,
        Parameters(req): Parameters<PutObjectRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let options = PutOptions {
            content_type: req.content_type,
            is_base64: req.is_base64,
        };
        let result = self
            .operations
            .put_object(&req.bucket, &req.key, &req.content, options)
            .await
            .map_err(|e| tool_failure("PutObject", e))?;
        json_result(&result)
    }

    #[tool(name = "DeleteObject", description = "Delete an object from S3")]
    async fn delete_object(
        &self,
        Parameters(req): Parameters<ObjectRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .operations
            .delete_object(&req.bucket, &req.key)
            .await
            .map_err(|e| tool_failure("DeleteObject", e))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for S3McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "s3mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "An MCP server for interacting with S3 storage: list, create and delete buckets; \
                 list, get, put and delete objects. Objects can also be read as s3://bucket/key resources."
                    .to_string(),
            ),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult {
            resource_templates: vec![object_template()],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let (bucket, key) = parse_object_uri(&uri).map_err(storage_error)?;
        tracing::debug!(bucket = %bucket, key = %key, "Reading S3 resource");

        let text = self
            .operations
            .read_object_text(&bucket, &key)
            .await
            .map_err(|e| tool_failure("ReadResource", e))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3mcp_storage::LocalStorage;
    use std::sync::Arc;

    async fn service() -> (tempfile::TempDir, S3McpService) {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let service = S3McpService::new(S3Operations::with_storage(Arc::new(storage)));
        (dir, service)
    }

    fn first_text(result: &CallToolResult) -> serde_json::Value {
        let value = serde_json::to_value(result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap().to_string();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn storage_errors_keep_kind_and_code() {
        let err = storage_error(StorageError::NotFound("object demo/a does not exist".into()));
        assert_eq!(err.code.0, RESOURCE_NOT_FOUND);
        assert_eq!(err.data.as_ref().unwrap()["kind"], "NotFound");

        let err = storage_error(StorageError::InvalidArgument("empty".into()));
        assert_eq!(err.code.0, INVALID_PARAMS);

        let err = storage_error(StorageError::NotEmpty("bucket demo is not empty".into()));
        assert_eq!(err.code.0, INTERNAL_ERROR);
        assert_eq!(err.data.as_ref().unwrap()["kind"], "NotEmpty");
    }

    #[tokio::test]
    async fn tools_return_json_payloads() {
        let (_dir, service) = service().await;

        service
            .create_bucket(Parameters(CreateBucketRequest {
                bucket: "demo".into(),
                region: Some(String::new()),
            }))
            .await
            .unwrap();
        let put = service
            .put_object(Parameters(PutObjectRequest {
                bucket: "demo".into(),
                key: "hello.txt".into(),
                content: "Hello, S3 world!".into(),
                content_type: None,
                is_base64: false,
            }))
            .await
            .unwrap();
        assert_eq!(first_text(&put)["size_bytes"], 16);

        let buckets = service.list_buckets().await.unwrap();
        assert_eq!(first_text(&buckets)["buckets"][0]["name"], "demo");

        let object = service
            .get_object(Parameters(ObjectRequest {
                bucket: "demo".into(),
                key: "hello.txt".into(),
            }))
            .await
            .unwrap();
        let body = first_text(&object);
        assert_eq!(body["content"], "Hello, S3 world!");
        assert_eq!(body["encoding"], "utf-8");
        assert_eq!(body["content_type"], "text/plain");
    }

    #[tokio::test]
    async fn tool_errors_carry_kind() {
        let (_dir, service) = service().await;
        let err = service
            .delete_bucket(Parameters(DeleteBucketRequest {
                bucket: "missing".into(),
                force: false,
            }))
            .await
            .unwrap_err();
        assert_eq!(err.data.unwrap()["kind"], "NotFound");
    }

    #[test]
    fn object_template_uses_s3_scheme() {
        let template = serde_json::to_value(object_template()).unwrap();
        assert_eq!(template["uriTemplate"], "s3://{bucket}/{key}");
        assert_eq!(template["name"], "S3 Object");
    }

    #[tokio::test]
    async fn advertises_tools_and_resources() {
        let (_dir, service) = service().await;
        let info = service.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }
}
