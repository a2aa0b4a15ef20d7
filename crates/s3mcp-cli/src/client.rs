//! MCP client side of the tool calls
//!
//! `ToolClient` is the seam the menu loop talks to; `McpToolClient` is the
//! real implementation over an SSE session.

use crate::requests::ToolRequest;
use anyhow::Context;
use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, ErrorData};
use rmcp::service::{RunningService, ServiceError};
use rmcp::transport::SseClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolCallError {
    /// The server answered with an error; `kind` is its stable error code.
    #[error("{kind}: {message}")]
    Rejected { kind: String, message: String },

    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl From<ErrorData> for ToolCallError {
    fn from(err: ErrorData) -> Self {
        let kind = err
            .data
            .as_ref()
            .and_then(|d| d.get("kind"))
            .and_then(Value::as_str)
            .unwrap_or("Error")
            .to_string();
        ToolCallError::Rejected {
            kind,
            message: err.message.into_owned(),
        }
    }
}

#[async_trait]
pub trait ToolClient: Send + Sync {
    /// Invoke a tool and return its JSON payload.
    async fn call(&self, request: ToolRequest) -> Result<Value, ToolCallError>;
}

/// Extract the JSON payload from a serialized `CallToolResult`.
///
/// The server puts one JSON document in the first text block. Text that is
/// not JSON is returned as a string value.
pub fn payload_from_result(result: &Value) -> Result<Value, ToolCallError> {
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.iter().find_map(|b| b.get("text").and_then(Value::as_str)))
        .ok_or_else(|| ToolCallError::Malformed(format!("no text content in {}", result)))?;

    if result.get("isError").and_then(Value::as_bool) == Some(true) {
        return Err(ToolCallError::Rejected {
            kind: "ToolError".to_string(),
            message: text.to_string(),
        });
    }

    Ok(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

pub struct McpToolClient {
    service: RunningService<RoleClient, ()>,
}

impl McpToolClient {
    /// Open the SSE stream at `url` and complete the MCP handshake.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let transport = SseClientTransport::start(url.to_string())
            .await
            .with_context(|| format!("Failed to open SSE stream at {}", url))?;
        let service = ()
            .serve(transport)
            .await
            .context("MCP initialization failed")?;
        Ok(Self { service })
    }

    /// Name and description of every tool the server offers.
    pub async fn tool_summaries(&self) -> Result<Vec<(String, String)>, ToolCallError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| ToolCallError::Transport(e.to_string()))?;

        tools
            .iter()
            .map(|tool| {
                let value = serde_json::to_value(tool)
                    .map_err(|e| ToolCallError::Malformed(e.to_string()))?;
                let field = |name: &str| {
                    value
                        .get(name)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Ok((field("name"), field("description")))
            })
            .collect()
    }

    pub async fn close(self) -> anyhow::Result<()> {
        self.service
            .cancel()
            .await
            .context("Failed to close MCP session")?;
        Ok(())
    }
}

#[async_trait]
impl ToolClient for McpToolClient {
    async fn call(&self, request: ToolRequest) -> Result<Value, ToolCallError> {
        tracing::debug!(tool = request.tool, "Calling tool");
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: request.tool.into(),
                arguments: Some(request.arguments),
            })
            .await
            .map_err(|e| match e {
                ServiceError::McpError(data) => ToolCallError::from(data),
                other => ToolCallError::Transport(other.to_string()),
            })?;

        let value =
            serde_json::to_value(&result).map_err(|e| ToolCallError::Malformed(e.to_string()))?;
        payload_from_result(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    #[test]
    fn payload_is_parsed_from_first_text_block() {
        let result = json!({ "content": [{ "type": "text", "text": "{\"status\":\"success\"}" }] });
        assert_eq!(payload_from_result(&result).unwrap()["status"], "success");
    }

    #[test]
    fn plain_text_payload_is_kept() {
        let result = json!({ "content": [{ "type": "text", "text": "hello" }] });
        assert_eq!(payload_from_result(&result).unwrap(), json!("hello"));
    }

    #[test]
    fn error_flag_becomes_rejection() {
        let result = json!({ "content": [{ "type": "text", "text": "boom" }], "isError": true });
        let err = payload_from_result(&result).unwrap_err();
        assert_eq!(err.to_string(), "ToolError: boom");
    }

    #[test]
    fn empty_content_is_malformed() {
        let err = payload_from_result(&json!({ "content": [] })).unwrap_err();
        assert!(matches!(err, ToolCallError::Malformed(_)));
    }

    #[test]
    fn error_data_keeps_server_kind() {
        let err = ToolCallError::from(ErrorData {
            code: ErrorCode(-32002),
            message: "object demo/a.txt does not exist".into(),
            data: Some(json!({ "kind": "NotFound", "message": "object demo/a.txt does not exist" })),
        });
        assert_eq!(err.to_string(), "NotFound: object demo/a.txt does not exist");
    }
}
