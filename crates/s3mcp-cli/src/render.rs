//! Human-readable output for tool results.

use crate::truncate_string;
use anyhow::{anyhow, Context};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

/// Text objects longer than this are cut in the preview.
pub const PREVIEW_CHARS: usize = 1000;

const RULE: &str = "-----------------------------------";

fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

pub fn tool_list(tools: &[(String, String)]) -> String {
    if tools.is_empty() {
        return "\nNo tools available from server".to_string();
    }
    let mut out = String::from("\nAvailable Tools:");
    for (name, description) in tools {
        out.push_str(&format!("\n- {}: {}", name, description));
    }
    out
}

pub fn bucket_list(payload: &Value) -> String {
    let buckets = payload
        .get("buckets")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if buckets.is_empty() {
        return "\nNo buckets found".to_string();
    }

    let mut out = String::from("\nAvailable Buckets:");
    for bucket in buckets {
        let name = str_field(bucket, "name").unwrap_or("?");
        match str_field(bucket, "creation_date") {
            Some(created) => out.push_str(&format!("\n- {} (created {})", name, created)),
            None => out.push_str(&format!("\n- {}", name)),
        }
    }
    out
}

pub fn object_list(bucket: &str, payload: &Value) -> String {
    let objects = payload
        .get("objects")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if objects.is_empty() {
        return format!("\nNo objects found in bucket {}", bucket);
    }

    let mut out = format!("\nObjects in bucket {}:", bucket);
    for object in objects {
        let key = str_field(object, "key").unwrap_or("?");
        let size = object.get("size_bytes").and_then(Value::as_u64).unwrap_or(0);
        out.push_str(&format!("\n- {} ({} bytes)", key, size));
    }
    if payload.get("truncated").and_then(Value::as_bool) == Some(true) {
        out.push_str("\n(more objects available, refine the prefix)");
    }
    out
}

/// Status line for create/delete/upload results.
pub fn receipt(label: &str, payload: &Value) -> String {
    match str_field(payload, "message") {
        Some(message) => format!("\n{}: {}", label, message),
        None => format!("\n{}: {}", label, payload),
    }
}

/// A fetched object as returned by the GetObject tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectView {
    pub key: String,
    pub content_type: String,
    pub size_bytes: Option<u64>,
    pub last_modified: Option<String>,
    pub binary: bool,
    pub content: String,
}

impl ObjectView {
    pub fn from_payload(payload: &Value) -> anyhow::Result<Self> {
        let content = str_field(payload, "content")
            .ok_or_else(|| anyhow!("GetObject response has no content"))?;
        Ok(Self {
            key: str_field(payload, "key").unwrap_or_default().to_string(),
            content_type: str_field(payload, "content_type")
                .unwrap_or("Unknown")
                .to_string(),
            size_bytes: payload.get("size_bytes").and_then(Value::as_u64),
            last_modified: str_field(payload, "last_modified").map(String::from),
            binary: str_field(payload, "encoding") == Some("base64"),
            content: content.to_string(),
        })
    }

    pub fn metadata(&self) -> String {
        let size = self
            .size_bytes
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        format!(
            "\nObject Information:\nContent Type: {}\nSize: {} bytes\nLast Modified: {}",
            self.content_type,
            size,
            self.last_modified.as_deref().unwrap_or("Unknown")
        )
    }

    /// Text body framed by rules, or a one-line note for binary content.
    pub fn preview(&self) -> String {
        if self.binary {
            return format!("\nBinary content detected ({})", self.content_type);
        }
        format!(
            "\nContent of {}:\n{}\n{}\n{}",
            self.key,
            RULE,
            truncate_string(&self.content, PREVIEW_CHARS),
            RULE
        )
    }

    /// Raw object bytes, decoding base64 bodies.
    pub fn bytes(&self) -> anyhow::Result<Vec<u8>> {
        if self.binary {
            BASE64
                .decode(self.content.trim())
                .context("Object content is not valid base64")
        } else {
            Ok(self.content.as_bytes().to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_buckets_with_creation_dates() {
        let payload = json!({ "buckets": [
            { "name": "demo", "creation_date": "2024-05-01T10:00:00Z" },
            { "name": "logs" }
        ]});
        assert_eq!(
            bucket_list(&payload),
            "\nAvailable Buckets:\n- demo (created 2024-05-01T10:00:00Z)\n- logs"
        );
        assert_eq!(bucket_list(&json!({ "buckets": [] })), "\nNo buckets found");
    }

    #[test]
    fn lists_objects_and_flags_truncation() {
        let payload = json!({
            "objects": [{ "key": "a.txt", "size_bytes": 3 }],
            "truncated": true
        });
        let out = object_list("demo", &payload);
        assert!(out.starts_with("\nObjects in bucket demo:\n- a.txt (3 bytes)"));
        assert!(out.contains("more objects available"));
        assert!(object_list("demo", &json!({ "objects": [] })).contains("No objects found"));
    }

    #[test]
    fn receipt_prefers_message() {
        let payload = json!({ "status": "success", "message": "Bucket demo created in us-east-1" });
        assert_eq!(
            receipt("Bucket creation result", &payload),
            "\nBucket creation result: Bucket demo created in us-east-1"
        );
    }

    #[test]
    fn text_object_preview_is_truncated() {
        let long = "x".repeat(PREVIEW_CHARS + 5);
        let view = ObjectView::from_payload(&json!({
            "key": "big.txt",
            "content_type": "text/plain",
            "size_bytes": PREVIEW_CHARS + 5,
            "encoding": "utf-8",
            "content": long,
        }))
        .unwrap();
        assert!(!view.binary);
        assert!(view.preview().contains(&format!("{}...", "x".repeat(PREVIEW_CHARS))));
        assert!(view.metadata().contains("Last Modified: Unknown"));
        assert_eq!(view.bytes().unwrap().len(), PREVIEW_CHARS + 5);
    }

    #[test]
    fn binary_object_decodes_base64() {
        let view = ObjectView::from_payload(&json!({
            "key": "logo.png",
            "content_type": "image/png",
            "encoding": "base64",
            "content": "iVBORw0KGgo=",
        }))
        .unwrap();
        assert_eq!(view.preview(), "\nBinary content detected (image/png)");
        assert_eq!(view.bytes().unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn missing_content_is_an_error() {
        assert!(ObjectView::from_payload(&json!({ "key": "a" })).is_err());
    }
}
