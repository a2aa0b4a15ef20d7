//! MCP tool request types with JSON Schema for AI parameter generation

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateBucketRequest {
    #[schemars(description = "Name of the bucket to create")]
    pub bucket: String,
    #[schemars(description = "Region for the bucket (empty uses the server default)")]
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteBucketRequest {
    #[schemars(description = "Name of the bucket to delete")]
    pub bucket: String,
    #[schemars(description = "Delete all objects first if the bucket is not empty")]
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListObjectsRequest {
    #[schemars(description = "Bucket to list")]
    pub bucket: String,
    #[schemars(description = "Only return keys starting with this prefix")]
    #[serde(default)]
    pub prefix: Option<String>,
    #[schemars(description = "Maximum number of keys to return (1-1000, default 1000)")]
    #[serde(default)]
    pub max_keys: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ObjectRequest {
    #[schemars(description = "Bucket containing the object")]
    pub bucket: String,
    #[schemars(description = "Object key")]
    pub key: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PutObjectRequest {
    #[schemars(description = "Bucket to upload into")]
    pub bucket: String,
    #[schemars(description = "Object key")]
    pub key: String,
    #[schemars(description = "Object content, plain text or base64 when is_base64 is set")]
    pub content: String,
    #[schemars(description = "MIME type of the content (default text/plain)")]
    #[serde(default)]
    pub content_type: Option<String>,
    #[schemars(description = "Whether content is base64-encoded binary data")]
    #[serde(default)]
    pub is_base64: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default() {
        let req: DeleteBucketRequest = serde_json::from_str(r#"{"bucket":"demo"}"#).unwrap();
        assert!(!req.force);

        let req: PutObjectRequest =
            serde_json::from_str(r#"{"bucket":"demo","key":"a.txt","content":"hi"}"#).unwrap();
        assert!(req.content_type.is_none());
        assert!(!req.is_base64);
    }

    #[test]
    fn empty_region_is_accepted() {
        let req: CreateBucketRequest =
            serde_json::from_str(r#"{"bucket":"demo","region":""}"#).unwrap();
        assert_eq!(req.region.as_deref(), Some(""));
    }
}
