//! Input checks applied before any call reaches the storage service.
//!
//! Only the basics are enforced locally; naming rules, uniqueness and
//! everything else belong to the service.

use crate::constants::{MAX_KEYS_LIMIT, MAX_OBJECT_KEY_BYTES};

/// Trimmed bucket name, or an error message when it is empty.
pub fn validate_bucket_name(name: &str) -> Result<&str, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Bucket name cannot be empty".to_string());
    }
    Ok(name)
}

/// Object key, or an error message when it is blank or longer than 1024 bytes.
///
/// Keys are not trimmed: leading and trailing spaces are legal in S3 keys.
pub fn validate_object_key(key: &str) -> Result<&str, String> {
    if key.trim().is_empty() {
        return Err("Object key cannot be empty".to_string());
    }
    if key.len() > MAX_OBJECT_KEY_BYTES {
        return Err(format!(
            "Object key is {} bytes, the limit is {}",
            key.len(),
            MAX_OBJECT_KEY_BYTES
        ));
    }
    Ok(key)
}

/// Resolve the listing page size, defaulting to the service maximum.
pub fn validate_max_keys(max_keys: Option<i32>) -> Result<i32, String> {
    match max_keys {
        None => Ok(MAX_KEYS_LIMIT),
        Some(n) if (1..=MAX_KEYS_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(format!(
            "max_keys must be between 1 and {}, got {}",
            MAX_KEYS_LIMIT, n
        )),
    }
}

/// Treat an empty prefix the same as no prefix.
pub fn normalize_prefix(prefix: Option<&str>) -> Option<&str> {
    prefix.filter(|p| !p.is_empty())
}
