//! Content-type guessing and text detection for object payloads.

use crate::constants::BINARY_CONTENT_TYPE;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "csv", "tsv", "json", "jsonl", "xml", "yaml", "yml", "toml", "ini",
    "cfg", "conf", "log", "html", "htm", "css", "js", "ts", "py", "rs", "go", "java", "sh", "sql",
];

fn extension(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Guess a MIME type from a file name or object key.
pub fn content_type_for_name(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("txt") | Some("log") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("yaml") | Some("yml") => "application/yaml",
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("zip") => "application/zip",
        _ => BINARY_CONTENT_TYPE,
    }
}

fn is_text_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("text/")
        || essence.ends_with("+json")
        || essence.ends_with("+xml")
        || matches!(
            essence.as_str(),
            "application/json"
                | "application/xml"
                | "application/javascript"
                | "application/yaml"
                | "application/x-yaml"
                | "application/toml"
        )
}

/// Whether an object should be shown as text rather than base64.
///
/// Either a text-like key extension or a text-like content type is enough;
/// callers must still check the bytes are valid UTF-8.
pub fn is_text_like(key: &str, content_type: Option<&str>) -> bool {
    let by_extension = extension(key)
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    by_extension || content_type.map(is_text_content_type).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_types() {
        assert_eq!(content_type_for_name("report.PDF"), "application/pdf");
        assert_eq!(content_type_for_name("/tmp/photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for_name("notes/hello.txt"), "text/plain");
        assert_eq!(content_type_for_name("archive"), "application/octet-stream");
        assert_eq!(content_type_for_name(".bashrc"), "application/octet-stream");
    }

    #[test]
    fn text_detection_uses_extension_or_type() {
        assert!(is_text_like("hello.txt", None));
        assert!(is_text_like("data/config.yml", Some("application/octet-stream")));
        assert!(is_text_like("blob", Some("text/plain; charset=utf-8")));
        assert!(is_text_like("event", Some("application/cloudevents+json")));
        assert!(!is_text_like("image.png", Some("image/png")));
        assert!(!is_text_like("blob", None));
    }
}
