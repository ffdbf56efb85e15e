//! Extension-based MIME classification.

use std::path::Path;

/// Fallback for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Static extension table. Extensions are matched case-insensitively.
const MIME_TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/plain"),
    ("markdown", "text/plain"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("go", "text/plain"),
    ("py", "text/plain"),
    ("java", "text/plain"),
    ("c", "text/plain"),
    ("cpp", "text/plain"),
    ("h", "text/plain"),
    ("rs", "text/plain"),
    ("toml", "text/plain"),
    ("yaml", "text/plain"),
    ("yml", "text/plain"),
];

/// MIME type for `path`, based on its extension.
pub fn mime_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return OCTET_STREAM;
    };
    MIME_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map_or(OCTET_STREAM, |&(_, mime)| mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_type(Path::new("d/y.json")), "application/json");
        assert_eq!(mime_type(Path::new("README.md")), "text/plain");
        assert_eq!(mime_type(Path::new("index.HTML")), "text/html");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(mime_type(Path::new("blob.bin")), OCTET_STREAM);
        assert_eq!(mime_type(Path::new("Makefile")), OCTET_STREAM);
        assert_eq!(mime_type(Path::new(".hidden")), OCTET_STREAM);
    }
}
