//! Content-type lookup by file extension.
//!
//! The table is built on first use and never mutated afterwards, so every
//! connection task reads it without synchronisation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Served when the extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Content type of the fixed error bodies.
pub const PLAIN_TEXT: &str = "text/plain; charset=UTF-8";

static MIME_TYPES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        // web & text
        ("html", "text/html"),
        ("htm", "text/html"),
        ("xhtml", "application/xhtml+xml"),
        ("css", "text/css"),
        ("js", "text/javascript"),
        ("mjs", "text/javascript"),
        ("json", "application/json"),
        ("map", "application/json"),
        ("xml", "application/xml"),
        ("rss", "application/rss+xml"),
        ("atom", "application/atom+xml"),
        ("txt", "text/plain"),
        ("log", "text/plain"),
        ("md", "text/markdown"),
        ("csv", "text/csv"),
        ("yaml", "text/yaml"),
        ("yml", "text/yaml"),
        ("toml", "application/toml"),
        ("wasm", "application/wasm"),
        ("webmanifest", "application/manifest+json"),
        // images
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("webp", "image/webp"),
        ("avif", "image/avif"),
        ("svg", "image/svg+xml"),
        ("ico", "image/x-icon"),
        ("bmp", "image/bmp"),
        ("tif", "image/tiff"),
        ("tiff", "image/tiff"),
        // audio
        ("mp3", "audio/mpeg"),
        ("wav", "audio/wav"),
        ("ogg", "audio/ogg"),
        ("oga", "audio/ogg"),
        ("flac", "audio/flac"),
        ("aac", "audio/aac"),
        ("m4a", "audio/mp4"),
        // video
        ("mp4", "video/mp4"),
        ("m4v", "video/mp4"),
        ("webm", "video/webm"),
        ("ogv", "video/ogg"),
        ("mov", "video/quicktime"),
        ("avi", "video/x-msvideo"),
        // fonts
        ("woff", "font/woff"),
        ("woff2", "font/woff2"),
        ("ttf", "font/ttf"),
        ("otf", "font/otf"),
        // documents & archives
        ("pdf", "application/pdf"),
        ("zip", "application/zip"),
        ("gz", "application/gzip"),
        ("tar", "application/x-tar"),
        ("7z", "application/x-7z-compressed"),
        ("bin", "application/octet-stream"),
    ]
    .into_iter()
    .collect()
});

/// Looks up the content type for an extension (without the dot).
///
/// Matching is ASCII case-insensitive.
pub fn lookup(extension: &str) -> Option<&'static str> {
    if extension.bytes().any(|b| b.is_ascii_uppercase()) {
        MIME_TYPES.get(extension.to_ascii_lowercase().as_str()).copied()
    } else {
        MIME_TYPES.get(extension).copied()
    }
}

/// Content type for a file, chosen by the text after its last `.`.
pub fn content_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(lookup)
        .unwrap_or(DEFAULT_MIME_TYPE)
}
