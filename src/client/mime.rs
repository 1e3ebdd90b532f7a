//! Content type for uploads, guessed from the file extension.

use std::path::Path;

/// Sent when the extension is missing or unknown
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extensions the service forwards as text, documents or media
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("csv", "text/csv"),
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("3gp", "video/3gpp"),
    ("ogg", "audio/ogg"),
    ("mp3", "audio/mpeg"),
];

pub fn detect_mime_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return OCTET_STREAM;
    };

    KNOWN_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map_or(OCTET_STREAM, |&(_, mime)| mime)
}
