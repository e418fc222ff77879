//! Mime type lookup
//!
//! Fixed extension table used when the backend does not report a content
//! type for an object.

use crate::path::MARKER_NAME;

/// Synthetic type reported for folder marker names
pub const FOLDER_MIME: &str = "folder";

/// Fallback type for unknown extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
];

/// Looks up the mime type for a file name by extension
///
/// # Examples
///
/// ```
/// use fs_view::mime_for_name;
///
/// assert_eq!(mime_for_name("photo.JPG"), "image/jpeg");
/// assert_eq!(mime_for_name("notes"), "application/octet-stream");
/// assert_eq!(mime_for_name("Docs/.folder"), "folder");
/// ```
pub fn mime_for_name(name: &str) -> &'static str {
    if name.ends_with(MARKER_NAME) {
        return FOLDER_MIME;
    }

    let extension = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(OCTET_STREAM)
}

/// Returns a human-readable label for a mime type
pub fn type_label(mime: &str) -> String {
    let label = match mime {
        FOLDER_MIME => "Folder",
        "image/jpeg" => "JPEG image",
        "image/png" => "PNG image",
        "image/gif" => "GIF image",
        "image/svg+xml" => "SVG image",
        "image/webp" => "WebP image",
        "application/pdf" => "PDF document",
        "application/msword"
        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            "Word document"
        }
        "application/vnd.ms-excel"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
            "Excel spreadsheet"
        }
        "application/vnd.ms-powerpoint"
        | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
            "PowerPoint presentation"
        }
        "audio/mpeg" => "MP3 audio",
        "video/mp4" => "MP4 video",
        "text/plain" => "Text file",
        "text/csv" => "CSV file",
        "application/json" => "JSON file",
        "application/zip" | "application/x-zip-compressed" => "ZIP archive",
        _ => "",
    };

    if !label.is_empty() {
        return label.to_string();
    }

    match mime.split_once('/').map(|(top, _)| top) {
        Some("image") => "Image".to_string(),
        Some("audio") => "Audio".to_string(),
        Some("video") => "Video".to_string(),
        Some("text") => "Text file".to_string(),
        Some("application") => "Application file".to_string(),
        _ if mime.is_empty() => "Unknown file".to_string(),
        _ => mime.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries() {
        assert_eq!(mime_for_name("a.jpeg"), "image/jpeg");
        assert_eq!(mime_for_name("a.png"), "image/png");
        assert_eq!(mime_for_name("a.gif"), "image/gif");
        assert_eq!(mime_for_name("a.pdf"), "application/pdf");
        assert_eq!(mime_for_name("a.doc"), "application/msword");
        assert_eq!(mime_for_name("a.xls"), "application/vnd.ms-excel");
        assert_eq!(mime_for_name("song.mp3"), "audio/mpeg");
        assert_eq!(mime_for_name("clip.mp4"), "video/mp4");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        assert_eq!(mime_for_name("readme.txt"), OCTET_STREAM);
        assert_eq!(mime_for_name("archive.tar.gz"), OCTET_STREAM);
        assert_eq!(mime_for_name("Makefile"), OCTET_STREAM);
    }

    #[test]
    fn test_folder_suffix_wins() {
        assert_eq!(mime_for_name(".folder"), FOLDER_MIME);
        assert_eq!(mime_for_name("odd.folder"), FOLDER_MIME);
    }

    #[test]
    fn test_type_label() {
        assert_eq!(type_label("image/png"), "PNG image");
        assert_eq!(type_label("image/tiff"), "Image");
        assert_eq!(type_label("application/x-tar"), "Application file");
        assert_eq!(type_label(""), "Unknown file");
        assert_eq!(type_label("font/woff"), "font/woff");
    }
}
