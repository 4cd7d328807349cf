//! Extension-based media classification.
//!
//! Pure functions, no I/O: the kind of a file is decided once from its
//! extension at load time and never revisited.

use std::path::Path;

use crate::record::MediaKind;

/// Recognized image extensions (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

/// Recognized video extensions (matched case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"];

/// Classify a path by its extension.
pub fn kind_for_path(path: &Path) -> MediaKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return MediaKind::Unknown;
    };

    if IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        MediaKind::Video
    } else {
        MediaKind::Unknown
    }
}

/// Check whether a path has a recognized image or video extension.
pub fn is_media_path(path: &Path) -> bool {
    kind_for_path(path).is_media()
}
