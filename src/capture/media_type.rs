//! Media type declaration for uploaded images.
//!
//! Extension first (what the browser would have declared), then content
//! sniffing via the `image` crate, then a generic fallback.

use std::path::Path;

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type for an image file at `path` with content `bytes`.
pub fn declared_media_type(path: &Path, bytes: &[u8]) -> &'static str {
    if let Some(mime) = from_extension(path) {
        return mime;
    }
    match sniff(bytes) {
        Some(mime) => {
            log::debug!("[CAPTURE] Sniffed {} for {}", mime, path.display());
            mime
        }
        None => {
            log::warn!(
                "[CAPTURE] Could not determine media type of {} — sending {}",
                path.display(),
                FALLBACK_MEDIA_TYPE
            );
            FALLBACK_MEDIA_TYPE
        }
    }
}

fn from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => return None,
    };
    Some(mime)
}

fn sniff(bytes: &[u8]) -> Option<&'static str> {
    use image::ImageFormat;

    let mime = match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}
