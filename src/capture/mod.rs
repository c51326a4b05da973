//! Image intake domain: public API.
//!
//! Turns a user-supplied image file into the transport payload the
//! inference client sends: base64 data plus a declared media type.
//! External code should only use the items exported here.

mod media_type;

pub use media_type::{declared_media_type, FALLBACK_MEDIA_TYPE};

use crate::error::InspectError;
use base64::Engine;
use std::path::Path;

/// How the user produced the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Taken with the device camera.
    Camera,
    /// Chosen from existing files.
    Upload,
}

/// Transport-ready image, owned by the request that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: String,
    /// Base64 (standard alphabet, padded).
    pub data: String,
    /// Size of the decoded content, for logging.
    pub byte_len: usize,
}

/// Read `path` fully and encode it.
///
/// Fails with `InputRead` when the file can't be read or is empty.
pub async fn encode(path: &Path) -> Result<EncodedImage, InspectError> {
    let start = std::time::Instant::now();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log::error!("[CAPTURE] Failed to read {}: {}", path.display(), e);
        InspectError::InputRead(format!("{}: {}", path.display(), e))
    })?;

    let declared = declared_media_type(path, &bytes);
    let image = encode_bytes(&bytes, declared)?;
    log::info!(
        "[CAPTURE] Encoded {} ({}, {} bytes) in {}ms",
        path.display(),
        image.media_type,
        image.byte_len,
        start.elapsed().as_millis()
    );
    Ok(image)
}

/// Encode in-memory content with an already-known media type.
pub fn encode_bytes(bytes: &[u8], media_type: &str) -> Result<EncodedImage, InspectError> {
    if bytes.is_empty() {
        return Err(InspectError::InputRead("file is empty".to_string()));
    }

    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    if data.is_empty() {
        return Err(InspectError::InputRead("encoding produced no data".to_string()));
    }

    Ok(EncodedImage {
        media_type: media_type.to_string(),
        data,
        byte_len: bytes.len(),
    })
}
