//! Data-URI image payload decoding.
//!
//! The browser client captures or uploads sheet photos and ships them as
//! `data:image/<subtype>;base64,<payload>` strings. Decoding is all-or-nothing
//! per batch: the recognition service accepts one multi-file request, so a
//! single bad payload fails the whole batch before any remote call is made.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

use rollmark_core::AttendanceError;

/// Pattern matching a base64 data-URI with an image media type.
static DATA_URI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(image/[a-z0-9.+-]+);base64,([A-Za-z0-9+/=]+)$").unwrap());

/// One decoded attendance-sheet photo.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Declared media type, e.g. `image/jpeg`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Filename used for the multipart part carrying this image.
    pub fn file_name(&self, index: usize) -> String {
        let ext = match self.mime.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "bin",
        };
        format!("sheet-{index}.{ext}")
    }
}

/// Decode one data-URI payload.
pub fn decode_data_uri(payload: &str) -> Result<DecodedImage, AttendanceError> {
    let captures = DATA_URI_PATTERN.captures(payload.trim()).ok_or_else(|| {
        AttendanceError::InvalidImageEncoding(
            "payload is not a base64 image data-URI".to_string(),
        )
    })?;

    let mime = captures[1].to_string();
    let bytes = BASE64.decode(&captures[2]).map_err(|e| {
        AttendanceError::InvalidImageEncoding(format!("invalid base64 payload: {e}"))
    })?;

    Ok(DecodedImage { mime, bytes })
}

/// Decode an entire image batch, failing on the first bad payload.
pub fn decode_batch(images: &[String]) -> Result<Vec<DecodedImage>, AttendanceError> {
    images
        .iter()
        .enumerate()
        .map(|(i, payload)| {
            decode_data_uri(payload).map_err(|e| {
                AttendanceError::InvalidImageEncoding(format!("image {i}: {e}"))
            })
        })
        .collect()
}
