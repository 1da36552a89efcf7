use crate::error::AppError;
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Upload ceiling: 5 MiB
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Used when neither the bytes nor the file name identify the format
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// An image picked by the user, held in memory for the session
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

/// Image metadata for presentation (no payload)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageInfo {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

/// Base64 payload ready for transmission
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl SelectedImage {
    /// Wrap raw bytes. The MIME type is sniffed from the content, then the file name.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let file_name = file_name.into();
        let bytes = bytes.into();
        let mime_type = detect_mime_type(&bytes, &file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size(),
        }
    }
}

/// Reject images over [`MAX_IMAGE_BYTES`]
pub fn validate_image_size(size: usize) -> Result<(), AppError> {
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::ImageTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Best-effort MIME detection: magic bytes first, then extension.
pub fn detect_mime_type(bytes: &[u8], file_name: &str) -> &'static str {
    if let Some(mime) = sniff_mime_type(bytes) {
        return mime;
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => DEFAULT_MIME_TYPE,
    }
}

fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Base64-encode the image. CPU-bound; callers run it off the async executor.
pub fn encode_image(image: &SelectedImage) -> EncodedImage {
    EncodedImage {
        mime_type: image.mime_type.clone(),
        data: general_purpose::STANDARD.encode(&image.bytes),
    }
}

/// Parse a data URL (e.g., "data:image/jpeg;base64,<data>")
/// Returns (mime_type, decoded bytes)
pub fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>), AppError> {
    let url_body = data_url.strip_prefix("data:").ok_or_else(|| {
        AppError::InvalidUpload("Invalid data URL: must start with 'data:'".to_string())
    })?;

    let (header, data) = url_body.split_once(',').ok_or_else(|| {
        AppError::InvalidUpload("Invalid data URL format: missing comma separator".to_string())
    })?;

    // Header: "image/jpeg;base64" or just "image/jpeg"
    let mut header_parts = header.split(';');
    let mime_type = header_parts.next().unwrap_or_default().to_string();

    if !header_parts.any(|part| part == "base64") {
        return Err(AppError::InvalidUpload(
            "Only base64-encoded data URLs are supported".to_string(),
        ));
    }

    if !mime_type.to_lowercase().starts_with("image/") {
        return Err(AppError::InvalidUpload(format!(
            "Invalid MIME type for image: {}",
            mime_type
        )));
    }

    let decoded = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::InvalidUpload(format!("Invalid base64 data: {}", e)))?;

    Ok((mime_type, decoded))
}
