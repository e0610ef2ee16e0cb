//! Upload validation before decoding.

use crate::config::{LimitsConfig, UploadConfig};
use crate::error::PipelineError;

/// Validates uploaded bytes before they reach the decoder.
pub struct Validator {
    limits: LimitsConfig,
    upload: UploadConfig,
}

impl Validator {
    /// Create a new validator with the given limits and accepted formats.
    pub fn new(limits: LimitsConfig, upload: UploadConfig) -> Self {
        Self { limits, upload }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - Upload is not empty
    /// - Upload size is within limits
    /// - File extension (when present) is an accepted format
    /// - Bytes start with valid image magic bytes
    pub fn validate(&self, bytes: &[u8], file_name: &str) -> Result<(), PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyUpload {
                file_name: file_name.to_string(),
            });
        }

        let len = bytes.len() as u64;
        if len > self.limits.max_file_size_bytes() as u64 {
            return Err(PipelineError::FileTooLarge {
                file_name: file_name.to_string(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if let Some(ext) = extension(file_name) {
            let accepted = self
                .upload
                .supported_formats
                .iter()
                .any(|f| f.eq_ignore_ascii_case(&ext));
            if !accepted {
                return Err(PipelineError::UnsupportedFormat {
                    file_name: file_name.to_string(),
                    format: ext,
                });
            }
        }

        if !is_valid_image_header(bytes) {
            return Err(PipelineError::Decode {
                file_name: file_name.to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }
}

/// Lowercased extension of a file name, if it has one.
fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Check if the leading bytes match a known image container.
fn is_valid_image_header(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }

    // PNG: 89 50 4E 47
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }

    // GIF: GIF8
    if header.starts_with(b"GIF8") {
        return true;
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") {
        return header.len() >= 12 && &header[8..12] == b"WEBP";
    }

    // BMP: BM
    if header.starts_with(b"BM") {
        return true;
    }

    // TIFF: II (little-endian) or MM (big-endian) followed by version 42
    if header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return true;
    }

    false
}
