//! Image decoding with format detection, validation, and timeout support.

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::ImageInfo;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an upload.
pub struct DecodedImage {
    /// Client-supplied file name
    pub file_name: String,
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Upload size in bytes
    pub file_size: u64,
}

impl DecodedImage {
    /// Summary shown in the image information panel.
    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            file_name: self.file_name.clone(),
            width: self.width,
            height: self.height,
            mode: color_mode_name(self.image.color()).to_string(),
            format: format_to_string(self.format),
            file_size: self.file_size,
        }
    }
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an uploaded byte buffer on the blocking pool, with timeout and
    /// dimension checks.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<DecodedImage, PipelineError> {
        let name = file_name.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async move {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &name)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        file_name: file_name.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                file_name: file_name.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                file_name: file_name.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    pub fn decode_bytes_sync(
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let file_size = bytes.len() as u64;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                file_name: file_name.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader
            .format()
            .ok_or_else(|| PipelineError::UnsupportedFormat {
                file_name: file_name.to_string(),
                format: "unknown".to_string(),
            })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            file_name: file_name.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            file_name: file_name.to_string(),
            image,
            format,
            width,
            height,
            file_size,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}

/// Short colour-mode name for a pixel layout.
pub fn color_mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_color_mode_name() {
        assert_eq!(color_mode_name(ColorType::L8), "L");
        assert_eq!(color_mode_name(ColorType::Rgba8), "RGBA");
        assert_eq!(color_mode_name(ColorType::Rgb16), "RGB;16");
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes uploaded under a .jpg name are still decoded as PNG
        let bytes = png_bytes(&DynamicImage::new_rgba8(8, 4));
        let decoded = ImageDecoder::decode_bytes_sync(bytes, "misnamed.jpg").unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);

        let info = decoded.info();
        assert_eq!(info.file_name, "misnamed.jpg");
        assert_eq!((info.width, info.height), (8, 4));
        assert_eq!(info.mode, "RGBA");
        assert_eq!(info.format, "png");
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result = ImageDecoder::decode_bytes_sync(b"definitely not an image".to_vec(), "x.png");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_dimensions() {
        let limits = LimitsConfig {
            max_image_dimension: 16,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let bytes = png_bytes(&DynamicImage::new_rgb8(32, 8));

        let err = decoder.decode_from_bytes(bytes, "wide.png").await.err().unwrap();
        assert!(matches!(
            err,
            PipelineError::ImageTooLarge {
                width: 32,
                height: 8,
                max_dim: 16,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_decode_from_bytes_records_size() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let bytes = png_bytes(&DynamicImage::new_luma8(10, 10));
        let len = bytes.len() as u64;

        let decoded = decoder.decode_from_bytes(bytes, "grey.png").await.unwrap();
        assert_eq!(decoded.file_size, len);
        assert_eq!(decoded.info().mode, "L");
    }
}
