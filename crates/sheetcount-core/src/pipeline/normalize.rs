//! Image normalization for transport: alpha flattening, mode conversion and
//! JPEG re-encoding.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;

use crate::config::NormalizeConfig;
use crate::error::PipelineError;
use crate::llm::ImageInput;

/// Turns decoded uploads into base64 JPEG payloads.
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    /// Create a new normalizer with the given configuration.
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Flatten, re-encode as JPEG and base64-encode an image.
    pub fn normalize(
        &self,
        image: DynamicImage,
        file_name: &str,
    ) -> Result<ImageInput, PipelineError> {
        let flattened = flatten(image);
        let bytes =
            encode_jpeg(&flattened, self.config.jpeg_quality).map_err(|e| PipelineError::Encode {
                file_name: file_name.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(
            file_name,
            jpeg_bytes = bytes.len(),
            quality = self.config.jpeg_quality,
            "Normalized upload"
        );
        Ok(ImageInput::jpeg(&bytes))
    }
}

/// Reduce an image to a layout JPEG can carry.
///
/// - anything with alpha is composited onto white and becomes RGB
/// - 8-bit greyscale and 8-bit RGB pass through
/// - 16-bit greyscale becomes 8-bit greyscale
/// - everything else becomes 8-bit RGB
pub fn flatten(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
        img if img.color().has_alpha() => DynamicImage::ImageRgb8(composite_on_white(&img)),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Composite `image` over an opaque white background using its alpha channel.
fn composite_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba32f();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a.clamp(0.0, 1.0);
        let blend = |c: f32| {
            let v = (c.clamp(0.0, 1.0) * a + (1.0 - a)) * 255.0;
            v.round().clamp(0.0, 255.0) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Encode an 8-bit greyscale or RGB image as baseline JPEG.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}
