use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::error::ImageError;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

// Downscale an uploaded photo so a single record stays small, then embed it
// as a JPEG data URL. Never upscales.
pub fn resize_and_encode(bytes: &[u8], max_width: u32, quality: u8) -> Result<String, ImageError> {
    if max_width == 0 {
        return Err(ImageError::InvalidParameters("max_width must be positive".into()));
    }
    if !(1..=100).contains(&quality) {
        return Err(ImageError::InvalidParameters(format!(
            "quality must be within 1..=100, got {quality}"
        )));
    }

    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());

    let img = if width > max_width {
        let scaled_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
        img.resize_exact(max_width, scaled_height, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality).encode_image(&rgb)?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(&encoded);
    Ok(format!("{DATA_URL_PREFIX}{b64}"))
}
