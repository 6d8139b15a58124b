//! Image decoding and tensor construction for the classifier.
//!
//! The classifier expects:
//! - Input size: 224×224 pixels
//! - Normalization: pixels scaled to [-1, 1] via (pixel/255 - 0.5) / 0.5
//! - Channel order: RGB
//! - Tensor layout: NHWC [batch, height, width, channels]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use ndarray::Array4;

use crate::error::DecodeError;

/// Spatial input size expected by the classifier.
pub const INPUT_SIZE: u32 = 224;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Normalization mean (per-channel).
const NORM_MEAN: f32 = 0.5;

/// Normalization std (per-channel).
const NORM_STD: f32 = 0.5;

/// Decode an image byte buffer, detecting the format from content.
///
/// `format_hint` is advisory: it is only consulted when content sniffing
/// finds no known magic bytes, which rescues headerless-but-valid inputs
/// without letting a wrong hint override a recognizable format. A buffer
/// that neither sniffs nor matches the hint is `UnknownFormat`; a
/// recognized buffer that fails to decode is `Malformed`.
pub fn decode_image(bytes: &[u8], format_hint: Option<&str>) -> Result<DynamicImage, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Malformed {
            message: format!("Cannot detect image format: {}", e),
        })?;

    if reader.format().is_none() {
        match format_hint.and_then(ImageFormat::from_extension) {
            Some(format) => reader.set_format(format),
            None => return Err(DecodeError::UnknownFormat),
        }
    }

    reader.decode().map_err(|e| DecodeError::Malformed {
        message: e.to_string(),
    })
}

/// Build the classifier input tensor from a decoded image.
///
/// Resizes to `size × size`, converts to RGB, normalizes to [-1, 1], and
/// returns an NHWC tensor suitable for ONNX Runtime.
pub fn build_tensor(image: &DynamicImage, size: u32) -> Array4<f32> {
    let resized = image.resize_exact(size, size, image::imageops::FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, side, side, CHANNELS));

    // NHWC matches the interleaved RGB8 buffer exactly, so the raw bytes
    // map onto the tensor slice with no index arithmetic.
    let raw = rgb.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, &val) in raw.iter().enumerate() {
        tensor_data[i] = (val as f32 / 255.0 - NORM_MEAN) / NORM_STD;
    }

    tensor
}

/// Decode a byte buffer and build the model input tensor in one step.
///
/// A successfully decoded but degenerate image (a single solid color, say)
/// is not an error here; it is a valid tensor the classifier may score
/// below every threshold.
pub fn tensor_from_bytes(
    bytes: &[u8],
    format_hint: Option<&str>,
) -> Result<Array4<f32>, DecodeError> {
    let image = decode_image(bytes, format_hint)?;
    Ok(build_tensor(&image, INPUT_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn jpeg_bytes(image: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn test_build_tensor_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = build_tensor(&img, INPUT_SIZE);
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_build_tensor_normalization_range() {
        // White image (255, 255, 255) -> (255/255 - 0.5) / 0.5 = 1.0
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let tensor = build_tensor(&img, INPUT_SIZE);
        let max_val = tensor.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((max_val - 1.0).abs() < 0.01);

        // Black image (0, 0, 0) -> (0/255 - 0.5) / 0.5 = -1.0
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])));
        let tensor = build_tensor(&img, INPUT_SIZE);
        let min_val = tensor.iter().cloned().fold(f32::INFINITY, f32::min);
        assert!((min_val - (-1.0)).abs() < 0.01);
    }

    #[test]
    fn test_build_tensor_channel_order() {
        // A uniform (255, 0, 127) image pins each channel's normalized value.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([255, 0, 127])));
        let tensor = build_tensor(&img, INPUT_SIZE);
        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 0.02);
        assert!((tensor[[0, 100, 100, 1]] + 1.0).abs() < 0.02);
        assert!(tensor[[0, 100, 100, 2]].abs() < 0.02);
    }

    #[test]
    fn test_decode_jpeg_from_content() {
        let bytes = jpeg_bytes(&RgbImage::from_pixel(16, 16, Rgb([120, 80, 40])));
        // No hint needed: format comes from the magic bytes.
        let tensor = tensor_from_bytes(&bytes, None).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_solid_color_image_is_not_an_error() {
        let bytes = jpeg_bytes(&RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])));
        assert!(tensor_from_bytes(&bytes, Some("jpeg")).is_ok());
    }

    #[test]
    fn test_non_image_bytes_unknown_format() {
        let err = tensor_from_bytes(b"PK\x03\x04 this is a docx, not an image", None).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownFormat));
        assert!(err.to_string().to_lowercase().contains("format"));
    }

    #[test]
    fn test_unusable_hint_still_unknown_format() {
        let err = tensor_from_bytes(b"plain text", Some("docx")).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownFormat));
    }

    #[test]
    fn test_hint_forces_decode_attempt() {
        // Sniffing fails, the hint names a real format, decoding then fails
        // with the decoder's own message rather than UnknownFormat.
        let err = tensor_from_bytes(b"not a jpeg at all", Some("jpeg")).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }
}
