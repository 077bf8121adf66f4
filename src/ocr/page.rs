//! Page decoding
//!
//! Decoding is CPU bound, so the async entry point hands it to the blocking pool.

use std::io::Cursor;

use image::DynamicImage;

use super::types::{DecodedImage, OcrError};

/// Decode uploaded bytes off the async runtime
pub async fn decode_image(bytes: Vec<u8>) -> Result<DecodedImage, OcrError> {
    tokio::task::spawn_blocking(move || decode_image_blocking(&bytes))
        .await
        .map_err(|e| OcrError::ProcessingError(format!("Image decoder task failed: {}", e)))?
}

/// Decode any format the `image` crate recognizes and re-encode it as PNG
pub fn decode_image_blocking(bytes: &[u8]) -> Result<DecodedImage, OcrError> {
    if bytes.is_empty() {
        return Err(OcrError::InvalidImage("uploaded file is empty".to_string()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| OcrError::InvalidImage(format!("cannot identify image file: {}", e)))?;

    // PNG has no float pixel layouts
    let img = match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        other => other,
    };

    let (width, height) = (img.width(), img.height());

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to encode page: {}", e)))?;

    Ok(DecodedImage { png, width, height })
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, _| {
        if x % 2 == 0 {
            image::Rgb([0, 0, 0])
        } else {
            image::Rgb([255, 255, 255])
        }
    });
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let decoded = decode_image_blocking(&sample_png(12, 7)).unwrap();
        assert_eq!((decoded.width, decoded.height), (12, 7));
        assert!(decoded.png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_decode_jpeg_is_reencoded_as_png() {
        let img = image::RgbImage::new(4, 4);
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let decoded = decode_image_blocking(&jpeg).unwrap();
        assert!(decoded.png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_rejects_garbage_and_empty_uploads() {
        assert!(matches!(
            decode_image_blocking(b"definitely not an image"),
            Err(OcrError::InvalidImage(_))
        ));
        assert!(matches!(decode_image_blocking(&[]), Err(OcrError::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_async_decode_matches_blocking() {
        let decoded = decode_image(sample_png(3, 3)).await.unwrap();
        assert_eq!(decoded.width, 3);
    }
}
