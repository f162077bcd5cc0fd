//! Decoding source bytes and encoding derivatives
//!
//! The source format is sniffed from the bytes; the output format follows the
//! object's extension so a derivative always keeps its source's file type.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use thumbnailer_core::ImageKind;
use thumbnailer_storage::ObjectMetadata;

use crate::error::ProcessingError;

/// Encoded derivative ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    pub encoded_bytes: Bytes,
    pub content_type: String,
    /// Always the exact length of `encoded_bytes`.
    pub content_length: u64,
    pub width: u32,
    pub height: u32,
}

impl Derivative {
    pub fn metadata(&self) -> ObjectMetadata {
        ObjectMetadata {
            content_type: self.content_type.clone(),
            content_length: self.content_length,
        }
    }
}

pub struct ImageCodec;

impl ImageCodec {
    pub fn image_format(kind: ImageKind) -> ImageFormat {
        match kind {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
        }
    }

    /// Decode raw object bytes into a pixel buffer.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
        let reader = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let format = reader.format();
        let img = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ProcessingError::InvalidDimensions {
                width,
                height,
                target_size: 0,
            });
        }

        tracing::debug!(
            width,
            height,
            format = ?format,
            size_bytes = data.len(),
            "Decoded source image"
        );

        Ok(img)
    }

    /// Encode `img` as `kind` and build the derivative's metadata.
    pub fn encode(
        img: &DynamicImage,
        kind: ImageKind,
        content_type: String,
    ) -> Result<Derivative, ProcessingError> {
        let (width, height) = img.dimensions();

        let mut buffer = Vec::with_capacity((width as usize) * (height as usize) * 3 / 4);
        let mut cursor = Cursor::new(&mut buffer);

        let format = Self::image_format(kind);
        let result = match kind {
            // JPEG carries no alpha channel.
            ImageKind::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut cursor, format),
            ImageKind::Png => img.write_to(&mut cursor, format),
        };
        result.map_err(|e| ProcessingError::Encode(e.to_string()))?;

        let content_length = buffer.len() as u64;

        Ok(Derivative {
            encoded_bytes: Bytes::from(buffer),
            content_type,
            content_length,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn rgba_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 128])))
    }

    #[test]
    fn test_encode_png_preserves_alpha() {
        let derivative =
            ImageCodec::encode(&rgba_image(20, 10), ImageKind::Png, "image/png".to_string())
                .unwrap();
        assert_eq!(derivative.content_length, derivative.encoded_bytes.len() as u64);
        assert_eq!((derivative.width, derivative.height), (20, 10));

        let decoded = ImageCodec::decode(&derivative.encoded_bytes).unwrap();
        assert_eq!(decoded.dimensions(), (20, 10));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_encode_jpeg_from_rgba() {
        let derivative =
            ImageCodec::encode(&rgba_image(16, 16), ImageKind::Jpeg, "image/jpeg".to_string())
                .unwrap();
        assert_eq!(&derivative.encoded_bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(derivative.metadata().content_type, "image/jpeg");
        assert_eq!(
            derivative.metadata().content_length,
            derivative.encoded_bytes.len() as u64
        );

        let decoded = ImageCodec::decode(&derivative.encoded_bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_decode_sniffs_format() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, Rgb([1, 2, 3])));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let decoded = ImageCodec::decode(&png).unwrap();
        assert_eq!(decoded.dimensions(), (8, 4));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        assert!(matches!(
            ImageCodec::decode(b"not an image"),
            Err(ProcessingError::Decode(_))
        ));
    }

    #[test]
    fn test_image_format_mapping() {
        assert_eq!(ImageCodec::image_format(ImageKind::Jpeg), ImageFormat::Jpeg);
        assert_eq!(ImageCodec::image_format(ImageKind::Png), ImageFormat::Png);
    }
}
