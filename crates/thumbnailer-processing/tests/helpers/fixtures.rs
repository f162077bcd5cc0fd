use aws_lambda_events::s3::{S3Bucket, S3Entity, S3Event, S3EventRecord, S3Object};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Solid-colour JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 120, 40])));
    encode(&img, ImageFormat::Jpeg)
}

/// PNG with partial transparency.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([30, 90, 200, 180]),
    ));
    encode(&img, ImageFormat::Png)
}

pub fn decode(data: &[u8]) -> DynamicImage {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap()
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

/// Single-record upload notification; `encoded_key` is URL-encoded as S3 delivers it.
pub fn s3_event(bucket: &str, encoded_key: &str) -> S3Event {
    S3Event {
        records: vec![S3EventRecord {
            event_name: Some("ObjectCreated:Put".to_string()),
            s3: S3Entity {
                bucket: S3Bucket {
                    name: Some(bucket.to_string()),
                    ..Default::default()
                },
                object: S3Object {
                    key: Some(encoded_key.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }],
    }
}
