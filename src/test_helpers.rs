//! Shared test utilities.
//!
//! Provides tag-map builders and in-memory / on-disk test images so tests
//! don't need binary fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let backend = MockBackend::with_photo(600, 400, fujifilm_tags());
//! let bytes = jpeg_bytes(200, 150);
//! ```

use crate::metadata::{
    TAG_DATE_TIME_ORIGINAL, TAG_EXPOSURE_TIME, TAG_F_NUMBER, TAG_FOCAL_LENGTH, TAG_ISO, TAG_MAKE,
    TAG_MODEL, TagMap, TagValue,
};
use exif::experimental::Writer;
use exif::{In, Tag, Value};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// Tags
// =========================================================================

/// Build a [`TagMap`] from `(name, value)` pairs.
pub fn tag_map(entries: &[(&str, TagValue)]) -> TagMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// A complete tag set as a Fujifilm body would write it.
pub fn fujifilm_tags() -> TagMap {
    tag_map(&[
        (TAG_MAKE, TagValue::Text("FUJIFILM".into())),
        (TAG_MODEL, TagValue::Text("X-T4".into())),
        (TAG_DATE_TIME_ORIGINAL, TagValue::Text("2023:05:01 14:30:05".into())),
        (TAG_EXPOSURE_TIME, TagValue::Rational { num: 1, den: 125 }),
        (TAG_F_NUMBER, TagValue::Rational { num: 28, den: 10 }),
        (TAG_ISO, TagValue::Number(800.0)),
        (TAG_FOCAL_LENGTH, TagValue::Rational { num: 35, den: 1 }),
    ])
}

// =========================================================================
// Images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a gradient image as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a gradient image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// The [`fujifilm_tags`] set, at 85mm, as kamadak-exif fields.
pub fn fujifilm_exif_fields() -> Vec<exif::Field> {
    let field = |tag, value| exif::Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    };
    vec![
        field(Tag::Make, Value::Ascii(vec![b"FUJIFILM".to_vec()])),
        field(Tag::Model, Value::Ascii(vec![b"X-T4".to_vec()])),
        field(
            Tag::DateTimeOriginal,
            Value::Ascii(vec![b"2023:05:01 14:30:05".to_vec()]),
        ),
        field(Tag::ExposureTime, Value::Rational(vec![(1, 125).into()])),
        field(Tag::FNumber, Value::Rational(vec![(28, 10).into()])),
        field(Tag::PhotographicSensitivity, Value::Short(vec![800])),
        field(Tag::FocalLength, Value::Rational(vec![(85, 1).into()])),
    ]
}

/// A gradient JPEG carrying `fields` in an APP1 Exif segment after SOI.
pub fn exif_jpeg_bytes(width: u32, height: u32, fields: &[exif::Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let jpeg = jpeg_bytes(width, height);
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write a gradient JPEG into `dir` and return its path.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes(width, height)).unwrap();
    path
}
