//! Pure Rust image backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | EXIF tags | `kamadak-exif` (`exif::Reader::read_from_container`) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` + decoder orientation |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |

use super::backend::{BackendError, ImageBackend};
use super::params::{EncodeParams, OutputFormat};
use crate::metadata::{
    TAG_DATE_TIME_ORIGINAL, TAG_EXPOSURE_TIME, TAG_F_NUMBER, TAG_FOCAL_LENGTH, TAG_GPS_LATITUDE,
    TAG_GPS_LONGITUDE, TAG_ISO, TAG_MAKE, TAG_MODEL, TagMap, TagValue,
};
use exif::{In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// EXIF tags read from the primary image, and the names they are reported under.
const TAG_NAMES: &[(Tag, &str)] = &[
    (Tag::Make, TAG_MAKE),
    (Tag::Model, TAG_MODEL),
    (Tag::DateTimeOriginal, TAG_DATE_TIME_ORIGINAL),
    (Tag::ExposureTime, TAG_EXPOSURE_TIME),
    (Tag::FNumber, TAG_F_NUMBER),
    (Tag::PhotographicSensitivity, TAG_ISO),
    (Tag::FocalLength, TAG_FOCAL_LENGTH),
    (Tag::GPSLatitude, TAG_GPS_LATITUDE),
    (Tag::GPSLongitude, TAG_GPS_LONGITUDE),
];

/// Pure Rust backend using `image` and `kamadak-exif`.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert the first component of an EXIF value into a [`TagValue`].
///
/// Multi-component values (GPS degrees/minutes/seconds) keep only the first
/// component; callers only test those for presence.
fn tag_value(value: &Value) -> Option<TagValue> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| TagValue::Text(String::from_utf8_lossy(bytes).into_owned())),
        Value::Rational(v) => v.first().map(|r| TagValue::Rational {
            num: r.num as i64,
            den: r.denom as i64,
        }),
        Value::SRational(v) => v.first().map(|r| TagValue::Rational {
            num: r.num as i64,
            den: r.denom as i64,
        }),
        Value::Short(v) => v.first().map(|n| TagValue::Number(f64::from(*n))),
        Value::Long(v) => v.first().map(|n| TagValue::Number(f64::from(*n))),
        Value::SShort(v) => v.first().map(|n| TagValue::Number(f64::from(*n))),
        Value::SLong(v) => v.first().map(|n| TagValue::Number(f64::from(*n))),
        Value::Float(v) => v.first().map(|n| TagValue::Number(f64::from(*n))),
        Value::Double(v) => v.first().map(|n| TagValue::Number(*n)),
        _ => None,
    }
}

impl ImageBackend for RustBackend {
    fn read_tags(&self, bytes: &[u8]) -> Result<TagMap, BackendError> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .map_err(|e| BackendError::Tags(e.to_string()))?;

        let tags: TagMap = TAG_NAMES
            .iter()
            .filter_map(|(tag, name)| {
                let field = exif.get_field(*tag, In::PRIMARY)?;
                tag_value(&field.value).map(|value| (name.to_string(), value))
            })
            .collect();
        debug!(count = tags.len(), "read EXIF tags");
        Ok(tags)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_decoder()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut img =
            DynamicImage::from_decoder(decoder).map_err(|e| BackendError::Decode(e.to_string()))?;
        img.apply_orientation(orientation);
        Ok(img)
    }

    fn encode(&self, canvas: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let (width, height) = canvas.dimensions();
        let result = match params.format {
            OutputFormat::Png => PngEncoder::new(&mut buf).write_image(
                canvas.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
            OutputFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut buf, params.quality.value() as u8).write_image(
                    canvas.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
        };
        result.map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
