//! Image backend trait and shared error type.
//!
//! The [`ImageBackend`] trait covers the three things the framing pipeline
//! needs from an image library: read EXIF tags, decode pixels, and encode a
//! finished canvas. Layout and drawing happen in-crate; only the codec and
//! metadata work sits behind this seam.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! recording [`MockBackend`](tests::MockBackend).

use super::params::EncodeParams;
use crate::metadata::TagMap;
use image::{DynamicImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read EXIF tags: {0}")]
    Tags(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Failed to load font {path}: {reason}")]
    Font { path: String, reason: String },
}

/// Trait for image codec and metadata backends.
pub trait ImageBackend {
    /// Read the EXIF tags embedded in an image file's bytes.
    fn read_tags(&self, bytes: &[u8]) -> Result<TagMap, BackendError>;

    /// Decode an image, applying its EXIF orientation.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Encode a rendered canvas.
    fn encode(&self, canvas: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, Quality};
    use crate::metadata::TagValue;
    use std::cell::RefCell;

    /// Mock backend that records operations and returns canned results.
    #[derive(Default)]
    pub struct MockBackend {
        /// Returned by `read_tags`; `None` makes it fail.
        pub tags: Option<TagMap>,
        /// Returned by `decode`; `None` makes it fail.
        pub image: Option<DynamicImage>,
        pub operations: RefCell<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        ReadTags(usize),
        Decode(usize),
        Encode {
            width: u32,
            height: u32,
            format: OutputFormat,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// A backend whose decode yields a `width`x`height` grey image and
        /// whose tag read yields `tags`.
        pub fn with_photo(width: u32, height: u32, tags: TagMap) -> Self {
            Self {
                tags: Some(tags),
                image: Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                    width,
                    height,
                    image::Rgb([128, 128, 128]),
                ))),
                operations: RefCell::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.borrow().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn read_tags(&self, bytes: &[u8]) -> Result<TagMap, BackendError> {
            self.operations
                .borrow_mut()
                .push(RecordedOp::ReadTags(bytes.len()));
            self.tags
                .clone()
                .ok_or_else(|| BackendError::Tags("No mock tags".to_string()))
        }

        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.operations
                .borrow_mut()
                .push(RecordedOp::Decode(bytes.len()));
            self.image
                .clone()
                .ok_or_else(|| BackendError::Decode("No mock image".to_string()))
        }

        fn encode(
            &self,
            canvas: &RgbImage,
            params: &EncodeParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.borrow_mut().push(RecordedOp::Encode {
                width: canvas.width(),
                height: canvas.height(),
                format: params.format,
                quality: params.quality.value(),
            });
            Ok(b"encoded".to_vec())
        }
    }

    #[test]
    fn mock_records_read_and_decode() {
        let mut tags = TagMap::new();
        tags.insert("Model".into(), TagValue::Text("X100V".into()));
        let backend = MockBackend::with_photo(60, 40, tags);

        let read = backend.read_tags(b"abc").unwrap();
        assert_eq!(read["Model"], TagValue::Text("X100V".into()));
        let img = backend.decode(b"abcd").unwrap();
        assert_eq!((img.width(), img.height()), (60, 40));

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::ReadTags(3), RecordedOp::Decode(4)]
        );
    }

    #[test]
    fn mock_without_results_fails() {
        let backend = MockBackend::new();
        assert!(matches!(backend.read_tags(b""), Err(BackendError::Tags(_))));
        assert!(matches!(backend.decode(b""), Err(BackendError::Decode(_))));
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();
        let canvas = RgbImage::new(30, 20);
        let bytes = backend
            .encode(&canvas, &EncodeParams::jpeg(Quality::new(80)))
            .unwrap();
        assert_eq!(bytes, b"encoded");
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Encode {
                width: 30,
                height: 20,
                format: OutputFormat::Jpeg,
                quality: 80,
            }
        ));
    }
}
