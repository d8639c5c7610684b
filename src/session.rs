//! One framing session: the loaded photo, its editable metadata, the layout
//! selections, and exports.
//!
//! ```text
//! upload(path)
//!   ├─ declared type must be image/*      ─┐
//!   ├─ size <= upload.max_file_size_mb     ├─ UploadError, session untouched
//!   ├─ read bytes                         ─┘
//!   ├─ read tags (failure → empty tags)
//!   ├─ decode (failure → UploadError::Decode, session untouched)
//!   └─ replace photo + form fields, snap aspect ratio to closest preset
//!
//! export(mode)
//!   └─ no photo → ExportError::NoPhoto
//!      plan_frame → render_frame → backend.encode → ExportArtifact
//! ```
//!
//! Everything happens synchronously on the caller's thread. `export` borrows
//! the session immutably, so an export can't overlap an upload or an edit.

use crate::compositor::{ExportArtifact, ExportMode, plan_frame};
use crate::config::{ConfigError, FrameConfig};
use crate::imaging::{BackendError, ImageBackend, RustBackend, render_frame};
use crate::layout::{Align, AspectRatio, FrameColor, LayoutState, LayoutView, Template};
use crate::metadata::{
    DisplayFields, Field, FormFields, MetadataRecord, TagMap, read_tags_or_empty,
};
use ab_glyph::FontVec;
use image::{DynamicImage, ImageFormat};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{name} is not a supported image type")]
    UnsupportedType { name: String },
    #[error("{name} is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: BackendError,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No photo loaded")]
    NoPhoto,
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Export failed: {0}")]
    Backend(#[from] BackendError),
}

/// The photo currently shown in the frame.
#[derive(Debug, Clone)]
pub struct LoadedPhoto {
    /// File name or caller-supplied label.
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Tags as read at upload time; empty when the file had none.
    pub tags: TagMap,
    /// Decoded pixels with EXIF orientation applied.
    pub image: DynamicImage,
}

impl LoadedPhoto {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// MIME type implied by a file's extension, if it names a known image format.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path).ok().map(|f| f.to_mime_type())
}

/// Read at most `limit + 1` bytes, enough to tell whether a source exceeds `limit`.
fn read_capped<R: Read>(reader: R, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    Ok(bytes)
}

pub struct Session<B: ImageBackend = RustBackend> {
    config: FrameConfig,
    backend: B,
    layout: LayoutState,
    fields: FormFields,
    photo: Option<LoadedPhoto>,
    font: Option<FontVec>,
}

impl<B: ImageBackend> Session<B> {
    /// Start an empty session with the configured default layout and no font.
    pub fn new(config: FrameConfig, backend: B) -> Self {
        let defaults = &config.defaults;
        let mut layout =
            LayoutState::new(defaults.template, defaults.aspect_ratio, defaults.frame_color);
        layout.select_align(defaults.align);
        Self {
            config,
            backend,
            layout,
            fields: FormFields::default(),
            photo: None,
            font: None,
        }
    }

    /// Use `font` for overlay text. Without a font, exports carry no text.
    pub fn with_font(mut self, font: Option<FontVec>) -> Self {
        self.font = font;
        self
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn photo(&self) -> Option<&LoadedPhoto> {
        self.photo.as_ref()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Load a photo from disk.
    ///
    /// The declared type comes from the file extension and the size from file
    /// metadata, so oversized or non-image files are rejected before reading.
    /// The read itself stops one byte past the limit and the size is checked
    /// again, in case the file grew in between.
    pub fn upload(&mut self, path: &Path) -> Result<&LoadedPhoto, UploadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_type_for(path).unwrap_or_default();
        let size = fs::metadata(path)?.len();
        self.check_declared(&name, mime, size)?;
        let bytes = read_capped(File::open(path)?, self.config.max_upload_bytes())?;
        self.check_declared(&name, mime, bytes.len() as u64)?;
        self.load(name, mime.to_string(), bytes)
    }

    /// Load a photo from memory with a caller-declared MIME type.
    pub fn upload_bytes(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&LoadedPhoto, UploadError> {
        self.check_declared(name, mime_type, bytes.len() as u64)?;
        self.load(name.to_string(), mime_type.to_string(), bytes)
    }

    fn check_declared(&self, name: &str, mime_type: &str, size: u64) -> Result<(), UploadError> {
        if !mime_type.starts_with("image/") {
            return Err(UploadError::UnsupportedType {
                name: name.to_string(),
            });
        }
        let limit = self.config.max_upload_bytes();
        if size > limit {
            return Err(UploadError::TooLarge {
                name: name.to_string(),
                size,
                limit,
            });
        }
        Ok(())
    }

    fn load(
        &mut self,
        name: String,
        mime_type: String,
        bytes: Vec<u8>,
    ) -> Result<&LoadedPhoto, UploadError> {
        let tags = read_tags_or_empty(&self.backend, &bytes);

        let image = match self.backend.decode(&bytes) {
            Ok(image) => image,
            Err(source) => return Err(UploadError::Decode { name, source }),
        };

        self.fields = FormFields::from_tags(&tags);
        let ratio = f64::from(image.width()) / f64::from(image.height());
        let snapped = self.layout.apply_closest_preset(ratio);
        info!(
            photo = %name,
            width = image.width(),
            height = image.height(),
            tags = tags.len(),
            aspect_ratio = %self.layout.aspect_ratio(),
            snapped = snapped.is_some(),
            "loaded photo"
        );

        Ok(&*self.photo.insert(LoadedPhoto {
            name,
            mime_type,
            size_bytes: bytes.len() as u64,
            tags,
            image,
        }))
    }

    // =========================================================================
    // Edits and selections
    // =========================================================================

    /// Overwrite one form field. The next display/export reflects it.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    pub fn select_template(&mut self, template: Template) {
        self.layout.select_template(template);
    }

    /// Returns `false` when the template locks the aspect ratio.
    pub fn select_aspect_ratio(&mut self, ratio: AspectRatio) -> bool {
        self.layout.select_aspect_ratio(ratio)
    }

    /// Returns `false` when the template locks the frame colour.
    pub fn select_frame_color(&mut self, color: FrameColor) -> bool {
        self.layout.select_frame_color(color)
    }

    pub fn select_align(&mut self, align: Align) {
        self.layout.select_align(align);
    }

    pub fn view(&self) -> LayoutView {
        self.layout.view()
    }

    pub fn record(&self) -> MetadataRecord {
        self.fields.record()
    }

    pub fn display(&self) -> DisplayFields {
        self.fields.display()
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Render and encode the current frame.
    pub fn export(&self, mode: ExportMode) -> Result<ExportArtifact, ExportError> {
        let photo = self.photo.as_ref().ok_or(ExportError::NoPhoto)?;
        let target = mode.target(&self.config);
        let palette = self.config.colors.palette(self.layout.frame_color())?;
        let view = self.view();

        let plan = plan_frame(&view, &self.display(), target.width, palette);
        let canvas = render_frame(&plan, &photo.image, self.font.as_ref());
        let bytes = self.backend.encode(&canvas, &target.encode)?;

        info!(
            mode = mode.name(),
            template = %view.template,
            width = canvas.width(),
            height = canvas.height(),
            bytes = bytes.len(),
            "exported frame"
        );
        Ok(ExportArtifact {
            mode,
            filename: target.filename,
            width: canvas.width(),
            height: canvas.height(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::metadata::{PLACEHOLDER_CAMERA, TAG_MODEL, TagValue};
    use crate::test_helpers::{fujifilm_tags, tag_map, write_jpeg};

    fn session(backend: MockBackend) -> Session<MockBackend> {
        Session::new(FrameConfig::default(), backend)
    }

    fn loaded_session() -> Session<MockBackend> {
        let mut s = session(MockBackend::with_photo(600, 400, fujifilm_tags()));
        s.upload_bytes("dawn.jpg", "image/jpeg", vec![0; 16]).unwrap();
        s
    }

    // =========================================================================
    // Upload validation
    // =========================================================================

    #[test]
    fn upload_rejects_non_image_type() {
        let mut s = session(MockBackend::with_photo(10, 10, TagMap::new()));
        let err = s.upload_bytes("notes.txt", "text/plain", vec![1]).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert!(s.photo().is_none());
        // Rejected before any backend work
        assert!(s.backend.get_operations().is_empty());
    }

    #[test]
    fn upload_rejects_oversized_file() {
        let mut config = FrameConfig::default();
        config.upload.max_file_size_mb = 1;
        let mut s = Session::new(config, MockBackend::with_photo(10, 10, TagMap::new()));

        let err = s
            .upload_bytes("huge.jpg", "image/jpeg", vec![0; 1024 * 1024 + 1])
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 1048576, .. }));
        assert!(s.photo().is_none());
    }

    #[test]
    fn upload_at_exact_limit_is_accepted() {
        let mut config = FrameConfig::default();
        config.upload.max_file_size_mb = 1;
        let mut s = Session::new(config, MockBackend::with_photo(10, 10, TagMap::new()));
        assert!(s.upload_bytes("a.jpg", "image/jpeg", vec![0; 1024 * 1024]).is_ok());
    }

    #[test]
    fn decode_failure_leaves_session_untouched() {
        let mut s = loaded_session();
        s.set_field(Field::Camera, "edited");
        let before_view = s.view();

        let mut failing = MockBackend::new();
        failing.tags = Some(tag_map(&[(TAG_MODEL, TagValue::Text("Other".into()))]));
        s.backend = failing;

        let err = s.upload_bytes("broken.jpg", "image/jpeg", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, UploadError::Decode { .. }));
        assert_eq!(s.photo().unwrap().name, "dawn.jpg");
        assert_eq!(s.fields().camera, "edited");
        assert_eq!(s.view(), before_view);
    }

    #[test]
    fn upload_path_checks_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("readme.md");
        fs::write(&path, b"# hi").unwrap();

        let mut s = session(MockBackend::with_photo(10, 10, TagMap::new()));
        assert!(matches!(
            s.upload(&path),
            Err(UploadError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn upload_path_missing_file_is_io_error() {
        let mut s = session(MockBackend::new());
        assert!(matches!(
            s.upload(Path::new("/nonexistent/photo.jpg")),
            Err(UploadError::Io(_))
        ));
    }

    #[test]
    fn upload_path_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_jpeg(tmp.path(), "dawn.jpg", 30, 20);

        let mut s = session(MockBackend::with_photo(300, 200, TagMap::new()));
        let photo = s.upload(&path).unwrap();
        assert_eq!(photo.name, "dawn.jpg");
        assert_eq!(photo.mime_type, "image/jpeg");
        assert!(photo.size_bytes > 0);
    }

    #[test]
    fn capped_read_stops_one_byte_past_limit() {
        let source = std::io::Cursor::new(vec![7u8; 100]);
        let bytes = read_capped(source, 40).unwrap();
        assert_eq!(bytes.len(), 41);

        let small = std::io::Cursor::new(vec![7u8; 10]);
        assert_eq!(read_capped(small, 40).unwrap().len(), 10);
    }

    #[test]
    fn oversized_read_is_rejected_after_reading() {
        let mut config = FrameConfig::default();
        config.upload.max_file_size_mb = 1;
        let s = Session::new(config, MockBackend::new());
        let limit = s.config().max_upload_bytes();
        let bytes = read_capped(std::io::repeat(0).take(limit + 10), limit).unwrap();
        let err = s
            .check_declared("grown.jpg", "image/jpeg", bytes.len() as u64)
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size, .. } if size == limit + 1));
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_type_for(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_type_for(Path::new("a.txt")), None);
    }

    // =========================================================================
    // Upload pipeline
    // =========================================================================

    #[test]
    fn upload_fills_fields_and_snaps_ratio() {
        let mut s = session(MockBackend::with_photo(1920, 1080, fujifilm_tags()));
        s.upload_bytes("city.jpg", "image/jpeg", vec![0; 8]).unwrap();

        assert_eq!(s.fields().camera, "FUJIFILM X-T4");
        assert_eq!(s.view().aspect_ratio, AspectRatio::new(16, 9));
        assert_eq!(
            s.backend.get_operations(),
            vec![RecordedOp::ReadTags(8), RecordedOp::Decode(8)]
        );
    }

    #[test]
    fn missing_tags_still_load_with_placeholders() {
        let mut backend = MockBackend::with_photo(400, 500, TagMap::new());
        backend.tags = None;
        let mut s = session(backend);

        s.upload_bytes("scan.png", "image/png", vec![0; 4]).unwrap();
        assert!(s.photo().unwrap().tags.is_empty());
        assert_eq!(s.display().camera, PLACEHOLDER_CAMERA);
        assert_eq!(s.view().aspect_ratio, AspectRatio::new(4, 5));
    }

    #[test]
    fn second_upload_replaces_fields() {
        let mut s = loaded_session();
        s.set_field(Field::Camera, "edited");

        s.backend = MockBackend::with_photo(100, 100, TagMap::new());
        s.upload_bytes("second.jpg", "image/jpeg", vec![0; 4]).unwrap();

        assert_eq!(s.photo().unwrap().name, "second.jpg");
        assert_eq!(s.fields().camera, "");
        assert_eq!(s.view().aspect_ratio, AspectRatio::SQUARE);
    }

    #[test]
    fn cheki_keeps_square_on_upload() {
        let mut s = session(MockBackend::with_photo(1920, 1080, TagMap::new()));
        s.select_template(Template::Cheki);
        s.upload_bytes("wide.jpg", "image/jpeg", vec![0; 4]).unwrap();
        assert_eq!(s.view().aspect_ratio, AspectRatio::SQUARE);
    }

    #[test]
    fn defaults_come_from_config() {
        let mut config = FrameConfig::default();
        config.defaults.template = Template::Fujifilm;
        config.defaults.frame_color = FrameColor::Black;
        let s = Session::new(config, MockBackend::new());
        // Fujifilm forces white regardless of the configured colour
        assert_eq!(s.view().frame_color, FrameColor::White);
        assert!(s.view().color_locked);
    }

    #[test]
    fn default_alignment_comes_from_config() {
        let mut config = FrameConfig::default();
        config.defaults.align = Align::Left;
        let mut s = Session::new(config, MockBackend::new());
        assert_eq!(s.view().align, Align::Left);
        s.select_align(Align::Right);
        assert_eq!(s.view().align, Align::Right);
    }

    // =========================================================================
    // Edits
    // =========================================================================

    #[test]
    fn field_edits_show_in_display() {
        let mut s = loaded_session();
        s.set_field(Field::Camera, "LEICA Q2");
        s.set_field(Field::Location, "Kyoto");
        let display = s.display();
        assert_eq!(display.camera, "LEICA Q2");
        assert_eq!(display.shot_on, "Shot on LEICA Q2");
        assert_eq!(display.location.as_deref(), Some("Kyoto"));
    }

    #[test]
    fn locked_selections_are_ignored() {
        let mut s = loaded_session();
        s.select_template(Template::Cheki);
        assert!(!s.select_aspect_ratio(AspectRatio::new(3, 2)));
        assert!(!s.select_frame_color(FrameColor::Black));
        assert_eq!(s.view().aspect_ratio, AspectRatio::SQUARE);
        assert_eq!(s.view().frame_color, FrameColor::White);
    }

    // =========================================================================
    // Export
    // =========================================================================

    #[test]
    fn export_without_photo_fails_before_rendering() {
        let s = session(MockBackend::new());
        assert!(matches!(s.export(ExportMode::Screen), Err(ExportError::NoPhoto)));
        assert!(s.backend.get_operations().is_empty());
    }

    #[test]
    fn screen_export_is_png_at_double_preview_width() {
        let s = loaded_session();
        let artifact = s.export(ExportMode::Screen).unwrap();
        assert_eq!(artifact.filename, "photo_frame_screen.png");
        // 1200 wide, 3:2 photo = 800, band = 96
        assert_eq!((artifact.width, artifact.height), (1200, 896));
        assert_eq!(artifact.bytes, b"encoded");
        assert!(matches!(
            s.backend.get_operations().last(),
            Some(RecordedOp::Encode {
                width: 1200,
                format: OutputFormat::Png,
                ..
            })
        ));
    }

    #[test]
    fn print_export_is_jpeg_at_print_width() {
        let s = loaded_session();
        let artifact = s.export(ExportMode::Print).unwrap();
        assert_eq!(artifact.filename, "photo_frame_print.jpg");
        assert_eq!(artifact.width, 3840);
        assert!(matches!(
            s.backend.get_operations().last(),
            Some(RecordedOp::Encode {
                format: OutputFormat::Jpeg,
                quality: 80,
                ..
            })
        ));
    }

    #[test]
    fn export_follows_current_template() {
        let mut s = loaded_session();
        s.select_template(Template::Cheki);
        let artifact = s.export(ExportMode::Screen).unwrap();
        // margin 72, photo 1056, band round(1056 * 0.28) = 296
        assert_eq!((artifact.width, artifact.height), (1200, 72 + 1056 + 296));
    }

    #[test]
    fn repeated_exports_are_identical() {
        let s = loaded_session();
        let a = s.export(ExportMode::Screen).unwrap();
        let b = s.export(ExportMode::Screen).unwrap();
        assert_eq!((a.width, a.height, a.bytes), (b.width, b.height, b.bytes));
    }
}
