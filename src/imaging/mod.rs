//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **EXIF tags** | `kamadak-exif` |
//! | **Decode** | `image` decoders + EXIF orientation |
//! | **Render** | `imageproc` rect/text drawing, `ab_glyph` fonts, Lanczos3 resize |
//! | **Encode** | PNG (screen) / JPEG with quality (print) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for frame geometry (unit testable)
//! - **Parameters**: Data structures describing what to render and encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Rasterizing a [`FramePlan`] onto a canvas
//! - **Fonts**: Locating a font for overlay text

pub mod backend;
mod calculations;
pub mod fonts;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{FrameGeometry, Rect, fit_contain, frame_geometry};
pub use fonts::load_font;
pub use operations::render_frame;
pub use params::{
    EncodeParams, FramePlan, OutputFormat, Palette, Quality, TextAnchor, TextItem,
};
pub use rust_backend::RustBackend;
