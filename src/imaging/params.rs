//! Parameter types for frame rendering and encoding.
//!
//! These structs describe *what* to draw and encode, not *how*. The
//! [`compositor`](crate::compositor) builds a [`FramePlan`] from layout and
//! metadata; [`operations`](super::operations) turns the plan into pixels; the
//! [`backend`](super::backend) encodes the pixels with [`EncodeParams`].
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`] / [`EncodeParams`]: PNG for screen exports, JPEG for print.
//! - [`Palette`]: the four colours a frame is painted with.
//! - [`TextItem`] / [`TextAnchor`]: one line of overlay text and where it hangs.
//! - [`FramePlan`]: geometry + palette + text, everything needed to render.

use super::calculations::FrameGeometry;
use image::Rgb;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless; quality is ignored.
    Png,
    Jpeg,
}

/// How to encode a rendered canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}

impl EncodeParams {
    pub fn png() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: Quality::new(100),
        }
    }

    pub fn jpeg(quality: Quality) -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality,
        }
    }
}

/// Colours for one frame colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Fills the whole canvas.
    pub background: Rgb<u8>,
    /// Fills the photo rectangle behind the fitted photo (visible as letterbox).
    pub photo_background: Rgb<u8>,
    pub text: Rgb<u8>,
    pub text_muted: Rgb<u8>,
}

/// Which point of the text line `x` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Left,
    Center,
    Right,
}

/// One line of overlay text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    /// Horizontal anchor position in canvas pixels.
    pub x: f64,
    /// Vertical centre of the line in canvas pixels.
    pub center_y: f64,
    /// Font size in pixels.
    pub size: f32,
    pub anchor: TextAnchor,
    pub color: Rgb<u8>,
}

/// Everything needed to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub geometry: FrameGeometry,
    pub palette: Palette,
    /// Drawn in order, after the photo.
    pub texts: Vec<TextItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(80).value(), 80);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn encode_params_constructors() {
        assert_eq!(EncodeParams::png().format, OutputFormat::Png);
        let jpeg = EncodeParams::jpeg(Quality::new(80));
        assert_eq!(jpeg.format, OutputFormat::Jpeg);
        assert_eq!(jpeg.quality.value(), 80);
    }
}
