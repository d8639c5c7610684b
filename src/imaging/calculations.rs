//! Pure calculation functions for frame geometry.
//!
//! All functions here are pure and testable without any I/O or images. Every
//! value is computed in `f64` from the same inputs in the same order, so a
//! given set of dimensions always produces the same rectangles.

use crate::layout::{AspectRatio, Template};

/// Information band height as a fraction of photo height (Leica, Fujifilm).
pub const BAND_FRACTION: f64 = 0.12;
/// Information band height as a fraction of photo height (Cheki).
pub const CHEKI_BAND_FRACTION: f64 = 0.28;
/// Cheki card margin around the photo as a fraction of canvas width.
pub const CHEKI_MARGIN_FRACTION: f64 = 0.06;

/// An axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Round to whole pixels: `(x, y, width, height)`, with width and height at
    /// least one pixel.
    pub fn to_pixels(&self) -> (i64, i64, u32, u32) {
        (
            self.x.round() as i64,
            self.y.round() as i64,
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

/// Fit an image inside `area` without cropping (CSS `object-fit: contain`).
///
/// If the image is wider than the area it fills the area's width and is
/// centred vertically; otherwise it fills the height and is centred
/// horizontally.
///
/// # Examples
/// ```
/// # use exif_frame::imaging::{Rect, fit_contain};
/// // 16:9 into a square: full width, equal letterbox above and below
/// let fitted = fit_contain((1600, 900), Rect::new(0.0, 0.0, 1000.0, 1000.0));
/// assert_eq!(fitted, Rect::new(0.0, 218.75, 1000.0, 562.5));
/// ```
pub fn fit_contain(image: (u32, u32), area: Rect) -> Rect {
    let (img_w, img_h) = image;
    let image_ratio = img_w as f64 / img_h as f64;
    let area_ratio = area.width / area.height;

    if image_ratio > area_ratio {
        let height = area.width / image_ratio;
        Rect::new(area.x, area.y + (area.height - height) / 2.0, area.width, height)
    } else {
        let width = area.height * image_ratio;
        Rect::new(area.x + (area.width - width) / 2.0, area.y, width, area.height)
    }
}

/// Canvas layout for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    /// Where the photo (and its background) goes.
    pub photo: Rect,
    /// The information band holding the text.
    pub band: Rect,
}

/// Compute the canvas layout for a template at a given canvas width.
///
/// ```text
/// Leica / Fujifilm              Cheki
/// ┌────────────────────┐        ┌────────────────────┐
/// │                    │        │  ┌──────────────┐  │
/// │       photo        │        │  │    photo     │  │
/// │   W × W/ratio      │        │  │ (W-2m)² inset│  │
/// ├────────────────────┤        │  └──────────────┘  │
/// │ band: 12% of photo │        │  band: 28%         │
/// └────────────────────┘        └────────────────────┘
/// ```
pub fn frame_geometry(template: Template, aspect: AspectRatio, width: u32) -> FrameGeometry {
    let canvas_w = width as f64;
    let ratio = aspect.value();

    match template {
        Template::Leica | Template::Fujifilm => {
            let photo_h = (canvas_w / ratio).round();
            let band_h = (photo_h * BAND_FRACTION).round();
            FrameGeometry {
                width,
                height: (photo_h + band_h) as u32,
                photo: Rect::new(0.0, 0.0, canvas_w, photo_h),
                band: Rect::new(0.0, photo_h, canvas_w, band_h),
            }
        }
        Template::Cheki => {
            let margin = (canvas_w * CHEKI_MARGIN_FRACTION).round();
            let photo_w = canvas_w - 2.0 * margin;
            let photo_h = (photo_w / ratio).round();
            let band_h = (photo_h * CHEKI_BAND_FRACTION).round();
            FrameGeometry {
                width,
                height: (margin + photo_h + band_h) as u32,
                photo: Rect::new(margin, margin, photo_w, photo_h),
                band: Rect::new(0.0, margin + photo_h, canvas_w, band_h),
            }
        }
    }
}
