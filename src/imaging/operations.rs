//! Frame rasterization.
//!
//! Turns a [`FramePlan`] and a decoded photo into an RGB canvas. Drawing order
//! is fixed:
//!
//! 1. canvas background
//! 2. photo background over the photo rectangle
//! 3. the photo, fitted with [`fit_contain`] and resized with Lanczos3
//! 4. overlay text, in plan order
//!
//! Text is skipped entirely when no font is available.

use super::calculations::fit_contain;
use super::params::{FramePlan, TextAnchor, TextItem};
use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect as PixelRect;

/// Render a frame plan onto a new canvas.
pub fn render_frame(plan: &FramePlan, photo: &DynamicImage, font: Option<&FontVec>) -> RgbImage {
    let geometry = &plan.geometry;
    let mut canvas = RgbImage::from_pixel(geometry.width, geometry.height, plan.palette.background);

    let (px, py, pw, ph) = geometry.photo.to_pixels();
    draw_filled_rect_mut(
        &mut canvas,
        PixelRect::at(px as i32, py as i32).of_size(pw, ph),
        plan.palette.photo_background,
    );

    let fitted = fit_contain((photo.width(), photo.height()), geometry.photo);
    let (fx, fy, fw, fh) = fitted.to_pixels();
    let resized = photo.resize_exact(fw, fh, FilterType::Lanczos3).to_rgb8();
    imageops::overlay(&mut canvas, &resized, fx, fy);

    if let Some(font) = font {
        for item in &plan.texts {
            draw_text_item(&mut canvas, item, font);
        }
    }

    canvas
}

/// Left edge of a text line given its anchor and measured width.
pub(crate) fn text_left(x: f64, width: u32, anchor: TextAnchor) -> f64 {
    match anchor {
        TextAnchor::Left => x,
        TextAnchor::Center => x - width as f64 / 2.0,
        TextAnchor::Right => x - width as f64,
    }
}

fn draw_text_item(canvas: &mut RgbImage, item: &TextItem, font: &FontVec) {
    if item.text.is_empty() {
        return;
    }
    let scale = PxScale::from(item.size);
    let (width, _) = text_size(scale, font, &item.text);
    let left = text_left(item.x, width, item.anchor);
    let top = item.center_y - f64::from(item.size) / 2.0;
    draw_text_mut(
        canvas,
        item.color,
        left.round() as i32,
        top.round() as i32,
        scale,
        font,
        &item.text,
    );
}
