//! Frame composition: where every piece of a framed photo goes.
//!
//! [`plan_frame`] is pure. Given the layout view, the display strings, a
//! canvas width and a palette, it returns a [`FramePlan`] that
//! [`render_frame`](crate::imaging::render_frame) rasterizes. Screen and print
//! exports differ only in the [`ExportTarget`] they resolve to.
//!
//! ## Text placement
//!
//! Sizes are fractions of the information band height. With centre alignment
//! each template keeps its own composition:
//!
//! | Template | Left / centre | Right |
//! |---|---|---|
//! | Leica | camera (0.24) over date (0.16, muted) | settings (0.20) over location (0.16, muted) |
//! | Fujifilm | "Shot on" (0.24) over settings (0.17, muted), centred | |
//! | Cheki | camera (0.14) over settings (0.12, muted) | date (0.14, muted) over location (0.12, muted) |
//!
//! Left and right alignment stack the same lines in one column against that
//! edge, camera first, sizes capped to the row pitch. Location is only drawn
//! when the field has content.

use crate::config::FrameConfig;
use crate::imaging::{
    EncodeParams, FrameGeometry, FramePlan, Palette, Quality, TextAnchor, TextItem,
    frame_geometry,
};
use crate::layout::{Align, LayoutView, Template};
use crate::metadata::DisplayFields;
use image::Rgb;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Horizontal text inset from the canvas edge, as a fraction of canvas width.
const TEXT_INSET_FRACTION: f64 = 0.04;
/// Vertical centre of the upper and lower text rows, as fractions of band height.
const UPPER_ROW: f64 = 0.36;
const LOWER_ROW: f64 = 0.68;
/// Cheki rows sit higher; the card's lower band is left blank.
const CHEKI_UPPER_ROW: f64 = 0.32;
const CHEKI_LOWER_ROW: f64 = 0.60;
/// Stacked lines are at most this share of the row pitch.
const STACKED_SIZE_LIMIT: f64 = 0.9;

/// Which export to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// PNG at preview width times pixel density.
    Screen,
    /// JPEG at print width.
    Print,
}

impl ExportMode {
    pub fn name(self) -> &'static str {
        match self {
            ExportMode::Screen => "screen",
            ExportMode::Print => "print",
        }
    }

    /// Resolve canvas width, encoding and filename from config.
    pub fn target(self, config: &FrameConfig) -> ExportTarget {
        match self {
            ExportMode::Screen => ExportTarget {
                width: config.screen.canvas_width(),
                encode: EncodeParams::png(),
                filename: config.screen.filename.clone(),
            },
            ExportMode::Print => ExportTarget {
                width: config.print.width,
                encode: EncodeParams::jpeg(Quality::new(config.print.jpeg_quality)),
                filename: config.print.filename.clone(),
            },
        }
    }
}

/// Concrete output parameters for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTarget {
    pub width: u32,
    pub encode: EncodeParams,
    pub filename: String,
}

/// An encoded frame, ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub mode: ExportMode,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its filename, returning the path.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

fn text(
    text: &str,
    x: f64,
    center_y: f64,
    size: f64,
    anchor: TextAnchor,
    color: Rgb<u8>,
) -> TextItem {
    TextItem {
        text: text.to_string(),
        x,
        center_y,
        size: size as f32,
        anchor,
        color,
    }
}

/// Lay out a frame for the given view and display strings.
pub fn plan_frame(
    view: &LayoutView,
    display: &DisplayFields,
    width: u32,
    palette: Palette,
) -> FramePlan {
    let geometry = frame_geometry(view.template, view.aspect_ratio, width);
    let texts = match view.align {
        Align::Center => plan_texts(view.template, &geometry, display, &palette),
        Align::Left | Align::Right => {
            plan_stacked(view.template, view.align, &geometry, display, &palette)
        }
    };
    FramePlan {
        geometry,
        palette,
        texts,
    }
}

/// Left and right text edges for a template.
fn text_edges(template: Template, geometry: &FrameGeometry) -> (f64, f64) {
    match template {
        Template::Leica | Template::Fujifilm => {
            let inset = (geometry.width as f64 * TEXT_INSET_FRACTION).round();
            (geometry.band.x + inset, geometry.band.right() - inset)
        }
        // Aligned with the photo edges rather than the card edges.
        Template::Cheki => (geometry.photo.x, geometry.photo.right()),
    }
}

fn plan_texts(
    template: Template,
    geometry: &FrameGeometry,
    display: &DisplayFields,
    palette: &Palette,
) -> Vec<TextItem> {
    use TextAnchor::{Center, Left, Right};

    let band = geometry.band;
    let row = |fraction: f64| band.y + band.height * fraction;
    let size = |fraction: f64| band.height * fraction;
    let (ink, muted) = (palette.text, palette.text_muted);
    let (left, right) = text_edges(template, geometry);

    match template {
        Template::Leica => {
            let mut texts = vec![
                text(&display.camera, left, row(UPPER_ROW), size(0.24), Left, ink),
                text(&display.date_time, left, row(LOWER_ROW), size(0.16), Left, muted),
                text(&display.settings, right, row(UPPER_ROW), size(0.20), Right, ink),
            ];
            if let Some(location) = &display.location {
                texts.push(text(location, right, row(LOWER_ROW), size(0.16), Right, muted));
            }
            texts
        }
        Template::Fujifilm => {
            let center = band.center_x();
            vec![
                text(&display.shot_on, center, row(0.38), size(0.24), Center, ink),
                text(&display.settings, center, row(0.70), size(0.17), Center, muted),
            ]
        }
        Template::Cheki => {
            let (upper, lower) = (row(CHEKI_UPPER_ROW), row(CHEKI_LOWER_ROW));
            let mut texts = vec![
                text(&display.camera, left, upper, size(0.14), Left, ink),
                text(&display.date_time, right, upper, size(0.14), Right, muted),
                text(&display.settings, left, lower, size(0.12), Left, muted),
            ];
            if let Some(location) = &display.location {
                texts.push(text(location, right, lower, size(0.12), Right, muted));
            }
            texts
        }
    }
}

/// One column of lines flush against the left or right edge.
fn plan_stacked(
    template: Template,
    align: Align,
    geometry: &FrameGeometry,
    display: &DisplayFields,
    palette: &Palette,
) -> Vec<TextItem> {
    let (ink, muted) = (palette.text, palette.text_muted);
    let location = display.location.as_deref();

    // (text, size as band fraction, colour), top to bottom
    let lines: Vec<(&str, f64, Rgb<u8>)> = match template {
        Template::Leica => [
            Some((display.camera.as_str(), 0.24, ink)),
            Some((display.settings.as_str(), 0.20, ink)),
            Some((display.date_time.as_str(), 0.16, muted)),
            location.map(|l| (l, 0.16, muted)),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Template::Fujifilm => vec![
            (display.shot_on.as_str(), 0.24, ink),
            (display.settings.as_str(), 0.17, muted),
        ],
        Template::Cheki => [
            Some((display.camera.as_str(), 0.14, ink)),
            Some((display.settings.as_str(), 0.12, muted)),
            Some((display.date_time.as_str(), 0.12, muted)),
            location.map(|l| (l, 0.12, muted)),
        ]
        .into_iter()
        .flatten()
        .collect(),
    };

    let (left, right) = text_edges(template, geometry);
    let (x, anchor) = match align {
        Align::Right => (right, TextAnchor::Right),
        Align::Left | Align::Center => (left, TextAnchor::Left),
    };
    let band = geometry.band;
    let pitch = 1.0 / (lines.len() as f64 + 1.0);
    let max_size = pitch * STACKED_SIZE_LIMIT;

    lines
        .into_iter()
        .enumerate()
        .map(|(i, (line, size, color))| {
            let center_y = band.y + band.height * pitch * (i as f64 + 1.0);
            text(line, x, center_y, band.height * size.min(max_size), anchor, color)
        })
        .collect()
}
