//! Standalone HTML preview of the current frame.
//!
//! The preview mirrors what an export would draw: the same layout view, the
//! same display strings, the same geometry at `screen.preview_width`. All
//! classes are derived from [`LayoutView`]:
//!
//! | Selection | Class on `.frame-preview` |
//! |---|---|
//! | Template | `leica-template`, `fujifilm-template`, `cheki-template` |
//! | Aspect ratio | `aspect-3-2`, `aspect-16-9`, ... |
//! | Frame colour | `black-frame`, `white-frame` |
//! | Alignment | `align-left`, `align-center`, `align-right` |
//!
//! Locked controls are rendered `disabled` inside a `.locked` fieldset. Every
//! interpolated string goes through maud's escaping, so metadata text can't
//! inject markup.
//!
//! Static styles are embedded at compile time from `static/preview.css`;
//! colour variables come from config via
//! [`generate_color_css`](crate::config::generate_color_css).

use crate::config::generate_color_css;
use crate::imaging::{ImageBackend, frame_geometry};
use crate::layout::{Align, AspectRatio, FrameColor, LayoutView, Template};
use crate::metadata::{DisplayFields, FormFields};
use crate::session::Session;
use maud::{DOCTYPE, Markup, html};
use std::path::{Component, Path};

const CSS_STATIC: &str = include_str!("../static/preview.css");

/// Class list for the frame element.
pub fn frame_classes(view: &LayoutView) -> String {
    format!(
        "frame-preview {}-template aspect-{} {}-frame align-{}",
        view.template.name(),
        view.aspect_ratio.slug(),
        view.frame_color.name(),
        view.align.name()
    )
}

/// `img` source for `photo` in a document written to `dir`.
///
/// Both paths should be absolute (canonicalized). The result is relative with
/// `/` separators when the two share a root; otherwise the photo path itself.
pub fn photo_src(photo: &Path, dir: &Path) -> String {
    let photo_parts: Vec<Component> = photo.components().collect();
    let dir_parts: Vec<Component> = dir.components().collect();
    let common = photo_parts
        .iter()
        .zip(&dir_parts)
        .take_while(|(a, b)| a == b)
        .count();

    // No shared root (another drive, or relative mixed with absolute)
    if common == 0 {
        return photo.to_string_lossy().into_owned();
    }

    let ups = dir_parts.len() - common;
    let mut parts: Vec<String> = vec!["..".to_string(); ups];
    parts.extend(
        photo_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Render the full preview document. `photo_src` is used verbatim as the
/// `img` source; see [`photo_src`] for a path relative to the output directory.
pub fn render_preview<B: ImageBackend>(session: &Session<B>, photo_src: Option<&str>) -> Markup {
    let view = session.view();
    let display = session.display();
    let css = format!("{}\n\n{}", CSS_STATIC, generate_color_css(&session.config().colors));
    let preview_width = session.config().screen.preview_width;
    let title = session
        .photo()
        .map(|p| format!("{} - exif-frame", p.name))
        .unwrap_or_else(|| "exif-frame".to_string());

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                main.editor {
                    (render_frame(&view, &display, preview_width, photo_src))
                    (render_controls(&view, session.fields()))
                }
            }
        }
    }
}

fn render_frame(
    view: &LayoutView,
    display: &DisplayFields,
    width: u32,
    photo_src: Option<&str>,
) -> Markup {
    let geometry = frame_geometry(view.template, view.aspect_ratio, width);
    let frame_style = format!(
        "width: {width}px; --band-ratio: {} / {};",
        geometry.width, geometry.band.height
    );
    let photo_style = format!(
        "aspect-ratio: {} / {};",
        geometry.photo.width, geometry.photo.height
    );

    html! {
        div class=(frame_classes(view)) style=(frame_style) {
            div.photo-area style=(photo_style) {
                @if let Some(src) = photo_src {
                    img src=(src) alt="";
                } @else {
                    span.empty { "No photo loaded" }
                }
            }
            div.info-band {
                (render_band(view.template, display))
            }
        }
    }
}

fn render_band(template: Template, display: &DisplayFields) -> Markup {
    match template {
        Template::Leica => html! {
            div.band-left {
                div.camera { (display.camera) }
                div.date.muted { (display.date_time) }
            }
            div.band-right {
                div.settings { (display.settings) }
                @if let Some(location) = &display.location {
                    div.location.muted { (location) }
                }
            }
        },
        Template::Fujifilm => html! {
            div.shot-on { (display.shot_on) }
            div.settings.muted { (display.settings) }
        },
        Template::Cheki => html! {
            div.band-left {
                div.camera { (display.camera) }
                div.settings.muted { (display.settings) }
            }
            div.band-right {
                div.date.muted { (display.date_time) }
                @if let Some(location) = &display.location {
                    div.location.muted { (location) }
                }
            }
        },
    }
}

fn render_controls(view: &LayoutView, fields: &FormFields) -> Markup {
    let record = fields.record();
    html! {
        aside.controls {
            fieldset.template {
                legend { "Template" }
                @for template in Template::ALL {
                    button type="button" data-template=(template.name())
                        class=[(template == view.template).then_some("active")] {
                        (template.name())
                    }
                }
            }
            fieldset.aspect-ratio.locked[view.aspect_locked] {
                legend { "Aspect ratio" }
                @for ratio in AspectRatio::PRESETS {
                    button type="button" data-aspect=(ratio.slug())
                        class=[(ratio == view.aspect_ratio).then_some("active")]
                        disabled[view.aspect_locked] {
                        (ratio)
                    }
                }
            }
            fieldset.frame-color.locked[view.color_locked] {
                legend { "Frame colour" }
                @for color in [FrameColor::Black, FrameColor::White] {
                    button type="button" data-color=(color.name())
                        class=[(color == view.frame_color).then_some("active")]
                        disabled[view.color_locked] {
                        (color.name())
                    }
                }
            }
            fieldset.align {
                legend { "Alignment" }
                @for align in Align::ALL {
                    button type="button" data-align=(align.name())
                        class=[(align == view.align).then_some("active")] {
                        (align.name())
                    }
                }
            }
            fieldset {
                legend { "Metadata" }
                dl.metadata {
                    dt { "Camera" }
                    dd { (record.camera) }
                    dt { "Date" }
                    dd { (fields.shooting_date_time) }
                    dt { "Shutter speed" }
                    dd { (record.shutter_speed) }
                    dt { "Aperture" }
                    dd { (record.aperture) }
                    dt { "ISO" }
                    dd { (record.iso) }
                    dt { "Focal length" }
                    dd { (record.focal_length) }
                    dt { "Location" }
                    dd { (fields.location) }
                }
            }
        }
    }
}
