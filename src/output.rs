//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! dawn.jpg (image/jpeg, 6000x4000, 11.2 MiB)
//!     Layout: leica, 3:2, black, align center
//!
//! Tags
//!     ExposureTime: 1/125
//!     FNumber: 28/10
//!     Model: X-T4
//!
//! Fields
//!     Camera: FUJIFILM X-T4
//!     Date: 2023-05-01T14:30:05
//!     ...
//!
//! Display
//!     Camera: FUJIFILM X-T4
//!     Shot on: Shot on FUJIFILM X-T4
//!     Settings: 35mm f/2.8 1/125s ISO800
//!     Date: 2023.05.01 14:30:05
//!     Location: (none)
//! ```
//!
//! ## Export
//!
//! ```text
//! screen → out/photo_frame_screen.png (1200x896, 412.0 KiB)
//! print → out/photo_frame_print.jpg (3840x2867, 1.9 MiB)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compositor::ExportArtifact;
use crate::layout::LayoutView;
use crate::metadata::{DisplayFields, Field, FormFields, MetadataRecord, TagMap, TagValue};
use crate::session::LoadedPhoto;
use serde::Serialize;
use std::path::Path;

/// Machine-readable form of `inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub tags: &'a TagMap,
    pub fields: &'a FormFields,
    pub record: MetadataRecord,
    pub display: DisplayFields,
    pub layout: LayoutView,
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count in binary units.
fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

/// Tag value as it was stored, without formatting rules applied.
fn format_tag_value(value: &TagValue) -> String {
    match value {
        TagValue::Number(n) => n.to_string(),
        TagValue::Rational { num, den } => format!("{num}/{den}"),
        TagValue::Text(s) => s.trim_matches('\0').trim().to_string(),
    }
}

/// `"Label: value"`, with `(none)` for empty values.
fn labeled(label: &str, value: &str) -> String {
    let value = if value.is_empty() { "(none)" } else { value };
    format!("{}{}: {}", indent(1), label, value)
}

// ============================================================================
// Inspect
// ============================================================================

pub fn format_inspect(
    photo: &LoadedPhoto,
    fields: &FormFields,
    display: &DisplayFields,
    view: &LayoutView,
) -> Vec<String> {
    let (width, height) = photo.dimensions();
    let mut lines = vec![
        format!(
            "{} ({}, {}x{}, {})",
            photo.name,
            photo.mime_type,
            width,
            height,
            format_size(photo.size_bytes)
        ),
        format!(
            "{}Layout: {}, {}, {}, align {}",
            indent(1),
            view.template,
            view.aspect_ratio,
            view.frame_color,
            view.align
        ),
        String::new(),
        "Tags".to_string(),
    ];

    if photo.tags.is_empty() {
        lines.push(format!("{}(no EXIF tags)", indent(1)));
    }
    for (name, value) in &photo.tags {
        lines.push(format!("{}{}: {}", indent(1), name, format_tag_value(value)));
    }

    lines.push(String::new());
    lines.push("Fields".to_string());
    for field in Field::ALL {
        lines.push(labeled(field.label(), fields.get(field)));
    }

    lines.push(String::new());
    lines.push("Display".to_string());
    lines.push(labeled("Camera", &display.camera));
    lines.push(labeled("Shot on", &display.shot_on));
    lines.push(labeled("Settings", &display.settings));
    lines.push(labeled("Date", &display.date_time));
    lines.push(labeled("Location", display.location.as_deref().unwrap_or("")));

    lines
}

pub fn print_inspect(
    photo: &LoadedPhoto,
    fields: &FormFields,
    display: &DisplayFields,
    view: &LayoutView,
) {
    for line in format_inspect(photo, fields, display, view) {
        println!("{}", line);
    }
}

// ============================================================================
// Export / preview
// ============================================================================

pub fn format_export(artifact: &ExportArtifact, path: &Path) -> String {
    format!(
        "{} → {} ({}x{}, {})",
        artifact.mode.name(),
        path.display(),
        artifact.width,
        artifact.height,
        format_size(artifact.bytes.len() as u64)
    )
}

pub fn print_export(artifact: &ExportArtifact, path: &Path) {
    println!("{}", format_export(artifact, path));
}

pub fn format_preview(path: &Path, has_font: bool) -> Vec<String> {
    let mut lines = vec![format!("preview → {}", path.display())];
    if !has_font {
        lines.push(format!(
            "{}No font found: exports will have no text. Set [fonts] path in the config.",
            indent(1)
        ));
    }
    lines
}

pub fn print_preview(path: &Path, has_font: bool) {
    for line in format_preview(path, has_font) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::ExportMode;
    use crate::layout::LayoutState;
    use crate::test_helpers::fujifilm_tags;
    use image::{DynamicImage, RgbImage};

    fn photo(tags: TagMap) -> LoadedPhoto {
        LoadedPhoto {
            name: "dawn.jpg".into(),
            mime_type: "image/jpeg".into(),
            size_bytes: 3 * 1024 * 1024,
            tags,
            image: DynamicImage::ImageRgb8(RgbImage::new(60, 40)),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MiB");
    }

    #[test]
    fn format_tag_value_raw_forms() {
        assert_eq!(format_tag_value(&TagValue::Number(800.0)), "800");
        assert_eq!(format_tag_value(&TagValue::Number(0.5)), "0.5");
        assert_eq!(
            format_tag_value(&TagValue::Rational { num: 1, den: 125 }),
            "1/125"
        );
        assert_eq!(format_tag_value(&TagValue::Text("X-T4\0".into())), "X-T4");
    }

    #[test]
    fn labeled_marks_empty_values() {
        assert_eq!(labeled("ISO", ""), "    ISO: (none)");
        assert_eq!(labeled("ISO", "ISO800"), "    ISO: ISO800");
    }

    // =========================================================================
    // Inspect tests
    // =========================================================================

    #[test]
    fn inspect_output_sections() {
        let photo = photo(fujifilm_tags());
        let fields = FormFields::from_tags(&photo.tags);
        let display = fields.display();
        let view = LayoutState::default().view();

        let lines = format_inspect(&photo, &fields, &display, &view);
        assert_eq!(lines[0], "dawn.jpg (image/jpeg, 60x40, 3.0 MiB)");
        assert_eq!(lines[1], "    Layout: leica, 3:2, black, align center");
        assert!(lines.contains(&"    ExposureTime: 1/125".to_string()));
        assert!(lines.contains(&"    Camera: FUJIFILM X-T4".to_string()));
        assert!(lines.contains(&"    Settings: 35mm f/2.8 1/125s ISO800".to_string()));
        assert!(lines.contains(&"    Location: (none)".to_string()));
        assert!(lines.contains(&"    Date: 2023-05-01T14:30:05".to_string()));
        assert!(lines.contains(&"    Focal length: 35mm".to_string()));
        for section in ["Tags", "Fields", "Display"] {
            assert!(lines.contains(&section.to_string()), "missing {section}");
        }
    }

    #[test]
    fn inspect_without_tags() {
        let photo = photo(TagMap::new());
        let fields = FormFields::default();
        let lines = format_inspect(&photo, &fields, &fields.display(), &LayoutState::default().view());
        assert!(lines.contains(&"    (no EXIF tags)".to_string()));
        assert!(lines.contains(&"    Camera: camera model".to_string()));
    }

    #[test]
    fn inspect_report_serializes() {
        let photo = photo(fujifilm_tags());
        let fields = FormFields::from_tags(&photo.tags);
        let report = InspectReport {
            name: &photo.name,
            mime_type: &photo.mime_type,
            size_bytes: photo.size_bytes,
            width: 60,
            height: 40,
            tags: &photo.tags,
            fields: &fields,
            record: fields.record(),
            display: fields.display(),
            layout: LayoutState::default().view(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tags"]["ExposureTime"]["num"], 1);
        assert_eq!(json["fields"]["camera"], "FUJIFILM X-T4");
        assert_eq!(json["record"]["shooting_date_time"], "2023-05-01T14:30:05");
        assert_eq!(json["layout"]["aspect_ratio"], "3:2");
        assert_eq!(json["layout"]["template"], "leica");
    }

    // =========================================================================
    // Export / preview tests
    // =========================================================================

    #[test]
    fn export_line() {
        let artifact = ExportArtifact {
            mode: ExportMode::Screen,
            filename: "photo_frame_screen.png".into(),
            width: 1200,
            height: 896,
            bytes: vec![0; 2048],
        };
        assert_eq!(
            format_export(&artifact, Path::new("out/photo_frame_screen.png")),
            "screen → out/photo_frame_screen.png (1200x896, 2.0 KiB)"
        );
    }

    #[test]
    fn preview_warns_without_font() {
        let path = Path::new("out/photo_frame_preview.html");
        assert_eq!(format_preview(path, true).len(), 1);
        let lines = format_preview(path, false);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("[fonts] path"));
    }
}
