//! Shooting metadata: raw tags, editable fields, and display strings.
//!
//! Metadata moves through three shapes, each derived from the previous one:
//!
//! ```text
//! TagMap  ──from_tags──▶  FormFields  ──record()──▶  MetadataRecord
//!                              │
//!                              └──display()──▶  DisplayFields (placeholders applied)
//! ```
//!
//! ## Tags
//!
//! The tag reader hands back a [`TagMap`]: EXIF tag name → [`TagValue`]. Cameras
//! are inconsistent about encodings: `ExposureTime` is usually a rational
//! (`1/125`) but some writers store a plain float (`0.008`). Both shapes go
//! through [`TagValue::as_f64`] so every formatter sees one number.
//!
//! ## Form fields
//!
//! [`FormFields`] are the free-text values the user can edit after extraction.
//! Extraction fills them once; edits overwrite individual fields. The
//! [`MetadataRecord`] and [`DisplayFields`] are always recomputed from the
//! current form fields, never cached.
//!
//! ## Formatting rules
//!
//! | Field | Rule | Example |
//! |---|---|---|
//! | Shutter | `t >= 1` → `"<t>s"`, else `"1/<round(1/t)>s"` | `1/125s`, `2s` |
//! | Aperture | `"f/"` + one decimal | `f/2.8` |
//! | ISO | `"ISO"` + value | `ISO800` |
//! | Focal length | value + `"mm"`, rationals rounded | `85mm` |
//! | Camera | make + model, single space, trimmed | `FUJIFILM X-T4` |
//! | Date-time | `YYYY:MM:DD HH:MM:SS` → `YYYY-MM-DDTHH:MM:SS` | |
//!
//! Missing or malformed values format to an empty string; placeholders are only
//! substituted at display time.

use crate::imaging::ImageBackend;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A single tag value as reported by the tag reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Rational { num: i64, den: i64 },
    Text(String),
}

impl TagValue {
    /// Normalize to a float. Rationals with a zero denominator are malformed
    /// and yield `None`, as does text that does not parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Number(n) if n.is_finite() => Some(*n),
            TagValue::Number(_) => None,
            TagValue::Rational { den: 0, .. } => None,
            TagValue::Rational { num, den } => Some(*num as f64 / *den as f64),
            TagValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Text content with EXIF NUL padding and surrounding whitespace removed.
    pub fn as_text(&self) -> Option<String> {
        match self {
            TagValue::Text(s) => {
                let cleaned = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
                Some(cleaned.to_string()).filter(|s| !s.is_empty())
            }
            _ => None,
        }
    }

    fn is_rational(&self) -> bool {
        matches!(self, TagValue::Rational { .. })
    }
}

/// Tag name → value, as produced by [`ImageBackend::read_tags`](crate::imaging::ImageBackend::read_tags).
pub type TagMap = BTreeMap<String, TagValue>;

pub const TAG_MAKE: &str = "Make";
pub const TAG_MODEL: &str = "Model";
pub const TAG_DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
pub const TAG_EXPOSURE_TIME: &str = "ExposureTime";
pub const TAG_F_NUMBER: &str = "FNumber";
pub const TAG_ISO: &str = "ISOSpeedRatings";
pub const TAG_FOCAL_LENGTH: &str = "FocalLength";
pub const TAG_GPS_LATITUDE: &str = "GPSLatitude";
pub const TAG_GPS_LONGITUDE: &str = "GPSLongitude";

/// Placeholder for an empty camera field.
pub const PLACEHOLDER_CAMERA: &str = "camera model";
/// Placeholder for the combined settings line when every setting is empty.
pub const PLACEHOLDER_SETTINGS: &str = "shooting data";
/// Placeholder for an empty or unparseable shooting date.
pub const PLACEHOLDER_DATE: &str = "shooting date";
/// Template B label when no camera is known.
pub const SHOT_ON_UNKNOWN: &str = "Shot on UNKNOWN CAMERA";
/// Location text used when the photo carries GPS coordinates.
pub const LOCATION_FROM_GPS: &str = "GPS location available";

/// Date-time layouts accepted in the shooting date field.
const FIELD_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

// ============================================================================
// Formatters
// ============================================================================

/// Format an exposure time: `"2s"` for one second or longer, `"1/125s"` below.
pub fn format_shutter_speed(value: &TagValue) -> String {
    match value.as_f64() {
        Some(t) if t >= 1.0 => format!("{t}s"),
        Some(t) if t > 0.0 => format!("1/{}s", (1.0 / t).round()),
        _ => String::new(),
    }
}

/// Format an f-number with exactly one decimal: `"f/2.8"`, `"f/11.0"`.
pub fn format_aperture(value: &TagValue) -> String {
    value
        .as_f64()
        .map(|f| format!("f/{}", to_fixed_1(f)))
        .unwrap_or_default()
}

/// Format an ISO sensitivity: `"ISO800"`.
pub fn format_iso(value: &TagValue) -> String {
    match value {
        TagValue::Text(_) => value
            .as_text()
            .map(|s| format!("ISO{s}"))
            .unwrap_or_default(),
        _ => value
            .as_f64()
            .map(|n| format!("ISO{n}"))
            .unwrap_or_default(),
    }
}

/// Format a focal length: `"85mm"`. Rational values are rounded to whole millimetres.
pub fn format_focal_length(value: &TagValue) -> String {
    match value.as_f64() {
        Some(n) if value.is_rational() => format!("{}mm", n.round()),
        Some(n) => format!("{n}mm"),
        None => String::new(),
    }
}

/// Join make and model with a single space and trim the result.
pub fn camera_label(make: Option<&str>, model: Option<&str>) -> String {
    format!("{} {}", make.unwrap_or(""), model.unwrap_or(""))
        .trim()
        .to_string()
}

/// Convert an EXIF `"YYYY:MM:DD HH:MM:SS"` stamp to `"YYYY-MM-DDTHH:MM:SS"`.
///
/// Returns an empty string when either the date or the time component is
/// missing; nothing is guessed.
pub fn split_exif_date_time(raw: &str) -> String {
    let mut parts = raw.trim().splitn(2, ' ');
    let date = parts.next().map(str::trim).filter(|s| !s.is_empty());
    let time = parts.next().map(str::trim).filter(|s| !s.is_empty());
    match (date, time) {
        (Some(date), Some(time)) => format!("{}T{}", date.replace(':', "-"), time),
        _ => String::new(),
    }
}

/// Format with one decimal, rounding exact ties away from zero.
///
/// `format!("{:.1}")` rounds exact binary ties (`2.25`, `0.75`) to even;
/// JavaScript's `toFixed(1)` picks the larger candidate. A tie at one decimal
/// is only exactly representable when `4x` is an odd integer.
fn to_fixed_1(x: f64) -> String {
    let quarters = x * 4.0;
    let is_tie = quarters.fract() == 0.0 && (quarters as i64) % 2 != 0;
    if is_tie {
        let tenths = (x * 10.0).round() as i64;
        let sign = if tenths < 0 { "-" } else { "" };
        let tenths = tenths.abs();
        format!("{sign}{}.{}", tenths / 10, tenths % 10)
    } else {
        format!("{x:.1}")
    }
}

/// The trimmed value, or `None` when nothing is left.
fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ============================================================================
// Extraction
// ============================================================================

/// Read tags through `backend`. Unreadable or absent tags give an empty map.
pub fn read_tags_or_empty<B: ImageBackend + ?Sized>(backend: &B, bytes: &[u8]) -> TagMap {
    backend.read_tags(bytes).unwrap_or_else(|e| {
        debug!(error = %e, "no readable tags, using empty fields");
        TagMap::new()
    })
}

/// Extract the normalized record from image bytes.
pub fn extract<B: ImageBackend + ?Sized>(backend: &B, bytes: &[u8]) -> MetadataRecord {
    FormFields::from_tags(&read_tags_or_empty(backend, bytes)).record()
}

// ============================================================================
// Form fields
// ============================================================================

/// The editable metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Camera,
    ShootingDateTime,
    ShutterSpeed,
    Aperture,
    Iso,
    FocalLength,
    Location,
}

impl Field {
    /// Form order.
    pub const ALL: [Field; 7] = [
        Field::Camera,
        Field::ShootingDateTime,
        Field::ShutterSpeed,
        Field::Aperture,
        Field::Iso,
        Field::FocalLength,
        Field::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Camera => "Camera",
            Field::ShootingDateTime => "Date",
            Field::ShutterSpeed => "Shutter",
            Field::Aperture => "Aperture",
            Field::Iso => "ISO",
            Field::FocalLength => "Focal length",
            Field::Location => "Location",
        }
    }
}

/// Free-text metadata fields, filled by extraction and editable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormFields {
    pub camera: String,
    /// `YYYY-MM-DDTHH:MM:SS`, or empty.
    pub shooting_date_time: String,
    pub shutter_speed: String,
    pub aperture: String,
    pub iso: String,
    pub focal_length: String,
    pub location: String,
}

impl FormFields {
    /// Fill every field from a tag map. Absent tags leave their field empty.
    pub fn from_tags(tags: &TagMap) -> Self {
        let text = |name: &str| tags.get(name).and_then(TagValue::as_text);
        let formatted = |name: &str, format: fn(&TagValue) -> String| {
            tags.get(name).map(format).unwrap_or_default()
        };

        let has_gps = tags.contains_key(TAG_GPS_LATITUDE) && tags.contains_key(TAG_GPS_LONGITUDE);

        Self {
            camera: camera_label(text(TAG_MAKE).as_deref(), text(TAG_MODEL).as_deref()),
            shooting_date_time: text(TAG_DATE_TIME_ORIGINAL)
                .map(|raw| split_exif_date_time(&raw))
                .unwrap_or_default(),
            shutter_speed: formatted(TAG_EXPOSURE_TIME, format_shutter_speed),
            aperture: formatted(TAG_F_NUMBER, format_aperture),
            iso: formatted(TAG_ISO, format_iso),
            focal_length: formatted(TAG_FOCAL_LENGTH, format_focal_length),
            location: if has_gps {
                LOCATION_FROM_GPS.to_string()
            } else {
                String::new()
            },
        }
    }

    /// Overwrite one field with user input.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Camera => self.camera = value,
            Field::ShootingDateTime => self.shooting_date_time = value,
            Field::ShutterSpeed => self.shutter_speed = value,
            Field::Aperture => self.aperture = value,
            Field::Iso => self.iso = value,
            Field::FocalLength => self.focal_length = value,
            Field::Location => self.location = value,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Camera => &self.camera,
            Field::ShootingDateTime => &self.shooting_date_time,
            Field::ShutterSpeed => &self.shutter_speed,
            Field::Aperture => &self.aperture,
            Field::Iso => &self.iso,
            Field::FocalLength => &self.focal_length,
            Field::Location => &self.location,
        }
    }

    /// The normalized record for the current field values.
    pub fn record(&self) -> MetadataRecord {
        MetadataRecord {
            camera: self.camera.trim().to_string(),
            shooting_date_time: parse_field_date_time(&self.shooting_date_time),
            shutter_speed: self.shutter_speed.trim().to_string(),
            aperture: self.aperture.trim().to_string(),
            iso: self.iso.trim().to_string(),
            focal_length: self.focal_length.trim().to_string(),
        }
    }

    /// Display strings with placeholders substituted for empty fields.
    pub fn display(&self) -> DisplayFields {
        DisplayFields::from_record(&self.record(), &self.location)
    }
}

fn parse_field_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    FIELD_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

// ============================================================================
// Record and display
// ============================================================================

/// Normalized metadata for one render cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub camera: String,
    pub shooting_date_time: Option<NaiveDateTime>,
    pub shutter_speed: String,
    pub aperture: String,
    pub iso: String,
    pub focal_length: String,
}

/// Text actually drawn onto a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    /// Camera label, or [`PLACEHOLDER_CAMERA`].
    pub camera: String,
    /// Template B label: `"Shot on ..."`.
    pub shot_on: String,
    /// `"<focal> <aperture> <shutter> <iso>"`, or [`PLACEHOLDER_SETTINGS`].
    pub settings: String,
    /// `YYYY.MM.DD HH:MM:SS`, or [`PLACEHOLDER_DATE`].
    pub date_time: String,
    /// Only present when the location field has content.
    pub location: Option<String>,
}

impl DisplayFields {
    pub fn from_record(record: &MetadataRecord, location: &str) -> Self {
        let camera = non_empty(&record.camera);

        let shot_on = match &camera {
            Some(label) => format!(
                "Shot on {}",
                label.split_whitespace().collect::<Vec<_>>().join(" ")
            ),
            None => SHOT_ON_UNKNOWN.to_string(),
        };

        let settings: Vec<&str> = [
            &record.focal_length,
            &record.aperture,
            &record.shutter_speed,
            &record.iso,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

        let settings = if settings.is_empty() {
            PLACEHOLDER_SETTINGS.to_string()
        } else {
            settings.join(" ")
        };

        let date_time = record
            .shooting_date_time
            .map(|dt| dt.format("%Y.%m.%d %H:%M:%S").to_string())
            .unwrap_or_else(|| PLACEHOLDER_DATE.to_string());

        Self {
            camera: camera.unwrap_or_else(|| PLACEHOLDER_CAMERA.to_string()),
            shot_on,
            settings,
            date_time,
            location: non_empty(location),
        }
    }
}
