//! Configuration module.
//!
//! Handles loading, validating, and merging `exif-frame.toml`. Stock defaults
//! are the base layer; a user config file overrides any subset of them.
//!
//! ## Config File Location
//!
//! By default `exif-frame.toml` is read from the working directory if it
//! exists. `--config <PATH>` points at a different file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [upload]
//! max_file_size_mb = 60         # Larger photos are rejected
//!
//! [screen]
//! preview_width = 600           # Preview width in CSS pixels
//! pixel_density = 2             # Export scale over the preview width
//! filename = "photo_frame_screen.png"
//!
//! [print]
//! width = 3840                  # Canvas width in pixels
//! jpeg_quality = 80             # 1-100
//! filename = "photo_frame_print.jpg"
//!
//! [defaults]
//! template = "leica"            # leica | fujifilm | cheki
//! aspect_ratio = "3:2"          # one of the presets
//! frame_color = "black"         # black | white
//! align = "center"              # left | center | right
//!
//! [fonts]
//! # path = "/path/to/font.ttf"  # Omit to search common system fonts
//!
//! [colors.black]
//! background = "#000000"
//! photo_background = "#111111"
//! text = "#ffffff"
//! text_muted = "#a0a0a0"
//!
//! [colors.white]
//! background = "#ffffff"
//! photo_background = "#f0f0f0"
//! text = "#111111"
//! text_muted = "#666666"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [print]
//! jpeg_quality = 92
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Palette;
use crate::layout::{Align, AspectRatio, FrameColor, Template};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILENAME: &str = "exif-frame.toml";

/// Upper bound for export canvas widths.
pub const MAX_CANVAS_WIDTH: u32 = 16384;

/// Upper bound for `upload.max_file_size_mb` (1 TiB).
pub const MAX_UPLOAD_MB: u64 = 1_048_576;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `exif-frame.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Upload limits.
    pub upload: UploadConfig,
    /// Screen export (PNG) settings.
    pub screen: ScreenConfig,
    /// Print export (JPEG) settings.
    pub print: PrintConfig,
    /// Initial layout selections.
    pub defaults: DefaultsConfig,
    /// Overlay text font.
    pub fonts: FontConfig,
    /// Colour schemes for black and white frames.
    pub colors: ColorConfig,
}

impl FrameConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_UPLOAD_MB).contains(&self.upload.max_file_size_mb) {
            return Err(ConfigError::Validation(format!(
                "upload.max_file_size_mb must be 1-{MAX_UPLOAD_MB}"
            )));
        }
        if self.screen.preview_width == 0 || self.screen.pixel_density == 0 {
            return Err(ConfigError::Validation(
                "screen.preview_width and screen.pixel_density must be non-zero".into(),
            ));
        }
        if self.screen.canvas_width() > MAX_CANVAS_WIDTH {
            return Err(ConfigError::Validation(format!(
                "screen.preview_width x screen.pixel_density must not exceed {MAX_CANVAS_WIDTH}"
            )));
        }
        if self.print.width == 0 || self.print.width > MAX_CANVAS_WIDTH {
            return Err(ConfigError::Validation(format!(
                "print.width must be 1-{MAX_CANVAS_WIDTH}"
            )));
        }
        if !(1..=100).contains(&self.print.jpeg_quality) {
            return Err(ConfigError::Validation(
                "print.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.screen.filename.trim().is_empty() || self.print.filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export filenames must not be empty".into(),
            ));
        }
        for color in [FrameColor::Black, FrameColor::White] {
            self.colors.palette(color)?;
        }
        Ok(())
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.upload.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Maximum photo size in MiB.
    pub max_file_size_mb: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 60,
        }
    }
}

/// Screen export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    /// Width of the on-screen preview in CSS pixels.
    pub preview_width: u32,
    /// Device pixel ratio the export is rendered at.
    pub pixel_density: u32,
    pub filename: String,
}

impl ScreenConfig {
    pub fn canvas_width(&self) -> u32 {
        self.preview_width.saturating_mul(self.pixel_density)
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            preview_width: 600,
            pixel_density: 2,
            filename: "photo_frame_screen.png".to_string(),
        }
    }
}

/// Print export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    /// Canvas width in pixels; height follows from the layout.
    pub width: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    pub filename: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            width: 3840,
            jpeg_quality: 80,
            filename: "photo_frame_print.jpg".to_string(),
        }
    }
}

/// Initial layout selections. Template constraints still apply on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub template: Template,
    pub aspect_ratio: AspectRatio,
    pub frame_color: FrameColor,
    pub align: Align,
}

/// Overlay text font.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// TrueType/OpenType font file. When absent, common system fonts are tried.
    pub path: Option<PathBuf>,
}

/// Colour configuration for black and white frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub black: ColorScheme,
    pub white: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            black: ColorScheme::default_black(),
            white: ColorScheme::default_white(),
        }
    }
}

impl ColorConfig {
    pub fn scheme(&self, color: FrameColor) -> &ColorScheme {
        match color {
            FrameColor::Black => &self.black,
            FrameColor::White => &self.white,
        }
    }

    /// Parsed palette for a frame colour.
    pub fn palette(&self, color: FrameColor) -> Result<Palette, ConfigError> {
        let scheme = self.scheme(color);
        let parse = |key: &str, value: &str| {
            parse_hex_color(value).map_err(|e| {
                ConfigError::Validation(format!("colors.{}.{key}: {e}", color.name()))
            })
        };
        Ok(Palette {
            background: parse("background", &scheme.background)?,
            photo_background: parse("photo_background", &scheme.photo_background)?,
            text: parse("text", &scheme.text)?,
            text_muted: parse("text_muted", &scheme.text_muted)?,
        })
    }
}

/// One frame colour scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Frame background.
    pub background: String,
    /// Shown around the photo when it does not fill the photo area.
    pub photo_background: String,
    /// Primary text colour.
    pub text: String,
    /// Secondary text colour (dates, location, settings line).
    pub text_muted: String,
}

impl ColorScheme {
    pub fn default_black() -> Self {
        Self {
            background: "#000000".to_string(),
            photo_background: "#111111".to_string(),
            text: "#ffffff".to_string(),
            text_muted: "#a0a0a0".to_string(),
        }
    }

    pub fn default_white() -> Self {
        Self {
            background: "#ffffff".to_string(),
            photo_background: "#f0f0f0".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_black()
    }
}

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex_color(value: &str) -> Result<Rgb<u8>, String> {
    let invalid = || format!("'{value}' is not a hex colour (expected #rrggbb)");
    let hex = value
        .trim()
        .strip_prefix('#')
        .filter(|h| h.is_ascii())
        .ok_or_else(invalid)?;
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok(Rgb([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ])),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
            Ok(Rgb([expand(0)?, expand(1)?, expand(2)?]))
        }
        _ => Err(invalid()),
    }
}

/// Generate CSS custom properties for both frame colours.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#".black-frame {{
    --frame-bg: {black_bg};
    --photo-bg: {black_photo_bg};
    --frame-text: {black_text};
    --frame-text-muted: {black_text_muted};
}}

.white-frame {{
    --frame-bg: {white_bg};
    --photo-bg: {white_photo_bg};
    --frame-text: {white_text};
    --frame-text-muted: {white_text_muted};
}}"#,
        black_bg = colors.black.background,
        black_photo_bg = colors.black.photo_background,
        black_text = colors.black.text,
        black_text_muted = colors.black.text_muted,
        white_bg = colors.white.background,
        white_photo_bg = colors.white.photo_background,
        white_text = colors.white.text,
        white_text_muted = colors.white.text_muted,
    )
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(FrameConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FrameConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FrameConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file, falling back to stock defaults when it is missing.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<FrameConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `exif-frame.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# exif-frame Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from ./exif-frame.toml, or from the path given with
# --config. Only the keys you want to change are needed.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Upload
# ---------------------------------------------------------------------------
[upload]
# Photos larger than this many MiB are rejected.
max_file_size_mb = 60

# ---------------------------------------------------------------------------
# Screen export (PNG)
# ---------------------------------------------------------------------------
[screen]
# Width of the on-screen preview in CSS pixels.
preview_width = 600

# The export is rendered at preview_width x pixel_density pixels wide.
pixel_density = 2

filename = "photo_frame_screen.png"

# ---------------------------------------------------------------------------
# Print export (JPEG)
# ---------------------------------------------------------------------------
[print]
# Canvas width in pixels. Height follows from the template and aspect ratio.
width = 3840

# JPEG encoding quality (1 = worst, 100 = best).
jpeg_quality = 80

filename = "photo_frame_print.jpg"

# ---------------------------------------------------------------------------
# Initial layout
# ---------------------------------------------------------------------------
[defaults]
# leica, fujifilm or cheki. Fujifilm forces a white frame; cheki forces a
# white frame and a 1:1 photo.
template = "leica"

# One of 3:2, 2:3, 4:3, 3:4, 16:9, 1:1, 4:5.
# Replaced by the closest preset when a photo is loaded.
aspect_ratio = "3:2"

# black or white.
frame_color = "black"

# Band text placement: left, center or right. center keeps each template's
# own layout; left and right stack every line against that edge.
align = "center"

# ---------------------------------------------------------------------------
# Fonts
# ---------------------------------------------------------------------------
[fonts]
# TrueType/OpenType font for the overlay text. When omitted, common system
# fonts are tried; without any, frames are exported without text.
# path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"

# ---------------------------------------------------------------------------
# Colors - black frame
# ---------------------------------------------------------------------------
[colors.black]
background = "#000000"
photo_background = "#111111"   # Visible when the photo does not fill its area
text = "#ffffff"
text_muted = "#a0a0a0"         # Dates, location, settings line

# ---------------------------------------------------------------------------
# Colors - white frame
# ---------------------------------------------------------------------------
[colors.white]
background = "#ffffff"
photo_background = "#f0f0f0"
text = "#111111"
text_muted = "#666666"
"##
}
