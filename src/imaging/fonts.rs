//! Font loading for overlay text.
//!
//! A configured font path must load; a broken path is an error. Without one,
//! a handful of common system font locations are tried in order. If none of
//! them exist, frames are rendered without text and a warning is logged.

use super::backend::BackendError;
use ab_glyph::FontVec;
use std::path::Path;
use tracing::{debug, warn};

/// System fonts tried when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a TrueType/OpenType font from disk.
pub fn load_font_file(path: &Path) -> Result<FontVec, BackendError> {
    let font_err = |reason: String| BackendError::Font {
        path: path.display().to_string(),
        reason,
    };
    let data = std::fs::read(path).map_err(|e| font_err(e.to_string()))?;
    FontVec::try_from_vec(data).map_err(|e| font_err(e.to_string()))
}

/// Resolve the font used for overlay text.
///
/// Returns `Ok(None)` when nothing is configured and no system font loads.
pub fn load_font(configured: Option<&Path>) -> Result<Option<FontVec>, BackendError> {
    if let Some(path) = configured {
        return load_font_file(path).map(Some);
    }

    for candidate in SYSTEM_FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match load_font_file(path) {
            Ok(font) => {
                debug!(font = %candidate, "using system font");
                return Ok(Some(font));
            }
            Err(e) => debug!(error = %e, "skipping system font"),
        }
    }

    warn!("no usable font found, frames will be rendered without text; set [fonts] path");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_missing_font_errors() {
        let result = load_font(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(result, Err(BackendError::Font { .. })));
    }

    #[test]
    fn configured_invalid_font_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let err = load_font_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.ttf"));
    }

    #[test]
    fn unconfigured_font_never_errors() {
        // Depends on the host's fonts, but must not fail either way.
        assert!(load_font(None).is_ok());
    }
}
