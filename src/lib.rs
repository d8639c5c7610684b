//! # exif-frame
//!
//! Frames a photo with its own shooting metadata. The camera, exposure
//! settings and date are read from EXIF, turned into short display lines, and
//! drawn into an information band around the photo. The result is exported as
//! a PNG for screens or a JPEG for print.
//!
//! # Data Flow
//!
//! ```text
//! bytes ──read_tags──▶ TagMap ──from_tags──▶ FormFields ──record──▶ MetadataRecord
//!   │                                          ▲ (user edits)          │
//!   │                                                                  ▼
//!   └──decode──▶ DynamicImage            LayoutView ──┐          DisplayFields
//!                     │                               ▼                │
//!                     └─────────────▶ render_frame ◀── plan_frame ◀────┘
//!                                          │
//!                                          ▼
//!                                 encode (PNG / JPEG) → ExportArtifact
//! ```
//!
//! Every arrow except the outermost three (read, decode, encode) is a pure
//! function. Those three sit behind [`imaging::ImageBackend`], so the session
//! logic is tested against a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Tag values, formatting rules, editable fields, display strings |
//! | [`layout`] | Templates, aspect ratios, frame colours and the locks between them |
//! | [`compositor`] | Pure text placement per template; screen/print export targets |
//! | [`imaging`] | Frame geometry, rasterization, fonts, and the EXIF/codec backend |
//! | [`session`] | One photo's lifecycle: upload, edit, select, export |
//! | [`preview`] | Standalone HTML preview rendered with Maud |
//! | [`config`] | `exif-frame.toml` loading, validation, colour schemes |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Templates Own Their Locks
//!
//! A template may force an aspect ratio or a frame colour. Selecting it
//! overwrites the earlier choice, and selections against a locked control are
//! refused. Previews and exports both read [`layout::LayoutState::view`], which
//! also reports which controls are locked.
//!
//! ## Geometry Is Width-Driven
//!
//! Only the canvas width varies between preview, screen and print. Photo area,
//! band and text positions are all fractions of it, so a print export is the
//! screen export scaled up rather than a separate layout.
//!
//! ## Text Is Optional
//!
//! Glyphs come from a TrueType font found at runtime. When none is available
//! the frame is still exported, without text, and a warning is logged.

pub mod compositor;
pub mod config;
pub mod imaging;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod preview;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
