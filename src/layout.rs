//! Frame layout state: template, aspect ratio, frame colour, and text alignment.
//!
//! [`LayoutState`] holds the four user selections. Templates constrain
//! aspect ratio and colour:
//!
//! | Template | Aspect ratio | Frame colour |
//! |---|---|---|
//! | Leica | user choice | user choice |
//! | Fujifilm | user choice | forced white |
//! | Cheki | forced 1:1 | forced white |
//!
//! Selecting a template applies its constraints immediately, overriding any
//! earlier choice. Selections against a locked control are ignored. Alignment
//! is always free. Everything the renderers need comes from
//! [`LayoutState::view`], a pure function of the selections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frame template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Information band under the photo, camera left and settings right.
    #[default]
    Leica,
    /// White band with a centered "Shot on" line.
    Fujifilm,
    /// Instant-film look: square photo inset in a white card.
    Cheki,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Leica, Template::Fujifilm, Template::Cheki];

    pub fn name(self) -> &'static str {
        match self {
            Template::Leica => "leica",
            Template::Fujifilm => "fujifilm",
            Template::Cheki => "cheki",
        }
    }

    /// Aspect ratio this template forces, if any.
    pub fn forced_aspect_ratio(self) -> Option<AspectRatio> {
        match self {
            Template::Cheki => Some(AspectRatio::SQUARE),
            Template::Leica | Template::Fujifilm => None,
        }
    }

    /// Frame colour this template forces, if any.
    pub fn forced_frame_color(self) -> Option<FrameColor> {
        match self {
            Template::Fujifilm | Template::Cheki => Some(FrameColor::White),
            Template::Leica => None,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template '{s}' (expected leica, fujifilm or cheki)"))
    }
}

/// Frame colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameColor {
    #[default]
    Black,
    White,
}

impl FrameColor {
    pub fn name(self) -> &'static str {
        match self {
            FrameColor::Black => "black",
            FrameColor::White => "white",
        }
    }
}

impl fmt::Display for FrameColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(FrameColor::Black),
            "white" => Ok(FrameColor::White),
            _ => Err(format!("unknown frame color '{s}' (expected black or white)")),
        }
    }
}

/// Horizontal placement of the band text.
///
/// `Center` keeps each template's own composition (Leica's two columns,
/// Fujifilm's centred lines, Cheki's split rows). `Left` and `Right` stack
/// every line in one column flush against that edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub const ALL: [Align; 3] = [Align::Left, Align::Center, Align::Right];

    pub fn name(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Align::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown alignment '{s}' (expected left, center or right)"))
    }
}

/// A preset aspect ratio, width:height.
///
/// Serialized as `"3:2"`. Parsing also accepts `"3-2"`, the form used in
/// preview class names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio::new(1, 1);

    /// Presets offered to the user, in display order. The first entry is the default.
    pub const PRESETS: [AspectRatio; 7] = [
        AspectRatio::new(3, 2),
        AspectRatio::new(2, 3),
        AspectRatio::new(4, 3),
        AspectRatio::new(3, 4),
        AspectRatio::new(16, 9),
        AspectRatio::SQUARE,
        AspectRatio::new(4, 5),
    ];

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn value(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// `"3-2"`, for class names and filenames.
    pub fn slug(self) -> String {
        format!("{}-{}", self.width, self.height)
    }

    pub fn is_preset(self) -> bool {
        Self::PRESETS.contains(&self)
    }

    /// The preset closest to `ratio` by absolute difference. Earlier presets
    /// win ties.
    pub fn closest_preset(ratio: f64) -> AspectRatio {
        let mut best = Self::PRESETS[0];
        let mut best_diff = (best.value() - ratio).abs();
        for preset in &Self::PRESETS[1..] {
            let diff = (preset.value() - ratio).abs();
            if diff < best_diff {
                best = *preset;
                best_diff = diff;
            }
        }
        best
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PRESETS[0]
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid aspect ratio '{s}' (expected e.g. 3:2)");
        let (w, h) = s.trim().split_once([':', '-']).ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        let ratio = AspectRatio::new(width, height);
        if !ratio.is_preset() {
            let presets: Vec<String> = Self::PRESETS.iter().map(|p| p.to_string()).collect();
            return Err(format!(
                "aspect ratio {ratio} is not a preset (available: {})",
                presets.join(", ")
            ));
        }
        Ok(ratio)
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

/// Everything a renderer needs to know about the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutView {
    pub template: Template,
    pub aspect_ratio: AspectRatio,
    pub frame_color: FrameColor,
    pub align: Align,
    /// The aspect-ratio control is disabled.
    pub aspect_locked: bool,
    /// The frame-colour control is disabled.
    pub color_locked: bool,
}

/// The active selections. Constructed through [`LayoutState::new`] so
/// template constraints always hold. Alignment is never locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutState {
    template: Template,
    aspect_ratio: AspectRatio,
    frame_color: FrameColor,
    align: Align,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(Template::default(), AspectRatio::default(), FrameColor::default())
    }
}

impl LayoutState {
    /// Start from the given selections, then apply the template's constraints.
    pub fn new(template: Template, aspect_ratio: AspectRatio, frame_color: FrameColor) -> Self {
        let mut state = Self {
            template,
            aspect_ratio,
            frame_color,
            align: Align::default(),
        };
        state.apply_template_rules();
        state
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn frame_color(&self) -> FrameColor {
        self.frame_color
    }

    pub fn align(&self) -> Align {
        self.align
    }

    /// Switch template and force its constrained values.
    pub fn select_template(&mut self, template: Template) {
        self.template = template;
        self.apply_template_rules();
    }

    /// Change the aspect ratio. Returns `false` (and changes nothing) while the
    /// active template locks it.
    pub fn select_aspect_ratio(&mut self, ratio: AspectRatio) -> bool {
        if self.template.forced_aspect_ratio().is_some() {
            return false;
        }
        self.aspect_ratio = ratio;
        true
    }

    /// Change the frame colour. Returns `false` while the active template locks it.
    pub fn select_frame_color(&mut self, color: FrameColor) -> bool {
        if self.template.forced_frame_color().is_some() {
            return false;
        }
        self.frame_color = color;
        true
    }

    pub fn select_align(&mut self, align: Align) {
        self.align = align;
    }

    /// Activate the preset nearest to a photo's width/height ratio, unless the
    /// template locks the ratio. Returns the preset that was applied.
    pub fn apply_closest_preset(&mut self, photo_ratio: f64) -> Option<AspectRatio> {
        let preset = AspectRatio::closest_preset(photo_ratio);
        self.select_aspect_ratio(preset).then_some(preset)
    }

    pub fn view(&self) -> LayoutView {
        LayoutView {
            template: self.template,
            aspect_ratio: self.aspect_ratio,
            frame_color: self.frame_color,
            align: self.align,
            aspect_locked: self.template.forced_aspect_ratio().is_some(),
            color_locked: self.template.forced_frame_color().is_some(),
        }
    }

    fn apply_template_rules(&mut self) {
        if let Some(ratio) = self.template.forced_aspect_ratio() {
            self.aspect_ratio = ratio;
        }
        if let Some(color) = self.template.forced_frame_color() {
            self.frame_color = color;
        }
    }
}
