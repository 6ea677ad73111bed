use crate::config::tags::{Tag, Tags};
use crate::foundation::core::{RgbColor, RgbaColor};
use crate::foundation::error::{ReviewError, ReviewResult};

/// A group of output definitions selected by host and product type.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct OutputProfile {
    /// Host names this profile applies to. Empty matches every host.
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Product types this profile applies to. Empty matches every product type.
    #[serde(default)]
    pub product_types: Vec<String>,
    /// Output definitions in render order.
    #[serde(default)]
    pub outputs: Vec<OutputDefinition>,
}

impl OutputProfile {
    /// Check every definition; compiles product-name regexes so bad patterns fail early.
    pub fn validate(&self) -> ReviewResult<()> {
        for output in &self.outputs {
            output.validate()?;
        }
        Ok(())
    }
}

/// One configured deliverable.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OutputDefinition {
    /// Output name, used as filename suffix.
    pub name: String,
    /// Output extension. Falls back to the input extension.
    #[serde(default)]
    pub ext: Option<String>,
    /// Flags copied onto the derived representation.
    #[serde(default)]
    pub tags: Tags,
    /// Burnin presets forwarded to the derived representation.
    #[serde(default)]
    pub burnins: Vec<String>,
    /// Restricts where this definition applies. `None` applies everywhere.
    #[serde(default)]
    pub filter: Option<OutputFilter>,
    /// Extra encoder arguments and filters.
    #[serde(default)]
    pub ffmpeg_args: FfmpegArgs,
    /// Output width, `0` means unset.
    #[serde(default)]
    pub width: u32,
    /// Output height, `0` means unset.
    #[serde(default)]
    pub height: u32,
    /// Overscan/crop expression, see [`crate::OverscanCrop`].
    #[serde(default)]
    pub overscan_crop: String,
    /// Fill color for areas padded by the overscan expression.
    #[serde(default)]
    pub overscan_color: Option<RgbColor>,
    /// Stretch non-square pixels to square before scaling.
    #[serde(default = "default_true")]
    pub scale_pixel_aspect: bool,
    /// Letter box drawn over the output.
    #[serde(default)]
    pub letter_box: LetterBox,
    /// Background composited under inputs with alpha.
    #[serde(default)]
    pub bg_color: Option<RgbaColor>,
}

impl Default for OutputDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            ext: None,
            tags: Tags::new(),
            burnins: Vec::new(),
            filter: None,
            ffmpeg_args: FfmpegArgs::default(),
            width: 0,
            height: 0,
            overscan_crop: String::new(),
            overscan_color: None,
            scale_pixel_aspect: true,
            letter_box: LetterBox::default(),
            bg_color: None,
        }
    }
}

impl OutputDefinition {
    /// Reject empty names, bad product-name regexes and a letter box without a ratio.
    pub fn validate(&self) -> ReviewResult<()> {
        if self.name.trim().is_empty() {
            return Err(ReviewError::validation("output definition name is empty"));
        }
        if let Some(filter) = &self.filter {
            for pattern in filter.product_names.iter().filter(|p| !p.is_empty()) {
                regex::Regex::new(pattern).map_err(|e| {
                    ReviewError::validation(format!(
                        "output '{}' has invalid product name filter '{pattern}': {e}",
                        self.name
                    ))
                })?;
            }
        }
        if self.letter_box.enabled && self.letter_box.ratio <= 0.0 {
            return Err(ReviewError::validation(format!(
                "output '{}' has letter box enabled with non-positive ratio",
                self.name
            )));
        }
        Ok(())
    }

    /// Whether the definition carries `tag`.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }
}

/// Optional restrictions on where an output definition applies.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct OutputFilter {
    /// Families, any of which must be on the instance. Compared case-insensitively.
    #[serde(default)]
    pub families: Vec<String>,
    /// Regexes searched in the product name.
    #[serde(default)]
    pub product_names: Vec<String>,
    /// Custom tags, any of which must be on the representation.
    #[serde(default)]
    pub custom_tags: Vec<String>,
    /// Restrict to single-frame or multi-frame inputs.
    #[serde(default)]
    pub single_frame_filter: Option<SingleFrameFilter>,
}

/// Which input shapes an output definition accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleFrameFilter {
    /// Only for inputs that are exactly one image file.
    SingleFrame,
    /// Only for anything else.
    MultiFrame,
}

/// Raw pass-through encoder arguments.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct FfmpegArgs {
    /// Arguments placed before the input.
    #[serde(default)]
    pub input: Vec<String>,
    /// Arguments placed before the output path.
    #[serde(default)]
    pub output: Vec<String>,
    /// Video filters, joined into one `-filter:v`.
    #[serde(default)]
    pub video_filters: Vec<String>,
    /// Audio filters, joined into one `-filter:a`.
    #[serde(default)]
    pub audio_filters: Vec<String>,
}

/// Bars covering the frame outside a target aspect ratio.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LetterBox {
    /// Draw the letter box.
    #[serde(default)]
    pub enabled: bool,
    /// Target aspect ratio of the visible area.
    #[serde(default)]
    pub ratio: f64,
    /// Color of the bars.
    #[serde(default = "default_fill_color")]
    pub fill_color: RgbaColor,
    /// Color of the line between bars and picture.
    #[serde(default)]
    pub line_color: RgbaColor,
    /// Line thickness in pixels, `0` draws no line.
    #[serde(default)]
    pub line_thickness: u32,
}

impl Default for LetterBox {
    fn default() -> Self {
        Self {
            enabled: false,
            ratio: 0.0,
            fill_color: default_fill_color(),
            line_color: RgbaColor::default(),
            line_thickness: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fill_color() -> RgbaColor {
    RgbaColor::new(0, 0, 0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
