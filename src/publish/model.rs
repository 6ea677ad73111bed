use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde_json::{Map, Value};

use crate::config::model::OutputDefinition;
use crate::config::tags::{Tag, Tags};
use crate::foundation::error::{ReviewError, ReviewResult};

/// Publish-wide data shared by all instances.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct PublishContext {
    /// Host application the publish runs in.
    #[serde(rename = "hostName")]
    pub host_name: String,
    /// Project being published.
    #[serde(rename = "projectName", default)]
    pub project_name: String,
    /// Fallback handles when the instance does not define both of its own.
    #[serde(rename = "handleStart", default)]
    pub handle_start: i64,
    /// Fallback tail handle.
    #[serde(rename = "handleEnd", default)]
    pub handle_end: i64,
}

/// One publish instance as seen by review extraction.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Instance {
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Product type, used for profile selection.
    #[serde(rename = "productType")]
    pub product_type: String,
    /// Product name matched by output filters.
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,
    /// Main family.
    #[serde(default)]
    pub family: Option<String>,
    /// Additional families.
    #[serde(default)]
    pub families: Vec<String>,
    /// First frame of the shot, without handles.
    #[serde(rename = "frameStart")]
    pub frame_start: i64,
    /// Last frame of the shot, without handles.
    #[serde(rename = "frameEnd")]
    pub frame_end: i64,
    /// Head handle in frames.
    #[serde(rename = "handleStart", default)]
    pub handle_start: Option<i64>,
    /// Tail handle in frames.
    #[serde(rename = "handleEnd", default)]
    pub handle_end: Option<i64>,
    /// First frame as recorded for review, when it differs from `frame_start`.
    #[serde(rename = "frameStartFtrack", default)]
    pub frame_start_ftrack: Option<i64>,
    /// Frames per second.
    pub fps: f64,
    /// Pixel aspect ratio of the input.
    #[serde(rename = "pixelAspect", default = "default_pixel_aspect")]
    pub pixel_aspect: f64,
    /// Target width. Output definition sizes take precedence.
    #[serde(rename = "resolutionWidth", default)]
    pub resolution_width: Option<u32>,
    /// Target height. Output definition sizes take precedence.
    #[serde(rename = "resolutionHeight", default)]
    pub resolution_height: Option<u32>,
    /// Audio tracks muxed into video outputs.
    #[serde(default)]
    pub audio: Vec<AudioSource>,
    /// Template fill data forwarded into output argument formatting.
    #[serde(rename = "anatomyData", default)]
    pub anatomy_data: Map<String, Value>,
    /// LUT applied for `bake-lut` outputs.
    #[serde(rename = "lutPath", default)]
    pub lut_path: Option<String>,
    /// `false` disables review extraction for this instance.
    #[serde(default = "default_true")]
    pub review: bool,
    /// Representations, source and derived.
    #[serde(default)]
    pub representations: Vec<Representation>,
    /// Fields this crate does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Instance {
    /// Reject non-positive fps or pixel aspect and reversed frame ranges.
    pub fn validate(&self) -> ReviewResult<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ReviewError::validation(format!(
                "instance fps must be positive, got {}",
                self.fps
            )));
        }
        if self.frame_end < self.frame_start {
            return Err(ReviewError::validation(format!(
                "instance frame range {}-{} is reversed",
                self.frame_start, self.frame_end
            )));
        }
        if !(self.pixel_aspect.is_finite() && self.pixel_aspect > 0.0) {
            return Err(ReviewError::validation(format!(
                "instance pixel aspect must be positive, got {}",
                self.pixel_aspect
            )));
        }
        Ok(())
    }

    /// `family` followed by `families`, without duplicates.
    pub fn all_families(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for family in self.family.iter().chain(self.families.iter()) {
            if !family.is_empty() && !out.contains(family) {
                out.push(family.clone());
            }
        }
        out
    }

    /// Label for logs: `label`, then product name, then product type.
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .or_else(|| self.product_name.clone())
            .unwrap_or_else(|| self.product_type.clone())
    }
}

/// Audio track attached to an instance.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AudioSource {
    /// Audio file path.
    pub filename: PathBuf,
    /// Frame on the instance timeline where the audio starts.
    #[serde(default)]
    pub offset: f64,
}

/// Files of a representation: one file, or an ordered list forming an image sequence.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RepresentationFiles {
    /// One file.
    Single(String),
    /// Numbered image files in frame order.
    Sequence(Vec<String>),
}

impl RepresentationFiles {
    /// Whether the files form a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    /// First file name, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name.as_str()).filter(|n| !n.is_empty()),
            Self::Sequence(names) => names.first().map(String::as_str),
        }
    }

    /// All file names.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) if name.is_empty() => Vec::new(),
            Self::Single(name) => vec![name.as_str()],
            Self::Sequence(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// All files joined onto `dir`.
    pub fn paths_in(&self, dir: &Path) -> Vec<PathBuf> {
        self.names().into_iter().map(|n| dir.join(n)).collect()
    }
}

/// A set of files published together, source or derived.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Representation {
    /// Representation name, usually the extension.
    #[serde(default)]
    pub name: String,
    /// File extension.
    pub ext: String,
    /// Published files.
    pub files: RepresentationFiles,
    /// Directory holding `files`.
    #[serde(rename = "stagingDir")]
    pub staging_dir: PathBuf,
    /// Flags steering review extraction.
    #[serde(default)]
    pub tags: Tags,
    /// Free-form tags matched by output filters.
    #[serde(default)]
    pub custom_tags: Vec<String>,
    /// Name suffix for derived outputs.
    #[serde(rename = "outputName", default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    /// Burnin presets to apply later.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub burnins: Vec<String>,
    /// Width of the media.
    #[serde(rename = "resolutionWidth", default, skip_serializing_if = "Option::is_none")]
    pub resolution_width: Option<u32>,
    /// Height of the media.
    #[serde(rename = "resolutionHeight", default, skip_serializing_if = "Option::is_none")]
    pub resolution_height: Option<u32>,
    /// Frames per second of the media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// First frame on the review timeline.
    #[serde(rename = "frameStartFtrack", default, skip_serializing_if = "Option::is_none")]
    pub frame_start_ftrack: Option<i64>,
    /// Last frame on the review timeline.
    #[serde(rename = "frameEndFtrack", default, skip_serializing_if = "Option::is_none")]
    pub frame_end_ftrack: Option<i64>,
    /// Encoder command that produced the files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_cmd: Option<String>,
    /// Printf-style pattern of a sequence output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_file: Option<String>,
    /// Output definition that produced the files.
    #[serde(rename = "outputDef", default, skip_serializing_if = "Option::is_none")]
    pub output_def: Option<OutputDefinition>,
    /// Fields this crate does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Representation {
    /// Whether the representation carries `tag`.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Extension without the leading dot, lower-cased.
    pub fn normalized_ext(&self) -> String {
        crate::foundation::core::normalize_ext(&self.ext)
    }
}

/// A context and instance pair, the unit the CLI reads and writes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PublishJob {
    /// Publish-wide data.
    pub context: PublishContext,
    /// The instance to process.
    pub instance: Instance,
}

impl PublishJob {
    /// Read a job from a JSON file.
    pub fn from_path(path: &Path) -> ReviewResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read publish job '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| ReviewError::serde(e.to_string()))
    }

    /// Serialize the job as pretty JSON.
    pub fn to_json_pretty(&self) -> ReviewResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReviewError::serde(e.to_string()))
    }
}

fn default_pixel_aspect() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "../../tests/unit/publish/model.rs"]
mod tests;
