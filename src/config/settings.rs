use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::model::OutputProfile;
use crate::foundation::core::quote_arg;
use crate::foundation::error::{ReviewError, ReviewResult};

/// Environment variable overriding the `ffmpeg` executable.
pub const FFMPEG_ENV: &str = "REVIEW_TRANSCODE_FFMPEG";
/// Environment variable overriding the `ffprobe` executable.
pub const FFPROBE_ENV: &str = "REVIEW_TRANSCODE_FFPROBE";
/// Environment variable overriding the `oiiotool` executable.
pub const OIIOTOOL_ENV: &str = "REVIEW_TRANSCODE_OIIOTOOL";

/// Settings for the review extraction step.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ExtractReviewSettings {
    /// Profiles, first match wins.
    #[serde(default)]
    pub profiles: Vec<OutputProfile>,
    /// External tool invocations.
    #[serde(default)]
    pub tools: ToolSettings,
    /// Parent directory for conversion scratch directories. Defaults to the system temp dir.
    #[serde(default)]
    pub temp_root: Option<PathBuf>,
}

impl ExtractReviewSettings {
    /// Load settings from a JSON file and apply environment overrides.
    pub fn from_path(path: &Path) -> ReviewResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings '{}'", path.display()))?;
        let mut settings = Self::from_json_str(&text)?;
        settings.tools.apply_env();
        Ok(settings)
    }

    /// Parse and validate settings JSON. Environment overrides are not applied.
    pub fn from_json_str(text: &str) -> ReviewResult<Self> {
        let settings: Self =
            serde_json::from_str(text).map_err(|e| ReviewError::serde(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate every profile and the tool invocations.
    pub fn validate(&self) -> ReviewResult<()> {
        for profile in &self.profiles {
            profile.validate()?;
        }
        self.tools.validate()
    }

    /// Directory conversion scratch dirs are created under.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Invocation tokens for the external tools.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ToolSettings {
    /// `ffmpeg` invocation tokens.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: Vec<String>,
    /// `ffprobe` invocation tokens.
    #[serde(default = "default_ffprobe")]
    pub ffprobe: Vec<String>,
    /// `oiiotool` invocation tokens.
    #[serde(default = "default_oiiotool")]
    pub oiiotool: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            oiiotool: default_oiiotool(),
        }
    }
}

impl ToolSettings {
    /// Reject empty invocations.
    pub fn validate(&self) -> ReviewResult<()> {
        for (name, args) in [
            ("ffmpeg", &self.ffmpeg),
            ("ffprobe", &self.ffprobe),
            ("oiiotool", &self.oiiotool),
        ] {
            if args.first().is_none_or(|exe| exe.trim().is_empty()) {
                return Err(ReviewError::validation(format!(
                    "tool '{name}' has an empty invocation"
                )));
            }
        }
        Ok(())
    }

    /// Replace executables with values from the environment, when set.
    pub fn apply_env(&mut self) {
        for (var, args) in [
            (FFMPEG_ENV, &mut self.ffmpeg),
            (FFPROBE_ENV, &mut self.ffprobe),
            (OIIOTOOL_ENV, &mut self.oiiotool),
        ] {
            if let Ok(exe) = std::env::var(var)
                && !exe.trim().is_empty()
            {
                tracing::debug!(var, exe, "tool override from environment");
                *args = vec![exe];
            }
        }
    }

    /// The encoder invocation as it appears at the start of a shell command line.
    pub fn ffmpeg_command_prefix(&self) -> String {
        self.ffmpeg
            .iter()
            .map(|a| quote_arg(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn default_ffmpeg() -> Vec<String> {
    vec!["ffmpeg".to_string()]
}

fn default_ffprobe() -> Vec<String> {
    vec!["ffprobe".to_string()]
}

fn default_oiiotool() -> Vec<String> {
    vec!["oiiotool".to_string()]
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
