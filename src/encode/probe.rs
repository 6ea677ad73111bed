use std::path::Path;

use crate::encode::runner::{run_tool, tool_command};
use crate::foundation::error::{ReviewError, ReviewResult};

/// Reads the pixel resolution of a media file.
pub trait MediaProbe {
    /// Width and height of the first video stream of `path`.
    fn resolution(&self, path: &Path) -> ReviewResult<(u32, u32)>;
}

/// [`MediaProbe`] backed by `ffprobe`.
#[derive(Clone, Debug)]
pub struct FfprobeProbe {
    tool: Vec<String>,
}

impl FfprobeProbe {
    /// Probe running `tool` as the ffprobe invocation.
    pub fn new(tool: Vec<String>) -> Self {
        Self { tool }
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new(vec!["ffprobe".to_string()])
    }
}

impl MediaProbe for FfprobeProbe {
    fn resolution(&self, path: &Path) -> ReviewResult<(u32, u32)> {
        tracing::debug!(path = %path.display(), "probing input");
        let mut cmd = tool_command(&self.tool)?;
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "fatal",
            "-show_error",
            "-show_streams",
            "-print_format",
            "json",
        ])
        .arg(path);
        let stdout = run_tool(cmd, "ffprobe")
            .map_err(|e| ReviewError::probe(path, format!("ffprobe couldn't read the file: {e}")))?;
        resolution_from_ffprobe_json(&stdout, path)
    }
}

/// Resolution of the first stream reporting both width and height.
pub fn resolution_from_ffprobe_json(json: &[u8], path: &Path) -> ReviewResult<(u32, u32)> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ReviewError::probe(path, format!("ffprobe json parse failed: {e}")))?;
    parsed
        .streams
        .iter()
        .find_map(|s| match (s.width, s.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        })
        .ok_or_else(|| ReviewError::probe(path, "ffprobe couldn't read resolution"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/probe.rs"]
mod tests;
