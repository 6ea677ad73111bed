use crate::foundation::core::{fmt_float, quote_arg};
use crate::publish::model::AudioSource;

/// Encoder arguments for the instance audio tracks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioArgs {
    /// Audio input arguments.
    pub input: Vec<String>,
    /// Audio filters.
    pub filters: Vec<String>,
    /// Audio output arguments.
    pub output: Vec<String>,
}

/// Build audio input/output arguments for `sources`.
///
/// The offset of each source is `(frame_start_ftrack - source.offset) / fps` seconds, zero when
/// the instance has no `frameStartFtrack`. A positive offset seeks into the audio, a negative
/// one delays it.
pub fn audio_args(
    sources: &[AudioSource],
    frame_start_ftrack: Option<i64>,
    fps: f64,
    video_duration: f64,
) -> AudioArgs {
    let mut args = AudioArgs::default();
    if sources.is_empty() {
        return args;
    }

    for source in sources {
        let offset = frame_start_ftrack
            .map(|start| (start as f64 - source.offset) / fps)
            .unwrap_or(0.0);

        if offset > 0.0 {
            args.input.push(format!("-ss {}", fmt_float(offset)));
        } else if offset < 0.0 {
            args.input.push(format!("-itsoffset {}", fmt_float(offset.abs())));
        }
        args.input.push(format!("-to {:.10}", video_duration + offset));
        args.input.push("-vn".to_string());
        args.input.push(format!(
            "-i {}",
            quote_arg(&source.filename.to_string_lossy())
        ));
    }

    if sources.len() > 1 {
        args.output.push("-filter_complex amerge".to_string());
        args.output.push(format!("-ac {}", sources.len()));
    }

    args
}

#[cfg(test)]
#[path = "../../tests/unit/timing/audio.rs"]
mod tests;
