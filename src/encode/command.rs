use serde_json::{Map, Value};

use crate::config::model::OutputDefinition;
use crate::encode::paths::IoPaths;
use crate::encode::template::format_template;
use crate::foundation::core::{fmt_float, fmt_significant, quote_arg};
use crate::publish::model::Instance;
use crate::timing::audio::audio_args;
use crate::timing::context::RenderContext;

const VIDEO_FILTER_FLAGS: &[&str] = &["-vf", "-filter:v"];
const AUDIO_FILTER_FLAGS: &[&str] = &["-af", "-filter:a"];

/// Everything needed to assemble one encoder command line.
#[derive(Clone, Debug)]
pub struct CommandRequest<'a> {
    /// Output definition being rendered.
    pub output_def: &'a OutputDefinition,
    /// Instance owning the representation.
    pub instance: &'a Instance,
    /// Frame range and input facts.
    pub ctx: &'a RenderContext,
    /// Resolved input and output paths.
    pub paths: &'a IoPaths,
    /// Values for `{key}` placeholders in output arguments.
    pub fill_data: &'a Map<String, Value>,
    /// Layer of a multi-layer input to read.
    pub layer_name: Option<&'a str>,
    /// Filters from the geometry normalizer, appended after definition filters.
    pub geometry_filters: &'a [String],
    /// Apply the instance LUT.
    pub bake_lut: bool,
    /// Shell-ready encoder invocation, e.g. `ffmpeg`.
    pub encoder: &'a str,
}

/// Ordered command tokens; joined with spaces they form the shell command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegCommand {
    args: Vec<String>,
}

impl FfmpegCommand {
    /// Command tokens; the first is the encoder.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Tokens joined with spaces.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

impl std::fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Build the encoder command for one output definition.
pub fn build_command(req: &CommandRequest<'_>) -> FfmpegCommand {
    let ctx = req.ctx;
    let paths = req.paths;
    let raw = &req.output_def.ffmpeg_args;

    let mut input_args: Vec<String> = non_empty(&raw.input);
    let mut video_filters: Vec<String> = non_empty(&raw.video_filters);
    let mut audio_filters: Vec<String> = non_empty(&raw.audio_filters);

    let mut output_args: Vec<String> = Vec::new();
    for value in raw.output.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match format_template(value, req.fill_data) {
            Ok(formatted) => output_args.push(formatted),
            Err(err) => {
                tracing::warn!(argument = value, error = %err, "failed to format encoder argument");
                output_args.push(value.to_string());
            }
        }
    }

    let single_image = paths.single_image_output();
    let frames_len = ctx.output_frames_len(single_image);
    let duration = ctx.duration_seconds(single_image);

    if let Some(layer) = req.layer_name {
        input_args.push(format!("-layer {layer}"));
    }

    if ctx.input_is_sequence {
        let start_number = ctx.first_sequence_frame.unwrap_or(ctx.output_frame_start);
        input_args.push(format!("-start_number {start_number}"));
        input_args.push(format!("-framerate {}", fmt_float(ctx.fps)));
        if !paths.output_is_sequence {
            input_args.push(format!("-to {duration:.10}"));
        }
    }

    if paths.output_is_sequence {
        output_args.push(format!("-start_number {}", ctx.output_frame_start));
    }

    if ctx.without_handles && ctx.handles_are_set {
        output_args.push(format!("-t {}", fmt_significant(duration, 10)));
        if !ctx.input_is_sequence {
            let start_sec = ctx.handle_start as f64 / ctx.fps;
            if start_sec > 0.0 {
                input_args.push(format!("-ss {start_sec:.10}"));
            }
        }
    } else if paths.output_is_sequence {
        output_args.push(format!("-frames:v {frames_len}"));
    }

    input_args.push(format!("-i {}", quote_arg(&paths.input_path.to_string_lossy())));

    if !paths.output_ext_is_image && ctx.with_audio {
        let audio = audio_args(
            &req.instance.audio,
            req.instance.frame_start_ftrack,
            ctx.fps,
            duration,
        );
        input_args.extend(audio.input);
        audio_filters.extend(audio.filters);
        output_args.extend(audio.output);
    }

    video_filters.extend(req.geometry_filters.iter().cloned());

    let mut input_args = split_ffmpeg_args(&input_args);

    if req.bake_lut
        && let Some(lut_path) = req.instance.lut_path.as_deref().filter(|p| !p.is_empty())
    {
        input_args = remove_flag(input_args, "-gamma");
        video_filters.push(format!("lut3d=file='{}'", escape_filter_path(lut_path)));
        video_filters.push("colormatrix=bt601:bt709".to_string());
        tracing::info!(lut = lut_path, "baking lut into review");
    }

    if let Some(bg) = req.output_def.bg_color.filter(|c| c.a > 0.0) {
        if ctx.input_allow_bg {
            let color = format!("#{}@{}", bg.hex_rgb(), fmt_float(bg.a));
            tracing::info!(color, "applying background color");
            let compose = [
                "split=2[bg][fg]".to_string(),
                format!("[bg]drawbox=c={color}:replace=1:t=fill[bg]"),
                "[bg][fg]overlay=format=auto".to_string(),
            ];
            video_filters = compose.into_iter().chain(video_filters).collect();
        } else {
            tracing::info!("background color set but input does not support it");
        }
    }

    let mut command = assemble(req.encoder, input_args, video_filters, audio_filters, output_args);
    command.args.push("-y".to_string());
    command
        .args
        .push(quote_arg(&paths.output_path.to_string_lossy()));
    command
}

/// Split arguments holding several flags (`"-c:v h264 -crf 18"`) into one token per flag,
/// keeping only the first occurrence of each token.
pub fn split_ffmpeg_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for arg in args {
        for (idx, part) in arg.as_ref().split(" -").enumerate() {
            let token = if idx == 0 {
                part.to_string()
            } else {
                format!("-{part}")
            };
            if !token.is_empty() && !out.contains(&token) {
                out.push(token);
            }
        }
    }
    out
}

/// Move video and audio filters found in output arguments into the filter lists.
///
/// Returns the remaining output arguments.
pub fn relocate_filters(
    output_args: Vec<String>,
    video_filters: &mut Vec<String>,
    audio_filters: &mut Vec<String>,
) -> Vec<String> {
    let mut remaining = Vec::with_capacity(output_args.len());
    let mut iter = output_args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        let target = if flag_value(&arg, VIDEO_FILTER_FLAGS).is_some()
            || VIDEO_FILTER_FLAGS.contains(&arg.as_str())
        {
            Some(&mut *video_filters)
        } else if flag_value(&arg, AUDIO_FILTER_FLAGS).is_some()
            || AUDIO_FILTER_FLAGS.contains(&arg.as_str())
        {
            Some(&mut *audio_filters)
        } else {
            None
        };
        let Some(target) = target else {
            remaining.push(arg);
            continue;
        };

        let value = match flag_value(&arg, VIDEO_FILTER_FLAGS)
            .or_else(|| flag_value(&arg, AUDIO_FILTER_FLAGS))
        {
            Some(value) => Some(value.to_string()),
            None => iter.next_if(|next| !next.starts_with('-')),
        };
        if let Some(v) = value
            .map(|v| unquote(&v).to_string())
            .filter(|v| !v.is_empty())
        {
            target.push(v);
        }
    }
    remaining
}

/// Join all parts into the final token list, relocating filters out of the output args.
pub fn assemble(
    encoder: &str,
    input_args: Vec<String>,
    mut video_filters: Vec<String>,
    mut audio_filters: Vec<String>,
    output_args: Vec<String>,
) -> FfmpegCommand {
    let output_args = split_ffmpeg_args(&output_args);
    let output_args = relocate_filters(output_args, &mut video_filters, &mut audio_filters);

    let mut args = Vec::with_capacity(input_args.len() + output_args.len() + 5);
    args.push(encoder.to_string());
    args.extend(input_args);
    if !video_filters.is_empty() {
        args.push("-filter:v".to_string());
        args.push(format!("\"{}\"", video_filters.join(",")));
    }
    if !audio_filters.is_empty() {
        args.push("-filter:a".to_string());
        args.push(format!("\"{}\"", audio_filters.join(",")));
    }
    args.extend(output_args);
    FfmpegCommand { args }
}

fn flag_value<'a>(arg: &'a str, flags: &[&str]) -> Option<&'a str> {
    flags.iter().find_map(|flag| {
        arg.strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix(' '))
            .map(str::trim)
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Drop `flag` with its value, given either as one token or as the following token.
fn remove_flag(args: Vec<String>, flag: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == flag {
            iter.next_if(|next| !next.starts_with('-'));
            continue;
        }
        if flag_value(&arg, &[flag]).is_some() {
            continue;
        }
        out.push(arg);
    }
    out
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect()
}

/// Escape a path for use inside a filter graph option value.
fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "/").replace(':', "\\:")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/command.rs"]
mod tests;
