use crate::config::model::OutputDefinition;
use crate::config::tags::Tag;
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::publish::model::{Instance, PublishContext, RepresentationFiles};
use crate::sequence::collection::FrameCollection;

/// Sequence extensions that may carry alpha, so a background color can be composited.
const ALPHA_EXTENSIONS: &[&str] = &["exr", "png", "dpx"];

/// Frame range, handle and input facts for one (representation, output definition) pair.
///
/// Computed once by [`RenderContext::prepare`]; every later stage only reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    /// First frame without handles.
    pub frame_start: i64,
    /// Last frame without handles.
    pub frame_end: i64,
    /// Head handle in frames.
    pub handle_start: i64,
    /// Tail handle in frames.
    pub handle_end: i64,
    /// First frame including the head handle.
    pub frame_start_handle: i64,
    /// Last frame including the tail handle.
    pub frame_end_handle: i64,
    /// First frame written to the output.
    pub output_frame_start: i64,
    /// Last frame written to the output.
    pub output_frame_end: i64,
    /// Frames per second.
    pub fps: f64,
    /// Pixel aspect ratio of the input.
    pub pixel_aspect: f64,
    /// Target width from the instance.
    pub resolution_width: Option<u32>,
    /// Target height from the instance.
    pub resolution_height: Option<u32>,
    /// The input is a numbered image sequence.
    pub input_is_sequence: bool,
    /// Frame number the encoder starts reading a sequence input from.
    pub first_sequence_frame: Option<i64>,
    /// A background color may be composited under the input.
    pub input_allow_bg: bool,
    /// Audio is muxed into the output.
    pub with_audio: bool,
    /// The output drops the handles.
    pub without_handles: bool,
    /// The instance defines its own handles.
    pub handles_are_set: bool,
}

impl RenderContext {
    /// Work out frame ranges, handles and input facts for one output.
    pub fn prepare(
        instance: &Instance,
        context: &PublishContext,
        files: &RepresentationFiles,
        output_def: &OutputDefinition,
    ) -> ReviewResult<Self> {
        let frame_start = instance.frame_start;
        let frame_end = instance.frame_end;

        // Instance handles only count when both are set.
        let (handle_start, handle_end) = match (instance.handle_start, instance.handle_end) {
            (Some(start), Some(end)) => (start, end),
            _ => (context.handle_start, context.handle_end),
        };

        let frame_start_handle = frame_start - handle_start;
        let frame_end_handle = frame_end + handle_end;

        let without_handles = output_def.has_tag(&Tag::NoHandles);
        let (output_frame_start, output_frame_end) = if without_handles {
            (frame_start, frame_end)
        } else {
            (frame_start_handle, frame_end_handle)
        };

        let handles_are_set = handle_start > 0 || handle_end > 0;
        let with_audio = !output_def.has_tag(&Tag::NoAudio) && !instance.audio.is_empty();

        let input_is_sequence = files.is_sequence();
        let mut first_sequence_frame = None;
        let mut input_allow_bg = false;
        if input_is_sequence && let Some(first_name) = files.first() {
            let (collections, _) = FrameCollection::assemble(&files.names());
            let collection = collections.first().ok_or_else(|| {
                ReviewError::validation(format!(
                    "sequence starting with '{first_name}' has no numbered frames"
                ))
            })?;
            let mut first = collection.first_frame().unwrap_or(frame_start_handle);

            // The source may or may not include handles; only skip them when the
            // sequence is long enough to still cover the output range afterwards.
            let output_duration = output_frame_end - output_frame_start + 1;
            let frame_count = collection.frames.len() as i64;
            if without_handles && frame_count - handle_start >= output_duration {
                first += handle_start;
            }
            first_sequence_frame = Some(first);

            let ext = crate::foundation::core::path_ext(std::path::Path::new(first_name));
            input_allow_bg = ALPHA_EXTENSIONS.contains(&ext.as_str());
        }

        let ctx = Self {
            frame_start,
            frame_end,
            handle_start,
            handle_end,
            frame_start_handle,
            frame_end_handle,
            output_frame_start,
            output_frame_end,
            fps: instance.fps,
            pixel_aspect: instance.pixel_aspect,
            resolution_width: instance.resolution_width,
            resolution_height: instance.resolution_height,
            input_is_sequence,
            first_sequence_frame,
            input_allow_bg,
            with_audio,
            without_handles,
            handles_are_set,
        };
        tracing::debug!(
            output_frame_start,
            output_frame_end,
            handle_start,
            handle_end,
            without_handles,
            first_sequence_frame = ?ctx.first_sequence_frame,
            "prepared render context"
        );
        Ok(ctx)
    }

    /// Number of frames the output holds. A single image output is always one frame.
    pub fn output_frames_len(&self, single_image_output: bool) -> i64 {
        if single_image_output {
            1
        } else {
            self.output_frame_end - self.output_frame_start + 1
        }
    }

    /// Output length in seconds.
    pub fn duration_seconds(&self, single_image_output: bool) -> f64 {
        self.output_frames_len(single_image_output) as f64 / self.fps
    }

    /// Timecode of the first frame including handles, exposed to templates as `{timecode}`.
    pub fn timecode(&self) -> String {
        frame_to_timecode(self.frame_start_handle, self.fps)
    }
}

/// Editorial timecode `HH:MM:SS:FF` of `frame` at `fps`.
pub fn frame_to_timecode(frame: i64, fps: f64) -> String {
    let total_seconds = frame as f64 / fps;
    let hours = (total_seconds / 3600.0).floor() as i64;
    let minutes = (total_seconds.rem_euclid(3600.0) / 60.0).floor() as i64;
    let seconds = total_seconds.rem_euclid(60.0).trunc() as i64;
    let frames = ((total_seconds - total_seconds.trunc()) * fps).round_ties_even() as i64;
    format!("{hours:02}:{minutes:02}:{seconds:02}:{frames:02}")
}

#[cfg(test)]
#[path = "../../tests/unit/timing/context.rs"]
mod tests;
