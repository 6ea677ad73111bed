//! Review transcoding for VFX publish pipelines.
//!
//! Given a publish instance and its representations, the crate decides which configured review
//! outputs apply, works out frame ranges, handles and audio offsets, repairs gaps in numbered
//! image sequences, resolves overscan expressions into filter chains and assembles the ffmpeg
//! command line for each output:
//!
//! - Load [`ExtractReviewSettings`]
//! - Build an [`ExtractReview`] (optionally with custom [`MediaProbe`], [`EncoderRunner`] or
//!   [`InputConverter`] implementations)
//! - Call [`ExtractReview::process`] on each [`Instance`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod config;
pub(crate) mod driver;
pub(crate) mod encode;
pub(crate) mod geometry;
pub(crate) mod overscan;
pub(crate) mod publish;
pub(crate) mod sequence;
pub(crate) mod timing;

pub use crate::foundation::core::{RgbColor, RgbaColor};
pub use crate::foundation::error::{ReviewError, ReviewResult};

pub use crate::config::model::{
    FfmpegArgs, LetterBox, OutputDefinition, OutputFilter, OutputProfile, SingleFrameFilter,
};
pub use crate::config::resolve::{
    IMAGE_EXTENSIONS, SUPPORTED_INPUT_EXTENSIONS, filter_by_custom_tags, filter_output_defs,
    review_skip_reason, select_profile, single_frame_filter,
};
pub use crate::config::settings::{
    ExtractReviewSettings, FFMPEG_ENV, FFPROBE_ENV, OIIOTOOL_ENV, ToolSettings,
};
pub use crate::config::tags::{Tag, Tags};
pub use crate::driver::extract::{ExtractReview, RenderedOutput, ReviewReport, SkippedOutput};
pub use crate::driver::scratch::ConversionScratch;
pub use crate::encode::command::{
    CommandRequest, FfmpegCommand, assemble, build_command, relocate_filters, split_ffmpeg_args,
};
pub use crate::encode::convert::{
    ConversionDecision, ImageAttrib, ImageInfo, InputAnalysis, InputConverter, OiioConverter,
    ReviewChannels, parse_oiio_info, review_layers,
};
pub use crate::encode::paths::{IoPaths, OUTPUT_IMAGE_EXTENSIONS};
pub use crate::encode::probe::{FfprobeProbe, MediaProbe};
pub use crate::encode::runner::{DryRunRunner, EncoderRunner, ShellRunner};
pub use crate::encode::template::format_template;
pub use crate::geometry::letterbox::letterbox_filters;
pub use crate::geometry::normalize::{Geometry, rescaling_filters};
pub use crate::overscan::crop::OverscanCrop;
pub use crate::overscan::parse::parse_overscan;
pub use crate::overscan::value::{OverscanValue, Sign};
pub use crate::publish::model::{
    AudioSource, Instance, PublishContext, PublishJob, Representation, RepresentationFiles,
};
pub use crate::sequence::collection::FrameCollection;
pub use crate::sequence::gaps::{FilledFrames, fill_sequence_gaps};
pub use crate::timing::audio::{AudioArgs, audio_args};
pub use crate::timing::context::{RenderContext, frame_to_timecode};
