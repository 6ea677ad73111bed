use std::path::Path;

use serde_json::{Map, Value};

use crate::config::model::OutputDefinition;
use crate::config::resolve::{
    filter_by_custom_tags, filter_output_defs, review_skip_reason, select_profile,
    single_frame_filter,
};
use crate::config::settings::ExtractReviewSettings;
use crate::config::tags::Tag;
use crate::driver::scratch::ConversionScratch;
use crate::encode::command::{CommandRequest, build_command};
use crate::encode::convert::{ConversionDecision, InputConverter, OiioConverter};
use crate::encode::paths::IoPaths;
use crate::encode::probe::{FfprobeProbe, MediaProbe};
use crate::encode::runner::{EncoderRunner, ShellRunner};
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::geometry::normalize::rescaling_filters;
use crate::publish::model::{Instance, PublishContext, Representation};
use crate::sequence::gaps::fill_sequence_gaps;
use crate::timing::context::RenderContext;

/// An encoder run made for one output definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedOutput {
    /// Name of the source representation.
    pub source: String,
    /// Output definition name.
    pub output: String,
    /// Name of the derived representation.
    pub representation: String,
    /// Encoder command line that was run.
    pub command: String,
}

/// A source representation or a single output definition that produced nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedOutput {
    /// Name of the source representation.
    pub source: String,
    /// `None` when the whole representation was skipped.
    pub output: Option<String>,
    /// Why nothing was rendered.
    pub reason: String,
}

/// What [`ExtractReview::process`] did to an instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewReport {
    /// Outputs rendered, in order.
    pub rendered: Vec<RenderedOutput>,
    /// Outputs or representations skipped.
    pub skipped: Vec<SkippedOutput>,
    /// Representations dropped for carrying the `delete` tag.
    pub removed: Vec<String>,
}

impl ReviewReport {
    fn skip(&mut self, source: &Representation, output: Option<&str>, reason: impl Into<String>) {
        self.skipped.push(SkippedOutput {
            source: source.name.clone(),
            output: output.map(str::to_string),
            reason: reason.into(),
        });
    }
}

/// Review extraction for publish instances.
///
/// Media access goes through three seams so callers can swap tooling: a [`MediaProbe`] for
/// input resolution, an [`InputConverter`] for inputs the encoder cannot read, and an
/// [`EncoderRunner`] that executes the assembled command line. [`ExtractReview::new`] wires
/// ffprobe, oiiotool and the platform shell from the tool settings.
pub struct ExtractReview {
    settings: ExtractReviewSettings,
    probe: Box<dyn MediaProbe>,
    runner: Box<dyn EncoderRunner>,
    converter: Box<dyn InputConverter>,
}

impl ExtractReview {
    /// Wire the default tools from `settings.tools`.
    pub fn new(settings: ExtractReviewSettings) -> Self {
        let probe = Box::new(FfprobeProbe::new(settings.tools.ffprobe.clone()));
        let converter = Box::new(OiioConverter::new(settings.tools.oiiotool.clone()));
        Self {
            settings,
            probe,
            runner: Box::new(ShellRunner),
            converter,
        }
    }

    /// Replace the media probe.
    pub fn with_probe(mut self, probe: impl MediaProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Replace the encoder runner.
    pub fn with_runner(mut self, runner: impl EncoderRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Replace the input converter.
    pub fn with_converter(mut self, converter: impl InputConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Settings in use.
    pub fn settings(&self) -> &ExtractReviewSettings {
        &self.settings
    }

    /// Render every matching output definition of every review representation of `instance`.
    ///
    /// Derived representations are appended in definition order. Afterwards representations
    /// tagged `delete` are removed unless they are also thumbnail sources. Nothing happens
    /// when the instance disables review.
    #[tracing::instrument(skip_all, fields(instance = %instance.display_label()))]
    pub fn process(
        &self,
        context: &PublishContext,
        instance: &mut Instance,
    ) -> ReviewResult<ReviewReport> {
        let mut report = ReviewReport::default();
        if !instance.review {
            tracing::debug!("review disabled on instance");
            return Ok(report);
        }
        instance.validate()?;

        let derived = self.render_instance(context, instance, &mut report)?;
        instance.representations.extend(derived);
        report.removed = prune_deleted(&mut instance.representations);
        Ok(report)
    }

    fn render_instance(
        &self,
        context: &PublishContext,
        instance: &Instance,
        report: &mut ReviewReport,
    ) -> ReviewResult<Vec<Representation>> {
        let Some(profile) = select_profile(
            &self.settings.profiles,
            &context.host_name,
            &instance.product_type,
        ) else {
            tracing::info!(
                host = %context.host_name,
                product_type = %instance.product_type,
                "Skipped instance. No profile matches"
            );
            return Ok(Vec::new());
        };

        let families = instance.all_families();
        let defs = filter_output_defs(profile, instance.product_name.as_deref(), &families)?;
        if defs.is_empty() {
            tracing::info!(
                ?families,
                product_name = ?instance.product_name,
                "Skipped instance. No output definition matches families or product name"
            );
            return Ok(Vec::new());
        }

        let mut derived = Vec::new();
        for repre in &instance.representations {
            if let Some(reason) = review_skip_reason(repre) {
                tracing::debug!(representation = %repre.name, %reason, "not a review source");
                continue;
            }
            let repre_defs = filter_by_custom_tags(&defs, &repre.custom_tags);
            if repre_defs.is_empty() {
                tracing::info!(
                    representation = %repre.name,
                    custom_tags = ?repre.custom_tags,
                    "no output definition matches custom tags"
                );
                report.skip(repre, None, "no output definition matches custom tags");
                continue;
            }
            derived.extend(self.render_representation(
                context,
                instance,
                repre,
                &repre_defs,
                report,
            )?);
        }
        Ok(derived)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(representation = %repre.name))]
    fn render_representation(
        &self,
        context: &PublishContext,
        instance: &Instance,
        repre: &Representation,
        defs: &[&OutputDefinition],
        report: &mut ReviewReport,
    ) -> ReviewResult<Vec<Representation>> {
        let input_paths = repre.files.paths_in(&repre.staging_dir);
        let defs = single_frame_filter(&input_paths, defs);
        if defs.is_empty() {
            tracing::debug!("all output definitions filtered out by single frame filter");
            report.skip(repre, None, "filtered out by single frame filter");
            return Ok(Vec::new());
        }
        let Some(first_input) = input_paths.first() else {
            tracing::warn!("representation has empty files, skipping");
            report.skip(repre, None, "representation has no files");
            return Ok(Vec::new());
        };

        let analysis = self.converter.analyze(first_input)?;
        let scratch = match analysis.decision {
            ConversionDecision::NotNeeded => None,
            ConversionDecision::Needed => {
                let scratch = ConversionScratch::create(&self.settings.temp_root())?;
                self.converter.convert(&input_paths, scratch.path())?;
                Some(scratch)
            }
            ConversionDecision::Undetermined => {
                tracing::info!("cannot determine whether input needs conversion, skipping");
                report.skip(repre, None, "conversion requirement undetermined");
                return Ok(Vec::new());
            }
        };
        let input_dir = scratch
            .as_ref()
            .map_or(repre.staging_dir.as_path(), ConversionScratch::path);

        let source = Source {
            repre,
            input_dir,
            layer_name: analysis.layer_name.as_deref(),
        };
        let mut fill_data = instance.anatomy_data.clone();
        let mut derived = Vec::new();
        for output_def in defs {
            if let Some(new_repre) =
                self.render_definition(context, instance, &source, output_def, &mut fill_data, report)?
            {
                derived.push(new_repre);
            }
        }
        Ok(derived)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(output = %output_def.name))]
    fn render_definition(
        &self,
        context: &PublishContext,
        instance: &Instance,
        source: &Source<'_>,
        output_def: &OutputDefinition,
        fill_data: &mut Map<String, Value>,
        report: &mut ReviewReport,
    ) -> ReviewResult<Option<Representation>> {
        let repre = source.repre;
        let mut new_repre = derive_representation(repre, output_def);
        tracing::debug!(tags = ?new_repre.tags, burnins = ?new_repre.burnins, "new representation");

        let ctx = RenderContext::prepare(instance, context, &repre.files, output_def)?;
        let filled = if ctx.input_is_sequence {
            Some(fill_sequence_gaps(
                &repre.files.names(),
                source.input_dir,
                ctx.frame_start,
                ctx.frame_end,
            )?)
        } else {
            None
        };

        let output_name = output_name(
            repre.output_name.as_deref(),
            &output_def.name,
            ctx.without_handles,
        );
        let source_ext = repre.normalized_ext();
        fill_data.insert("output".to_string(), Value::from(output_name.as_str()));
        fill_data.insert("ext".to_string(), Value::from(source_ext.as_str()));
        fill_data.insert("timecode".to_string(), Value::from(ctx.timecode()));

        let paths = IoPaths::resolve(
            &repre.files,
            source.input_dir,
            &repre.staging_dir,
            output_def,
            &ctx,
        )?;
        paths.create_output_dir()?;

        let (width, height) = self.probe.resolution(&paths.input_single_file)?;
        let reformatted = new_repre.has_tag(&Tag::Reformatted);
        let geometry = match rescaling_filters(width, height, &ctx, output_def, reformatted) {
            Ok(geometry) => geometry,
            Err(ReviewError::DegenerateGeometry(msg)) if source_ext == "exr" => {
                tracing::warn!(%msg, "unsupported input geometry, skipping output");
                report.skip(repre, Some(&output_def.name), msg);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let encoder = self.settings.tools.ffmpeg_command_prefix();
        let command = build_command(&CommandRequest {
            output_def,
            instance,
            ctx: &ctx,
            paths: &paths,
            fill_data,
            layer_name: source.layer_name,
            geometry_filters: &geometry.filters,
            bake_lut: new_repre.has_tag(&Tag::BakeLut),
            encoder: &encoder,
        });
        let command_line = command.command_line();
        tracing::debug!(command = %command_line, "executing encoder");
        self.runner.run(&command_line)?;
        drop(filled);

        new_repre.name = format!("{output_name}_{source_ext}");
        new_repre.ext = paths.output_ext;
        new_repre.files = paths.output_files;
        new_repre.staging_dir = paths.output_dir;
        new_repre.sequence_file = paths.sequence_file;
        new_repre.resolution_width = Some(geometry.width);
        new_repre.resolution_height = Some(geometry.height);
        new_repre.fps = Some(ctx.fps);
        new_repre.frame_start_ftrack = Some(ctx.output_frame_start);
        new_repre.frame_end_ftrack = Some(ctx.output_frame_end);
        new_repre.output_def = Some(output_def.clone());
        new_repre.ffmpeg_cmd = Some(command_line.clone());
        new_repre.output_name = if new_repre.has_tag(&Tag::CleanName) {
            None
        } else {
            Some(output_name)
        };
        new_repre.extra.remove("thumbnail");

        tracing::debug!(representation = %new_repre.name, "adding new representation");
        report.rendered.push(RenderedOutput {
            source: repre.name.clone(),
            output: output_def.name.clone(),
            representation: new_repre.name.clone(),
            command: command_line,
        });
        Ok(Some(new_repre))
    }
}

/// Source representation with the directory its files are read from.
struct Source<'a> {
    repre: &'a Representation,
    /// The conversion scratch dir when converted, else the staging dir.
    input_dir: &'a Path,
    layer_name: Option<&'a str>,
}

/// Copy of `repre` carrying the tags and burnins of `output_def`.
fn derive_representation(repre: &Representation, output_def: &OutputDefinition) -> Representation {
    let mut new_repre = repre.clone();
    new_repre.tags.remove(&Tag::Delete);
    new_repre.tags.remove(&Tag::NeedThumbnail);
    for tag in output_def.tags.iter() {
        new_repre.tags.insert(tag.clone());
    }
    for burnin in &output_def.burnins {
        if !new_repre.burnins.contains(burnin) {
            new_repre.burnins.push(burnin.clone());
        }
    }
    new_repre
}

fn output_name(existing: Option<&str>, suffix: &str, without_handles: bool) -> String {
    let mut name = match existing {
        Some(existing) if !existing.is_empty() => format!("{existing}_{suffix}"),
        _ => suffix.to_string(),
    };
    if without_handles {
        name.push_str("_noHandles");
    }
    name
}

/// Remove representations tagged `delete` that are not thumbnail sources. Returns their names.
fn prune_deleted(representations: &mut Vec<Representation>) -> Vec<String> {
    let mut removed = Vec::new();
    representations.retain(|repre| {
        let keep = !repre.has_tag(&Tag::Delete)
            || repre.has_tag(&Tag::Thumbnail)
            || repre.has_tag(&Tag::NeedThumbnail);
        if !keep {
            tracing::debug!(representation = %repre.name, "removing representation");
            removed.push(repre.name.clone());
        }
        keep
    });
    removed
}

#[cfg(test)]
#[path = "../../tests/unit/driver/extract.rs"]
mod tests;
