use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::model::OutputDefinition;
use crate::config::tags::Tag;
use crate::foundation::core::{normalize_ext, path_ext};
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::publish::model::RepresentationFiles;
use crate::sequence::collection::FrameCollection;
use crate::timing::context::RenderContext;

/// Extensions written as image files rather than video containers.
pub const OUTPUT_IMAGE_EXTENSIONS: &[&str] =
    &["exr", "jpg", "jpeg", "png", "dpx", "tga", "tiff", "tif"];

/// Resolved input and output locations for one output definition.
#[derive(Clone, Debug, PartialEq)]
pub struct IoPaths {
    /// Path handed to the encoder: a file, or a `%0Nd` pattern for sequences.
    pub input_path: PathBuf,
    /// One real input file, used for probing.
    pub input_single_file: PathBuf,
    /// Output file, or a `%0Nd` pattern for sequence outputs.
    pub output_path: PathBuf,
    /// Directory holding the output files, recorded as the new staging dir.
    pub output_dir: PathBuf,
    /// Output extension without the dot, lower-cased.
    pub output_ext: String,
    /// Output extension is an image format.
    pub output_ext_is_image: bool,
    /// Output is a numbered image sequence.
    pub output_is_sequence: bool,
    /// Output file names recorded on the derived representation.
    pub output_files: RepresentationFiles,
    /// Printf-style file pattern of a sequence output.
    pub sequence_file: Option<String>,
}

impl IoPaths {
    /// Resolve paths for `files` read from `input_dir`, writing next to `dst_staging_dir`.
    pub fn resolve(
        files: &RepresentationFiles,
        input_dir: &Path,
        dst_staging_dir: &Path,
        output_def: &OutputDefinition,
        ctx: &RenderContext,
    ) -> ReviewResult<Self> {
        let first = files
            .first()
            .ok_or_else(|| ReviewError::validation("representation has no files"))?;

        let (input_path, filename) = if ctx.input_is_sequence {
            let (collections, _) = FrameCollection::assemble(&files.names());
            let collection = collections.first().ok_or_else(|| {
                ReviewError::validation(format!(
                    "sequence starting with '{first}' has no numbered frames"
                ))
            })?;
            let head = collection.head.strip_suffix('.').unwrap_or(&collection.head);
            (input_dir.join(collection.pattern()), head.to_string())
        } else {
            let stem = Path::new(first)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| first.to_string());
            (input_dir.join(first), stem)
        };
        let input_single_file = input_dir.join(first);

        let output_ext = match &output_def.ext {
            Some(ext) if !ext.trim().is_empty() => normalize_ext(ext),
            _ => path_ext(&input_path),
        };
        let output_ext_is_image = OUTPUT_IMAGE_EXTENSIONS.contains(&output_ext.as_str());
        let output_is_sequence = output_ext_is_image && output_def.has_tag(&Tag::Sequence);

        let suffix = &output_def.name;
        let (output_path, output_files, sequence_file) = if output_is_sequence {
            let filename_base = format!("{filename}_{suffix}");
            let padding = ctx.output_frame_end.to_string().len();
            let pattern = format!("{filename_base}.%0{padding}d.{output_ext}");
            let names = (ctx.output_frame_start..=ctx.output_frame_end)
                .map(|frame| format!("{filename_base}.{frame:0padding$}.{output_ext}"))
                .collect();
            (
                dst_staging_dir.join(&filename_base).join(&pattern),
                RepresentationFiles::Sequence(names),
                Some(pattern),
            )
        } else {
            let name = format!("{filename}_{suffix}.{output_ext}");
            (
                dst_staging_dir.join(&name),
                RepresentationFiles::Single(name),
                None,
            )
        };
        let output_dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dst_staging_dir.to_path_buf());

        tracing::debug!(
            input = %input_path.display(),
            output = %output_path.display(),
            "resolved review paths"
        );
        Ok(Self {
            input_path,
            input_single_file,
            output_path,
            output_dir,
            output_ext,
            output_ext_is_image,
            output_is_sequence,
            output_files,
            sequence_file,
        })
    }

    /// Output is a lone image file.
    pub fn single_image_output(&self) -> bool {
        self.output_ext_is_image && !self.output_is_sequence
    }

    /// Create the output directory if missing.
    pub fn create_output_dir(&self) -> ReviewResult<()> {
        if !self.output_dir.exists() {
            tracing::debug!(dir = %self.output_dir.display(), "creating output directory");
        }
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "failed to create output directory '{}'",
                self.output_dir.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/paths.rs"]
mod tests;
