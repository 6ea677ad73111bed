use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReviewError, ReviewResult};
use crate::sequence::collection::FrameCollection;

/// Frames created by [`fill_sequence_gaps`]. The files are removed when the guard drops.
#[derive(Debug, Default)]
#[must_use = "filled frames are deleted as soon as the guard is dropped"]
pub struct FilledFrames {
    paths: Vec<PathBuf>,
}

impl FilledFrames {
    /// Created files.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Whether nothing was created.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of created files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl Drop for FilledFrames {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed filled frame"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to remove filled frame")
                }
            }
        }
    }
}

/// Fill missing frames of a numbered sequence in `[start, end]` by copying the previous
/// existing frame.
///
/// `files` are file names inside `staging_dir` and must form exactly one collection. A hole
/// before the first existing frame is filled from the first existing frame. Files already on
/// disk at a hole path are left untouched and are not part of the result.
#[tracing::instrument(level = "debug", skip(files), fields(files = files.len()))]
pub fn fill_sequence_gaps<S: AsRef<str>>(
    files: &[S],
    staging_dir: &Path,
    start: i64,
    end: i64,
) -> ReviewResult<FilledFrames> {
    let (collections, _) = FrameCollection::assemble(files);
    let collection = match collections.as_slice() {
        [one] => one,
        [] => {
            return Err(ReviewError::known_publish(format!(
                "no frame collection found in {} file(s)",
                files.len()
            )));
        }
        _ => return Err(ReviewError::known_publish("multiple collections found")),
    };

    let mut filled = FilledFrames::default();
    let mut previous = collection.first_frame();

    for frame in start..=end {
        if collection.contains(frame) {
            previous = Some(frame);
            continue;
        }
        let hole = staging_dir.join(collection.file_name(frame));
        if hole.exists() {
            tracing::debug!(path = %hole.display(), "hole already on disk, leaving it");
            continue;
        }
        let Some(source_frame) = previous else {
            continue;
        };
        let source = staging_dir.join(collection.file_name(source_frame));
        if !source.is_file() {
            return Err(ReviewError::known_publish(format!(
                "missing previously detected file: {}",
                source.display()
            )));
        }
        std::fs::copy(&source, &hole).with_context(|| {
            format!(
                "failed to copy '{}' to '{}'",
                source.display(),
                hole.display()
            )
        })?;
        tracing::debug!(from = %source.display(), to = %hole.display(), "filled missing frame");
        filled.paths.push(hole);
    }

    Ok(filled)
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/gaps.rs"]
mod tests;
