use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::ReviewResult;

/// Temporary directory holding converted inputs of one representation.
///
/// Removed with its contents when dropped, whether rendering succeeded or not.
#[derive(Debug)]
pub struct ConversionScratch {
    dir: tempfile::TempDir,
}

impl ConversionScratch {
    /// Create a fresh directory under `root`, creating `root` when missing.
    pub fn create(root: &Path) -> ReviewResult<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create temp root '{}'", root.display()))?;
        let dir = tempfile::Builder::new()
            .prefix("review_convert_")
            .tempdir_in(root)
            .with_context(|| format!("failed to create scratch dir in '{}'", root.display()))?;
        tracing::debug!(dir = %dir.path().display(), "created conversion scratch");
        Ok(Self { dir })
    }

    /// The scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/scratch.rs"]
mod tests;
