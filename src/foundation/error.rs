use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    /// Invalid configuration or instance data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Known publish failure meant to be shown to the artist without a backtrace.
    #[error("known publish error: {0}")]
    KnownPublish(String),

    /// Malformed overscan/crop expression.
    #[error("invalid string for rescaling \"{input}\"")]
    OverscanParse {
        /// The rejected expression, verbatim.
        input: String,
    },

    /// Geometry that cannot be computed (division by zero, sub-pixel output).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Media probe could not read the input.
    #[error("probe error for '{}': {message}", path.display())]
    Probe {
        /// File that was probed.
        path: PathBuf,
        /// Failure detail.
        message: String,
    },

    /// External tool (encoder, converter) failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReviewError {
    /// Build a [`ReviewError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReviewError::KnownPublish`] value.
    pub fn known_publish(msg: impl Into<String>) -> Self {
        Self::KnownPublish(msg.into())
    }

    /// Build a [`ReviewError::DegenerateGeometry`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Build a [`ReviewError::Probe`] value.
    pub fn probe(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Build a [`ReviewError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReviewError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors the surrounding pipeline shows without a backtrace.
    pub fn is_known_publish(&self) -> bool {
        matches!(self, Self::KnownPublish(_))
    }
}

impl From<std::io::Error> for ReviewError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
