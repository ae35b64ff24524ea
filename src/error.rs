use thiserror::Error;

/// Result type for k-means operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running k-means
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cluster count, dimension, iteration cap, worker count or empty input.
    /// Always reported before the first iteration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A point, centroid set or label buffer whose length disagrees with the dataset
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed dataset text
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}
