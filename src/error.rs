use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the engine boundary.
///
/// Boundary problems (missing files, unparseable cells, bad sort codes)
/// abort the whole computation. A species that is simply absent from the
/// curated reference is *not* an error; it is a valid data state recorded
/// on the scored row itself.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An input file does not exist or could not be opened.
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The input table violates its shape contract, e.g. a non-numeric
    /// value in a read-count column. No partial scoring is attempted.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A caller-supplied argument is invalid: unknown sort characters,
    /// `I` combined with other sort keys, or an unparseable weight file.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The weight set shares no property with the curated columns, so
    /// every score would silently be zero. Partial overlaps are not an
    /// error; the unmatched properties are dropped and reported instead.
    #[error("weight configuration matches no curated column: {0}")]
    ConfigurationMismatch(String),
}

impl EngineError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        EngineError::MalformedInput(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidArgument(msg.into())
    }
}
