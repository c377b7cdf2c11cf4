//! Errors reported by the sampling and aggregation engine.

use thiserror::Error;

/// An error produced while reading, parsing or aggregating sampled data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KpiError {
    /// A read past the end of a column or trajectory.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// The operation is not supported by the data it was invoked on.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// Text could not be parsed as a value of the given kind.
    #[error("cannot parse {text:?} as {kind}")]
    Parse { kind: &'static str, text: String },
    /// The segment ID is not known to the sampler.
    #[error("unknown monitored segment")]
    UnknownSegment,
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, KpiError>;
