//! Error taxonomy for sample parsing and sample set construction
//!
//! Parse errors carry the 1-based line number of the offending line in the
//! original input (blank lines included) so a dump can be fixed by hand.

use thiserror::Error;

/// Errors raised while parsing, validating or loading samples
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("Unexpected value input on line {line}: \"{text}\"")]
    MalformedValue { line: usize, text: String },

    #[error("Unexpected reading input on line {line}: \"{text}\"")]
    MalformedCounterLine { line: usize, text: String },

    #[error("Invalid timestamp on line {line}: \"{text}\"")]
    MalformedTimestamp { line: usize, text: String },

    #[error("Duplicate reading found: \"{name}\"")]
    DuplicateReading { name: String },

    #[error("Two timestamps found within the same sample (line {line})")]
    DuplicateTimestamp { line: usize },

    #[error("Sample end found without a preceding timestamp (line {line})")]
    UnexpectedEndMarker { line: usize },

    #[error("Incomplete sample starting on line {line}: {reason}")]
    IncompleteSample { line: usize, reason: &'static str },

    #[error("Unexpected number of samples parsed. Expected {expected}, received {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("The given samples are not complete")]
    IncompleteSet,

    #[error("The given sample set is not genuine ({0})")]
    IngenuineSet(String),

    #[error("Covariance matrix is only defined for complete sample sets")]
    CovarianceUnavailable,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SampleError {
    /// Whether this error came from the line grammar rather than set policy or IO
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedValue { .. }
                | Self::MalformedCounterLine { .. }
                | Self::MalformedTimestamp { .. }
                | Self::DuplicateReading { .. }
                | Self::DuplicateTimestamp { .. }
                | Self::UnexpectedEndMarker { .. }
                | Self::IncompleteSample { .. }
                | Self::SampleCountMismatch { .. }
        )
    }
}

/// Result type for sample operations
pub type Result<T> = std::result::Result<T, SampleError>;
