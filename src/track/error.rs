//! Track error types
//!
//! Errors raised by the alignment core. "No match close enough" is not an
//! error and never appears here.

use thiserror::Error;

/// Errors that can occur when building or querying a track index
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A query was attempted against an index with zero samples
    #[error("Track index is empty")]
    EmptyIndex,

    /// A timestamped raw record could not be turned into a sample
    #[error("Invalid track record at position {position}: {reason}")]
    InvalidInput { position: usize, reason: String },

    /// Applying the offset left the representable time range
    #[error("Time out of range: {0}")]
    TimeOutOfRange(String),
}

/// Result type alias for track operations
pub type TrackResult<T> = Result<T, TrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackError::EmptyIndex;
        assert_eq!(err.to_string(), "Track index is empty");

        let err = TrackError::InvalidInput {
            position: 3,
            reason: "missing longitude".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid track record at position 3: missing longitude"
        );
    }
}
