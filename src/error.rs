//! Unified error handling for the sailtrack library.
//!
//! Only configuration problems and bad segment ranges are errors. Malformed
//! fixes and degenerate tracks degrade to warnings or empty results instead.

use thiserror::Error;

/// Unified error type for sailtrack operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SailTrackError {
    /// A configuration value is out of its accepted range
    #[error("Configuration error: {field} {message}")]
    InvalidConfig { field: String, message: String },

    /// Requested segment range starts after it ends
    #[error("Invalid segment range: start {start} is after end {end}")]
    InvalidSegmentRange { start: usize, end: usize },

    /// Requested segment range reaches past the last segment
    #[error("Segment {index} is out of range (max: {max})")]
    SegmentRangeOutOfBounds { index: usize, max: usize },

    /// Analysis record could not be serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl SailTrackError {
    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        SailTrackError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SailTrackError {
    fn from(err: serde_json::Error) -> Self {
        SailTrackError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for sailtrack operations.
pub type Result<T> = std::result::Result<T, SailTrackError>;

/// Extension trait for converting Option to SailTrackError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an out-of-range segment error.
    fn ok_or_segment_out_of_range(self, index: usize, segment_count: usize) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_segment_out_of_range(self, index: usize, segment_count: usize) -> Result<T> {
        self.ok_or_else(|| SailTrackError::SegmentRangeOutOfBounds {
            index,
            max: segment_count.saturating_sub(1),
        })
    }
}
