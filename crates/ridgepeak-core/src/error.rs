//! Error types for peak detection

use thiserror::Error;

/// Errors raised while preparing a detector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PeakFinderError {
    /// No samples were supplied
    #[error("input signal is empty")]
    EmptySignal,

    /// Abscissa and ordinate arrays disagree in length
    #[error("x and y lengths differ: {x} vs {y}")]
    LengthMismatch { x: usize, y: usize },

    /// A detector setting is outside its valid range
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PeakFinderError>;
