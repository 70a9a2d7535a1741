//! # ridgepeak synthetic data
//!
//! Spectra with known peak positions for exercising and demonstrating the
//! ridgepeak detector.
//!
//! - [`spectrum`]: peak components, backgrounds and the generator
//! - [`noise`]: seeded additive noise models
//!
//! Every configuration type is serde-serializable, so test scenarios can be
//! kept as JSON files and replayed exactly when a seed is set.

pub mod noise;
pub mod spectrum;

use thiserror::Error;

pub use noise::{NoiseConfig, NoiseModel, NoiseSource};
pub use spectrum::{
    Background, PeakComponent, PeakShape, SpectrumConfig, SpectrumGenerator, SyntheticSpectrum,
};

/// Errors from invalid generator settings
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Zero samples requested
    #[error("spectrum must have at least one point")]
    EmptyGrid,

    /// x range is empty or reversed
    #[error("invalid x range: {min} to {max}")]
    InvalidRange { min: f64, max: f64 },

    /// Noise sigma is negative or not finite
    #[error("invalid noise sigma: {0}")]
    InvalidNoise(f64),
}
