//! Peak Extraction
//!
//! Turns scored ridges into peak descriptors under a set of acceptance
//! thresholds. Extraction is cheap and pure, so the same prepared ridge set
//! can be queried repeatedly with different [`PeakParams`].
//!
//! ## Double peaks
//!
//! A narrow shoulder sitting on the flank of a strong peak often produces a
//! ridge that is too short to pass the length threshold. With double-peak
//! detection enabled, ridges whose length reaches a reduced threshold are
//! reconsidered and kept when they fall inside the reach of an accepted
//! peak.

pub mod extract;

pub use extract::{analyze, extract_peaks, PeakAnalysis, RidgeStatus};

use crate::noise::ScoredRidge;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Width conversion from sample extent to peak width
const WIDTH_DIVISOR: f64 = 1.6;

/// Intensity calibration for the Mexican-hat response
const INTENSITY_FACTOR: f64 = 1.41;

/// A detected peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Abscissa of the peak center
    pub position: f64,
    /// Estimated width in x units
    pub width: f64,
    /// Estimated height above the local baseline
    pub intensity: f64,
    /// Length of the supporting ridge
    pub ridge_length: usize,
    /// Signal-to-noise ratio of the supporting ridge
    pub snr: f64,
}

impl Peak {
    /// Build a peak from a scored ridge over the sorted abscissa `x`
    pub fn from_ridge(ridge: &ScoredRidge, x: &[f64]) -> Self {
        let n = x.len();
        let center = ridge.summary.last_sample_index;
        let scale = ridge.summary.peak_scale;
        let half = scale / 2.0;
        let last = n as i64 - 1;

        let mut lo = ((center as f64 - half).trunc() as i64).clamp(0, last) as usize;
        let mut hi = ((center as f64 + half).trunc() as i64).clamp(0, last) as usize;
        if lo == center && center > 0 {
            lo -= 1;
        }
        if hi == center && center + 1 < n {
            hi += 1;
        }

        Self {
            position: x[center],
            width: (x[hi] - x[lo]).abs() / WIDTH_DIVISOR,
            intensity: ridge.summary.peak_amplitude * INTENSITY_FACTOR / scale.sqrt(),
            ridge_length: ridge.summary.length,
            snr: ridge.snr,
        }
    }

    /// True if `position` lies within `snr / 2` widths of this peak
    pub fn covers(&self, position: f64) -> bool {
        let reach = self.snr / 2.0 * self.width;
        self.position - reach <= position && position <= self.position + reach
    }

    /// Output order: position, then width, intensity, ridge length, snr
    pub fn output_order(a: &Peak, b: &Peak) -> Ordering {
        a.position
            .total_cmp(&b.position)
            .then_with(|| a.width.total_cmp(&b.width))
            .then_with(|| a.intensity.total_cmp(&b.intensity))
            .then_with(|| a.ridge_length.cmp(&b.ridge_length))
            .then_with(|| a.snr.total_cmp(&b.snr))
    }
}

/// Thresholds for one extraction call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Minimum SNR
    pub snr: f64,
    /// Minimum width; twice the median sample spacing when unset
    pub min_width: Option<f64>,
    /// Maximum width; 30% of the x span when unset
    pub max_width: Option<f64>,
    /// Minimum ridge length
    pub ridge_length: usize,
    /// Enable the double-peak pass
    pub double_peak_detection: bool,
    /// Ridge length accepted in the double-peak pass
    pub double_peak_reduced_ridge_length: usize,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            snr: 2.5,
            min_width: None,
            max_width: None,
            ridge_length: 15,
            double_peak_detection: false,
            double_peak_reduced_ridge_length: 3,
        }
    }
}

impl PeakParams {
    /// Default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SNR threshold
    pub fn with_snr(mut self, snr: f64) -> Self {
        self.snr = snr;
        self
    }

    /// Set the minimum width
    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Set the maximum width
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Set the ridge length threshold
    pub fn with_ridge_length(mut self, ridge_length: usize) -> Self {
        self.ridge_length = ridge_length;
        self
    }

    /// Enable double-peak recovery with the given reduced ridge length
    pub fn with_double_peak_detection(mut self, reduced_ridge_length: usize) -> Self {
        self.double_peak_detection = true;
        self.double_peak_reduced_ridge_length = reduced_ridge_length;
        self
    }
}
