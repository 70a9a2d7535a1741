//! Threshold filtering and double-peak recovery

use super::{Peak, PeakParams};
use crate::noise::ScoredRidge;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraction of the x span used as the default maximum width
const DEFAULT_MAX_WIDTH_FRACTION: f64 = 0.3;

/// Outcome of the filter stages for one ridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RidgeStatus {
    /// Passed every filter
    Accepted,
    /// Too short, but kept by the double-peak pass
    Recovered,
    /// SNR below threshold
    RejectedSnr,
    /// Ridge shorter than the length threshold
    RejectedLength,
    /// Width outside the allowed range
    RejectedWidth,
}

impl RidgeStatus {
    /// True for ridges that produced a peak
    pub fn is_peak(&self) -> bool {
        matches!(self, RidgeStatus::Accepted | RidgeStatus::Recovered)
    }

    /// Short lowercase name for tables
    pub fn as_str(&self) -> &'static str {
        match self {
            RidgeStatus::Accepted => "accepted",
            RidgeStatus::Recovered => "recovered",
            RidgeStatus::RejectedSnr => "snr",
            RidgeStatus::RejectedLength => "length",
            RidgeStatus::RejectedWidth => "width",
        }
    }
}

/// Peaks together with what every filter stage dropped.
///
/// Rejection lists hold indices into the scored ridge slice, and each ridge
/// appears in at most one of them: the first stage it failed. Stages run in
/// order SNR, length, width.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakAnalysis {
    /// Accepted and recovered peaks, in output order
    pub peaks: Vec<Peak>,
    /// Ridges whose SNR was below threshold
    pub rejected_by_snr: Vec<usize>,
    /// Ridges shorter than the length threshold
    pub rejected_by_length: Vec<usize>,
    /// Ridges whose peak width was out of range
    pub rejected_by_width: Vec<usize>,
    /// Per-ridge outcome, parallel to the ridge slice
    pub statuses: Vec<RidgeStatus>,
    /// Minimum width actually applied
    pub min_width: f64,
    /// Maximum width actually applied
    pub max_width: f64,
}

/// Width bounds for `params`, filling in the data-derived defaults
pub fn width_bounds(signal: &Signal, params: &PeakParams) -> (f64, f64) {
    let min = params
        .min_width
        .unwrap_or_else(|| 2.0 * signal.median_spacing());
    let max = params
        .max_width
        .unwrap_or_else(|| DEFAULT_MAX_WIDTH_FRACTION * signal.span());
    (min, max)
}

/// Run every filter stage and record why ridges were dropped
pub fn analyze(signal: &Signal, ridges: &[ScoredRidge], params: &PeakParams) -> PeakAnalysis {
    let x = signal.x();
    let (min_width, max_width) = width_bounds(signal, params);
    let in_bounds = |p: &Peak| min_width <= p.width && p.width <= max_width;

    let mut statuses = vec![RidgeStatus::Accepted; ridges.len()];
    let mut rejected_by_snr = Vec::new();
    let mut rejected_by_length = Vec::new();
    let mut rejected_by_width = Vec::new();
    let mut accepted: Vec<Peak> = Vec::new();
    let mut shoulders: Vec<usize> = Vec::new();

    for (i, ridge) in ridges.iter().enumerate() {
        // NaN never passes
        if !(ridge.snr >= params.snr) {
            statuses[i] = RidgeStatus::RejectedSnr;
            rejected_by_snr.push(i);
            continue;
        }

        let length = ridge.summary.length;
        if length < params.ridge_length {
            statuses[i] = RidgeStatus::RejectedLength;
            rejected_by_length.push(i);
            if params.double_peak_detection && length >= params.double_peak_reduced_ridge_length {
                shoulders.push(i);
            }
            continue;
        }

        let peak = Peak::from_ridge(ridge, x);
        if in_bounds(&peak) {
            accepted.push(peak);
        } else {
            statuses[i] = RidgeStatus::RejectedWidth;
            rejected_by_width.push(i);
        }
    }

    let mut peaks = accepted.clone();
    for i in shoulders {
        let side = Peak::from_ridge(&ridges[i], x);
        if in_bounds(&side) && accepted.iter().any(|p| p.covers(side.position)) {
            statuses[i] = RidgeStatus::Recovered;
            peaks.push(side);
        }
    }
    peaks.sort_by(Peak::output_order);

    debug!(
        peaks = peaks.len(),
        recovered = peaks.len() - accepted.len(),
        snr = rejected_by_snr.len(),
        length = rejected_by_length.len(),
        width = rejected_by_width.len(),
        "peak extraction"
    );

    PeakAnalysis {
        peaks,
        rejected_by_snr,
        rejected_by_length,
        rejected_by_width,
        statuses,
        min_width,
        max_width,
    }
}

/// Peaks passing `params`, sorted by position
pub fn extract_peaks(signal: &Signal, ridges: &[ScoredRidge], params: &PeakParams) -> Vec<Peak> {
    analyze(signal, ridges, params).peaks
}
