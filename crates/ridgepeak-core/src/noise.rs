//! Noise floor and SNR estimation
//!
//! The finest-scale coefficient row is almost pure noise away from sharp
//! features, so its upper quantile around a ridge's end point serves as the
//! local noise level. A global floor, a fraction of the whole row's
//! quantile, keeps quiet regions from inflating the SNR.

use crate::cwt::CoefficientGrid;
use crate::ridges::RidgeSummary;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quantile used for noise levels
pub const NOISE_QUANTILE: f64 = 0.95;

/// Plotting position parameter (alpha = beta) of the quantile estimator
const PLOTTING_POSITION: f64 = 3.0 / 8.0;

/// Largest scale considered when sizing the local noise window
const MAX_WINDOW_SCALE: f64 = 5.0;

/// Local window half-width, in multiples of the (capped) peak scale
const WINDOW_FACTOR: f64 = 3.0;

/// Empirical quantile with plotting positions `(alphap, betap)`.
///
/// Non-finite values are ignored. Returns NaN when nothing is left and the
/// single value when one is.
pub fn quantile(values: &[f64], p: f64, alphap: f64, betap: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = sorted.len();
    match n {
        0 => return f64::NAN,
        1 => return sorted[0],
        _ => {}
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let m = alphap + p * (1.0 - alphap - betap);
    let aleph = n as f64 * p + m;
    let k = aleph.clamp(1.0, (n - 1) as f64).floor();
    let gamma = (aleph - k).clamp(0.0, 1.0);
    let k = k as usize;
    (1.0 - gamma) * sorted[k - 1] + gamma * sorted[k]
}

/// 95th percentile with the estimator's standard plotting positions
pub fn noise_quantile(values: &[f64]) -> f64 {
    quantile(values, NOISE_QUANTILE, PLOTTING_POSITION, PLOTTING_POSITION)
}

/// A ridge summary with its signal-to-noise ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredRidge {
    /// The ridge being scored
    #[serde(flatten)]
    pub summary: RidgeSummary,
    /// Local noise level used for the ratio
    pub noise: f64,
    /// `peak_amplitude / noise`, or 0 when the noise level is not positive
    pub snr: f64,
}

/// Attach an SNR to every ridge summary.
///
/// `minimum_noise_level` scales the global floor taken from the whole
/// finest row.
pub fn estimate_snr(
    grid: &CoefficientGrid,
    summaries: &[RidgeSummary],
    minimum_noise_level: f64,
) -> Vec<ScoredRidge> {
    let finest = grid.finest();
    let n = finest.len();

    let floor = minimum_noise_level * noise_quantile(finest);
    let floor = if floor.is_nan() { 0.0 } else { floor };
    debug!(noise_floor = floor, "global noise floor");

    summaries
        .iter()
        .map(|summary| {
            let half = (WINDOW_FACTOR * summary.peak_scale.min(MAX_WINDOW_SCALE)) as usize;
            let center = summary.last_sample_index;
            let lo = center.saturating_sub(half);
            let hi = (center + half).min(n - 1);

            let local = noise_quantile(&finest[lo..=hi]);
            let local = if local.is_nan() { 0.0 } else { local };
            let noise = floor.max(local);
            let snr = if noise > 0.0 {
                summary.peak_amplitude / noise
            } else {
                0.0
            };

            ScoredRidge {
                summary: *summary,
                noise,
                snr,
            }
        })
        .collect()
}

/// Zero the SNR of ridges ending on the outermost sample a `window`-wide
/// local maximum can occupy.
///
/// The zero padding of the transform turns any residual slope into a step
/// at the signal ends. Its ridge runs down to the boundary and, since the
/// finest row there is tiny for smooth data, scores an arbitrarily high
/// SNR regardless of amplitude.
pub fn suppress_edge_ridges(scored: &mut [ScoredRidge], samples: usize, window: usize) {
    let half = window / 2;
    let last = samples.saturating_sub(1 + half);
    let mut suppressed = 0;
    for ridge in scored.iter_mut() {
        let end = ridge.summary.last_sample_index;
        if end <= half || end >= last {
            ridge.snr = 0.0;
            suppressed += 1;
        }
    }
    if suppressed > 0 {
        debug!(suppressed, "ridges ending on the signal boundary");
    }
}
