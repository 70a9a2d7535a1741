//! Mexican-hat CWT by FFT convolution

use super::ScaleSet;
use crate::fft_utils::FftProcessor;
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Normalization of the Mexican-hat transfer function
const MEXICAN_HAT_NORM: f64 = 1.1529702;

/// Fourier transform of the Mexican-hat wavelet
pub fn mexican_hat(omega: f64) -> f64 {
    let w2 = omega * omega;
    w2 * (-w2 / 2.0).exp() / MEXICAN_HAT_NORM
}

/// Wavelet coefficients, one row per scale, row 0 the finest
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientGrid {
    rows: usize,
    samples: usize,
    data: Vec<f64>,
}

impl CoefficientGrid {
    fn from_rows(rows: Vec<Vec<f64>>, samples: usize) -> Self {
        let count = rows.len();
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        debug_assert_eq!(data.len(), count * samples);
        Self {
            rows: count,
            samples,
            data,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_test_rows(rows: Vec<Vec<f64>>) -> Self {
        let samples = rows.first().map_or(0, Vec::len);
        Self::from_rows(rows, samples)
    }

    /// Number of scales
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of samples per row
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Coefficients at one scale
    pub fn row(&self, scale_index: usize) -> &[f64] {
        let start = scale_index * self.samples;
        &self.data[start..start + self.samples]
    }

    /// Single coefficient
    pub fn value(&self, scale_index: usize, sample_index: usize) -> f64 {
        self.data[scale_index * self.samples + sample_index]
    }

    /// Finest-scale row, used as the noise reference
    pub fn finest(&self) -> &[f64] {
        self.row(0)
    }
}

/// Value subtracted before transforming.
///
/// An exactly constant signal is referenced to its own level so it
/// transforms to exact zeros; anything else is referenced to its mean.
fn baseline(samples: &[f64]) -> f64 {
    let first = samples[0];
    if samples.iter().all(|&v| v == first) {
        first
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Continuous wavelet transform of `samples` at every scale in `scales`.
///
/// The samples are zero-padded to twice their length, centered, and
/// convolved in the frequency domain. `samples` must be non-empty.
///
/// Only an exactly constant input transforms to zeros. Any slope left after
/// removing the mean, however small, becomes a step at the padded
/// boundary and produces a ridge ending next to the edge; the finder drops
/// those with [`crate::noise::suppress_edge_ridges`].
pub fn transform(samples: &[f64], scales: &ScaleSet) -> CoefficientGrid {
    let n = samples.len();
    let size = 2 * n;
    let offset = n / 2;
    let level = baseline(samples);

    let mut padded = vec![0.0; size];
    for (dst, &v) in padded[offset..offset + n].iter_mut().zip(samples) {
        *dst = v - level;
    }

    let fft = FftProcessor::new(size);
    let spectrum = fft.fft_real(&padded);
    let omega = fft.angular_frequencies();

    let row_at = |scale: f64| -> Vec<f64> {
        let norm = (2.0 * PI * scale).sqrt();
        let mut buffer: Vec<Complex64> = spectrum
            .iter()
            .zip(&omega)
            .map(|(&c, &w)| c * (mexican_hat(w * scale) * norm))
            .collect();
        fft.ifft_inplace(&mut buffer);
        buffer[offset..offset + n].iter().map(|c| c.re).collect()
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<f64>> = scales.as_slice().par_iter().map(|&s| row_at(s)).collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<f64>> = scales.as_slice().iter().map(|&s| row_at(s)).collect();

    debug!(scales = scales.len(), samples = n, "computed wavelet coefficients");
    CoefficientGrid::from_rows(rows, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mexican_hat_shape() {
        assert_eq!(mexican_hat(0.0), 0.0);
        // maximum of w^2 exp(-w^2/2) is at w = sqrt(2)
        let peak = mexican_hat(2f64.sqrt());
        assert!(peak > mexican_hat(1.0));
        assert!(peak > mexican_hat(2.0));
        assert!((mexican_hat(-1.3) - mexican_hat(1.3)).abs() < 1e-15);
    }

    #[test]
    fn test_grid_dimensions() {
        let samples: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
        let scales = ScaleSet::log(samples.len(), 3, 1.0);
        let grid = transform(&samples, &scales);
        assert_eq!(grid.rows(), scales.len());
        assert_eq!(grid.samples(), 64);
        assert_eq!(grid.row(2).len(), 64);
        assert_eq!(grid.value(2, 5), grid.row(2)[5]);
    }

    #[test]
    fn test_flat_signal_is_zero() {
        let samples = vec![3.25; 100];
        let scales = ScaleSet::log(samples.len(), 5, 1.0);
        let grid = transform(&samples, &scales);
        for r in 0..grid.rows() {
            assert!(grid.row(r).iter().all(|&v| v == 0.0), "row {} not zero", r);
        }
    }

    #[test]
    fn test_bump_peaks_at_center() {
        let n = 401;
        let samples: Vec<f64> = (0..n)
            .map(|i| {
                let t = (i as f64 - 200.0) / 6.0;
                (-0.5 * t * t).exp()
            })
            .collect();
        let scales = ScaleSet::log(n, 4, 1.0);
        // a scale close to the bump width
        let r = (0..scales.len())
            .min_by(|&a, &b| {
                (scales.get(a) - 6.0)
                    .abs()
                    .total_cmp(&(scales.get(b) - 6.0).abs())
            })
            .unwrap();
        let grid = transform(&samples, &scales);
        let row = grid.row(r);
        let argmax = (0..n).max_by(|&a, &b| row[a].total_cmp(&row[b])).unwrap();
        assert!(
            (argmax as i64 - 200).abs() <= 1,
            "maximum at {}, expected 200",
            argmax
        );
        assert!(row[200] > 0.0);
    }

    #[test]
    fn test_single_sample() {
        let scales = ScaleSet::log(1, 5, 1.0);
        let grid = transform(&[4.0], &scales);
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.row(0), &[0.0]);
    }
}
