//! Wavelet scale sets

use crate::config::{DetectorConfig, ScaleMode};

/// Strictly increasing wavelet scales, finest first
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSet {
    scales: Vec<f64>,
}

impl ScaleSet {
    /// Geometric scales, `notes` per octave.
    ///
    /// The count is `floor(notes * log2(n / largest_scale))`, at least one,
    /// and scale `j` is `2^(j / notes)`.
    pub fn log(n: usize, notes: usize, largest_scale: f64) -> Self {
        let notes = notes.max(1);
        let octaves = (n as f64 / largest_scale).log2();
        let count = (notes as f64 * octaves).floor();
        let count = if count.is_finite() && count >= 1.0 {
            count as usize
        } else {
            1
        };

        let scales = (0..count)
            .map(|j| 2f64.powf(j as f64 / notes as f64))
            .collect();
        Self { scales }
    }

    /// Integer scales 2, 3, ... strictly below `n / largest_scale / 2`,
    /// or just `[2]` when that range is empty.
    pub fn linear(n: usize, largest_scale: f64) -> Self {
        let upper = n as f64 / largest_scale / 2.0;
        let mut scales: Vec<f64> = (2..)
            .map(|s| s as f64)
            .take_while(|&s| s < upper)
            .collect();
        if scales.is_empty() {
            scales.push(2.0);
        }
        Self { scales }
    }

    #[cfg(test)]
    pub(crate) fn from_values(scales: Vec<f64>) -> Self {
        Self { scales }
    }

    /// Scales for an `n`-sample signal under `config`
    pub fn for_config(n: usize, config: &DetectorConfig) -> Self {
        match config.scale_mode {
            ScaleMode::Log => Self::log(n, config.resolution, config.largest_scale),
            ScaleMode::Linear => Self::linear(n, config.largest_scale),
        }
    }

    /// Number of scales
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Never true
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Scale at `index`
    pub fn get(&self, index: usize) -> f64 {
        self.scales[index]
    }

    /// All scales, finest first
    pub fn as_slice(&self) -> &[f64] {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_scales() {
        let scales = ScaleSet::log(1024, 4, 1.0);
        // log2(1024) = 10 octaves
        assert_eq!(scales.len(), 40);
        assert_eq!(scales.get(0), 1.0);
        assert!((scales.get(4) - 2.0).abs() < 1e-12);
        assert!((scales.get(39) - 2f64.powf(39.0 / 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_log_scales_strictly_increasing() {
        let scales = ScaleSet::log(5000, 5, 1.0);
        assert_eq!(scales.len(), 61);
        for w in scales.as_slice().windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_log_scales_never_empty() {
        assert_eq!(ScaleSet::log(1, 5, 1.0).len(), 1);
        assert_eq!(ScaleSet::log(10, 5, 100.0).len(), 1);
        // zero notes behaves like one
        assert_eq!(ScaleSet::log(16, 0, 1.0).len(), 4);
    }

    #[test]
    fn test_linear_scales() {
        let scales = ScaleSet::linear(20, 1.0);
        assert_eq!(scales.as_slice(), &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(ScaleSet::linear(3, 1.0).as_slice(), &[2.0]);
    }

    #[test]
    fn test_for_config() {
        let config = DetectorConfig::default().with_scale_mode(ScaleMode::Linear);
        assert_eq!(ScaleSet::for_config(12, &config).as_slice(), &[2.0, 3.0, 4.0, 5.0]);
        let config = DetectorConfig::with_resolution(2);
        assert_eq!(ScaleSet::for_config(8, &config).len(), 6);
    }
}
