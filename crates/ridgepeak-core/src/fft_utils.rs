//! FFT Utilities
//!
//! Thin wrapper around a planned forward/inverse FFT pair. Plans are shared
//! through `Arc`, so one processor can serve several threads at once.

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned forward and inverse transforms of a fixed size
#[derive(Clone)]
pub struct FftProcessor {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl FftProcessor {
    /// Plan transforms for `size` points
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        Self {
            size,
            forward,
            inverse,
        }
    }

    /// Transform size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unnormalized forward FFT in place
    pub fn fft_inplace(&self, buffer: &mut [Complex64]) {
        self.forward.process(buffer);
    }

    /// Inverse FFT in place, scaled by 1/N
    pub fn ifft_inplace(&self, buffer: &mut [Complex64]) {
        self.inverse.process(buffer);
        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }

    /// Forward FFT of a real sequence
    pub fn fft_real(&self, samples: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft_inplace(&mut buffer);
        buffer
    }

    /// Angular frequency (radians per sample) of each bin in natural FFT order
    ///
    /// Bins past the midpoint wrap to negative frequencies.
    pub fn angular_frequencies(&self) -> Vec<f64> {
        let n = self.size;
        let half = n / 2;
        (0..n)
            .map(|k| {
                let k = if k < half { k as f64 } else { k as f64 - n as f64 };
                2.0 * std::f64::consts::PI * k / n as f64
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_restores_samples() {
        let fft = FftProcessor::new(12);
        let samples: Vec<f64> = (0..12).map(|i| (i as f64 * 0.7).sin()).collect();
        let mut spectrum = fft.fft_real(&samples);
        fft.ifft_inplace(&mut spectrum);
        for (a, b) in samples.iter().zip(spectrum.iter()) {
            assert!((a - b.re).abs() < 1e-12, "expected {}, got {}", a, b.re);
            assert!(b.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_dc_bin() {
        let fft = FftProcessor::new(8);
        let spectrum = fft.fft_real(&[1.0; 8]);
        assert!((spectrum[0].re - 8.0).abs() < 1e-12);
        for c in &spectrum[1..] {
            assert!(c.norm() < 1e-12);
        }
    }

    #[test]
    fn test_angular_frequencies_wrap() {
        let fft = FftProcessor::new(8);
        let w = fft.angular_frequencies();
        assert_eq!(w[0], 0.0);
        assert!((w[1] - std::f64::consts::PI / 4.0).abs() < 1e-12);
        assert!(w[4] < 0.0, "upper half should be negative");
        assert!((w[7] + std::f64::consts::PI / 4.0).abs() < 1e-12);
    }
}
