//! Prepared Peak Detector
//!
//! [`PeakFinder`] runs the expensive part of the pipeline once: sorting,
//! the wavelet transform, ridge tracing and SNR estimation. Queries with
//! different thresholds then only filter the cached ridge set.
//!
//! ```rust
//! use ridgepeak_core::{PeakFinder, PeakParams};
//!
//! let x: Vec<f64> = (0..400).map(|i| i as f64 * 0.25).collect();
//! let y: Vec<f64> = x
//!     .iter()
//!     .map(|&v| (-0.5 * ((v - 50.0) / 2.0_f64).powi(2)).exp())
//!     .collect();
//!
//! let finder = PeakFinder::new(&x, &y, 5).unwrap();
//! let peaks = finder.get_peaks(&PeakParams::default());
//! println!("{}", finder.format_text(&peaks));
//! ```

use crate::config::DetectorConfig;
use crate::cwt::{transform, CoefficientGrid, ScaleSet};
use crate::error::Result;
use crate::noise::{estimate_snr, suppress_edge_ridges, ScoredRidge};
use crate::peaks::{self, Peak, PeakAnalysis, PeakParams};
use crate::ridges::{summarize_all, trace_ridges, RidgeLine};
use crate::signal::Signal;
use tracing::debug;

/// Search half-width for the background level, in peak widths
const BACKGROUND_REACH: f64 = 2.0;

/// A signal prepared for repeated peak queries
#[derive(Debug, Clone)]
pub struct PeakFinder {
    config: DetectorConfig,
    signal: Signal,
    scales: ScaleSet,
    grid: CoefficientGrid,
    ridges: Vec<RidgeLine>,
    scored: Vec<ScoredRidge>,
}

impl PeakFinder {
    /// Prepare `x`, `y` with `resolution` scales per octave and otherwise
    /// default settings. The pairs need not be sorted.
    pub fn new(x: &[f64], y: &[f64], resolution: usize) -> Result<Self> {
        Self::with_config(x, y, DetectorConfig::with_resolution(resolution))
    }

    /// Prepare `x`, `y` with explicit settings
    pub fn with_config(x: &[f64], y: &[f64], config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let config = config.normalized();
        let signal = Signal::new(x, y)?;

        let scales = ScaleSet::for_config(signal.len(), &config);
        debug!(
            samples = signal.len(),
            scales = scales.len(),
            mode = ?config.scale_mode,
            "preparing peak finder"
        );

        let grid = transform(signal.y(), &scales);
        let ridges = trace_ridges(&grid, &scales, config.max_gap, config.window);
        let summaries = summarize_all(&ridges, &grid, &scales);
        let mut scored = estimate_snr(&grid, &summaries, config.minimum_noise_level);
        suppress_edge_ridges(&mut scored, signal.len(), config.window);

        Ok(Self {
            config,
            signal,
            scales,
            grid,
            ridges,
            scored,
        })
    }

    /// Peaks passing `params`, sorted by position
    pub fn get_peaks(&self, params: &PeakParams) -> Vec<Peak> {
        peaks::extract_peaks(&self.signal, &self.scored, params)
    }

    /// Peaks plus the ridges each filter stage rejected
    pub fn analyze(&self, params: &PeakParams) -> PeakAnalysis {
        peaks::analyze(&self.signal, &self.scored, params)
    }

    /// Lowest y within two widths of the peak
    pub fn background(&self, peak: &Peak) -> f64 {
        let reach = BACKGROUND_REACH * peak.width;
        self.signal
            .min_y_between(peak.position - reach, peak.position + reach)
            .unwrap_or(0.0)
    }

    /// Settings in effect after normalization
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The sorted input
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Scales of the transform
    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Wavelet coefficients
    pub fn grid(&self) -> &CoefficientGrid {
        &self.grid
    }

    /// Every traced ridge
    pub fn ridges(&self) -> &[RidgeLine] {
        &self.ridges
    }

    /// Ridge summaries with SNR, parallel to [`PeakFinder::ridges`]
    pub fn scored_ridges(&self) -> &[ScoredRidge] {
        &self.scored
    }

    /// Peaks as an aligned table with the local background of each
    pub fn format_text(&self, peaks: &[Peak]) -> String {
        let mut output = format!(
            "{} peak(s) in {} samples, {} scales\n",
            peaks.len(),
            self.signal.len(),
            self.scales.len()
        );
        output.push_str(&format!(
            "{:>4}  {:>12}  {:>10}  {:>11}  {:>11}  {:>5}  {:>8}\n",
            "#", "position", "width", "intensity", "background", "ridge", "snr"
        ));
        for (i, peak) in peaks.iter().enumerate() {
            output.push_str(&format!(
                "{:>4}  {:>12.4}  {:>10.4}  {:>11.4e}  {:>11.4e}  {:>5}  {:>8.2}\n",
                i + 1,
                peak.position,
                peak.width,
                peak.intensity,
                self.background(peak),
                peak.ridge_length,
                peak.snr
            ));
        }
        output
    }

    /// Peaks as CSV with the same columns as [`PeakFinder::format_text`]
    pub fn format_csv(&self, peaks: &[Peak]) -> String {
        let mut output = String::from("position,width,intensity,background,ridge_length,snr\n");
        for peak in peaks {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                peak.position,
                peak.width,
                peak.intensity,
                self.background(peak),
                peak.ridge_length,
                peak.snr
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleMode;
    use crate::error::PeakFinderError;

    fn gaussian(x: f64, center: f64, sigma: f64, height: f64) -> f64 {
        let t = (x - center) / sigma;
        height * (-0.5 * t * t).exp()
    }

    fn two_bumps() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..800).map(|i| i as f64 * 0.25).collect();
        let y = x
            .iter()
            .map(|&v| gaussian(v, 60.0, 2.0, 1.0) + gaussian(v, 140.0, 3.0, 0.6))
            .collect();
        (x, y)
    }

    #[test]
    fn test_finds_clean_bumps() {
        let (x, y) = two_bumps();
        let finder = PeakFinder::new(&x, &y, 5).unwrap();
        let peaks = finder.get_peaks(&PeakParams::default());
        for center in [60.0, 140.0] {
            assert!(
                peaks.iter().any(|p| (p.position - center).abs() <= p.width),
                "no peak near {} in {:?}",
                center,
                peaks
            );
        }
    }

    #[test]
    fn test_empty_input_fails_early() {
        assert_eq!(
            PeakFinder::new(&[], &[], 5).unwrap_err(),
            PeakFinderError::EmptySignal
        );
        assert!(matches!(
            PeakFinder::new(&[1.0, 2.0], &[1.0], 5),
            Err(PeakFinderError::LengthMismatch { x: 2, y: 1 })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (x, y) = two_bumps();
        let config = DetectorConfig::default().with_minimum_noise_level(-1.0);
        assert!(matches!(
            PeakFinder::with_config(&x, &y, config),
            Err(PeakFinderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_accessors_consistent() {
        let (x, y) = two_bumps();
        let finder = PeakFinder::new(&x, &y, 4).unwrap();
        assert_eq!(finder.grid().rows(), finder.scales().len());
        assert_eq!(finder.grid().samples(), finder.signal().len());
        assert_eq!(finder.ridges().len(), finder.scored_ridges().len());
        assert_eq!(finder.config().resolution, 4);
    }

    #[test]
    fn test_linear_scale_mode() {
        let (x, y) = two_bumps();
        let config = DetectorConfig::default().with_scale_mode(ScaleMode::Linear);
        let finder = PeakFinder::with_config(&x, &y, config).unwrap();
        assert_eq!(finder.scales().get(0), 2.0);
        assert_eq!(finder.scales().len(), 398);
    }

    #[test]
    fn test_background_level() {
        let (x, y) = two_bumps();
        let lifted: Vec<f64> = y.iter().map(|v| v + 0.5).collect();
        let finder = PeakFinder::new(&x, &lifted, 5).unwrap();
        let peak = Peak {
            position: 60.0,
            width: 4.0,
            intensity: 1.0,
            ridge_length: 20,
            snr: 10.0,
        };
        let background = finder.background(&peak);
        // 8 units either side: the bump has decayed to exp(-8)
        assert!((background - 0.5).abs() < 1e-3, "background {}", background);
    }

    #[test]
    fn test_format_outputs() {
        let x: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();
        let y = vec![1.5; 40];
        let finder = PeakFinder::new(&x, &y, 5).unwrap();
        let peaks = vec![Peak {
            position: 12.5,
            width: 0.75,
            intensity: 3.0,
            ridge_length: 22,
            snr: 8.25,
        }];

        let text = finder.format_text(&peaks);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            format!("1 peak(s) in 40 samples, {} scales", finder.scales().len())
        );
        assert!(lines[1].contains("background"));
        assert!(lines[2].contains("12.5000"));
        assert!(lines[2].contains("1.5000e0"));
        assert_eq!(finder.format_text(&[]).lines().count(), 2);

        let csv = finder.format_csv(&peaks);
        assert_eq!(
            csv,
            "position,width,intensity,background,ridge_length,snr\n12.5,0.75,3,1.5,22,8.25\n"
        );
    }
}
