//! Detector configuration and stored threshold presets
//!
//! [`DetectorConfig`] holds the construction-time settings that shape the
//! coefficient grid and ridge set. [`PeakPreset`] stores a reusable set of
//! extraction thresholds with widths relative to the x span, so one preset
//! applies to data sets of any extent. A [`PresetBook`] keeps five numbered
//! slots and round-trips through any serde format.

use crate::error::{PeakFinderError, Result};
use crate::peaks::PeakParams;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of slots in a [`PresetBook`]
pub const PRESET_SLOTS: usize = 5;

/// How the wavelet scales are spaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// `resolution` scales per octave, geometric spacing
    #[default]
    Log,
    /// Integer scales 2, 3, 4, ...
    Linear,
}

impl ScaleMode {
    /// Parse a scale mode from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "log" | "logarithmic" => Some(ScaleMode::Log),
            "linear" | "lin" => Some(ScaleMode::Linear),
            _ => None,
        }
    }
}

/// Construction-time detector settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Scales per octave in log mode
    pub resolution: usize,
    /// Scale spacing
    pub scale_mode: ScaleMode,
    /// Divisor of the signal length bounding the scale range
    pub largest_scale: f64,
    /// Rows a ridge may miss before it stops growing
    pub max_gap: usize,
    /// Local-maximum window in samples
    pub window: usize,
    /// Fraction of the global noise quantile used as a noise floor
    pub minimum_noise_level: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            resolution: 5,
            scale_mode: ScaleMode::Log,
            largest_scale: 1.0,
            max_gap: 4,
            window: 3,
            minimum_noise_level: 0.3,
        }
    }
}

impl DetectorConfig {
    /// Default settings with the given scales-per-octave
    pub fn with_resolution(resolution: usize) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    /// Set the scale spacing
    pub fn with_scale_mode(mut self, scale_mode: ScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    /// Set the largest-scale divisor
    pub fn with_largest_scale(mut self, largest_scale: f64) -> Self {
        self.largest_scale = largest_scale;
        self
    }

    /// Set the ridge gap tolerance
    pub fn with_max_gap(mut self, max_gap: usize) -> Self {
        self.max_gap = max_gap;
        self
    }

    /// Set the local-maximum window
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the noise floor fraction
    pub fn with_minimum_noise_level(mut self, level: f64) -> Self {
        self.minimum_noise_level = level;
        self
    }

    /// Reject values no detector can work with
    pub fn validate(&self) -> Result<()> {
        if !self.largest_scale.is_finite() || self.largest_scale <= 0.0 {
            return Err(PeakFinderError::InvalidConfig(format!(
                "largest_scale must be positive, got {}",
                self.largest_scale
            )));
        }
        if !self.minimum_noise_level.is_finite() || self.minimum_noise_level < 0.0 {
            return Err(PeakFinderError::InvalidConfig(format!(
                "minimum_noise_level must be non-negative, got {}",
                self.minimum_noise_level
            )));
        }
        Ok(())
    }

    /// Clamp tuning integers into their usable range.
    ///
    /// A resolution of zero becomes one; the window is forced odd and at
    /// least one sample wide.
    pub fn normalized(mut self) -> Self {
        if self.resolution == 0 {
            warn!("resolution 0 is not usable, using 1");
            self.resolution = 1;
        }
        if self.window % 2 == 0 {
            let window = self.window + 1;
            warn!(
                "local maximum window {} is even, using {}",
                self.window, window
            );
            self.window = window;
        }
        self
    }
}

/// A stored threshold set with widths relative to the x span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakPreset {
    /// Minimum width in percent of the x span
    pub min_width_percent: f64,
    /// Maximum width in percent of the x span
    pub max_width_percent: f64,
    /// Minimum SNR
    pub snr: f64,
    /// Minimum ridge length
    pub ridge_length: usize,
    /// Enable the double-peak pass
    pub double_peaks: bool,
    /// Reduced ridge length for the double-peak pass
    pub double_peak_ridge_length: usize,
}

impl Default for PeakPreset {
    fn default() -> Self {
        Self {
            min_width_percent: 0.0,
            max_width_percent: 50.0,
            snr: 2.0,
            ridge_length: 20,
            double_peaks: false,
            double_peak_ridge_length: 5,
        }
    }
}

impl PeakPreset {
    /// Absolute thresholds for data covering `span` along x
    pub fn to_params(&self, span: f64) -> PeakParams {
        let params = PeakParams::new()
            .with_snr(self.snr)
            .with_min_width(self.min_width_percent * span * 0.01)
            .with_max_width(self.max_width_percent * span * 0.01)
            .with_ridge_length(self.ridge_length);
        if self.double_peaks {
            params.with_double_peak_detection(self.double_peak_ridge_length)
        } else {
            params
        }
    }

    /// Capture `params` as a preset relative to `span`.
    ///
    /// Unset width bounds fall back to the default preset's percentages.
    pub fn from_params(params: &PeakParams, span: f64) -> Self {
        let defaults = Self::default();
        let percent = |w: Option<f64>, fallback: f64| match w {
            Some(w) if span > 0.0 => w / span * 100.0,
            _ => fallback,
        };
        Self {
            min_width_percent: percent(params.min_width, defaults.min_width_percent),
            max_width_percent: percent(params.max_width, defaults.max_width_percent),
            snr: params.snr,
            ridge_length: params.ridge_length,
            double_peaks: params.double_peak_detection,
            double_peak_ridge_length: params.double_peak_reduced_ridge_length,
        }
    }
}

/// Five numbered preset slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetBook {
    presets: Vec<PeakPreset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self {
            presets: vec![PeakPreset::default(); PRESET_SLOTS],
        }
    }
}

impl PresetBook {
    /// Create a book with every slot at the default preset
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset in `slot` (1-based)
    pub fn get(&self, slot: usize) -> Option<&PeakPreset> {
        slot.checked_sub(1).and_then(|i| self.presets.get(i))
    }

    /// Overwrite `slot` (1-based)
    pub fn store(&mut self, slot: usize, preset: PeakPreset) -> Result<()> {
        let entry = slot
            .checked_sub(1)
            .and_then(|i| self.presets.get_mut(i))
            .ok_or_else(|| {
                PeakFinderError::InvalidConfig(format!(
                    "preset slot {} out of range 1..={}",
                    slot, PRESET_SLOTS
                ))
            })?;
        *entry = preset;
        Ok(())
    }

    /// Iterate over (slot, preset) pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PeakPreset)> {
        self.presets.iter().enumerate().map(|(i, p)| (i + 1, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.resolution, 5);
        assert_eq!(config.max_gap, 4);
        assert_eq!(config.window, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_largest_scale() {
        let config = DetectorConfig::default().with_largest_scale(0.0);
        assert!(matches!(
            config.validate(),
            Err(PeakFinderError::InvalidConfig(_))
        ));
        let config = DetectorConfig::default().with_largest_scale(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalized_window_and_resolution() {
        let config = DetectorConfig::with_resolution(0).with_window(4).normalized();
        assert_eq!(config.resolution, 1);
        assert_eq!(config.window, 5);

        let config = DetectorConfig::default().with_window(0).normalized();
        assert_eq!(config.window, 1);
    }

    #[test]
    fn test_scale_mode_from_str() {
        assert_eq!(ScaleMode::from_str("LOG"), Some(ScaleMode::Log));
        assert_eq!(ScaleMode::from_str("linear"), Some(ScaleMode::Linear));
        assert_eq!(ScaleMode::from_str("cubic"), None);
    }

    #[test]
    fn test_preset_to_params() {
        let preset = PeakPreset {
            min_width_percent: 1.0,
            max_width_percent: 10.0,
            snr: 4.0,
            ridge_length: 12,
            double_peaks: true,
            double_peak_ridge_length: 4,
        };
        let params = preset.to_params(200.0);
        assert_eq!(params.min_width, Some(2.0));
        assert_eq!(params.max_width, Some(20.0));
        assert_eq!(params.snr, 4.0);
        assert_eq!(params.ridge_length, 12);
        assert!(params.double_peak_detection);
        assert_eq!(params.double_peak_reduced_ridge_length, 4);
    }

    #[test]
    fn test_preset_from_params() {
        let params = PeakParams::new().with_min_width(5.0).with_snr(3.0);
        let preset = PeakPreset::from_params(&params, 500.0);
        assert!((preset.min_width_percent - 1.0).abs() < 1e-12);
        assert_eq!(preset.max_width_percent, 50.0);
        assert_eq!(preset.snr, 3.0);
        assert!(!preset.double_peaks);
    }

    #[test]
    fn test_preset_book_slots() {
        let mut book = PresetBook::new();
        assert!(book.get(0).is_none());
        assert!(book.get(PRESET_SLOTS + 1).is_none());
        assert_eq!(book.get(1), Some(&PeakPreset::default()));

        let preset = PeakPreset {
            snr: 7.5,
            ..Default::default()
        };
        book.store(3, preset).unwrap();
        assert_eq!(book.get(3).map(|p| p.snr), Some(7.5));
        assert!(book.store(6, preset).is_err());
        assert_eq!(book.iter().count(), PRESET_SLOTS);
    }

    #[test]
    fn test_preset_book_json_roundtrip() {
        let mut book = PresetBook::new();
        book.store(
            2,
            PeakPreset {
                ridge_length: 9,
                ..Default::default()
            },
        )
        .unwrap();
        let json = serde_json::to_string(&book).unwrap();
        let back: PresetBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"resolution": 8}"#).unwrap();
        assert_eq!(config.resolution, 8);
        assert_eq!(config.scale_mode, ScaleMode::Log);
        assert_eq!(config.minimum_noise_level, 0.3);
    }
}
