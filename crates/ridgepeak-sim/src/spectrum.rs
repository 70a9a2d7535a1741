//! Synthetic Spectra
//!
//! A spectrum is a sum of peak components on a linear background, sampled
//! on a uniform grid, plus noise:
//!
//! ```text
//! y(x) = offset + slope * x + Σ height * shape((x - center) / width) + noise
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ridgepeak_sim::spectrum::{SpectrumConfig, SpectrumGenerator};
//! use ridgepeak_sim::noise::NoiseConfig;
//!
//! let config = SpectrumConfig::five_peaks().with_noise(NoiseConfig::gaussian(0.05).with_seed(7));
//! let mut generator = SpectrumGenerator::new(config).unwrap();
//! let spectrum = generator.generate();
//! assert_eq!(spectrum.x.len(), 5000);
//! ```

use crate::noise::{NoiseConfig, NoiseSource};
use crate::SimError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Line shape of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeakShape {
    /// exp(-t²/2), width is the standard deviation
    #[default]
    Gaussian,
    /// 1 / (1 + t²), width is the half width at half maximum
    Lorentzian,
}

impl PeakShape {
    /// Unit-height profile at normalized offset `t`
    pub fn profile(&self, t: f64) -> f64 {
        match self {
            PeakShape::Gaussian => (-0.5 * (t * t)).exp(),
            PeakShape::Lorentzian => 1.0 / (1.0 + t * t),
        }
    }
}

/// One peak of a synthetic spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakComponent {
    /// Peak center
    pub center: f64,
    /// Shape width parameter
    pub width: f64,
    /// Peak height above the background
    pub height: f64,
    /// Line shape
    #[serde(default)]
    pub shape: PeakShape,
}

impl PeakComponent {
    /// Gaussian component
    pub fn gaussian(center: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
            shape: PeakShape::Gaussian,
        }
    }

    /// Lorentzian component
    pub fn lorentzian(center: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
            shape: PeakShape::Lorentzian,
        }
    }

    /// Value at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        self.height * self.shape.profile((x - self.center) / self.width)
    }
}

/// Linear background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Background {
    /// Constant term
    pub offset: f64,
    /// Linear term
    pub slope: f64,
}

/// Complete description of a synthetic spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// First abscissa
    pub x_min: f64,
    /// Last abscissa
    pub x_max: f64,
    /// Number of samples
    pub points: usize,
    /// Peaks to place
    pub components: Vec<PeakComponent>,
    /// Background under the peaks
    pub background: Background,
    /// Noise added on top
    pub noise: NoiseConfig,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self::five_peaks()
    }
}

impl SpectrumConfig {
    /// Five Gaussians of mixed width and height on [-200, 400]
    pub fn five_peaks() -> Self {
        Self {
            x_min: -200.0,
            x_max: 400.0,
            points: 5000,
            components: vec![
                PeakComponent::gaussian(10.0, 5.0, 0.15),
                PeakComponent::gaussian(30.0, 0.5, 1.0),
                PeakComponent::gaussian(55.0, 1.0, 1.0),
                PeakComponent::gaussian(75.0, 1.0, 0.3),
                PeakComponent::gaussian(90.0, 3.0, 0.2),
            ],
            background: Background::default(),
            noise: NoiseConfig::gaussian(0.05),
        }
    }

    /// A broad peak with a narrow shoulder on its flank.
    ///
    /// The shoulder's ridge spans about 19 scales at the default resolution,
    /// so default thresholds (ridge length 15) already report it. It only
    /// depends on the double-peak pass once the ridge length threshold is
    /// raised above that, e.g. to 25, while the main ridge runs through
    /// all scales.
    pub fn shoulder() -> Self {
        Self {
            x_min: 0.0,
            x_max: 100.0,
            points: 1000,
            components: vec![
                PeakComponent::gaussian(50.0, 2.0, 1.0),
                PeakComponent::gaussian(52.5, 0.45, 0.5),
            ],
            background: Background::default(),
            noise: NoiseConfig::gaussian(0.01),
        }
    }

    /// Replace the noise configuration
    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    /// Replace the background
    pub fn with_background(mut self, offset: f64, slope: f64) -> Self {
        self.background = Background { offset, slope };
        self
    }

    /// Replace the sample count
    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    /// Uniform abscissa grid
    pub fn grid(&self) -> Vec<f64> {
        match self.points {
            0 => Vec::new(),
            1 => vec![self.x_min],
            n => {
                let step = (self.x_max - self.x_min) / (n - 1) as f64;
                (0..n).map(|i| self.x_min + step * i as f64).collect()
            }
        }
    }

    /// Noise-free value at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        let peaks: f64 = self.components.iter().map(|c| c.evaluate(x)).sum();
        self.background.offset + self.background.slope * x + peaks
    }
}

/// Generated samples
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpectrum {
    /// Abscissa
    pub x: Vec<f64>,
    /// Noisy ordinate
    pub y: Vec<f64>,
    /// Ordinate before noise
    pub clean: Vec<f64>,
}

impl SyntheticSpectrum {
    /// Two whitespace-separated columns with a comment header
    pub fn to_columns(&self) -> String {
        let mut output = String::from("# x y\n");
        for (x, y) in self.x.iter().zip(&self.y) {
            output.push_str(&format!("{} {}\n", x, y));
        }
        output
    }
}

/// Spectrum generator holding its noise state
pub struct SpectrumGenerator {
    config: SpectrumConfig,
    noise: NoiseSource,
}

impl SpectrumGenerator {
    /// Create a generator; fails on an empty grid or invalid noise
    pub fn new(config: SpectrumConfig) -> Result<Self, SimError> {
        if config.points == 0 {
            return Err(SimError::EmptyGrid);
        }
        if !(config.x_max > config.x_min) && config.points > 1 {
            return Err(SimError::InvalidRange {
                min: config.x_min,
                max: config.x_max,
            });
        }
        let noise = NoiseSource::new(&config.noise)?;
        Ok(Self { config, noise })
    }

    /// Configuration in use
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Draw one spectrum. Successive calls produce fresh noise.
    pub fn generate(&mut self) -> SyntheticSpectrum {
        let x = self.config.grid();
        let clean: Vec<f64> = x.iter().map(|&v| self.config.evaluate(v)).collect();
        let mut y = clean.clone();
        self.noise.apply(&mut y);
        debug!(
            points = x.len(),
            components = self.config.components.len(),
            "generated spectrum"
        );
        SyntheticSpectrum { x, y, clean }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_endpoints() {
        let config = SpectrumConfig::five_peaks();
        let grid = config.grid();
        assert_eq!(grid.len(), 5000);
        assert_eq!(grid[0], -200.0);
        assert!((grid[4999] - 400.0).abs() < 1e-9);
        assert_eq!(config.with_points(1).grid(), vec![-200.0]);
    }

    #[test]
    fn test_component_shapes() {
        let g = PeakComponent::gaussian(5.0, 2.0, 3.0);
        assert_eq!(g.evaluate(5.0), 3.0);
        assert!((g.evaluate(7.0) - 3.0 * (-0.5_f64).exp()).abs() < 1e-12);

        let l = PeakComponent::lorentzian(0.0, 1.0, 2.0);
        assert_eq!(l.evaluate(0.0), 2.0);
        assert_eq!(l.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_background_added() {
        let config = SpectrumConfig {
            components: Vec::new(),
            ..SpectrumConfig::shoulder()
        }
        .with_background(2.0, 0.5)
        .with_noise(NoiseConfig::none());
        let mut generator = SpectrumGenerator::new(config).unwrap();
        let spectrum = generator.generate();
        for (x, y) in spectrum.x.iter().zip(&spectrum.y) {
            assert!((y - (2.0 + 0.5 * x)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_is_added_to_clean() {
        let config = SpectrumConfig::shoulder().with_noise(NoiseConfig::gaussian(0.1).with_seed(9));
        let mut generator = SpectrumGenerator::new(config).unwrap();
        let spectrum = generator.generate();
        assert_eq!(spectrum.clean.len(), spectrum.y.len());
        let residual: f64 = spectrum
            .y
            .iter()
            .zip(&spectrum.clean)
            .map(|(y, c)| (y - c).powi(2))
            .sum::<f64>()
            / spectrum.y.len() as f64;
        assert!((residual.sqrt() - 0.1).abs() < 0.015, "noise std {}", residual.sqrt());
    }

    #[test]
    fn test_seeded_generators_agree() {
        let config = SpectrumConfig::shoulder().with_noise(NoiseConfig::gaussian(0.1).with_seed(5));
        let a = SpectrumGenerator::new(config.clone()).unwrap().generate();
        let b = SpectrumGenerator::new(config).unwrap().generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_configs() {
        let empty = SpectrumConfig::five_peaks().with_points(0);
        assert!(matches!(SpectrumGenerator::new(empty), Err(SimError::EmptyGrid)));

        let reversed = SpectrumConfig {
            x_min: 5.0,
            x_max: 1.0,
            ..SpectrumConfig::shoulder()
        };
        assert!(matches!(
            SpectrumGenerator::new(reversed),
            Err(SimError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = SpectrumConfig::shoulder().with_noise(NoiseConfig::gaussian(0.2).with_seed(11));
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: SpectrumConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: SpectrumConfig = serde_json::from_str(r#"{"points": 200}"#).unwrap();
        assert_eq!(partial.points, 200);
        assert_eq!(partial.components.len(), 5);
    }

    #[test]
    fn test_to_columns() {
        let spectrum = SyntheticSpectrum {
            x: vec![0.0, 0.5],
            y: vec![1.0, 2.25],
            clean: vec![1.0, 2.0],
        };
        assert_eq!(spectrum.to_columns(), "# x y\n0 1\n0.5 2.25\n");
    }
}
