//! Additive noise for synthetic spectra
//!
//! Noise is drawn from a seeded `StdRng` when a seed is given, so a
//! configuration file fully determines the generated data. Without a seed
//! the generator is seeded from the OS.

use crate::SimError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Noise model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoiseModel {
    /// No noise
    None,
    /// Additive white Gaussian noise with fixed sigma
    #[default]
    Gaussian,
    /// Gaussian noise with sigma proportional to sqrt(|y|), a counting
    /// statistics approximation
    Counting,
}

/// Noise configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Noise model to use
    pub model: NoiseModel,
    /// Standard deviation (Gaussian) or scale factor (Counting)
    pub sigma: f64,
    /// RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            model: NoiseModel::Gaussian,
            sigma: 0.05,
            seed: None,
        }
    }
}

impl NoiseConfig {
    /// Noise-free configuration
    pub fn none() -> Self {
        Self {
            model: NoiseModel::None,
            sigma: 0.0,
            seed: None,
        }
    }

    /// White Gaussian noise with the given sigma
    pub fn gaussian(sigma: f64) -> Self {
        Self {
            model: NoiseModel::Gaussian,
            sigma,
            ..Default::default()
        }
    }

    /// Fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Stateful noise source
pub struct NoiseSource {
    model: NoiseModel,
    normal: Normal<f64>,
    rng: StdRng,
}

impl NoiseSource {
    /// Create a noise source; fails for negative or non-finite sigma
    pub fn new(config: &NoiseConfig) -> Result<Self, SimError> {
        let sigma = if config.model == NoiseModel::None {
            0.0
        } else {
            config.sigma
        };
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SimError::InvalidNoise(sigma));
        }
        let normal = Normal::new(0.0, sigma).map_err(|_| SimError::InvalidNoise(sigma))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            model: config.model,
            normal,
            rng,
        })
    }

    /// Add noise to `samples` in place
    pub fn apply(&mut self, samples: &mut [f64]) {
        match self.model {
            NoiseModel::None => {}
            NoiseModel::Gaussian => {
                for s in samples.iter_mut() {
                    *s += self.normal.sample(&mut self.rng);
                }
            }
            NoiseModel::Counting => {
                for s in samples.iter_mut() {
                    let scale = s.abs().sqrt();
                    *s += scale * self.normal.sample(&mut self.rng);
                }
            }
        }
    }
}
