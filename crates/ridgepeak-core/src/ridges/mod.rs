//! Ridge Lines
//!
//! A ridge line follows one local maximum of the coefficient grid from
//! coarse to fine scales. Long ridges belong to real features; noise
//! produces short ones that die out after a few scales.

pub mod local_max;
pub mod tracer;

pub use local_max::local_maxima;
pub use tracer::trace_ridges;

use crate::cwt::{CoefficientGrid, ScaleSet};
use serde::{Deserialize, Serialize};

/// One grid cell on a ridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidgePoint {
    /// Row in the coefficient grid
    pub scale_index: usize,
    /// Column in the coefficient grid
    pub sample_index: usize,
}

/// Points of one ridge, coarsest scale first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidgeLine {
    points: Vec<RidgePoint>,
}

impl RidgeLine {
    pub(crate) fn start(scale_index: usize, sample_index: usize) -> Self {
        Self {
            points: vec![RidgePoint {
                scale_index,
                sample_index,
            }],
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true for a traced ridge
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, coarse to fine
    pub fn points(&self) -> &[RidgePoint] {
        &self.points
    }

    /// Sample index of the finest point
    pub fn last_sample_index(&self) -> usize {
        self.points[self.points.len() - 1].sample_index
    }

    /// Coefficient under each point
    pub fn coefficients(&self, grid: &CoefficientGrid) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| grid.value(p.scale_index, p.sample_index))
            .collect()
    }

    /// Reduce to length, end position and strongest coefficient
    pub fn summarize(&self, grid: &CoefficientGrid, scales: &ScaleSet) -> RidgeSummary {
        let mut best = self.points[0];
        let mut best_value = grid.value(best.scale_index, best.sample_index);
        for &p in &self.points[1..] {
            let v = grid.value(p.scale_index, p.sample_index);
            if v.abs() > best_value.abs() {
                best = p;
                best_value = v;
            }
        }

        RidgeSummary {
            length: self.points.len(),
            last_sample_index: self.last_sample_index(),
            peak_scale_index: best.scale_index,
            peak_scale: scales.get(best.scale_index),
            peak_amplitude: best_value,
        }
    }
}

/// Compact description of a ridge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RidgeSummary {
    /// Number of points on the ridge
    pub length: usize,
    /// Sample index at the finest traced scale
    pub last_sample_index: usize,
    /// Row where the coefficient magnitude is largest
    pub peak_scale_index: usize,
    /// Scale value of that row
    pub peak_scale: f64,
    /// Coefficient at that point (signed)
    pub peak_amplitude: f64,
}

/// Summaries for every ridge, in ridge order
pub fn summarize_all(
    ridges: &[RidgeLine],
    grid: &CoefficientGrid,
    scales: &ScaleSet,
) -> Vec<RidgeSummary> {
    ridges.iter().map(|r| r.summarize(grid, scales)).collect()
}
