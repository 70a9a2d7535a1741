//! Sorted (x, y) signal
//!
//! Every stage downstream assumes x is non-decreasing, so the pairs are
//! sorted once here and never touched again.

use crate::error::{PeakFinderError, Result};

/// An immutable sequence of (x, y) samples ordered by x
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Signal {
    /// Pair up `x` and `y` and sort the pairs by x ascending.
    ///
    /// The sort is stable, so samples sharing an abscissa keep their input
    /// order. Values must be finite; NaN or infinite samples are not
    /// rejected but make every later result unspecified.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.is_empty() || y.is_empty() {
            return Err(PeakFinderError::EmptySignal);
        }
        if x.len() != y.len() {
            return Err(PeakFinderError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));

        Ok(Self {
            x: order.iter().map(|&i| x[i]).collect(),
            y: order.iter().map(|&i| y[i]).collect(),
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false; construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Sorted abscissa
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Ordinate, in the same order as [`Signal::x`]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Distance between the first and last abscissa
    pub fn span(&self) -> f64 {
        self.x[self.x.len() - 1] - self.x[0]
    }

    /// Median of the gaps between neighbouring samples (upper median for an
    /// even count). A single sample has no spacing and yields 0.
    pub fn median_spacing(&self) -> f64 {
        let mut diffs: Vec<f64> = self.x.windows(2).map(|w| w[1] - w[0]).collect();
        if diffs.is_empty() {
            return 0.0;
        }
        diffs.sort_by(|a, b| a.total_cmp(b));
        diffs[diffs.len() / 2]
    }

    /// Smallest y among samples whose x lies in `[lo, hi]`
    pub fn min_y_between(&self, lo: f64, hi: f64) -> Option<f64> {
        let start = self.x.partition_point(|&v| v < lo);
        let end = self.x.partition_point(|&v| v <= hi);
        if start >= end {
            return None;
        }
        self.y[start..end].iter().copied().reduce(f64::min)
    }
}
