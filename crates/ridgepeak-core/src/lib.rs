//! # ridgepeak
//!
//! Peak detection in noisy 1-D data by tracking ridges of a continuous
//! wavelet transform.
//!
//! ## Pipeline
//!
//! ```text
//!  (x, y) ──▶ Signal ──▶ CWT grid ──▶ ridge lines ──▶ SNR ──▶ peaks
//!            (sorted)   (scale×x)    (coarse→fine)          (thresholds)
//!  └──────────────── PeakFinder::new ───────────────┘  └─ get_peaks ─┘
//! ```
//!
//! Everything up to the SNR estimate is computed once when the
//! [`PeakFinder`] is built. [`PeakFinder::get_peaks`] only filters the
//! cached ridges, so trying several thresholds on the same data is cheap.
//!
//! ## Features
//!
//! - `parallel` (default): compute wavelet scales on the rayon pool

pub mod config;
pub mod cwt;
pub mod error;
pub mod fft_utils;
pub mod finder;
pub mod noise;
pub mod peaks;
pub mod ridges;
pub mod signal;

pub use config::{DetectorConfig, PeakPreset, PresetBook, ScaleMode};
pub use error::{PeakFinderError, Result};
pub use finder::PeakFinder;
pub use noise::ScoredRidge;
pub use peaks::{Peak, PeakAnalysis, PeakParams, RidgeStatus};
pub use ridges::{RidgeLine, RidgePoint, RidgeSummary};
pub use signal::Signal;
