//! Continuous Wavelet Transform
//!
//! Multi-scale convolution of a real signal with dilated Mexican-hat
//! wavelets. The result is a scale × sample grid of real coefficients that
//! the ridge tracer walks from coarse to fine.
//!
//! Rows are independent; with the `parallel` feature they are computed on
//! the rayon thread pool.

pub mod scales;
pub mod transform;

pub use scales::ScaleSet;
pub use transform::{mexican_hat, transform, CoefficientGrid};
