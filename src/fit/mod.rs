//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - extraction: regressor build, boundary trim, complex least squares
//! - validation: regressor build, boundary trim, prediction with fixed coefficients

pub mod fitter;

pub use fitter::*;
