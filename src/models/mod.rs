//! Memory-polynomial model evaluation.
//!
//! The model is linear in its coefficients, so everything reduces to building a
//! regressor matrix and multiplying it by a coefficient vector. Both are small,
//! pure functions so the fitting code can stay generic.

pub mod model;

pub use model::*;
