//! Mathematical utilities: memory-polynomial basis terms and complex least squares.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;
