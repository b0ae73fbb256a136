//! Signal sources that do not come from a measurement file.

pub mod sample;

pub use sample::*;
