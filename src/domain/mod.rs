//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model shape (`ModelShape`: memory depth + polynomial order)
//! - measured signal pairs (`SignalPair`)
//! - run configuration (`FitConfig`, `SynthConfig`)
//! - fit outputs and the portable coefficient file (`FitQuality`, `CoefficientFile`)

pub mod types;

pub use types::*;
