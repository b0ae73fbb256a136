//! `mp-model` library crate.
//!
//! The binary (`mp`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the regressor builder and solver are reusable from other tools
//!   (e.g. a predistortion loop) without going through CSV files

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
