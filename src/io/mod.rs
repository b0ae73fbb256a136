//! Input/output helpers.
//!
//! - signal CSV ingest + validation (`ingest`)
//! - signal and prediction CSV exports (`export`)
//! - coefficient JSON read/write (`coefs`)

pub mod coefs;
pub mod export;
pub mod ingest;

pub use coefs::*;
pub use export::*;
pub use ingest::*;
