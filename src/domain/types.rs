//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later to apply a saved model to new data

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default memory depth (taps at lag 0 and lag 1).
pub const DEFAULT_MEMORY_DEPTH: usize = 1;

/// Default polynomial order (powers `|x|^0 ..= |x|^4`).
pub const DEFAULT_ORDER: usize = 5;

/// Rows dropped from each end beyond the memory depth before fitting.
const TRIM_MARGIN: usize = 3;

/// Shape of a memory-polynomial model.
///
/// Column layout of the regressor matrix is lag-major:
/// `j = lag * order + (power - 1)`, with `lag ∈ 0..=memory_depth` and
/// `power ∈ 1..=order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelShape {
    pub memory_depth: usize,
    pub order: usize,
}

impl Default for ModelShape {
    fn default() -> Self {
        Self {
            memory_depth: DEFAULT_MEMORY_DEPTH,
            order: DEFAULT_ORDER,
        }
    }
}

impl ModelShape {
    pub fn new(memory_depth: usize, order: usize) -> Result<Self, AppError> {
        let shape = Self { memory_depth, order };
        shape.validate()?;
        Ok(shape)
    }

    /// Check the order and that every derived size (`taps`, `n_coefficients`,
    /// `min_trimmed_len`) fits in `usize`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.order == 0 {
            return Err(AppError::shape("Polynomial order must be >= 1."));
        }
        let too_large = || {
            AppError::shape(format!(
                "Model shape M={}, P={} is too large.",
                self.memory_depth, self.order
            ))
        };
        self.memory_depth
            .checked_add(1)
            .and_then(|taps| taps.checked_mul(self.order))
            .ok_or_else(too_large)?;
        self.memory_depth
            .checked_add(TRIM_MARGIN)
            .and_then(|t| t.checked_mul(2))
            .and_then(|t| t.checked_add(1))
            .ok_or_else(too_large)?;
        Ok(())
    }

    /// Number of taps (lags `0..=memory_depth`).
    pub fn taps(&self) -> usize {
        self.memory_depth + 1
    }

    /// Number of regressor columns / coefficients.
    pub fn n_coefficients(&self) -> usize {
        self.order * self.taps()
    }

    /// Zero-based column for `(lag, power)` with `power` starting at 1.
    pub fn column_index(&self, lag: usize, power: usize) -> usize {
        debug_assert!(lag <= self.memory_depth);
        debug_assert!((1..=self.order).contains(&power));
        lag * self.order + (power - 1)
    }

    /// Inverse of `column_index`.
    pub fn term_of_column(&self, column: usize) -> (usize, usize) {
        (column / self.order, column % self.order + 1)
    }

    /// Rows dropped from each end of the regressor before fitting.
    pub fn trim_width(&self) -> usize {
        self.memory_depth + TRIM_MARGIN
    }

    /// Smallest signal length that survives trimming with at least one row.
    pub fn min_trimmed_len(&self) -> usize {
        2 * self.trim_width() + 1
    }
}

/// Time-aligned complex input/output samples of one measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPair {
    pub input: Vec<Complex64>,
    pub output: Vec<Complex64>,
}

impl SignalPair {
    pub fn new(input: Vec<Complex64>, output: Vec<Complex64>) -> Result<Self, AppError> {
        if input.len() != output.len() {
            return Err(AppError::shape(format!(
                "Input and output lengths differ: {} vs {}.",
                input.len(),
                output.len()
            )));
        }
        Ok(Self { input, output })
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

/// Resolved configuration for `mp fit`.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub extraction: PathBuf,
    pub validation: PathBuf,
    pub shape: ModelShape,
    /// Relative singular-value cutoff; `None` means machine epsilon.
    pub rcond: Option<f64>,
    pub summary_only: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_prediction: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

/// Resolved configuration for `mp synth`.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub out: PathBuf,
    pub samples: usize,
    pub seed: u64,
    pub shape: ModelShape,
    /// RMS magnitude of the generated input.
    pub rms: f64,
    /// Output signal-to-noise ratio in dB.
    pub snr_db: f64,
}

/// Diagnostics of a least-squares solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveInfo {
    /// Rows used in the solve (after trimming).
    pub rows: usize,
    /// Singular values above the cutoff.
    pub rank: usize,
    /// `σ_max / σ_min` over the retained singular values.
    pub condition_number: f64,
}

/// Fit quality figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nmse_extraction_db: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nmse_validation_db: Option<f64>,
}

/// One coefficient tagged with the term it multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub lag: usize,
    pub power: usize,
    pub value: Complex64,
}

/// Portable representation of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientFile {
    pub tool: String,
    pub fitted_at: DateTime<Utc>,
    pub memory_depth: usize,
    pub order: usize,
    pub rcond: f64,
    pub terms: Vec<Term>,
    pub quality: FitQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_is_unique_and_dense() {
        let shape = ModelShape::new(2, 5).unwrap();
        let mut seen = vec![false; shape.n_coefficients()];
        for lag in 0..=shape.memory_depth {
            for power in 1..=shape.order {
                let j = shape.column_index(lag, power);
                assert!(!seen[j], "column {j} produced twice");
                seen[j] = true;
                assert_eq!(shape.term_of_column(j), (lag, power));
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn default_shape_matches_reference_model() {
        let shape = ModelShape::default();
        assert_eq!(shape.n_coefficients(), 10);
        assert_eq!(shape.trim_width(), 4);
        assert_eq!(shape.column_index(1, 1), 5);
    }

    #[test]
    fn zero_order_is_rejected() {
        let err = ModelShape::new(1, 0).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_SHAPE);
    }

    #[test]
    fn oversized_shapes_are_rejected() {
        for (m, p) in [(usize::MAX, 5), (usize::MAX / 2, 5), (1, usize::MAX), (usize::MAX - 3, 1)] {
            let err = ModelShape::new(m, p).unwrap_err();
            assert_eq!(err.exit_code(), crate::error::EXIT_SHAPE, "M={m}, P={p}");
        }
        assert!(ModelShape::new(1000, 5).is_ok());
    }

    #[test]
    fn signal_pair_rejects_length_mismatch() {
        let err = SignalPair::new(vec![Complex64::new(1.0, 0.0)], vec![]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_SHAPE);
    }
}
