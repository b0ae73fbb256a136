//! Extraction and validation for a single memory-polynomial model.
//!
//! Given:
//! - an extraction signal pair `(x, y)`
//! - a model shape `(M, P)`
//!
//! we:
//! - build the regressor `X` from `x`
//! - drop `T = M + 3` rows from both ends of `X` and `y`
//! - solve the complex least-squares problem for the coefficients
//!
//! and later reapply those coefficients to an independent input signal.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{debug, info};

use crate::domain::{ModelShape, SignalPair, SolveInfo, Term};
use crate::error::AppError;
use crate::math::{effective_rcond, solve_least_squares};
use crate::models::{build_regressor, predict, trim_rows, trim_samples};
use crate::report::nmse_db_if_defined;

/// Coefficients extracted for one model shape.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub shape: ModelShape,
    pub coefficients: DVector<Complex64>,
    /// Relative singular-value cutoff used by the solve.
    pub rcond: f64,
    pub info: SolveInfo,
    /// NMSE of the model on the (trimmed) extraction data; `None` for a zero-energy target.
    pub nmse_extraction_db: Option<f64>,
}

impl ModelFit {
    /// Coefficients tagged with the `(lag, power)` they multiply, in column order.
    pub fn terms(&self) -> Vec<Term> {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(j, &value)| {
                let (lag, power) = self.shape.term_of_column(j);
                Term { lag, power, value }
            })
            .collect()
    }
}

/// Model output over the trimmed part of a signal.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Index of `samples[0]` in the untrimmed signal.
    pub first_index: usize,
    pub samples: DVector<Complex64>,
}

impl Prediction {
    /// Sample indices (in the untrimmed signal) covered by the prediction.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.first_index..self.first_index + self.samples.len()
    }
}

/// Extract model coefficients from a measured signal pair.
pub fn fit_model(signal: &SignalPair, shape: ModelShape, rcond: Option<f64>) -> Result<ModelFit, AppError> {
    shape.validate()?;
    if signal.input.len() != signal.output.len() {
        return Err(AppError::shape(format!(
            "Extraction input/output lengths differ: {} vs {}.",
            signal.input.len(),
            signal.output.len()
        )));
    }
    let rcond = effective_rcond(rcond)?;
    let width = shape.trim_width();

    let x = build_regressor(&signal.input, shape)?;
    debug!(rows = x.nrows(), cols = x.ncols(), "built extraction regressor");

    let x_trim = trim_rows(&x, width)?;
    let y_trim = trim_samples(&signal.output, width)?;
    info!(
        samples = signal.len(),
        rows = x_trim.nrows(),
        coefficients = shape.n_coefficients(),
        trim = width,
        "solving extraction least squares"
    );

    let ls = solve_least_squares(&x_trim, &y_trim, Some(rcond))?;
    let fitted = predict(&x_trim, &ls.coefficients)?;
    let nmse_extraction_db = nmse_db_if_defined(y_trim.as_slice(), fitted.as_slice())?;
    info!(rank = ls.info.rank, nmse_db = ?nmse_extraction_db, "extraction complete");

    Ok(ModelFit {
        shape,
        coefficients: ls.coefficients,
        rcond,
        info: ls.info,
        nmse_extraction_db,
    })
}

/// Apply fixed coefficients to a new input signal.
///
/// The same boundary trim as extraction is applied, so the prediction covers
/// samples `T..N-T` of the input.
pub fn apply_model(
    input: &[Complex64],
    shape: ModelShape,
    coefficients: &DVector<Complex64>,
) -> Result<Prediction, AppError> {
    shape.validate()?;
    if coefficients.len() != shape.n_coefficients() {
        return Err(AppError::shape(format!(
            "Model (M={}, P={}) needs {} coefficients, got {}.",
            shape.memory_depth,
            shape.order,
            shape.n_coefficients(),
            coefficients.len()
        )));
    }
    let width = shape.trim_width();
    let x = build_regressor(input, shape)?;
    let x_trim: DMatrix<Complex64> = trim_rows(&x, width)?;
    let samples = predict(&x_trim, coefficients)?;
    if samples.iter().any(|v| !v.is_finite()) {
        return Err(AppError::numeric("Non-finite model prediction."));
    }
    debug!(samples = samples.len(), "applied model");

    Ok(Prediction {
        first_index: width,
        samples,
    })
}
