//! Regressor construction, boundary trimming and prediction.
//!
//! The fitter relies on three primitive operations:
//! - build the regressor matrix for an input signal (`build_regressor`)
//! - drop the unreliable boundary rows (`trim_rows`, `trim_samples`)
//! - predict the output for given coefficients (`predict`)

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::domain::ModelShape;
use crate::error::AppError;
use crate::math::basis_term;

/// Index of the first row that has a complete history window.
///
/// Rows before it are left all-zero.
pub fn first_full_row(shape: ModelShape) -> usize {
    shape.memory_depth
}

/// Build the `N × P·(M+1)` memory-polynomial regressor matrix.
///
/// `X[i][lag·P + (p-1)] = x[i-lag] · |x[i-lag]|^(p-1)` for every row with a full
/// history window; the leading `M` rows stay zero.
///
/// Row `M` is the first written row, not `M+1`: it already has a full history
/// window, and the `M+3` boundary trim makes the fitted coefficients identical
/// either way.
pub fn build_regressor(input: &[Complex64], shape: ModelShape) -> Result<DMatrix<Complex64>, AppError> {
    shape.validate()?;
    let n = input.len();
    if n < shape.taps() {
        return Err(AppError::shape(format!(
            "Input has {n} samples; memory depth {} needs at least {}.",
            shape.memory_depth,
            shape.taps()
        )));
    }

    let magnitude: Vec<f64> = input.iter().map(|x| x.norm()).collect();
    let first = first_full_row(shape);
    let mut x = DMatrix::<Complex64>::zeros(n, shape.n_coefficients());

    for lag in 0..shape.taps() {
        for power in 1..=shape.order {
            let mut column = x.column_mut(shape.column_index(lag, power));
            for i in first..n {
                column[i] = basis_term(input[i - lag], magnitude[i - lag], power);
            }
        }
    }

    Ok(x)
}

/// Drop `width` rows from both ends of a matrix.
pub fn trim_rows(x: &DMatrix<Complex64>, width: usize) -> Result<DMatrix<Complex64>, AppError> {
    let kept = trimmed_len(x.nrows(), width)?;
    Ok(x.rows(width, kept).into_owned())
}

/// Drop `width` samples from both ends of a signal.
pub fn trim_samples(samples: &[Complex64], width: usize) -> Result<DVector<Complex64>, AppError> {
    let kept = trimmed_len(samples.len(), width)?;
    Ok(DVector::from_column_slice(&samples[width..width + kept]))
}

fn trimmed_len(n: usize, width: usize) -> Result<usize, AppError> {
    match width.checked_mul(2).and_then(|w| n.checked_sub(w)) {
        Some(kept) if kept > 0 => Ok(kept),
        _ => Err(AppError::shape(format!(
            "Signal of {n} samples is too short to drop {width} samples from each end."
        ))),
    }
}

/// Predict the output `X · c`.
pub fn predict(x: &DMatrix<Complex64>, coefficients: &DVector<Complex64>) -> Result<DVector<Complex64>, AppError> {
    if x.ncols() != coefficients.len() {
        return Err(AppError::shape(format!(
            "Regressor has {} columns but {} coefficients were supplied.",
            x.ncols(),
            coefficients.len()
        )));
    }
    Ok(x * coefficients)
}
