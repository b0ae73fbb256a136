//! Complex least squares solver.
//!
//! We solve problems of the form:
//!
//! ```text
//! minimize Σ |y_i - x_i^T c|^2      (x_i, y_i, c complex)
//! ```
//!
//! Implementation choices:
//! - SVD on the (tall) design matrix. Nalgebra's `QR::solve` is intended for
//!   square systems, SVD handles tall and rank-deficient matrices alike.
//! - Singular values at or below `rcond · σ_max` are treated as zero, which
//!   yields the minimum-norm solution for rank-deficient problems. With no
//!   explicit `rcond` the cutoff is machine epsilon relative to `σ_max`.
//! - Non-finite values are rejected before the decomposition; an SVD of a
//!   matrix containing NaN does not converge.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::debug;

use crate::domain::SolveInfo;
use crate::error::AppError;

/// Solution of a least-squares problem plus solve diagnostics.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub coefficients: DVector<Complex64>,
    pub info: SolveInfo,
}

/// Resolve an optional `rcond` to the relative cutoff actually used.
pub fn effective_rcond(rcond: Option<f64>) -> Result<f64, AppError> {
    match rcond {
        None => Ok(f64::EPSILON),
        Some(r) if r.is_finite() && r >= 0.0 => Ok(r),
        Some(r) => Err(AppError::input(format!("Invalid rcond {r}: must be finite and >= 0."))),
    }
}

/// Solve `min ||x·c - y||²` using SVD.
pub fn solve_least_squares(
    x: &DMatrix<Complex64>,
    y: &DVector<Complex64>,
    rcond: Option<f64>,
) -> Result<LeastSquares, AppError> {
    let (rows, cols) = x.shape();
    if rows != y.len() {
        return Err(AppError::shape(format!(
            "Design matrix has {rows} rows but target has {} samples.",
            y.len()
        )));
    }
    if cols == 0 {
        return Err(AppError::shape("Design matrix has no columns."));
    }
    if rows < cols {
        return Err(AppError::shape(format!(
            "Underdetermined system: {rows} rows for {cols} coefficients."
        )));
    }
    if !all_finite(x.iter()) {
        return Err(AppError::numeric("Design matrix contains non-finite values."));
    }
    if !all_finite(y.iter()) {
        return Err(AppError::numeric("Target vector contains non-finite values."));
    }

    let rcond = effective_rcond(rcond)?;
    let svd = x
        .clone()
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or_else(|| AppError::numeric("SVD did not converge."))?;

    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = rcond * sigma_max;

    let retained: Vec<f64> = svd
        .singular_values
        .iter()
        .copied()
        .filter(|&s| s > cutoff)
        .collect();
    let rank = retained.len();
    let sigma_min = retained.iter().copied().fold(f64::INFINITY, f64::min);
    let condition_number = if rank == 0 { f64::INFINITY } else { sigma_max / sigma_min };

    debug!(rows, cols, rank, sigma_max, cutoff, "svd least squares");

    let coefficients = svd
        .solve(y, cutoff)
        .map_err(|e| AppError::numeric(format!("Least-squares solve failed: {e}")))?;

    if !all_finite(coefficients.iter()) {
        return Err(AppError::numeric("Least-squares solution contains non-finite values."));
    }

    Ok(LeastSquares {
        coefficients,
        info: SolveInfo {
            rows,
            rank,
            condition_number,
        },
    })
}

fn all_finite<'a>(mut values: impl Iterator<Item = &'a Complex64>) -> bool {
    values.all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(
            3,
            2,
            &[c(1.0, 0.0), c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)],
        );
        let y = DVector::from_row_slice(&[c(2.0, 0.0), c(5.0, 0.0), c(8.0, 0.0)]);

        let ls = solve_least_squares(&x, &y, None).unwrap();
        assert_abs_diff_eq!(ls.coefficients[0].re, 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(ls.coefficients[1].re, 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(ls.coefficients[0].im, 0.0, epsilon = 1e-10);
        assert_eq!(ls.info.rank, 2);
    }

    #[test]
    fn recovers_complex_coefficients() {
        let x = DMatrix::from_row_slice(
            4,
            2,
            &[
                c(1.0, 1.0),
                c(0.5, 0.0),
                c(-0.3, 2.0),
                c(1.0, -1.0),
                c(0.0, 0.7),
                c(2.0, 0.1),
                c(1.5, -0.4),
                c(-1.0, 0.0),
            ],
        );
        let c_true = DVector::from_row_slice(&[c(0.9, -0.2), c(-0.05, 0.3)]);
        let y = &x * &c_true;

        let ls = solve_least_squares(&x, &y, None).unwrap();
        for (got, want) in ls.coefficients.iter().zip(c_true.iter()) {
            assert!((got - want).norm() < 1e-10, "got {got}, want {want}");
        }
    }

    #[test]
    fn rank_deficient_returns_minimum_norm() {
        // Two identical columns: any c0 + c1 = 2 fits, minimum norm is [1, 1].
        let a = [c(1.0, 0.0), c(2.0, 1.0), c(-1.0, 0.5)];
        let x = DMatrix::from_fn(3, 2, |i, _| a[i]);
        let y = DVector::from_fn(3, |i, _| a[i] * 2.0);

        let ls = solve_least_squares(&x, &y, Some(1e-10)).unwrap();
        assert_eq!(ls.info.rank, 1);
        assert!((ls.coefficients[0] - c(1.0, 0.0)).norm() < 1e-10);
        assert!((ls.coefficients[1] - c(1.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn all_zero_matrix_gives_zero_solution() {
        let x = DMatrix::from_element(4, 2, c(0.0, 0.0));
        let y = DVector::from_element(4, c(1.0, 0.0));
        let ls = solve_least_squares(&x, &y, None).unwrap();
        assert_eq!(ls.info.rank, 0);
        assert!(ls.coefficients.iter().all(|v| v.norm() == 0.0));
    }

    #[test]
    fn underdetermined_is_an_error() {
        let x = DMatrix::from_element(2, 3, c(1.0, 0.0));
        let y = DVector::from_element(2, c(1.0, 0.0));
        let err = solve_least_squares(&x, &y, None).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_SHAPE);
    }

    #[test]
    fn non_finite_input_is_an_error() {
        let mut x = DMatrix::from_element(3, 1, c(1.0, 0.0));
        x[(1, 0)] = c(f64::NAN, 0.0);
        let y = DVector::from_element(3, c(1.0, 0.0));
        let err = solve_least_squares(&x, &y, None).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NUMERIC);
    }

    #[test]
    fn negative_rcond_is_rejected() {
        assert!(effective_rcond(Some(-1.0)).is_err());
        assert_eq!(effective_rcond(None).unwrap(), f64::EPSILON);
    }
}
