//! Reporting utilities: error metrics and formatted terminal output.

pub mod format;

pub use format::*;

use num_complex::Complex64;

use tracing::warn;

use crate::error::AppError;

/// NMSE in dB, or `None` when the measured signal has zero energy.
///
/// Scoring is a report, not part of the solve: an all-zero target still has a
/// valid (all-zero) model, so an undefined score must not abort the run.
pub fn nmse_db_if_defined(measured: &[Complex64], predicted: &[Complex64]) -> Result<Option<f64>, AppError> {
    if measured.len() == predicted.len() && measured.iter().all(|y| y.norm_sqr() == 0.0) {
        warn!(samples = measured.len(), "measured signal has zero energy; NMSE not reported");
        return Ok(None);
    }
    nmse_db(measured, predicted).map(Some)
}

/// Normalized mean square error in dB: `10·log10(Σ|y-ŷ|² / Σ|y|²)`.
pub fn nmse_db(measured: &[Complex64], predicted: &[Complex64]) -> Result<f64, AppError> {
    if measured.len() != predicted.len() {
        return Err(AppError::shape(format!(
            "Cannot compare {} measured samples with {} predicted samples.",
            measured.len(),
            predicted.len()
        )));
    }
    let energy: f64 = measured.iter().map(|y| y.norm_sqr()).sum();
    if energy <= 0.0 {
        return Err(AppError::numeric("Measured signal has zero energy; NMSE is undefined."));
    }
    let error: f64 = measured
        .iter()
        .zip(predicted)
        .map(|(y, y_hat)| (y - y_hat).norm_sqr())
        .sum();

    // A perfect fit gives -inf; clamp to a finite floor so it can be reported.
    let nmse = 10.0 * (error / energy).max(f64::MIN_POSITIVE).log10();
    if !nmse.is_finite() {
        return Err(AppError::numeric("Non-finite NMSE."));
    }
    Ok(nmse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nmse_of_ten_percent_error_is_minus_twenty_db() {
        let y = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        let y_hat: Vec<Complex64> = y.iter().map(|v| *v * 1.1).collect();
        let nmse = nmse_db(&y, &y_hat).unwrap();
        assert!((nmse + 20.0).abs() < 1e-9, "got {nmse}");
    }

    #[test]
    fn perfect_fit_is_finite() {
        let y = vec![Complex64::new(0.5, -0.5); 4];
        assert!(nmse_db(&y, &y).unwrap() < -300.0);
    }

    #[test]
    fn zero_energy_is_rejected() {
        let y = vec![Complex64::new(0.0, 0.0); 3];
        assert!(nmse_db(&y, &y).is_err());
    }

    #[test]
    fn zero_energy_score_is_skipped() {
        let y = vec![Complex64::new(0.0, 0.0); 3];
        let y_hat = vec![Complex64::new(0.1, 0.0); 3];
        assert_eq!(nmse_db_if_defined(&y, &y_hat).unwrap(), None);
        assert!(nmse_db_if_defined(&y, &y_hat[..2]).is_err());
        let v = vec![Complex64::new(1.0, 0.0); 3];
        assert!(nmse_db_if_defined(&v, &v).unwrap().is_some());
    }
}
