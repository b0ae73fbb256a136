//! Read/write coefficient JSON files.
//!
//! A coefficient file is the "portable" representation of a fitted model:
//! - model shape (`memory_depth`, `order`) and the solve cutoff
//! - one entry per coefficient, tagged with its `(lag, power)`
//! - fit quality figures and a timestamp
//!
//! The schema is defined by `domain::CoefficientFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use nalgebra::DVector;
use num_complex::Complex64;

use crate::domain::{CoefficientFile, FitQuality, ModelShape};
use crate::error::AppError;
use crate::fit::ModelFit;

const TOOL: &str = "mp";

/// Build the portable representation of a fit.
pub fn coefficient_file(fit: &ModelFit, quality: FitQuality) -> CoefficientFile {
    CoefficientFile {
        tool: TOOL.to_string(),
        fitted_at: Utc::now(),
        memory_depth: fit.shape.memory_depth,
        order: fit.shape.order,
        rcond: fit.rcond,
        terms: fit.terms(),
        quality,
    }
}

/// Rebuild the model shape and column-ordered coefficient vector.
///
/// Terms may appear in any order, but every `(lag, power)` of the shape must be
/// present exactly once.
pub fn coefficients_from_file(file: &CoefficientFile) -> Result<(ModelShape, DVector<Complex64>), AppError> {
    let shape = ModelShape::new(file.memory_depth, file.order).map_err(|e| AppError::input(e.message()))?;
    let mut slots: Vec<Option<Complex64>> = vec![None; shape.n_coefficients()];

    for term in &file.terms {
        if term.lag > shape.memory_depth || term.power == 0 || term.power > shape.order {
            return Err(AppError::input(format!(
                "Coefficient term (lag={}, power={}) is outside M={}, P={}.",
                term.lag, term.power, shape.memory_depth, shape.order
            )));
        }
        let slot = &mut slots[shape.column_index(term.lag, term.power)];
        if slot.replace(term.value).is_some() {
            return Err(AppError::input(format!(
                "Duplicate coefficient term (lag={}, power={}).",
                term.lag, term.power
            )));
        }
    }

    let values = slots
        .into_iter()
        .enumerate()
        .map(|(j, v)| {
            v.ok_or_else(|| {
                let (lag, power) = shape.term_of_column(j);
                AppError::input(format!("Missing coefficient term (lag={lag}, power={power})."))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((shape, DVector::from_vec(values)))
}

/// Write a coefficient JSON file.
pub fn write_coefficients_json(path: &Path, file: &CoefficientFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::input(format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a coefficient JSON file.
pub fn read_coefficients_json(path: &Path) -> Result<CoefficientFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let model: CoefficientFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid model JSON: {e}")))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SolveInfo, Term};

    fn sample_fit() -> ModelFit {
        let shape = ModelShape::new(1, 2).unwrap();
        ModelFit {
            shape,
            coefficients: DVector::from_fn(4, |j, _| Complex64::new(j as f64 + 0.5, -(j as f64))),
            rcond: f64::EPSILON,
            info: SolveInfo { rows: 20, rank: 4, condition_number: 3.0 },
            nmse_extraction_db: Some(-35.0),
        }
    }

    #[test]
    fn file_rebuilds_coefficient_vector() {
        let fit = sample_fit();
        let file = coefficient_file(&fit, FitQuality { nmse_extraction_db: Some(-35.0), nmse_validation_db: None });
        let (shape, coefficients) = coefficients_from_file(&file).unwrap();
        assert_eq!(shape, fit.shape);
        assert_eq!(coefficients, fit.coefficients);
    }

    #[test]
    fn json_round_trip() {
        let fit = sample_fit();
        let file = coefficient_file(&fit, FitQuality { nmse_extraction_db: Some(-35.0), nmse_validation_db: Some(-33.0) });
        let path = std::env::temp_dir().join(format!("mp_model_{}_coefs.json", std::process::id()));
        write_coefficients_json(&path, &file).unwrap();
        let back = read_coefficients_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, file);
    }

    #[test]
    fn missing_and_duplicate_terms_are_rejected() {
        let fit = sample_fit();
        let quality = FitQuality { nmse_extraction_db: None, nmse_validation_db: None };

        let mut file = coefficient_file(&fit, quality);
        file.terms.pop();
        assert!(coefficients_from_file(&file).is_err());

        let mut file = coefficient_file(&fit, quality);
        file.terms[3] = Term { lag: 0, power: 1, value: Complex64::new(0.0, 0.0) };
        assert!(coefficients_from_file(&file).is_err());

        let mut file = coefficient_file(&fit, quality);
        file.terms[0].power = 3;
        assert!(coefficients_from_file(&file).is_err());
    }
}
