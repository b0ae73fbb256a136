//! Shared "fit pipeline" logic used by the `fit` and `apply` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> regressor -> trim -> least squares -> apply to validation -> score
//!
//! The command handlers can then focus on presentation (printing and exports).

use num_complex::Complex64;
use tracing::info;

use crate::domain::{CoefficientFile, FitConfig, FitQuality, ModelShape, SignalPair};
use crate::error::AppError;
use crate::fit::{ModelFit, Prediction, apply_model, fit_model};
use crate::io::coefs::coefficients_from_file;
use crate::io::ingest::{IngestedSignal, load_signal, load_signal_pair};
use crate::models::trim_samples;
use crate::report::nmse_db_if_defined;

/// All computed outputs of a single `mp fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub extraction: SignalPair,
    pub validation: SignalPair,
    pub fit: ModelFit,
    pub prediction: Prediction,
    pub quality: FitQuality,
}

/// Outputs of applying a saved model to a new signal.
#[derive(Debug, Clone)]
pub struct ApplyOutput {
    pub signal: IngestedSignal,
    pub shape: ModelShape,
    pub prediction: Prediction,
    pub nmse_db: Option<f64>,
}

/// Execute the full pipeline: load both datasets, fit, predict, score.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let extraction = load_signal_pair(&config.extraction)?;
    let validation = load_signal_pair(&config.validation)?;
    run_fit_with_signals(config.shape, config.rcond, extraction, validation)
}

/// Execute the pipeline on already-loaded signals.
pub fn run_fit_with_signals(
    shape: ModelShape,
    rcond: Option<f64>,
    extraction: SignalPair,
    validation: SignalPair,
) -> Result<RunOutput, AppError> {
    info!(
        extraction = extraction.len(),
        validation = validation.len(),
        memory_depth = shape.memory_depth,
        order = shape.order,
        "fitting memory polynomial"
    );

    let fit = fit_model(&extraction, shape, rcond)?;
    let prediction = apply_model(&validation.input, shape, &fit.coefficients)?;
    let nmse_validation_db = score_prediction(&validation.output, &prediction, shape)?;
    info!(nmse_db = ?nmse_validation_db, "validation complete");

    let quality = FitQuality {
        nmse_extraction_db: fit.nmse_extraction_db,
        nmse_validation_db,
    };

    Ok(RunOutput {
        extraction,
        validation,
        fit,
        prediction,
        quality,
    })
}

/// Apply a saved coefficient file to a signal loaded from disk.
pub fn run_apply(model: &CoefficientFile, input: &std::path::Path) -> Result<ApplyOutput, AppError> {
    let (shape, coefficients) = coefficients_from_file(model)?;
    let signal = load_signal(input)?;
    let prediction = apply_model(&signal.input, shape, &coefficients)?;
    let nmse_db = match &signal.output {
        Some(output) => score_prediction(output, &prediction, shape)?,
        None => None,
    };

    Ok(ApplyOutput {
        signal,
        shape,
        prediction,
        nmse_db,
    })
}

fn score_prediction(
    measured: &[Complex64],
    prediction: &Prediction,
    shape: ModelShape,
) -> Result<Option<f64>, AppError> {
    let measured = trim_samples(measured, shape.trim_width())?;
    nmse_db_if_defined(measured.as_slice(), prediction.samples.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::generate_signal;
    use crate::domain::SynthConfig;

    fn synth(seed: u64, samples: usize) -> SignalPair {
        let config = SynthConfig {
            out: std::path::PathBuf::new(),
            samples,
            seed,
            shape: ModelShape::default(),
            rms: 0.5,
            snr_db: 60.0,
        };
        generate_signal(&config).unwrap()
    }

    #[test]
    fn fit_generalizes_to_independent_validation_signal() {
        let run = run_fit_with_signals(ModelShape::default(), None, synth(1, 2000), synth(2, 1500)).unwrap();

        assert_eq!(run.fit.coefficients.len(), 10);
        assert_eq!(run.prediction.samples.len(), 1500 - 8);
        // 60 dB SNR: both figures should sit close to the noise floor.
        assert!(run.quality.nmse_extraction_db.unwrap() < -50.0, "{:?}", run.quality);
        let val = run.quality.nmse_validation_db.unwrap();
        assert!(val < -50.0, "validation nmse {val}");
    }

    #[test]
    fn zero_validation_output_still_predicts() {
        let mut validation = synth(4, 600);
        validation.output.iter_mut().for_each(|y| *y = Complex64::new(0.0, 0.0));

        let run = run_fit_with_signals(ModelShape::default(), None, synth(3, 1000), validation).unwrap();
        assert_eq!(run.prediction.samples.len(), 600 - 8);
        assert!(run.prediction.samples.iter().any(|v| v.norm() > 0.0));
        assert_eq!(run.quality.nmse_validation_db, None);
        assert!(run.quality.nmse_extraction_db.is_some());
    }
}
