//! Synthetic power-amplifier measurements.
//!
//! The input is complex Gaussian (a reasonable stand-in for a wideband
//! OFDM-like drive signal) and the output is a reference memory polynomial
//! plus complex Gaussian measurement noise at a chosen SNR.

use nalgebra::DVector;
use num_complex::Complex64;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{ModelShape, SignalPair, SynthConfig};
use crate::error::AppError;
use crate::models::{build_regressor, predict};

/// Odd-order reference coefficients for lags 0..=2, powers 1, 3 and 5.
///
/// Values follow the classic class-AB memory-polynomial example used in the
/// digital predistortion literature (mild AM/PM, compressive fifth-order term).
const REFERENCE_ODD: [[(f64, f64); 3]; 3] = [
    [(1.0513, 0.0904), (-0.0542, -0.2900), (-0.9657, -0.7028)],
    [(-0.0680, -0.0023), (0.2234, 0.2317), (-0.2451, -0.3735)],
    [(0.0289, -0.0054), (-0.0621, -0.0932), (0.1229, 0.1508)],
];

/// Attenuation applied per lag beyond the tabulated ones.
const LAG_DECAY: f64 = 0.5;

/// Reference coefficient for `(lag, power)`; even powers and powers above 5 are zero.
pub fn reference_coefficient(lag: usize, power: usize) -> Complex64 {
    if power % 2 == 0 || power > 5 {
        return Complex64::new(0.0, 0.0);
    }
    let k = power / 2;
    let tabulated = lag.min(REFERENCE_ODD.len() - 1);
    let (re, im) = REFERENCE_ODD[tabulated][k];
    let extra = (lag - tabulated) as i32;
    Complex64::new(re, im) * LAG_DECAY.powi(extra)
}

/// Reference coefficient vector in regressor column order.
pub fn reference_coefficients(shape: ModelShape) -> DVector<Complex64> {
    DVector::from_fn(shape.n_coefficients(), |j, _| {
        let (lag, power) = shape.term_of_column(j);
        reference_coefficient(lag, power)
    })
}

/// Generate a deterministic synthetic input/output pair.
pub fn generate_signal(config: &SynthConfig) -> Result<SignalPair, AppError> {
    config.shape.validate()?;
    if config.samples < config.shape.min_trimmed_len() {
        return Err(AppError::input(format!(
            "Sample count must be >= {} for memory depth {}.",
            config.shape.min_trimmed_len(),
            config.shape.memory_depth
        )));
    }
    if !(config.rms.is_finite() && config.rms > 0.0) {
        return Err(AppError::input("Input RMS must be finite and > 0."));
    }
    if !config.snr_db.is_finite() {
        return Err(AppError::input("SNR must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let unit = Normal::new(0.0, 1.0).map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;

    // Split the power evenly between I and Q.
    let sigma_in = config.rms / std::f64::consts::SQRT_2;
    let input: Vec<Complex64> = (0..config.samples)
        .map(|_| Complex64::new(unit.sample(&mut rng), unit.sample(&mut rng)) * sigma_in)
        .collect();

    let x = build_regressor(&input, config.shape)?;
    let clean = predict(&x, &reference_coefficients(config.shape))?;

    let signal_power = clean.iter().map(|v| v.norm_sqr()).sum::<f64>() / clean.len() as f64;
    let noise_power = signal_power / 10f64.powf(config.snr_db / 10.0);
    let sigma_noise = (noise_power / 2.0).sqrt();

    let output: Vec<Complex64> = clean
        .iter()
        .map(|&y| y + Complex64::new(unit.sample(&mut rng), unit.sample(&mut rng)) * sigma_noise)
        .collect();

    info!(
        samples = config.samples,
        seed = config.seed,
        rms = config.rms,
        snr_db = config.snr_db,
        "generated synthetic signal"
    );

    SignalPair::new(input, output)
}
