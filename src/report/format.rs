//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use num_complex::Complex64;

use crate::app::pipeline::{ApplyOutput, RunOutput};
use crate::fit::{ModelFit, Prediction};

/// Format the full run summary (dataset sizes, solve diagnostics, NMSE, coefficients).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();
    let fit = &run.fit;

    out.push_str("=== mp - Memory Polynomial PA Model ===\n");
    out.push_str(&format!(
        "Model: M={} (taps 0..={}) | P={} | coefficients={}\n",
        fit.shape.memory_depth,
        fit.shape.memory_depth,
        fit.shape.order,
        fit.shape.n_coefficients()
    ));
    out.push_str(&format!(
        "Samples: extraction={} | validation={} | trim={} per end\n",
        run.extraction.len(),
        run.validation.len(),
        fit.shape.trim_width()
    ));
    out.push_str(&format!(
        "Solve: rows={} | rank={}/{} | cond={} | rcond={:.3e}\n",
        fit.info.rows,
        fit.info.rank,
        fit.shape.n_coefficients(),
        fmt_cond(fit.info.condition_number),
        fit.rcond
    ));
    out.push_str(&format!("NMSE extraction: {}\n", fmt_nmse(run.quality.nmse_extraction_db)));
    out.push_str(&format!("NMSE validation: {}\n", fmt_nmse(run.quality.nmse_validation_db)));

    out.push_str("\nCoefficients:\n");
    out.push_str(&format_coefficients(fit));
    out
}

/// Format the summary of applying a saved model.
pub fn format_apply_summary(run: &ApplyOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Applied M={} P={} model to {} samples ({} predicted)\n",
        run.shape.memory_depth,
        run.shape.order,
        run.signal.input.len(),
        run.prediction.samples.len()
    ));
    if let Some(v) = run.nmse_db {
        out.push_str(&format!("NMSE: {v:.2} dB\n"));
    }
    out
}

/// Coefficient table, one row per `(lag, power)` in column order.
pub fn format_coefficients(fit: &ModelFit) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>4} {:>5} {:>16} {:>16} {:>12}\n", "lag", "power", "re", "im", "|c|"));
    out.push_str(&format!("{:->4} {:->5} {:->16} {:->16} {:->12}\n", "", "", "", "", ""));
    for term in fit.terms() {
        out.push_str(&format!(
            "{:>4} {:>5} {:>16.8e} {:>16.8e} {:>12.4e}\n",
            term.lag,
            term.power,
            term.value.re,
            term.value.im,
            term.value.norm()
        ));
    }
    out
}

/// One predicted sample per line: `index re im`.
pub fn format_prediction(prediction: &Prediction) -> String {
    let mut out = String::with_capacity(prediction.samples.len() * 48);
    for (index, v) in prediction.indices().zip(prediction.samples.iter()) {
        out.push_str(&format!("{index} {}\n", fmt_complex(*v)));
    }
    out
}

fn fmt_complex(v: Complex64) -> String {
    format!("{:+.10e}{:+.10e}j", v.re, v.im)
}

fn fmt_nmse(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2} dB"),
        None => "n/a (zero-energy target)".to_string(),
    }
}

fn fmt_cond(c: f64) -> String {
    if c.is_finite() { format!("{c:.3e}") } else { "inf".to_string() }
}
