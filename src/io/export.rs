//! CSV exports: signal files and model predictions.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts,
//! and signal files round-trip through `io::ingest`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use num_complex::Complex64;

use crate::domain::SignalPair;
use crate::error::AppError;
use crate::fit::Prediction;

/// Write a signal pair in the ingest format (`in_re,in_im,out_re,out_im`).
pub fn write_signal_csv(path: &Path, signal: &SignalPair) -> Result<(), AppError> {
    let mut file = create(path, "signal CSV")?;
    write_signal(&mut file, signal).map_err(|e| AppError::input(format!("Failed to write signal CSV: {e}")))?;
    file.flush()
        .map_err(|e| AppError::input(format!("Failed to write signal CSV: {e}")))
}

/// Write predicted samples, with the measured samples alongside when available.
///
/// `measured` is the untrimmed measured output; rows are aligned by sample index.
pub fn write_prediction_csv(
    path: &Path,
    prediction: &Prediction,
    measured: Option<&[Complex64]>,
) -> Result<(), AppError> {
    if let Some(measured) = measured {
        if prediction.indices().end > measured.len() {
            return Err(AppError::shape(format!(
                "Prediction covers samples up to {} but the measured signal has {}.",
                prediction.indices().end,
                measured.len()
            )));
        }
    }
    let mut file = create(path, "prediction CSV")?;
    write_prediction(&mut file, prediction, measured)
        .map_err(|e| AppError::input(format!("Failed to write prediction CSV: {e}")))?;
    file.flush()
        .map_err(|e| AppError::input(format!("Failed to write prediction CSV: {e}")))
}

fn create(path: &Path, what: &str) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create {what} '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn write_signal(out: &mut impl Write, signal: &SignalPair) -> std::io::Result<()> {
    writeln!(out, "in_re,in_im,out_re,out_im")?;
    for (x, y) in signal.input.iter().zip(&signal.output) {
        writeln!(out, "{:.17e},{:.17e},{:.17e},{:.17e}", x.re, x.im, y.re, y.im)?;
    }
    Ok(())
}

fn write_prediction(
    out: &mut impl Write,
    prediction: &Prediction,
    measured: Option<&[Complex64]>,
) -> std::io::Result<()> {
    match measured {
        Some(_) => writeln!(out, "index,pred_re,pred_im,meas_re,meas_im")?,
        None => writeln!(out, "index,pred_re,pred_im")?,
    }
    for (index, p) in prediction.indices().zip(prediction.samples.iter()) {
        write!(out, "{index},{:.17e},{:.17e}", p.re, p.im)?;
        if let Some(m) = measured.map(|m| m[index]) {
            write!(out, ",{:.17e},{:.17e}", m.re, m.im)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
