//! CSV ingest for measured signals.
//!
//! A signal file holds one complex sample per row:
//!
//! ```text
//! in_re,in_im,out_re,out_im
//! 0.0132,-0.0041,0.0139,-0.0037
//! ...
//! ```
//!
//! Design goals:
//! - **Strict schema**: the `in_*` columns are required; `out_*` columns are
//!   required for extraction/validation and optional when only applying a model
//! - **Strict rows**: a bad value aborts the load with its line number; rows are
//!   never skipped, since dropping a sample would break the time alignment
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use num_complex::Complex64;
use tracing::{debug, info};

use crate::domain::SignalPair;
use crate::error::AppError;

const IN_RE: &str = "in_re";
const IN_IM: &str = "in_im";
const OUT_RE: &str = "out_re";
const OUT_IM: &str = "out_im";

/// A loaded signal whose output columns may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedSignal {
    pub input: Vec<Complex64>,
    pub output: Option<Vec<Complex64>>,
}

impl IngestedSignal {
    /// Require the output columns and convert to a `SignalPair`.
    pub fn into_pair(self, source: &str) -> Result<SignalPair, AppError> {
        let output = self
            .output
            .ok_or_else(|| AppError::input(format!("'{source}' has no `{OUT_RE}`/`{OUT_IM}` columns.")))?;
        SignalPair::new(self.input, output)
    }
}

/// Load a signal file that must contain both input and output columns.
pub fn load_signal_pair(path: &Path) -> Result<SignalPair, AppError> {
    load_signal(path)?.into_pair(&path.display().to_string())
}

/// Load a signal file; output columns are optional.
pub fn load_signal(path: &Path) -> Result<IngestedSignal, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let signal = read_signal(file, &path.display().to_string())?;
    info!(
        path = %path.display(),
        samples = signal.input.len(),
        has_output = signal.output.is_some(),
        "loaded signal"
    );
    Ok(signal)
}

/// Parse a signal CSV from any reader. `source` is only used in messages.
pub fn read_signal<R: Read>(reader: R, source: &str) -> Result<IngestedSignal, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers of '{source}': {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let in_cols = (
        require_column(&header_map, IN_RE, source)?,
        require_column(&header_map, IN_IM, source)?,
    );
    let out_cols = match (header_map.get(OUT_RE), header_map.get(OUT_IM)) {
        (Some(&re), Some(&im)) => Some((re, im)),
        (None, None) => None,
        _ => {
            return Err(AppError::input(format!(
                "'{source}' must have both `{OUT_RE}` and `{OUT_IM}` columns, or neither."
            )));
        }
    };

    let mut input = Vec::new();
    let mut output = out_cols.map(|_| Vec::new());

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::input(format!("{source}:{line}: CSV parse error: {e}")))?;

        input.push(parse_complex(&record, in_cols, source, line)?);
        if let (Some(cols), Some(out)) = (out_cols, output.as_mut()) {
            out.push(parse_complex(&record, cols, source, line)?);
        }
    }

    if input.is_empty() {
        return Err(AppError::input(format!("'{source}' contains no samples.")));
    }
    debug!(source, samples = input.len(), "parsed signal csv");

    Ok(IngestedSignal { input, output })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str, source: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::input(format!("Missing required column in '{source}': `{name}`")))
}

fn parse_complex(
    record: &StringRecord,
    (re_idx, im_idx): (usize, usize),
    source: &str,
    line: usize,
) -> Result<Complex64, AppError> {
    let re = parse_f64(record, re_idx).map_err(|e| AppError::input(format!("{source}:{line}: {e}")))?;
    let im = parse_f64(record, im_idx).map_err(|e| AppError::input(format!("{source}:{line}: {e}")))?;
    Ok(Complex64::new(re, im))
}

fn parse_f64(record: &StringRecord, idx: usize) -> Result<f64, String> {
    let s = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value in column {}", idx + 1))?;
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("invalid number '{s}' in column {}", idx + 1))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite value '{s}' in column {}", idx + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_signal() {
        let csv = "in_re,in_im,out_re,out_im\n1,0,2,0.5\n-0.5,0.25,1,-1\n";
        let signal = read_signal(csv.as_bytes(), "mem").unwrap();
        assert_eq!(signal.input, vec![Complex64::new(1.0, 0.0), Complex64::new(-0.5, 0.25)]);
        assert_eq!(
            signal.output,
            Some(vec![Complex64::new(2.0, 0.5), Complex64::new(1.0, -1.0)])
        );
    }

    #[test]
    fn headers_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}IN_RE, In_Im ,note\n1,2,x\n";
        let signal = read_signal(csv.as_bytes(), "mem").unwrap();
        assert_eq!(signal.input, vec![Complex64::new(1.0, 2.0)]);
        assert!(signal.output.is_none());
        assert!(signal.into_pair("mem").is_err());
    }

    #[test]
    fn bad_value_reports_line() {
        let csv = "in_re,in_im\n1,0\n1,abc\n";
        let err = read_signal(csv.as_bytes(), "mem").unwrap_err();
        assert!(err.message().contains("mem:3"), "{err}");
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let csv = "in_re,in_im\nNaN,0\n";
        assert!(read_signal(csv.as_bytes(), "mem").is_err());
    }

    #[test]
    fn half_output_columns_are_rejected() {
        let csv = "in_re,in_im,out_re\n1,0,1\n";
        assert!(read_signal(csv.as_bytes(), "mem").is_err());
    }

    #[test]
    fn empty_file_is_rejected() {
        let csv = "in_re,in_im,out_re,out_im\n";
        assert!(read_signal(csv.as_bytes(), "mem").is_err());
    }
}
