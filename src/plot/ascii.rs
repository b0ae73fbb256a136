//! ASCII AM/AM plot for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of amplifier compression in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements (x = |input|, y = |output|):
//! - measured samples: `o`
//! - model samples: `*` (drawn last, so they win shared cells)

use num_complex::Complex64;

/// Render an AM/AM scatter for aligned input/measured/model samples.
///
/// All three slices must be index-aligned; extra samples in the longer slices
/// are ignored. `model` may be empty to plot the measurement alone.
pub fn render_am_am(
    input: &[Complex64],
    measured: &[Complex64],
    model: &[Complex64],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let measured_pts = magnitudes(input, measured);
    let model_pts = magnitudes(input, model);

    let (x_min, x_max) = range(measured_pts.iter().chain(&model_pts).map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(measured_pts.iter().chain(&model_pts).map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = pad_range(x_min, x_max, 0.05);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (points, ch) in [(&measured_pts, 'o'), (&model_pts, '*')] {
        for &(x, y) in points.iter() {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "AM/AM: |in|=[{x_min:.4}, {x_max:.4}] | |out|=[{y_min:.4}, {y_max:.4}] | o=measured *=model\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn magnitudes(input: &[Complex64], output: &[Complex64]) -> Vec<(f64, f64)> {
    input
        .iter()
        .zip(output)
        .map(|(x, y)| (x.norm(), y.norm()))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}
