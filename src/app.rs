//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the stderr log subscriber
//! - runs extraction + validation, or applies a saved model, or synthesizes data
//! - prints reports/plots
//! - writes optional exports

use std::io::Write;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{ApplyArgs, Command, FitArgs, ShapeArgs, SynthArgs};
use crate::domain::{FitConfig, ModelShape, SynthConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Apply(args) => handle_apply(args),
        Command::Synth(args) => handle_synth(args),
    }
}

/// Log to stderr so stdout carries only results.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. from an embedding host) is harmless; keep the first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    if run.fit.info.rank < run.fit.shape.n_coefficients() {
        warn!(
            rank = run.fit.info.rank,
            coefficients = run.fit.shape.n_coefficients(),
            "regressor is rank-deficient; using the minimum-norm solution"
        );
    }

    write_fit_report(&run, &config, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())
        .map_err(|e| AppError::input(format!("Failed to write report: {e}")))?;

    // Optional exports.
    if let Some(path) = &config.export_prediction {
        crate::io::export::write_prediction_csv(path, &run.prediction, Some(run.validation.output.as_slice()))?;
        info!(path = %path.display(), "wrote prediction CSV");
    }
    if let Some(path) = &config.export_model {
        let file = crate::io::coefs::coefficient_file(&run.fit, run.quality);
        crate::io::coefs::write_coefficients_json(path, &file)?;
        info!(path = %path.display(), "wrote model JSON");
    }

    Ok(())
}

/// Print the fit results.
///
/// `out` carries the prediction; the summary and plot go to `diag`, unless
/// `--summary-only` makes them the sole `out` content.
fn write_fit_report(
    run: &pipeline::RunOutput,
    config: &FitConfig,
    out: &mut impl Write,
    diag: &mut impl Write,
) -> std::io::Result<()> {
    let summary_sink: &mut dyn Write = if config.summary_only { &mut *out } else { &mut *diag };
    writeln!(summary_sink, "{}", crate::report::format_run_summary(run))?;

    if config.plot {
        let first = run.prediction.first_index;
        let end = run.prediction.indices().end;
        let plot = crate::plot::render_am_am(
            &run.validation.input[first..end],
            &run.validation.output[first..end],
            run.prediction.samples.as_slice(),
            config.plot_width,
            config.plot_height,
        );
        writeln!(summary_sink, "{plot}")?;
    }

    if !config.summary_only {
        write!(out, "{}", crate::report::format_prediction(&run.prediction))?;
    }
    Ok(())
}

fn handle_apply(args: ApplyArgs) -> Result<(), AppError> {
    let model = crate::io::coefs::read_coefficients_json(&args.model)?;
    let run = pipeline::run_apply(&model, &args.input)?;

    eprint!("{}", crate::report::format_apply_summary(&run));
    print!("{}", crate::report::format_prediction(&run.prediction));

    if let Some(path) = &args.export {
        crate::io::export::write_prediction_csv(path, &run.prediction, run.signal.output.as_deref())?;
        info!(path = %path.display(), "wrote prediction CSV");
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = synth_config_from_args(&args)?;
    let signal = crate::data::generate_signal(&config)?;
    crate::io::export::write_signal_csv(&config.out, &signal)?;
    println!("Wrote {} samples to {}", signal.len(), config.out.display());
    Ok(())
}

fn shape_from_args(args: ShapeArgs) -> Result<ModelShape, AppError> {
    ModelShape::new(args.memory_depth, args.order).map_err(|e| AppError::input(e.message()))
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    Ok(FitConfig {
        extraction: args.extraction.clone(),
        validation: args.validation.clone(),
        shape: shape_from_args(args.shape)?,
        rcond: args.rcond,
        summary_only: args.summary_only,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_prediction: args.export.clone(),
        export_model: args.export_model.clone(),
    })
}

pub fn synth_config_from_args(args: &SynthArgs) -> Result<SynthConfig, AppError> {
    Ok(SynthConfig {
        out: args.out.clone(),
        samples: args.samples,
        seed: args.seed,
        shape: shape_from_args(args.shape)?,
        rms: args.rms,
        snr_db: args.snr_db,
    })
}
