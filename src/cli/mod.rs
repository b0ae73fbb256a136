//! Command-line parsing for the memory-polynomial modeling tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{DEFAULT_MEMORY_DEPTH, DEFAULT_ORDER};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mp", version, about = "Memory-polynomial power amplifier behavioral modeling")]
pub struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract coefficients from one measurement and predict another.
    Fit(FitArgs),
    /// Apply a previously exported model to a signal file.
    Apply(ApplyArgs),
    /// Generate a synthetic amplifier measurement.
    Synth(SynthArgs),
}

/// Model shape options shared by `fit` and `synth`.
#[derive(Debug, Args, Clone, Copy)]
pub struct ShapeArgs {
    /// Memory depth M (taps at lags 0..=M).
    #[arg(short = 'M', long, default_value_t = DEFAULT_MEMORY_DEPTH)]
    pub memory_depth: usize,

    /// Polynomial order P (powers |x|^0..|x|^(P-1)).
    #[arg(short = 'P', long, default_value_t = DEFAULT_ORDER)]
    pub order: usize,
}

/// Options for `mp fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Extraction signal CSV (`in_re,in_im,out_re,out_im`).
    #[arg(long, value_name = "CSV")]
    pub extraction: PathBuf,

    /// Validation signal CSV (`in_re,in_im,out_re,out_im`).
    #[arg(long, value_name = "CSV")]
    pub validation: PathBuf,

    #[command(flatten)]
    pub shape: ShapeArgs,

    /// Relative singular-value cutoff (default: machine epsilon).
    #[arg(long)]
    pub rcond: Option<f64>,

    /// Print only the summary (to stdout), not the predicted samples.
    ///
    /// Without it the summary goes to stderr and stdout carries the prediction.
    #[arg(long)]
    pub summary_only: bool,

    /// Render an ASCII AM/AM plot of the validation prediction.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the validation prediction to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted coefficients to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

/// Options for `mp apply`.
#[derive(Debug, Parser, Clone)]
pub struct ApplyArgs {
    /// Model JSON produced by `mp fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Signal CSV; `out_re,out_im` columns are optional.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Export the prediction to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for `mp synth`.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Output signal CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = 4096)]
    pub samples: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub shape: ShapeArgs,

    /// RMS magnitude of the input signal.
    #[arg(long, default_value_t = 0.3)]
    pub rms: f64,

    /// Output signal-to-noise ratio (dB).
    #[arg(long = "snr-db", default_value_t = 50.0)]
    pub snr_db: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults_match_reference_model() {
        let cli = Cli::parse_from(["mp", "fit", "--extraction", "a.csv", "--validation", "b.csv"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.shape.memory_depth, 1);
        assert_eq!(args.shape.order, 5);
        assert!(args.rcond.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn shape_and_verbosity_flags_parse() {
        let cli = Cli::parse_from(["mp", "-vv", "synth", "--out", "s.csv", "-M", "2", "-P", "7", "--seed", "9"]);
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        assert_eq!((args.shape.memory_depth, args.shape.order, args.seed), (2, 7, 9));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
