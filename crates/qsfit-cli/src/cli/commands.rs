use super::CliError;
use super::helpers::{load_record, render_fit_summary, write_json_report};
use qsfit_core::domain::InitialGuess;
use qsfit_core::modules::oracle::SpectrumOracle;
use qsfit_core::progress::{ConsoleProgress, ProgressReporter, SilentProgress};
use qsfit_core::spectra::ModelRegistry;
use serde::Serialize;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct SweepInput {
    /// Sweep record JSON path
    pub record: PathBuf,

    /// Qubit model kind to fit
    #[arg(long, default_value = "transmon")]
    pub qubit_type: String,
}

#[derive(clap::Args)]
pub(super) struct GuessArgs {
    /// Initial flux-period guess, in parameter units
    #[arg(long)]
    pub period: f64,

    /// Initial sweet-spot guess, in parameter units
    #[arg(long, default_value_t = 0.0)]
    pub sweet_spot: f64,

    /// Initial maximum-frequency guess [Hz]
    #[arg(long)]
    pub frequency: f64,

    /// Initial junction-asymmetry guess
    #[arg(long)]
    pub asymmetry: f64,
}

impl GuessArgs {
    fn as_guess(&self) -> InitialGuess {
        InitialGuess {
            period: self.period,
            sweet_spot: self.sweet_spot,
            frequency_hz: self.frequency,
            asymmetry: self.asymmetry,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct FitArgs {
    #[command(flatten)]
    input: SweepInput,

    #[command(flatten)]
    guess: GuessArgs,

    /// Stream per-cell grid-search progress to stderr
    #[arg(long)]
    progress: bool,

    /// Write the fit result as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct FitReport<'a> {
    qubit_type: &'a str,
    result: qsfit_core::domain::FitResult,
}

pub(super) fn run_fit_command(args: FitArgs) -> Result<i32, CliError> {
    let record = load_record(&args.input.record)?;
    let registry = ModelRegistry::default();
    let oracle = SpectrumOracle::new(
        &args.input.qubit_type,
        &registry,
        &record,
        &args.guess.as_guess(),
    )?;

    let reporter: &dyn ProgressReporter = if args.progress {
        &ConsoleProgress
    } else {
        &SilentProgress
    };
    let result = oracle.run(reporter)?;
    if args.progress {
        // The in-place progress line never prints a trailing newline.
        eprintln!();
    }
    if result.degenerate {
        tracing::warn!("fit is degenerate: every grid cell used the penalty loss");
    }

    println!("{}", render_fit_summary(&args.input.qubit_type, &result));
    if let Some(report_path) = &args.report {
        let report = FitReport {
            qubit_type: &args.input.qubit_type,
            result,
        };
        write_json_report(report_path, &report)?;
        tracing::info!(path = %report_path.display(), "fit report written");
    }
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct PeaksArgs {
    #[command(flatten)]
    input: SweepInput,

    #[command(flatten)]
    guess: GuessArgs,
}

pub(super) fn run_peaks_command(args: PeaksArgs) -> Result<i32, CliError> {
    let record = load_record(&args.input.record)?;
    let registry = ModelRegistry::default();
    let oracle = SpectrumOracle::new(
        &args.input.qubit_type,
        &registry,
        &record,
        &args.guess.as_guess(),
    )?;

    let points = oracle.extract_points()?;
    tracing::info!(count = points.len(), "candidate peaks extracted");
    println!("{:>24} {:>20}", "parameter", "frequency [Hz]");
    for point in points.iter() {
        println!(
            "{:>24.6e} {:>20.6e}",
            point.parameter_value,
            point.frequency_ghz * qsfit_core::domain::HZ_PER_GHZ
        );
    }
    Ok(0)
}
