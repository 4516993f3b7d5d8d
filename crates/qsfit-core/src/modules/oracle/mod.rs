//! Spectrum oracle: orchestrates peak extraction and the coarse-to-fine grid
//! search, owning the grid configuration derived from the initial guess.

pub mod parser;

use crate::domain::{
    FitResult, HZ_PER_GHZ, InitialGuess, OracleError, OracleResult, PointCloud, SweepDataset,
};
use crate::modules::coarse::{CoarseFit, coarse_fit};
use crate::modules::fine::{FineAxes, fine_fit};
use crate::modules::peaks::{PeakDetectionConfig, extract_peaks};
use crate::numerics::grid::GridAxis;
use crate::progress::ProgressReporter;
use crate::spectra::{ModelRegistry, SpectrumModelFn, evaluate_over};
use serde_json::Value;

/// Base residual tolerance in GHz; the coarse stage doubles it to stay
/// robust against initial-guess error.
pub const Y_SCAN_AREA_SIZE_GHZ: f64 = 50e-3;
const COARSE_TOLERANCE_FACTOR: f64 = 2.0;

const COARSE_FREQUENCY_STEPS: usize = 50;
const FINE_STEPS: usize = 5;

/// Search axes derived once from the initial guess, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleGrids {
    pub period: GridAxis,
    pub sweet_spot: GridAxis,
    pub frequency: GridAxis,
    pub asymmetry: GridAxis,
    pub alpha: GridAxis,
}

impl OracleGrids {
    fn from_guess(guess: &InitialGuess) -> OracleResult<Self> {
        let period = guess.period;
        let sweet_spot = guess.sweet_spot;
        let frequency_ghz = guess.frequency_hz / HZ_PER_GHZ;
        let d = guess.asymmetry;

        Ok(Self {
            period: GridAxis::new("period", 0.98 * period, 1.02 * period, 3)?,
            sweet_spot: GridAxis::new(
                "sweet_spot",
                sweet_spot - 0.02 * period,
                sweet_spot + 0.02 * period,
                5,
            )?,
            frequency: GridAxis::new(
                "frequency",
                0.7 * frequency_ghz,
                1.3 * frequency_ghz,
                COARSE_FREQUENCY_STEPS,
            )?,
            asymmetry: GridAxis::new("asymmetry", 0.9 * d, 1.1 * d, 5)?,
            alpha: GridAxis::new("alpha", 100e-3, 120e-3, 5)?,
        })
    }
}

#[derive(Debug)]
pub struct SpectrumOracle {
    model: SpectrumModelFn,
    dataset: SweepDataset,
    grids: OracleGrids,
    seed_period: f64,
    seed_sweet_spot: f64,
    tolerance_ghz: f64,
    peak_config: PeakDetectionConfig,
}

impl SpectrumOracle {
    /// Resolves the model kind (before any data is touched), extracts the
    /// sweep dataset from the record and derives the search grids from the
    /// initial guess. Extraction failures therefore surface here, at
    /// construction, rather than from [`Self::run`].
    pub fn new(
        qubit_type: &str,
        registry: &ModelRegistry,
        record: &Value,
        guess: &InitialGuess,
    ) -> OracleResult<Self> {
        let model = registry.resolve(qubit_type)?;
        let dataset = parser::extract_dataset(record)?;
        let grids = OracleGrids::from_guess(guess)?;
        Ok(Self {
            model,
            dataset,
            seed_period: grids.period.midpoint(),
            seed_sweet_spot: grids.sweet_spot.midpoint(),
            grids,
            tolerance_ghz: Y_SCAN_AREA_SIZE_GHZ,
            peak_config: PeakDetectionConfig::default(),
        })
    }

    pub fn with_peak_config(mut self, config: PeakDetectionConfig) -> Self {
        self.peak_config = config;
        self
    }

    pub fn dataset(&self) -> &SweepDataset {
        &self.dataset
    }

    pub fn grids(&self) -> &OracleGrids {
        &self.grids
    }

    /// Runs peak extraction alone; empty clouds are fatal since a grid
    /// search on no points is degenerate everywhere.
    pub fn extract_points(&self) -> OracleResult<PointCloud> {
        let cloud = extract_peaks(&self.dataset, &self.peak_config);
        if cloud.is_empty() {
            return Err(OracleError::InsufficientPeaks);
        }
        Ok(cloud)
    }

    /// Full pipeline: peaks, coarse 2D sweep, fine 5D sweep, Hz rescale.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> OracleResult<FitResult> {
        let points = self.extract_points()?;

        let coarse = coarse_fit(
            &points,
            self.seed_period,
            self.seed_sweet_spot,
            self.grids.frequency,
            self.grids.asymmetry,
            COARSE_TOLERANCE_FACTOR * self.tolerance_ghz,
            self.dataset.parameter_count(),
            self.model,
            reporter,
        );

        let fine_axes = self.fine_axes(&coarse)?;
        let fine = fine_fit(&points, &fine_axes, self.tolerance_ghz, self.model, reporter);

        Ok(FitResult {
            period: fine.period,
            sweet_spot: fine.sweet_spot,
            frequency_hz: fine.frequency_ghz * HZ_PER_GHZ,
            asymmetry: fine.asymmetry,
            alpha_ghz: fine.alpha_ghz,
            loss: fine.loss,
            degenerate: coarse.degenerate || fine.degenerate,
        })
    }

    /// Narrowed fine-stage axes: period and sweet spot around the initial
    /// seed, frequency and asymmetry around the coarse result, alpha on its
    /// original wide axis.
    fn fine_axes(&self, coarse: &CoarseFit) -> OracleResult<FineAxes> {
        Ok(FineAxes {
            period: GridAxis::new(
                "period",
                0.95 * self.seed_period,
                1.05 * self.seed_period,
                FINE_STEPS,
            )?,
            sweet_spot: GridAxis::new(
                "sweet_spot",
                self.seed_sweet_spot - 0.01 * self.seed_period,
                self.seed_sweet_spot + 0.01 * self.seed_period,
                FINE_STEPS,
            )?,
            frequency: GridAxis::new(
                "frequency",
                0.975 * coarse.frequency_ghz,
                1.025 * coarse.frequency_ghz,
                FINE_STEPS,
            )?,
            asymmetry: GridAxis::new(
                "asymmetry",
                0.95 * coarse.asymmetry,
                1.05 * coarse.asymmetry,
                FINE_STEPS,
            )?,
            alpha: self.grids.alpha,
        })
    }

    /// Fitted curve overlays in GHz for the main transition and its two
    /// sub-harmonic branches, evaluated over `xs`. Pure side output for
    /// visualization; nothing feeds back into the fit.
    pub fn fitted_branches(&self, result: &FitResult, xs: &[f64]) -> [Vec<f64>; 3] {
        let frequency_ghz = result.frequency_hz / HZ_PER_GHZ;
        let main = evaluate_over(
            self.model,
            xs,
            result.period,
            result.sweet_spot,
            frequency_ghz,
            result.asymmetry,
        );
        let demoted = |demotion: f64| -> Vec<f64> {
            main.iter().map(|&frequency| frequency - demotion).collect()
        };
        let sub1 = demoted(result.alpha_ghz);
        let sub2 = demoted(2.0 * result.alpha_ghz);
        [main, sub1, sub2]
    }
}
