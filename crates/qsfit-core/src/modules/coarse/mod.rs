//! Coarse fit stage: 2D brute-force sweep over (center frequency, asymmetry)
//! with period and sweet spot pinned at the initial guess.

use crate::domain::PointCloud;
use crate::numerics::grid::{GridAxis, GridMinimum, cell_count, minimize_grid};
use crate::progress::{FitStage, ProgressCounter, ProgressReporter};
use crate::spectra::SpectrumModelFn;

/// Transmon asymmetry values beyond this are treated as a degenerate region
/// the optimizer must not settle in.
pub const DEGENERATE_ASYMMETRY_LIMIT: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoarseFit {
    pub frequency_ghz: f64,
    pub asymmetry: f64,
    pub loss: f64,
    /// True when no grid cell satisfied the chosen-point quorum anywhere.
    pub degenerate: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn coarse_fit(
    points: &PointCloud,
    fixed_period: f64,
    fixed_sweet_spot: f64,
    frequency_axis: GridAxis,
    asymmetry_axis: GridAxis,
    tolerance_ghz: f64,
    slice_count: usize,
    model: SpectrumModelFn,
    reporter: &dyn ProgressReporter,
) -> CoarseFit {
    let axes = [frequency_axis, asymmetry_axis];
    let mut counter = ProgressCounter::new(cell_count(&axes));
    let mut any_quorum = false;

    let GridMinimum { params, loss } = minimize_grid(&axes, |candidate| {
        let evaluation = coarse_loss(
            points,
            fixed_period,
            fixed_sweet_spot,
            candidate[0],
            candidate[1],
            tolerance_ghz,
            slice_count,
            model,
        );
        any_quorum |= !evaluation.fallback;
        counter.advance();
        reporter.on_cell(
            FitStage::Coarse,
            counter,
            candidate,
            evaluation.loss,
            evaluation.chosen_count,
        );
        evaluation.loss
    });

    if !any_quorum {
        reporter.on_degenerate(FitStage::Coarse);
    }

    CoarseFit {
        frequency_ghz: params[0],
        asymmetry: params[1],
        loss,
        degenerate: !any_quorum,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CoarseLoss {
    pub loss: f64,
    pub chosen_count: usize,
    pub fallback: bool,
}

/// Robust coarse loss. Points within `tolerance_ghz` of the model are
/// "chosen"; with fewer than a third of the slices matched, or with the
/// asymmetry in its degenerate region, the squared sum of all residuals acts
/// as a penalty surface. Otherwise the loss rewards both closeness and the
/// number of matched points.
#[allow(clippy::too_many_arguments)]
pub(crate) fn coarse_loss(
    points: &PointCloud,
    period: f64,
    sweet_spot: f64,
    frequency_ghz: f64,
    asymmetry: f64,
    tolerance_ghz: f64,
    slice_count: usize,
    model: SpectrumModelFn,
) -> CoarseLoss {
    let mut total_residual = 0.0;
    let mut chosen_sum = 0.0;
    let mut chosen_count = 0usize;

    for point in points.iter() {
        let predicted = model(
            point.parameter_value,
            period,
            sweet_spot,
            frequency_ghz,
            asymmetry,
        );
        let residual = (predicted - point.frequency_ghz).abs();
        total_residual += residual;
        if residual < tolerance_ghz {
            chosen_sum += residual;
            chosen_count += 1;
        }
    }

    let quorum = slice_count as f64 / 3.0;
    let fallback = (chosen_count as f64) < quorum || asymmetry > DEGENERATE_ASYMMETRY_LIMIT;
    let loss = if fallback {
        total_residual * total_residual
    } else {
        chosen_sum / ((chosen_count + 1) as f64).powi(2)
    };

    CoarseLoss {
        loss,
        chosen_count,
        fallback,
    }
}
