//! Fine fit stage: 5D brute-force sweep over all model parameters plus the
//! sub-harmonic spacing, scoring the main transition together with two
//! demoted branch copies.

use crate::domain::PointCloud;
use crate::numerics::grid::{GridAxis, GridMinimum, cell_count, minimize_grid};
use crate::progress::{FitStage, ProgressCounter, ProgressReporter};
use crate::spectra::SpectrumModelFn;

/// Branch weights encode that the main transition dominates fit quality while
/// sub-harmonics only contribute lower-trust confirmatory evidence.
const SUB_HARMONIC_1_WEIGHT: f64 = 0.1;
const SUB_HARMONIC_2_WEIGHT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineAxes {
    pub period: GridAxis,
    pub sweet_spot: GridAxis,
    pub frequency: GridAxis,
    pub asymmetry: GridAxis,
    pub alpha: GridAxis,
}

impl FineAxes {
    fn as_array(&self) -> [GridAxis; 5] {
        [
            self.period,
            self.sweet_spot,
            self.frequency,
            self.asymmetry,
            self.alpha,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineFit {
    pub period: f64,
    pub sweet_spot: f64,
    pub frequency_ghz: f64,
    pub asymmetry: f64,
    pub alpha_ghz: f64,
    pub loss: f64,
    /// True when no grid cell satisfied the main-branch quorum anywhere.
    pub degenerate: bool,
}

pub fn fine_fit(
    points: &PointCloud,
    axes: &FineAxes,
    tolerance_ghz: f64,
    model: SpectrumModelFn,
    reporter: &dyn ProgressReporter,
) -> FineFit {
    let axis_array = axes.as_array();
    let mut counter = ProgressCounter::new(cell_count(&axis_array));
    let mut any_quorum = false;

    let GridMinimum { params, loss } = minimize_grid(&axis_array, |candidate| {
        let evaluation = fine_loss(points, candidate, tolerance_ghz, model);
        any_quorum |= !evaluation.fallback;
        counter.advance();
        reporter.on_cell(
            FitStage::Fine,
            counter,
            candidate,
            evaluation.loss,
            evaluation.total_hits,
        );
        evaluation.loss
    });

    if !any_quorum {
        reporter.on_degenerate(FitStage::Fine);
    }

    FineFit {
        period: params[0],
        sweet_spot: params[1],
        frequency_ghz: params[2],
        asymmetry: params[3],
        alpha_ghz: params[4],
        loss,
        degenerate: !any_quorum,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FineLoss {
    pub loss: f64,
    pub total_hits: usize,
    pub fallback: bool,
}

/// Multi-branch loss over `[period, sweet_spot, frequency, asymmetry, alpha]`.
///
/// For every distinct parameter value the nearest same-slice point is scored
/// against the main transition and against copies demoted by `alpha` and
/// `2*alpha`; a branch hit only counts when that nearest residual is inside
/// the tolerance. Too few main-branch hits engage the squared total-residual
/// penalty, same rationale as the coarse stage.
pub(crate) fn fine_loss(
    points: &PointCloud,
    params: &[f64],
    tolerance_ghz: f64,
    model: SpectrumModelFn,
) -> FineLoss {
    let [period, sweet_spot, frequency_ghz, asymmetry, alpha] =
        [params[0], params[1], params[2], params[3], params[4]];
    let distinct = points.distinct_parameter_values();

    let mut main_sum = 0.0;
    let mut main_hits = 0usize;
    let mut sub1_sum = 0.0;
    let mut sub1_hits = 0usize;
    let mut sub2_sum = 0.0;
    let mut sub2_hits = 0usize;
    let mut unfiltered_main_total = 0.0;

    for &x in &distinct {
        let predicted = model(x, period, sweet_spot, frequency_ghz, asymmetry);
        let mut nearest_main = f64::INFINITY;
        let mut nearest_sub1 = f64::INFINITY;
        let mut nearest_sub2 = f64::INFINITY;

        for frequency in points.frequencies_at(x) {
            let main_residual = (predicted - frequency).abs();
            unfiltered_main_total += main_residual;
            nearest_main = nearest_main.min(main_residual);
            nearest_sub1 = nearest_sub1.min((predicted - alpha - frequency).abs());
            nearest_sub2 = nearest_sub2.min((predicted - 2.0 * alpha - frequency).abs());
        }

        if nearest_main < tolerance_ghz {
            main_sum += nearest_main;
            main_hits += 1;
        }
        if nearest_sub1 < tolerance_ghz {
            sub1_sum += nearest_sub1;
            sub1_hits += 1;
        }
        if nearest_sub2 < tolerance_ghz {
            sub2_sum += nearest_sub2;
            sub2_hits += 1;
        }
    }

    let total_hits = main_hits + sub1_hits + sub2_hits;
    let quorum = distinct.len() as f64 / 3.0;
    if (main_hits as f64) < quorum {
        return FineLoss {
            loss: unfiltered_main_total * unfiltered_main_total,
            total_hits,
            fallback: true,
        };
    }

    let mut loss = main_sum / (main_hits + 1) as f64
        + SUB_HARMONIC_1_WEIGHT * sub1_sum / (sub1_hits + 1) as f64
        + SUB_HARMONIC_2_WEIGHT * sub2_sum / (sub2_hits + 1) as f64;
    loss /= (total_hits as f64).powi(2);

    FineLoss {
        loss,
        total_hits,
        fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::{FineAxes, fine_fit, fine_loss};
    use crate::domain::{CandidatePoint, PointCloud};
    use crate::numerics::grid::GridAxis;
    use crate::progress::SilentProgress;
    use crate::spectra::transmon_spectrum;

    const PERIOD: f64 = 1e-3;
    const F_MAX: f64 = 5.0;
    const D: f64 = 0.5;
    const ALPHA: f64 = 0.11;

    fn slice_positions(count: usize) -> Vec<f64> {
        (0..count)
            .map(|index| -0.25e-3 + 0.5e-3 * index as f64 / (count - 1) as f64)
            .collect()
    }

    fn main_branch_points(count: usize) -> PointCloud {
        slice_positions(count)
            .into_iter()
            .map(|x| CandidatePoint {
                parameter_value: x,
                frequency_ghz: transmon_spectrum(x, PERIOD, 0.0, F_MAX, D),
            })
            .collect()
    }

    fn multi_branch_points(count: usize) -> PointCloud {
        let mut cloud = PointCloud::default();
        for x in slice_positions(count) {
            let main = transmon_spectrum(x, PERIOD, 0.0, F_MAX, D);
            for branch in 0..3 {
                cloud.push(CandidatePoint {
                    parameter_value: x,
                    frequency_ghz: main - branch as f64 * ALPHA,
                });
            }
        }
        cloud
    }

    fn truth_params() -> Vec<f64> {
        vec![PERIOD, 0.0, F_MAX, D, ALPHA]
    }

    #[test]
    fn exact_parameters_give_near_zero_loss_with_all_branches_hit() {
        let points = multi_branch_points(9);
        let evaluation = fine_loss(&points, &truth_params(), 50e-3, transmon_spectrum);
        assert!(!evaluation.fallback);
        assert_eq!(evaluation.total_hits, 27);
        assert!(evaluation.loss < 1e-12);
    }

    #[test]
    fn fallback_engages_monotonically_as_tolerance_shrinks() {
        let points = main_branch_points(9);
        // Slightly detuned frequency: residuals ~15 MHz on every slice.
        let params = vec![PERIOD, 0.0, F_MAX + 0.015, D, ALPHA];

        let wide = fine_loss(&points, &params, 50e-3, transmon_spectrum);
        let narrow = fine_loss(&points, &params, 1e-3, transmon_spectrum);
        assert!(!wide.fallback);
        assert!(narrow.fallback);
        assert!(narrow.loss > wide.loss);
    }

    #[test]
    fn loss_is_invariant_to_point_ordering() {
        let points = multi_branch_points(7);
        let mut shuffled: Vec<CandidatePoint> = points.points().to_vec();
        shuffled.reverse();
        shuffled.swap(0, 5);
        let shuffled: PointCloud = shuffled.into_iter().collect();

        let first = fine_loss(&points, &truth_params(), 50e-3, transmon_spectrum);
        let second = fine_loss(&shuffled, &truth_params(), 50e-3, transmon_spectrum);
        assert_eq!(first.loss, second.loss);
        assert_eq!(first.total_hits, second.total_hits);
    }

    #[test]
    fn sub_harmonic_branches_refine_but_never_dominate() {
        let points = multi_branch_points(9);
        let good = fine_loss(&points, &truth_params(), 50e-3, transmon_spectrum);
        // Wrong alpha loses the sub-harmonic hits but keeps the main branch.
        let wrong_alpha = vec![PERIOD, 0.0, F_MAX, D, 0.3];
        let detuned = fine_loss(&points, &wrong_alpha, 50e-3, transmon_spectrum);
        assert!(!detuned.fallback);
        assert!(good.loss <= detuned.loss);
        assert!(good.total_hits > detuned.total_hits);
    }

    #[test]
    fn exhaustive_sweep_recovers_all_five_parameters() {
        let points = multi_branch_points(9);
        let axes = FineAxes {
            period: GridAxis::new("period", 0.95 * PERIOD, 1.05 * PERIOD, 5).expect("axis"),
            sweet_spot: GridAxis::new("sweet_spot", -0.01 * PERIOD, 0.01 * PERIOD, 5)
                .expect("axis"),
            frequency: GridAxis::new("frequency", 0.975 * F_MAX, 1.025 * F_MAX, 5).expect("axis"),
            asymmetry: GridAxis::new("asymmetry", 0.95 * D, 1.05 * D, 5).expect("axis"),
            alpha: GridAxis::new("alpha", 0.10, 0.12, 5).expect("axis"),
        };

        let fit = fine_fit(&points, &axes, 50e-3, transmon_spectrum, &SilentProgress);
        assert!(!fit.degenerate);
        assert!((fit.period - PERIOD).abs() < 1e-6 * PERIOD);
        assert!(fit.sweet_spot.abs() < 1e-9);
        assert!((fit.frequency_ghz - F_MAX).abs() < 1e-6);
        assert!((fit.asymmetry - D).abs() < 1e-6);
        assert!((fit.alpha_ghz - ALPHA).abs() < 1e-6);
    }
}
