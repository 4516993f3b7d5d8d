use crate::domain::{OracleError, OracleResult};

/// One immutable search axis: `steps` evenly spaced values spanning
/// `[start, stop]` inclusive. A single-step axis collapses to `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub start: f64,
    pub stop: f64,
    pub steps: usize,
}

impl GridAxis {
    pub fn new(name: &'static str, start: f64, stop: f64, steps: usize) -> OracleResult<Self> {
        if !start.is_finite() || !stop.is_finite() {
            return Err(OracleError::invalid_grid(
                name,
                format!("bounds must be finite, got [{start}, {stop}]"),
            ));
        }
        if steps == 0 {
            return Err(OracleError::invalid_grid(name, "step count must be >= 1"));
        }
        Ok(Self { start, stop, steps })
    }

    pub fn values(&self) -> Vec<f64> {
        if self.steps == 1 {
            return vec![self.start];
        }
        let span = self.stop - self.start;
        let denominator = (self.steps - 1) as f64;
        (0..self.steps)
            .map(|index| self.start + span * index as f64 / denominator)
            .collect()
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.stop) / 2.0
    }
}

/// Minimizing grid point of an exhaustive sweep, verbatim from the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMinimum {
    pub params: Vec<f64>,
    pub loss: f64,
}

/// Exhaustively evaluates `loss` over the cartesian product of `axes` and
/// returns the first grid point attaining the minimum. Non-finite losses are
/// never selected over finite ones. The loss surface is discontinuous and
/// multi-modal, so no gradient or polish step is applied.
pub fn minimize_grid<F>(axes: &[GridAxis], mut loss: F) -> GridMinimum
where
    F: FnMut(&[f64]) -> f64,
{
    let axis_values: Vec<Vec<f64>> = axes.iter().map(GridAxis::values).collect();
    let mut indices = vec![0usize; axes.len()];
    let mut params = vec![0.0f64; axes.len()];

    let mut best_params = Vec::new();
    let mut best_loss = f64::INFINITY;
    let mut any_finite = false;

    loop {
        for (slot, &index) in indices.iter().enumerate() {
            params[slot] = axis_values[slot][index];
        }
        let value = loss(&params);
        let better = if value.is_finite() {
            !any_finite || value < best_loss
        } else {
            best_params.is_empty()
        };
        if better {
            best_loss = value;
            best_params = params.clone();
            any_finite |= value.is_finite();
        }

        // Odometer increment over the last axis first.
        let mut slot = indices.len();
        loop {
            if slot == 0 {
                return GridMinimum {
                    params: best_params,
                    loss: best_loss,
                };
            }
            slot -= 1;
            indices[slot] += 1;
            if indices[slot] < axis_values[slot].len() {
                break;
            }
            indices[slot] = 0;
        }
    }
}

/// Total number of grid cells swept over `axes`.
pub fn cell_count(axes: &[GridAxis]) -> usize {
    axes.iter().map(|axis| axis.steps).product()
}

#[cfg(test)]
mod tests {
    use super::{GridAxis, cell_count, minimize_grid};
    use crate::domain::OracleError;

    #[test]
    fn axis_values_span_bounds_inclusively() {
        let axis = GridAxis::new("freq", 1.0, 2.0, 5).expect("valid axis");
        let values = axis.values();
        assert_eq!(values, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
    }

    #[test]
    fn single_step_axis_collapses_to_start() {
        let axis = GridAxis::new("d", 0.4, 0.6, 1).expect("valid axis");
        assert_eq!(axis.values(), vec![0.4]);
    }

    #[test]
    fn axis_rejects_zero_steps_and_non_finite_bounds() {
        assert!(matches!(
            GridAxis::new("alpha", 0.0, 1.0, 0),
            Err(OracleError::InvalidGrid { axis: "alpha", .. })
        ));
        assert!(GridAxis::new("alpha", f64::NAN, 1.0, 3).is_err());
    }

    #[test]
    fn minimizer_finds_the_grid_argmin_of_a_paraboloid() {
        let axes = [
            GridAxis::new("a", -2.0, 2.0, 5).expect("valid axis"),
            GridAxis::new("b", -1.0, 3.0, 5).expect("valid axis"),
        ];
        let minimum = minimize_grid(&axes, |params| {
            (params[0] - 1.0).powi(2) + (params[1] - 2.0).powi(2)
        });
        assert_eq!(minimum.params, vec![1.0, 2.0]);
        assert_eq!(minimum.loss, 0.0);
        assert_eq!(cell_count(&axes), 25);
    }

    #[test]
    fn minimizer_prefers_finite_losses_over_nan_cells() {
        let axes = [GridAxis::new("a", 0.0, 3.0, 4).expect("valid axis")];
        let minimum = minimize_grid(&axes, |params| {
            if params[0] < 1.5 {
                f64::NAN
            } else {
                params[0]
            }
        });
        assert_eq!(minimum.params, vec![2.0]);
        assert_eq!(minimum.loss, 2.0);
    }

    #[test]
    fn minimizer_keeps_the_first_of_tied_minima() {
        let axes = [GridAxis::new("a", 0.0, 4.0, 5).expect("valid axis")];
        let minimum = minimize_grid(&axes, |_| 1.0);
        assert_eq!(minimum.params, vec![0.0]);
    }
}
