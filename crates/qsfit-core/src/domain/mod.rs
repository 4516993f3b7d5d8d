pub mod errors;

pub use errors::{OracleError, OracleResult};

use serde::{Deserialize, Serialize};

/// Single conversion boundary between external Hz and the GHz-scale units
/// used internally for numerical conditioning.
pub const HZ_PER_GHZ: f64 = 1e9;

/// Background-subtracted 2D magnitude map of a spectroscopy sweep.
///
/// Rows follow the swept control parameter (e.g. flux-bias current), columns
/// follow the readout frequency axis in GHz.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepDataset {
    parameter_values: Vec<f64>,
    frequencies_ghz: Vec<f64>,
    magnitudes: Vec<Vec<f64>>,
}

impl SweepDataset {
    pub fn new(
        parameter_values: Vec<f64>,
        frequencies_ghz: Vec<f64>,
        magnitudes: Vec<Vec<f64>>,
    ) -> OracleResult<Self> {
        if parameter_values.is_empty() || frequencies_ghz.is_empty() {
            return Err(OracleError::invalid_dataset(
                "parameter and frequency axes must be non-empty",
            ));
        }
        if magnitudes.len() != parameter_values.len() {
            return Err(OracleError::invalid_dataset(format!(
                "expected {} magnitude rows, got {}",
                parameter_values.len(),
                magnitudes.len()
            )));
        }
        for (index, row) in magnitudes.iter().enumerate() {
            if row.len() != frequencies_ghz.len() {
                return Err(OracleError::invalid_dataset(format!(
                    "magnitude row {} has {} columns, expected {}",
                    index,
                    row.len(),
                    frequencies_ghz.len()
                )));
            }
        }
        Ok(Self {
            parameter_values,
            frequencies_ghz,
            magnitudes,
        })
    }

    pub fn parameter_values(&self) -> &[f64] {
        &self.parameter_values
    }

    pub fn frequencies_ghz(&self) -> &[f64] {
        &self.frequencies_ghz
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_values.len()
    }

    pub fn frequency_count(&self) -> usize {
        self.frequencies_ghz.len()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.magnitudes[index]
    }
}

/// Detected resonance candidate: one bright local maximum in one slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePoint {
    pub parameter_value: f64,
    pub frequency_ghz: f64,
}

/// Bag of candidate points across all slices. Insertion order follows the
/// ascending slice index, but no stage depends on ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<CandidatePoint>,
}

impl PointCloud {
    pub fn push(&mut self, point: CandidatePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidatePoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[CandidatePoint] {
        &self.points
    }

    /// Distinct parameter values in first-seen order (exact f64 equality;
    /// slice values all originate from the same sweep axis).
    pub fn distinct_parameter_values(&self) -> Vec<f64> {
        let mut distinct: Vec<f64> = Vec::new();
        for point in &self.points {
            if !distinct.contains(&point.parameter_value) {
                distinct.push(point.parameter_value);
            }
        }
        distinct
    }

    pub fn frequencies_at(&self, parameter_value: f64) -> Vec<f64> {
        self.points
            .iter()
            .filter(|point| point.parameter_value == parameter_value)
            .map(|point| point.frequency_ghz)
            .collect()
    }
}

impl FromIterator<CandidatePoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CandidatePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Initial qubit-parameter guess in external units (frequency in Hz).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub period: f64,
    pub sweet_spot: f64,
    pub frequency_hz: f64,
    pub asymmetry: f64,
}

/// Optimized parameter vector. Frequency is rescaled back to Hz at this
/// output boundary; alpha stays in GHz like the internal search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub period: f64,
    pub sweet_spot: f64,
    pub frequency_hz: f64,
    pub asymmetry: f64,
    pub alpha_ghz: f64,
    pub loss: f64,
    /// True when every grid cell of some stage fell back to the penalty
    /// loss: the returned minimizer is not meaningful.
    pub degenerate: bool,
}
