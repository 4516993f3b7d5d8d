//! Candidate-peak extraction: turns the 2D magnitude map into a sparse cloud
//! of (parameter, frequency) points, one slice at a time.

use crate::domain::{CandidatePoint, PointCloud, SweepDataset};
use crate::numerics::{local_maxima, median, peak_to_peak};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetectionConfig {
    /// Minimum index separation a local maximum must dominate on both sides.
    pub detection_order: usize,
    /// Per-slice candidate cap; the brightness threshold is raised until the
    /// surviving set fits under it.
    pub max_candidates_per_slice: usize,
    /// Starting brightness threshold as a fraction of the global maximum.
    pub initial_threshold: f64,
    /// Threshold increment applied while a slice still exceeds the cap.
    pub threshold_step: f64,
    /// Fraction of the global peak-to-peak span added to the per-row median
    /// to form the absolute brightness floor.
    pub median_ptp_fraction: f64,
}

impl Default for PeakDetectionConfig {
    fn default() -> Self {
        Self {
            detection_order: 2,
            max_candidates_per_slice: 5,
            initial_threshold: 0.1,
            threshold_step: 0.01,
            median_ptp_fraction: 0.05,
        }
    }
}

/// Extracts bright local maxima from every parameter slice.
///
/// A candidate must exceed both the per-row median floor and a fraction of
/// the global maximum; the fraction grows until at most
/// `max_candidates_per_slice` survive. Raising the threshold may discard true
/// peaks, which the downstream grid search tolerates far better than excess
/// noise points.
pub fn extract_peaks(dataset: &SweepDataset, config: &PeakDetectionConfig) -> PointCloud {
    let all_magnitudes: Vec<f64> = (0..dataset.parameter_count())
        .flat_map(|index| dataset.row(index).iter().map(|value| value.abs()))
        .collect();
    let global_max = all_magnitudes.iter().fold(0.0f64, |max, &value| max.max(value));
    let global_span = peak_to_peak(&all_magnitudes);

    let mut cloud = PointCloud::default();
    for index in 0..dataset.parameter_count() {
        let row: Vec<f64> = dataset.row(index).iter().map(|value| value.abs()).collect();
        let extrema = local_maxima(&row, config.detection_order);
        if extrema.is_empty() {
            continue;
        }

        let brightness_floor = median(&row) + config.median_ptp_fraction * global_span;
        let mut threshold = config.initial_threshold;
        let mut survivors = filter_extrema(&row, &extrema, brightness_floor, threshold, global_max);
        while survivors.len() > config.max_candidates_per_slice {
            threshold += config.threshold_step;
            survivors = filter_extrema(&row, &extrema, brightness_floor, threshold, global_max);
        }

        let parameter_value = dataset.parameter_values()[index];
        for column in survivors {
            cloud.push(CandidatePoint {
                parameter_value,
                frequency_ghz: dataset.frequencies_ghz()[column],
            });
        }
    }
    cloud
}

fn filter_extrema(
    row: &[f64],
    extrema: &[usize],
    brightness_floor: f64,
    threshold: f64,
    global_max: f64,
) -> Vec<usize> {
    extrema
        .iter()
        .copied()
        .filter(|&column| row[column] > brightness_floor && row[column] > threshold * global_max)
        .collect()
}
