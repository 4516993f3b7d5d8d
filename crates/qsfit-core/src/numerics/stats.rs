/// Median of a sample; even-length samples average the two middle values.
/// Empty samples return 0.0 (flat-row guard, never hit with validated data).
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Peak-to-peak span (max - min), 0.0 for empty samples.
pub fn peak_to_peak(values: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if min > max { 0.0 } else { max - min }
}

/// Indices of local maxima: points strictly exceeding every neighbor within
/// `order` samples on both sides. Out-of-range neighbor indices clamp to the
/// row bounds, so boundary samples never qualify (a clamped comparison
/// degenerates to `row[i] > row[i]`).
pub fn local_maxima(row: &[f64], order: usize) -> Vec<usize> {
    let len = row.len();
    let mut maxima = Vec::new();
    for index in 0..len {
        let mut is_max = order >= 1 && len > 1;
        for offset in 1..=order {
            let left = index.saturating_sub(offset);
            let right = (index + offset).min(len - 1);
            if !(row[index] > row[left] && row[index] > row[right]) {
                is_max = false;
                break;
            }
        }
        if is_max {
            maxima.push(index);
        }
    }
    maxima
}
