//! Reconstruction error statistics (0–255 scale).

use nalgebra::Vector3;

use crate::progress::ErrorStats;

/// Per-pixel Euclidean color error, scaled to 0–255, summarized as RMSE,
/// maximum and median (mean of the two middle values for even counts).
pub fn reconstruction_stats(original: &[Vector3<f64>], reconstructed: &[Vector3<f64>]) -> ErrorStats {
    let mut errors: Vec<f64> = original
        .iter()
        .zip(reconstructed)
        .map(|(a, b)| (a - b).norm() * 255.0)
        .collect();
    if errors.is_empty() {
        return ErrorStats::default();
    }
    let n = errors.len() as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
    let max_error = errors.iter().copied().fold(0.0, f64::max);
    errors.sort_by(f64::total_cmp);
    let mid = errors.len() / 2;
    let median_error = if errors.len() % 2 == 0 {
        0.5 * (errors[mid - 1] + errors[mid])
    } else {
        errors[mid]
    };
    ErrorStats {
        rmse,
        max_error,
        median_error,
    }
}
