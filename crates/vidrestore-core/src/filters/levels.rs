use ndarray::{Array2, Array3};

use crate::color::process::process_channels;
use crate::consts::{EPSILON, MAX_INTENSITY};

/// Linear `v * alpha + beta`, saturated to [0, 255].
pub fn scale_abs(data: &Array3<f32>, alpha: f32, beta: f32) -> Array3<f32> {
    data.mapv(|v| (v * alpha + beta).clamp(0.0, MAX_INTENSITY))
}

/// Linear stretch of a plane: maps [black_point, white_point] to [0, 255].
pub fn histogram_stretch(plane: &Array2<f32>, black_point: f32, white_point: f32) -> Array2<f32> {
    let range = white_point - black_point;
    let range = if range.abs() < EPSILON { 1.0 } else { range };
    plane.mapv(|v| ((v - black_point) / range * MAX_INTENSITY).clamp(0.0, MAX_INTENSITY))
}

/// Value at `fraction` (0.0..=1.0) of the sorted samples.
pub fn percentile(plane: &Array2<f32>, fraction: f32) -> f32 {
    let mut sorted: Vec<f32> = plane.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let idx = ((n as f32 - 1.0) * fraction.clamp(0.0, 1.0)).round() as usize;
    sorted[idx.min(n - 1)]
}

/// Per-channel percentile stretch.
///
/// Channels whose percentile range is degenerate are left unchanged.
pub fn auto_levels(data: &Array3<f32>, low_percentile: f32, high_percentile: f32) -> Array3<f32> {
    process_channels(data, |_, plane| {
        let lo = percentile(plane, low_percentile);
        let hi = percentile(plane, high_percentile);
        if hi - lo < 1.0 {
            plane.clone()
        } else {
            histogram_stretch(plane, lo, hi)
        }
    })
}
