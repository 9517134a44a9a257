use ndarray::Array2;

use crate::consts::MAD_TO_SIGMA;

/// Compute Laplacian variance of a plane; higher means sharper.
///
/// Convolves with the 3x3 Laplacian kernel:
///   0  1  0
///   1 -4  1
///   0  1  0
/// Then returns the variance of the result over the interior pixels.
/// Returns `None` for planes too small to hold a 3x3 neighborhood.
pub fn laplacian_variance(data: &Array2<f32>) -> Option<f64> {
    let (h, w) = data.dim();
    if h < 3 || w < 3 {
        return None;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let count = ((h - 2) * (w - 2)) as f64;

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let lap = -4.0 * data[[row, col]] as f64
                + data[[row - 1, col]] as f64
                + data[[row + 1, col]] as f64
                + data[[row, col - 1]] as f64
                + data[[row, col + 1]] as f64;
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let mean = sum / count;
    Some((sum_sq / count - mean * mean).max(0.0))
}

/// Robust noise sigma estimate.
///
/// Filters with the second-difference kernel
///    1 -2  1
///   -2  4 -2
///    1 -2  1
/// and scales the median absolute response by 1 / 0.6745.
pub fn noise_sigma(data: &Array2<f32>) -> Option<f64> {
    let (h, w) = data.dim();
    if h < 3 || w < 3 {
        return None;
    }

    let mut responses: Vec<f32> = Vec::with_capacity((h - 2) * (w - 2));
    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let corners = data[[row - 1, col - 1]]
                + data[[row - 1, col + 1]]
                + data[[row + 1, col - 1]]
                + data[[row + 1, col + 1]];
            let sides = data[[row - 1, col]]
                + data[[row + 1, col]]
                + data[[row, col - 1]]
                + data[[row, col + 1]];
            let v = corners - 2.0 * sides + 4.0 * data[[row, col]];
            responses.push(v.abs());
        }
    }

    let mid = responses.len() / 2;
    let (_, median, _) = responses.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    Some(*median as f64 / MAD_TO_SIGMA)
}
