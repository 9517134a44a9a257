use ndarray::{Array2, Zip};

use crate::filters::convolve::convolve_separable;

/// Mean over a `(2 * radius + 1)` square window.
pub fn box_mean(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let size = 2 * radius + 1;
    let kernel = vec![1.0 / size as f32; size];
    convolve_separable(data, &kernel, &kernel)
}

/// Local standard deviation over a `size x size` window.
pub fn local_std(data: &Array2<f32>, size: usize) -> Array2<f32> {
    let radius = size / 2;
    let mean = box_mean(data, radius);
    let sq = data.mapv(|v| v * v);
    let mean_sq = box_mean(&sq, radius);
    Zip::from(&mean)
        .and(&mean_sq)
        .map_collect(|&m, &m2| (m2 - m * m).max(0.0).sqrt())
}
