use ndarray::Array2;

use crate::consts::{ALIASING_EDGE_MAGNITUDE, BLOCK_GRID, BLOCK_STEP_MAX};
use crate::detection::morphology::dilate;
use crate::filters::edges::{canny, gradient_direction, gradient_magnitude, sobel};

/// Codec block sizes whose boundaries are scanned.
const BLOCK_SIZES: [usize; 2] = [BLOCK_GRID, BLOCK_GRID * 2];

/// Mean boundary step across 8- and 16-pixel block grids.
///
/// Only steps in (0, `BLOCK_STEP_MAX`] count, and pixels near genuine edges
/// (dilated Canny mask) are excluded. Returns 0 when no boundary qualifies
/// and `None` for planes smaller than one macroblock.
pub fn block_artifact_score(gray: &Array2<f32>) -> Option<f64> {
    let (h, w) = gray.dim();
    if h <= BLOCK_GRID * 2 || w <= BLOCK_GRID * 2 {
        return None;
    }

    let edges = dilate(&canny(gray, 45.0, 110.0), 2);

    let mut sum = 0.0f64;
    let mut count = 0usize;
    let mut take = |a: f32, b: f32, on_edge: bool| {
        let step = (a - b).abs();
        if !on_edge && step > 0.0 && step <= BLOCK_STEP_MAX {
            sum += step as f64;
            count += 1;
        }
    };

    for &size in &BLOCK_SIZES {
        for col in (size..w).step_by(size) {
            for row in 0..h {
                take(gray[[row, col - 1]], gray[[row, col]], edges[[row, col]]);
            }
        }
        for row in (size..h).step_by(size) {
            for col in 0..w {
                take(gray[[row - 1, col]], gray[[row, col]], edges[[row, col]]);
            }
        }
    }

    if count == 0 {
        Some(0.0)
    } else {
        Some(sum / count as f64)
    }
}

/// Gradient-direction discontinuity along strong edges, in [0, 1].
///
/// Mean absolute direction difference between horizontally and vertically
/// adjacent strong-edge pixels, averaged over both axes.
pub fn aliasing_score(gray: &Array2<f32>) -> Option<f64> {
    let (h, w) = gray.dim();
    if h < 3 || w < 3 {
        return None;
    }

    let (gx, gy) = sobel(gray);
    let mag = gradient_magnitude(&gx, &gy);
    let dir = gradient_direction(&gx, &gy);

    let axis_mean = |dr: usize, dc: usize| -> f64 {
        let mut sum = 0.0f64;
        let mut n = 0usize;
        for row in dr..h {
            for col in dc..w {
                let (pr, pc) = (row - dr, col - dc);
                if mag[[row, col]] > ALIASING_EDGE_MAGNITUDE && mag[[pr, pc]] > ALIASING_EDGE_MAGNITUDE {
                    sum += (dir[[row, col]] - dir[[pr, pc]]).abs() as f64;
                    n += 1;
                }
            }
        }
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    };

    let (along_x, along_y) = rayon::join(|| axis_mean(0, 1), || axis_mean(1, 0));
    Some(((along_x + along_y) / 2.0).min(1.0))
}
