use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

use crate::consts::{COLOR_CHANNEL_COUNT, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::luma_of;

/// Patch half-size (3x3 patches).
const PATCH_RADIUS: isize = 1;
/// Search half-size (7x7 window).
const SEARCH_RADIUS: isize = 3;

/// Non-local means denoising of an RGB image in [0, 255].
///
/// Patch similarity is measured on luma; the weighted average is taken over
/// all three channels. `h` is the filter strength in 8-bit levels.
pub fn non_local_means(data: &Array3<f32>, h: f32) -> Array3<f32> {
    let (height, width, _) = data.dim();
    if h <= 0.0 || height == 0 || width == 0 {
        return data.clone();
    }

    let luma = luma_of(data);
    let patch_len = ((2 * PATCH_RADIUS + 1) * (2 * PATCH_RADIUS + 1)) as f32;
    let inv_h2 = 1.0 / (h * h);

    let mut result = Array3::<f32>::zeros(data.raw_dim());
    let row_fn = |row: usize, mut out: ndarray::ArrayViewMut2<f32>| {
        for col in 0..width {
            let mut acc = [0.0f32; COLOR_CHANNEL_COUNT];
            let mut wsum = 0.0f32;
            for dy in -SEARCH_RADIUS..=SEARCH_RADIUS {
                for dx in -SEARCH_RADIUS..=SEARCH_RADIUS {
                    let (r, c) = clamp_at(&luma, row as isize + dy, col as isize + dx);
                    let dist = patch_distance(&luma, (row, col), (r, c)) / patch_len;
                    let weight = (-dist * inv_h2).exp();
                    for (ch, a) in acc.iter_mut().enumerate() {
                        *a += data[[r, c, ch]] * weight;
                    }
                    wsum += weight;
                }
            }
            for (ch, a) in acc.iter().enumerate() {
                out[[col, ch]] = a / wsum;
            }
        }
    };

    if height * width >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| row_fn(row, out));
    } else {
        for (row, out) in result.axis_iter_mut(Axis(0)).enumerate() {
            row_fn(row, out);
        }
    }
    result
}

fn clamp_at(plane: &Array2<f32>, row: isize, col: isize) -> (usize, usize) {
    let (h, w) = plane.dim();
    (
        row.clamp(0, h as isize - 1) as usize,
        col.clamp(0, w as isize - 1) as usize,
    )
}

/// Sum of squared differences between the patches centered at `a` and `b`.
fn patch_distance(plane: &Array2<f32>, a: (usize, usize), b: (usize, usize)) -> f32 {
    let mut sum = 0.0f32;
    for dy in -PATCH_RADIUS..=PATCH_RADIUS {
        for dx in -PATCH_RADIUS..=PATCH_RADIUS {
            let pa = clamp_at(plane, a.0 as isize + dy, a.1 as isize + dx);
            let pb = clamp_at(plane, b.0 as isize + dy, b.1 as isize + dx);
            let d = plane[[pa.0, pa.1]] - plane[[pb.0, pb.1]];
            sum += d * d;
        }
    }
    sum
}
