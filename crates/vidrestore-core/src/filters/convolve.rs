use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Separable 2D convolution: `kx` along rows, then `ky` along columns.
///
/// Borders replicate the nearest edge sample.
pub fn convolve_separable(data: &Array2<f32>, kx: &[f32], ky: &[f32]) -> Array2<f32> {
    let row_pass = convolve_rows(data, kx);
    convolve_cols(&row_pass, ky)
}

/// Convolve every row with a centered 1D kernel.
pub fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let mut result = Array2::<f32>::zeros((h, w));

    let row_fn = |row: usize, out: &mut [f32]| {
        for (col, o) in out.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_col =
                    (col as isize + ki as isize - radius as isize).clamp(0, w as isize - 1) as usize;
                sum += data[[row, src_col]] * kv;
            }
            *o = sum;
        }
    };

    run_rows(&mut result, row_fn);
    result
}

/// Convolve every column with a centered 1D kernel.
pub fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let mut result = Array2::<f32>::zeros((h, w));

    let row_fn = |row: usize, out: &mut [f32]| {
        out.iter_mut().for_each(|o| *o = 0.0);
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_row =
                (row as isize + ki as isize - radius as isize).clamp(0, h as isize - 1) as usize;
            let src = data.row(src_row);
            for (o, &s) in out.iter_mut().zip(src.iter()) {
                *o += s * kv;
            }
        }
    };

    run_rows(&mut result, row_fn);
    result
}

/// Fill `result` row by row, in parallel for large images.
pub(crate) fn run_rows<F>(result: &mut Array2<f32>, row_fn: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    let (h, w) = result.dim();
    if h == 0 || w == 0 {
        return;
    }
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut out)| {
                if let Some(slice) = out.as_slice_mut() {
                    row_fn(row, slice);
                }
            });
    } else {
        for (row, mut out) in result.axis_iter_mut(Axis(0)).enumerate() {
            if let Some(slice) = out.as_slice_mut() {
                row_fn(row, slice);
            }
        }
    }
}
