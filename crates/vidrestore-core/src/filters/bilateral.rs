use ndarray::{Array3, Axis};
use rayon::prelude::*;

use crate::consts::{COLOR_CHANNEL_COUNT, PARALLEL_PIXEL_THRESHOLD};

/// Edge-preserving bilateral filter on an RGB image in [0, 255].
///
/// `diameter` is the neighborhood width; only offsets inside the inscribed
/// circle contribute. Color distance is the L1 distance over the three
/// channels.
pub fn bilateral_filter(
    data: &Array3<f32>,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Array3<f32> {
    let (h, w, _) = data.dim();
    let radius = (diameter / 2).max(1) as isize;

    let mut offsets: Vec<(isize, isize, f32)> = Vec::new();
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dy * dy + dx * dx) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            offsets.push((dy, dx, (r2 * space_coeff).exp()));
        }
    }

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let lut_len = COLOR_CHANNEL_COUNT * 256;
    let color_lut: Vec<f32> = (0..lut_len)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let mut result = Array3::<f32>::zeros((h, w, COLOR_CHANNEL_COUNT));

    let row_fn = |row: usize, mut out: ndarray::ArrayViewMut2<f32>| {
        for col in 0..w {
            let center = [data[[row, col, 0]], data[[row, col, 1]], data[[row, col, 2]]];
            let mut acc = [0.0f32; 3];
            let mut wsum = 0.0f32;
            for &(dy, dx, ws) in &offsets {
                let r = (row as isize + dy).clamp(0, h as isize - 1) as usize;
                let c = (col as isize + dx).clamp(0, w as isize - 1) as usize;
                let px = [data[[r, c, 0]], data[[r, c, 1]], data[[r, c, 2]]];
                let dist = (px[0] - center[0]).abs()
                    + (px[1] - center[1]).abs()
                    + (px[2] - center[2]).abs();
                let idx = (dist.round() as usize).min(lut_len - 1);
                let weight = ws * color_lut[idx];
                acc[0] += px[0] * weight;
                acc[1] += px[1] * weight;
                acc[2] += px[2] * weight;
                wsum += weight;
            }
            for ch in 0..COLOR_CHANNEL_COUNT {
                out[[col, ch]] = if wsum > 0.0 { acc[ch] / wsum } else { center[ch] };
            }
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
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
