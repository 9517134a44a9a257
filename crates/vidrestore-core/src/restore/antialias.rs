use std::f32::consts::{FRAC_PI_2, PI};

use ndarray::{Array2, Array3, Zip};

use crate::color::process::process_channels;
use crate::error::Result;
use crate::filters::convolve::{convolve_cols, convolve_rows};
use crate::filters::edges::{gradient_direction, gradient_magnitude, sobel};
use crate::filters::gaussian_blur::{gaussian_blur_rgb_sized, gaussian_blur_sized};
use crate::frame::{blend_masked, Frame};

use super::{Stage, StageContext, StageKind};

/// Gradient magnitude mapped to full edge strength.
const EDGE_SCALE: f32 = 80.0;
/// Neighbor difference that counts as a staircase step.
const STEP_THRESHOLD: f32 = 8.0;
/// Angular tolerance (radians) for axis alignment.
const AXIS_TOLERANCE: f32 = 0.3;
/// Minimum summed mask weight before an axis is interpolated.
const MIN_JAGGED_MASS: f32 = 100.0;
const INTERP_KERNEL: [f32; 5] = [0.15, 0.2, 0.3, 0.2, 0.15];
const STRONG_EDGE: f32 = 0.2;

/// Step 3: smooth staircase edges along the perpendicular axis, then lightly
/// smooth strong edges tangentially.
pub struct AntiAlias;

impl Stage for AntiAlias {
    fn kind(&self) -> StageKind {
        StageKind::AntiAlias
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        let p = ctx.profile;
        let gray = frame.luma();
        let (gx, gy) = sobel(&gray);
        let edge_strength = gradient_magnitude(&gx, &gy).mapv(|m| (m / EDGE_SCALE).clamp(0.0, 1.0));
        let direction = gradient_direction(&gx, &gy);

        let (diff_h, diff_v) = neighbor_steps(&gray);
        let jagged = |diff: &Array2<f32>| {
            Zip::from(diff)
                .and(&edge_strength)
                .map_collect(|&d, &e| if d > STEP_THRESHOLD { e } else { 0.0 })
        };
        let jagged_h = jagged(&diff_h);
        let jagged_v = jagged(&diff_v);

        let near_horizontal = direction.mapv(|d| {
            if d.abs() < AXIS_TOLERANCE || d.abs() > PI - AXIS_TOLERANCE {
                1.0
            } else {
                0.0
            }
        });
        let near_vertical = direction.mapv(|d| {
            if (d.abs() - FRAC_PI_2).abs() < AXIS_TOLERANCE {
                1.0
            } else {
                0.0
            }
        });

        let mut result = frame.to_f32();
        let amount = p.aa_strength * 0.5;

        let h_mask = jagged_v * &near_horizontal;
        if h_mask.sum() > MIN_JAGGED_MASS {
            let interp = process_channels(&result, |_, plane| convolve_cols(plane, &INTERP_KERNEL));
            result = blend_masked(&result, &interp, &h_mask.mapv(|m| m * amount));
        }

        let v_mask = jagged_h * &near_vertical;
        if v_mask.sum() > MIN_JAGGED_MASS {
            let interp = process_channels(&result, |_, plane| convolve_rows(plane, &INTERP_KERNEL));
            result = blend_masked(&result, &interp, &v_mask.mapv(|m| m * amount));
        }

        let strong = edge_strength.mapv(|e| if e > STRONG_EDGE { 1.0 } else { 0.0 });
        let edge_region = gaussian_blur_sized(&strong, 3, 0.5);
        let tangent = gaussian_blur_rgb_sized(&result, 3, 0.5);
        let weight = edge_region.mapv(|e| (e * p.edge_refine * 0.15).clamp(0.0, 1.0));
        let result: Array3<f32> = blend_masked(&result, &tangent, &weight);

        Ok(frame.with_f32(&result))
    }
}

/// Absolute difference to the left and upper neighbor; zero on the first column/row.
fn neighbor_steps(gray: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = gray.dim();
    let mut diff_h = Array2::<f32>::zeros((h, w));
    let mut diff_v = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            if col > 0 {
                diff_h[[row, col]] = (gray[[row, col]] - gray[[row, col - 1]]).abs();
            }
            if row > 0 {
                diff_v[[row, col]] = (gray[[row, col]] - gray[[row - 1, col]]).abs();
            }
        }
    }
    (diff_h, diff_v)
}
