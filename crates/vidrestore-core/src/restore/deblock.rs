use ndarray::{Array2, Axis};

use crate::consts::BLOCK_GRID;
use crate::detection::morphology::{dilate, to_float};
use crate::error::Result;
use crate::filters::box_filter::local_std;
use crate::filters::edges::canny;
use crate::filters::gaussian_blur::{gaussian_blur_sized, gaussian_blur_rgb_sized};
use crate::filters::guided::guided_filter_rgb;
use crate::filters::noise::gaussian_noise;
use crate::frame::{blend_masked, Frame};

use super::{Stage, StageContext, StageKind};

/// Boundary steps at or below this are ordinary gradients, not blocking.
const MIN_BLOCK_STEP: f32 = 1.5;
/// Half-width of the mask painted around each boundary.
const BOUNDARY_SPREAD: isize = 2;
const GUIDED_RADIUS: usize = 5;
const GUIDED_EPS: f32 = 0.01;
/// Share of the re-dithered signal in banded regions.
const DEBAND_MIX: f32 = 0.65;
const DITHER_SALT: u64 = 1;

/// Step 1: smooth codec block boundaries and re-dither flat banded areas.
pub struct Deblock;

impl Stage for Deblock {
    fn kind(&self) -> StageKind {
        StageKind::Deblock
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        frame.ensure_min_size(BLOCK_GRID)?;
        let p = ctx.profile;
        let rgb = frame.to_f32();
        let gray = frame.luma();

        let edge_protect = to_float(&dilate(&canny(&gray, 45.0, 110.0), 2)).mapv(|e| 1.0 - e);

        // Deblock: guided-filter blend restricted to block boundaries.
        let mut mask = block_boundary_mask(&gray, p.deblock_threshold);
        mask *= &edge_protect;
        let mask = gaussian_blur_sized(&mask, 5, 1.0).mapv(|m| (m * p.deblock_strength).clamp(0.0, 1.0));
        let smooth = guided_filter_rgb(&gray, &rgb, GUIDED_RADIUS, GUIDED_EPS);
        let mut result = blend_masked(&rgb, &smooth, &mask);

        // Deband: flat regions get a smoothed, dithered copy.
        let flat = local_std(&gray, 9).mapv(|s| if s < p.deband_threshold { 1.0 } else { 0.0 });
        let banding = gaussian_blur_sized(&(flat * &edge_protect), 11, 2.5);
        if banding.iter().any(|&m| m > 0.0) {
            let (h, w) = gray.dim();
            let mut rng = ctx.rng(DITHER_SALT);
            let mut smoothed = gaussian_blur_rgb_sized(&result, 15, 3.0);
            for mut channel in smoothed.axis_iter_mut(Axis(2)) {
                channel += &gaussian_noise(&mut rng, h, w, p.deband_dither);
            }
            let weight = banding.mapv(|m| (m * DEBAND_MIX).clamp(0.0, 1.0));
            result = blend_masked(&result, &smoothed, &weight);
        }

        Ok(frame.with_f32(&result))
    }
}

/// Weighted mask of pixels near 8/16-pixel block boundaries whose step lies
/// strictly between `MIN_BLOCK_STEP` and `threshold`.
fn block_boundary_mask(gray: &Array2<f32>, threshold: f32) -> Array2<f32> {
    let (h, w) = gray.dim();
    let mut mask = Array2::<f32>::zeros((h, w));
    let is_artifact = |step: f32| step > MIN_BLOCK_STEP && step < threshold;

    for size in [BLOCK_GRID, BLOCK_GRID * 2] {
        for x in (size..w).step_by(size) {
            for y in 0..h {
                if !is_artifact((gray[[y, x]] - gray[[y, x - 1]]).abs()) {
                    continue;
                }
                for d in -BOUNDARY_SPREAD..=BOUNDARY_SPREAD {
                    let c = x as isize + d;
                    if c < 0 || c >= w as isize {
                        continue;
                    }
                    let wgt = 1.0 - 0.2 * d.abs() as f32;
                    let m = &mut mask[[y, c as usize]];
                    *m = m.max(wgt);
                }
            }
        }
        for y in (size..h).step_by(size) {
            for x in 0..w {
                if !is_artifact((gray[[y, x]] - gray[[y - 1, x]]).abs()) {
                    continue;
                }
                for d in -BOUNDARY_SPREAD..=BOUNDARY_SPREAD {
                    let r = y as isize + d;
                    if r < 0 || r >= h as isize {
                        continue;
                    }
                    let wgt = 1.0 - 0.2 * d.abs() as f32;
                    let m = &mut mask[[r as usize, x]];
                    *m = m.max(wgt);
                }
            }
        }
    }

    mask
}
