use ndarray::{Array3, Axis};

use crate::color::convert::{lab_to_rgb, rgb_to_lab};
use crate::consts::MAX_INTENSITY;
use crate::error::Result;
use crate::filters::unsharp_mask::unsharp_mask;
use crate::frame::Frame;

use super::{Stage, StageContext, StageKind};

/// Source contrast above which the boost and rollback are halved.
const HIGH_CONTRAST: f64 = 60.0;
const MID_GRAY: f32 = 128.0;
const UNSHARP_SIGMA: f32 = 2.0;

/// Step 2: boost luminance contrast, unsharp mask, then roll most of the boost back.
pub struct PreSharpen;

impl Stage for PreSharpen {
    fn kind(&self) -> StageKind {
        StageKind::PreSharpen
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        let p = ctx.profile;
        let mut boost = p.pre_sharpen_contrast;
        let mut rollback = p.contrast_rollback;
        if ctx.metrics.is_some_and(|m| m.contrast > HIGH_CONTRAST) {
            boost = 1.0 + (boost - 1.0) * 0.5;
            rollback = 1.0 - (1.0 - rollback) * 0.5;
        }

        let boosted = scale_lightness(&frame.to_f32(), boost);
        let sharpened = unsharp_mask(&boosted, UNSHARP_SIGMA, p.pre_sharpen_strength / 100.0)
            .mapv(|v| v.clamp(0.0, MAX_INTENSITY));
        let result = scale_lightness(&sharpened, rollback);

        Ok(frame.with_f32(&result))
    }
}

/// Stretch LAB lightness around mid-gray by `factor`, leaving chroma alone.
fn scale_lightness(rgb: &Array3<f32>, factor: f32) -> Array3<f32> {
    let mut lab = rgb_to_lab(rgb);
    lab.index_axis_mut(Axis(2), 0)
        .mapv_inplace(|l| (MID_GRAY + (l - MID_GRAY) * factor).clamp(0.0, MAX_INTENSITY));
    lab_to_rgb(&lab).mapv(|v| v.clamp(0.0, MAX_INTENSITY))
}
