use ndarray::{s, Array2, Array3, Zip};

use crate::color::convert::rgb_to_hsv;
use crate::error::Result;
use crate::filters::bilateral::bilateral_filter;
use crate::filters::gaussian_blur::{gaussian_blur_rgb, gaussian_blur_sized};
use crate::frame::{blend_masked, BoundingBox, Frame};

use super::{Stage, StageContext, StageKind};

/// Region padding as a fraction of the larger face side.
const FACE_PADDING: f32 = 0.2;
/// Feather width as a fraction of the smaller region side.
const FEATHER: f32 = 0.15;
/// Loose skin-tone gate in 8-bit HSV.
const SKIN_HUE_MAX: f32 = 20.0;
const SKIN_SAT_MIN: f32 = 20.0;
const SKIN_VAL_MIN: f32 = 70.0;

/// Step 5: soften skin inside detected faces while keeping fine detail.
pub struct FaceRepair;

impl Stage for FaceRepair {
    fn kind(&self) -> StageKind {
        StageKind::FaceRepair
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        if ctx.faces.is_empty() {
            return Ok(frame.clone());
        }

        let (h, w) = (frame.height(), frame.width());
        let strength = ctx.profile.face_strength;
        let mut result = frame.to_f32();

        for face in ctx.faces {
            let pad = (FACE_PADDING * face.width.max(face.height) as f32) as usize;
            let region = face.padded(pad, w, h);
            if region.is_empty() {
                continue;
            }
            let repaired = repair_region(&result, &region, strength);
            result
                .slice_mut(s![region.y..region.bottom(), region.x..region.right(), ..])
                .assign(&repaired);
        }

        Ok(frame.with_f32(&result))
    }
}

fn repair_region(image: &Array3<f32>, region: &BoundingBox, strength: f32) -> Array3<f32> {
    let patch = image
        .slice(s![region.y..region.bottom(), region.x..region.right(), ..])
        .to_owned();

    // Smooth the low band, keep most of the high band.
    let low = gaussian_blur_rgb(&patch, 2.0);
    let high = &patch - &low;
    let low_smooth = bilateral_filter(&low, 7, 35.0, 35.0);
    let keep_detail = 1.0 - strength * 0.3;
    let smoothed = Zip::from(&low_smooth)
        .and(&high)
        .map_collect(|&l, &hf| (l + hf * keep_detail).clamp(0.0, 255.0));

    let skin = skin_mask(&patch);
    let skin = gaussian_blur_sized(&skin, 15, 3.0).mapv(|m| (m * strength).clamp(0.0, 1.0));
    let blended = blend_masked(&patch, &smoothed, &skin);

    let ramp = feather_ramp(region.height, region.width);
    blend_masked(&patch, &blended, &ramp)
}

fn skin_mask(patch: &Array3<f32>) -> Array2<f32> {
    let hsv = rgb_to_hsv(patch);
    let (h, w, _) = hsv.dim();
    Array2::from_shape_fn((h, w), |(r, c)| {
        let (hue, sat, val) = (hsv[[r, c, 0]], hsv[[r, c, 1]], hsv[[r, c, 2]]);
        if hue <= SKIN_HUE_MAX && sat >= SKIN_SAT_MIN && val >= SKIN_VAL_MIN {
            1.0
        } else {
            0.0
        }
    })
}

/// 0 at the region border rising linearly to 1 over the feather width.
fn feather_ramp(height: usize, width: usize) -> Array2<f32> {
    let border = (FEATHER * height.min(width) as f32).max(1.0);
    Array2::from_shape_fn((height, width), |(r, c)| {
        let d = r.min(height - 1 - r).min(c).min(width - 1 - c) as f32;
        (d / border).min(1.0)
    })
}
