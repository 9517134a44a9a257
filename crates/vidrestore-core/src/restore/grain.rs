use ndarray::{Array2, Array3, Zip};
use rand::Rng;

use crate::error::Result;
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::filters::noise::standard_normal;
use crate::frame::Frame;

use super::{Stage, StageContext, StageKind};

/// Luma below which no grain is added.
pub const GRAIN_LUMA_FLOOR: f32 = 25.0;
const GRAIN_SALT: u64 = 8;

/// Step 8: Gaussian film grain, kept out of near-black areas.
pub struct Grain;

impl Stage for Grain {
    fn kind(&self) -> StageKind {
        StageKind::Grain
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        let mut rng = ctx.rng(GRAIN_SALT);
        let result = add_masked_grain(&frame.to_f32(), &frame.luma(), ctx.profile.grain_strength, &mut rng);
        Ok(frame.with_f32(&result))
    }
}

/// Add per-sample Gaussian noise of `sigma`, weighted by a blurred luma mask.
///
/// Shared with the grain filter preset.
pub fn add_masked_grain<R: Rng>(rgb: &Array3<f32>, luma: &Array2<f32>, sigma: f32, rng: &mut R) -> Array3<f32> {
    let bright = luma.mapv(|v| if v > GRAIN_LUMA_FLOOR { 1.0 } else { 0.0 });
    let mask = gaussian_blur_array(&bright, 5.0);

    let mut out = rgb.clone();
    Zip::indexed(&mut out).for_each(|(r, c, _), v| {
        *v += standard_normal(&mut *rng) * sigma * mask[[r, c]];
    });
    out
}
