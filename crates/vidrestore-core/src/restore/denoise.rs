use crate::error::Result;
use crate::filters::bilateral::bilateral_filter;
use crate::filters::box_filter::local_std;
use crate::filters::gaussian_blur::gaussian_blur_sized;
use crate::frame::{blend_masked, Frame};

use super::{Stage, StageContext, StageKind};

/// Local luma deviation above which a pixel is treated as texture.
const TEXTURE_STD: f32 = 12.0;

/// Step 4: bilateral smoothing that backs off in textured regions.
pub struct Denoise;

impl Stage for Denoise {
    fn kind(&self) -> StageKind {
        StageKind::Denoise
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        let p = ctx.profile;
        let rgb = frame.to_f32();
        let smooth = bilateral_filter(&rgb, 9, 45.0, 45.0);

        let texture = local_std(&frame.luma(), 7).mapv(|s| if s > TEXTURE_STD { 1.0 } else { 0.0 });
        let texture = gaussian_blur_sized(&texture, 5, 1.0);
        let weight = texture.mapv(|t| ((1.0 - t * p.denoise_preserve) * p.denoise_strength).clamp(0.0, 1.0));

        Ok(frame.with_f32(&blend_masked(&rgb, &smooth, &weight)))
    }
}
