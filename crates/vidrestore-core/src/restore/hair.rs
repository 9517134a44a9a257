use ndarray::{s, Array2, Zip};

use crate::error::Result;
use crate::filters::gaussian_blur::{gaussian_blur_rgb, gaussian_blur_sized};
use crate::frame::{BoundingBox, Frame};

use super::{Stage, StageContext, StageKind};

const DETAIL_SIGMA: f32 = 1.2;
const REINJECT: f32 = 0.4;

/// Step 6: restore fine detail from the unprocessed frame around and above faces.
pub struct HairProtect;

impl Stage for HairProtect {
    fn kind(&self) -> StageKind {
        StageKind::HairProtect
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        if ctx.faces.is_empty() || !ctx.original.same_shape(frame) {
            return Ok(frame.clone());
        }

        let (h, w) = (frame.height(), frame.width());
        let mut region_mask = Array2::<f32>::zeros((h, w));
        for face in ctx.faces {
            let r = hair_region(face, w, h);
            if !r.is_empty() {
                region_mask
                    .slice_mut(s![r.y..r.bottom(), r.x..r.right()])
                    .fill(1.0);
            }
        }
        let mask = gaussian_blur_sized(&region_mask, 15, 4.0);

        let original = ctx.original.to_f32();
        let detail = &original - &gaussian_blur_rgb(&original, DETAIL_SIGMA);
        let gain = ctx.profile.hair_protect * REINJECT;

        let mut result = frame.to_f32();
        Zip::indexed(&mut result)
            .and(&detail)
            .for_each(|(r, c, _), v, &d| *v += d * mask[[r, c]] * gain);

        Ok(frame.with_f32(&result))
    }
}

/// Band from 1.2 face-heights above the face to just below its top,
/// widened by a quarter face-width on each side.
fn hair_region(face: &BoundingBox, width: usize, height: usize) -> BoundingBox {
    let (fx, fy) = (face.x as f32, face.y as f32);
    let (fw, fh) = (face.width as f32, face.height as f32);
    let top = (fy - 1.2 * fh).max(0.0) as usize;
    let bottom = ((fy + 0.1 * fh) as usize).min(height);
    let left = (fx - 0.25 * fw).max(0.0) as usize;
    let right = ((fx + fw + 0.25 * fw) as usize).min(width);
    BoundingBox::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
}
