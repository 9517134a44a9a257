use ndarray::Zip;
use tracing::debug;

use crate::consts::SHARPNESS_SUFFICIENT;
use crate::error::Result;
use crate::filters::edges::{gradient_magnitude, sobel};
use crate::filters::gaussian_blur::gaussian_blur_rgb;
use crate::frame::Frame;

use super::{Stage, StageContext, StageKind};

/// Soft limit on the high-frequency delta, in 8-bit levels.
const DELTA_LIMIT: f32 = 15.0;
/// Gradient magnitude mapped to a full edge gate.
const EDGE_SCALE: f32 = 50.0;

/// Step 7: edge-gated unsharp masking with a tanh clamp against ringing.
///
/// Does nothing when the sampled sharpness is already sufficient.
pub struct FinalSharpen;

impl Stage for FinalSharpen {
    fn kind(&self) -> StageKind {
        StageKind::FinalSharpen
    }

    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame> {
        if let Some(m) = ctx.metrics {
            if m.sharpness > SHARPNESS_SUFFICIENT {
                debug!(sharpness = m.sharpness, "Final sharpen skipped");
                return Ok(frame.clone());
            }
        }

        let strength = ctx.profile.final_sharpen * 0.4;
        let rgb = frame.to_f32();
        let blurred = gaussian_blur_rgb(&rgb, 1.0);
        let (gx, gy) = sobel(&frame.luma());
        let edge = gradient_magnitude(&gx, &gy).mapv(|m| (m / EDGE_SCALE).clamp(0.0, 1.0));

        let mut result = rgb.clone();
        Zip::indexed(&mut result)
            .and(&blurred)
            .for_each(|(r, c, _), v, &b| {
                let delta = (*v - b) / DELTA_LIMIT;
                *v += delta.tanh() * DELTA_LIMIT * edge[[r, c]] * strength;
            });

        Ok(frame.with_f32(&result))
    }
}
