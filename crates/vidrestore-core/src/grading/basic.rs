use ndarray::{Array3, Axis};
use tracing::debug;

use crate::color::convert::{hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab};
use crate::consts::MAX_INTENSITY;
use crate::filters::levels::scale_abs;
use crate::frame::Frame;
use crate::pipeline::config::BasicConfig;
use crate::quality::{Adjustment, Recommendations};

use super::profile::GradingProfile;

const CONTRAST_OFFSET: f32 = -5.0;
const WARMTH_BLUE: f32 = 8.0;
const WARMTH_RED: f32 = -5.0;
const HIGHLIGHT_LIFT: f32 = 10.0;

/// Exposure, contrast, saturation, temperature and highlight adjustments.
///
/// With `recommendations` (smart mode) brightness, contrast and saturation
/// are skipped when the sampled frame is already in its favorable band.
pub fn apply_basic(frame: &Frame, config: &BasicConfig, recommendations: Option<&Recommendations>) -> Frame {
    let p = GradingProfile::for_intensity(config.intensity);
    let wanted = |enabled: bool, adj: Adjustment| {
        let skip = recommendations.is_some_and(|r| r.should_skip(adj));
        if enabled && skip {
            debug!(adjustment = %adj, "Basic adjustment skipped");
        }
        enabled && !skip
    };

    // Quantize between steps, as separate 8-bit passes would.
    let mut rgb = frame.to_f32();
    if wanted(config.brightness, Adjustment::Brightness) {
        rgb = round(scale_abs(&rgb, 1.0, p.brightness));
    }
    if wanted(config.contrast, Adjustment::Contrast) {
        rgb = round(scale_abs(&rgb, p.contrast, CONTRAST_OFFSET));
    }
    if wanted(config.saturation, Adjustment::Saturation) {
        rgb = round(scale_saturation(&rgb, p.saturation));
    }
    if config.temperature {
        rgb = shift_temperature(&rgb);
    }
    if config.highlight {
        rgb = round(lift_lightness(&rgb, HIGHLIGHT_LIFT));
    }
    frame.with_f32(&rgb)
}

fn round(data: Array3<f32>) -> Array3<f32> {
    data.mapv(|v| v.round().clamp(0.0, MAX_INTENSITY))
}

/// Multiply HSV saturation by `gain`.
pub fn scale_saturation(rgb: &Array3<f32>, gain: f32) -> Array3<f32> {
    let mut hsv = rgb_to_hsv(rgb);
    hsv.index_axis_mut(Axis(2), 1)
        .mapv_inplace(|s| (s * gain).clamp(0.0, MAX_INTENSITY));
    hsv_to_rgb(&hsv)
}

/// Cool the image slightly: blue up, red down.
pub fn shift_temperature(rgb: &Array3<f32>) -> Array3<f32> {
    let mut out = rgb.clone();
    out.index_axis_mut(Axis(2), 0)
        .mapv_inplace(|r| (r + WARMTH_RED).clamp(0.0, MAX_INTENSITY));
    out.index_axis_mut(Axis(2), 2)
        .mapv_inplace(|b| (b + WARMTH_BLUE).clamp(0.0, MAX_INTENSITY));
    out
}

/// Add `amount` to LAB lightness.
pub fn lift_lightness(rgb: &Array3<f32>, amount: f32) -> Array3<f32> {
    let mut lab = rgb_to_lab(rgb);
    lab.index_axis_mut(Axis(2), 0)
        .mapv_inplace(|l| (l + amount).clamp(0.0, MAX_INTENSITY));
    lab_to_rgb(&lab)
}
