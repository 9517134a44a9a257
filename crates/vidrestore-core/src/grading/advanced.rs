use ndarray::{Array2, Array3, Axis, Zip};
use tracing::debug;

use crate::color::convert::{hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab};
use crate::consts::MAX_INTENSITY;
use crate::detection::morphology::min_filter;
use crate::filters::levels::auto_levels as percentile_levels;
use crate::filters::nl_means::non_local_means;
use crate::frame::Frame;
use crate::pipeline::config::AdvancedConfig;
use crate::quality::{Adjustment, Recommendations};

use super::profile::GradingProfile;

const WB_GAIN: f32 = 1.1;
const LEVELS_LOW: f32 = 0.01;
const LEVELS_HIGH: f32 = 0.99;
const SHADOW_LIFT: f32 = 25.0;
const HIGHLIGHT_PULL: f32 = 20.0;

/// Dark-channel prior parameters.
const DEHAZE_STRENGTH: f32 = 0.85;
const DEHAZE_WINDOW_RADIUS: usize = 7;
const DEHAZE_TOP_FRACTION: f32 = 0.001;
const TRANSMISSION_FLOOR: f32 = 0.1;

/// White balance, levels, shadow/highlight, denoise and dehaze.
///
/// With `recommendations` (smart mode) each adjustment is skipped when its
/// recommendation says so.
pub fn apply_advanced(
    frame: &Frame,
    config: &AdvancedConfig,
    recommendations: Option<&Recommendations>,
) -> Frame {
    let p = GradingProfile::for_intensity(config.intensity);
    let wanted = |enabled: bool, adj: Adjustment| {
        let skip = recommendations.is_some_and(|r| r.should_skip(adj));
        if enabled && skip {
            debug!(adjustment = %adj, "Advanced adjustment skipped");
        }
        enabled && !skip
    };

    let mut rgb = frame.to_f32();
    if wanted(config.auto_white_balance, Adjustment::WhiteBalance) {
        rgb = auto_white_balance(&rgb);
    }
    if wanted(config.auto_levels, Adjustment::AutoLevels) {
        rgb = percentile_levels(&rgb, LEVELS_LOW, LEVELS_HIGH);
    }
    if wanted(config.shadow_lift, Adjustment::ShadowLift) {
        rgb = adjust_value(&rgb, |v| v + SHADOW_LIFT * (1.0 - v / MAX_INTENSITY).powi(2));
    }
    if wanted(config.highlight_recovery, Adjustment::HighlightRecovery) {
        rgb = adjust_value(&rgb, |v| v - HIGHLIGHT_PULL * (v / MAX_INTENSITY).powi(3));
    }
    if wanted(config.denoise, Adjustment::Denoise) {
        rgb = non_local_means(&rgb, p.denoise);
    }
    if wanted(config.dehaze, Adjustment::Dehaze) {
        rgb = dehaze(&rgb);
    }
    frame.with_f32(&rgb)
}

/// Pull the mean LAB chroma toward neutral, more strongly in bright areas.
pub fn auto_white_balance(rgb: &Array3<f32>) -> Array3<f32> {
    let mut lab = rgb_to_lab(rgb);
    let n = (lab.len() / 3).max(1) as f32;
    let avg_a = lab.index_axis(Axis(2), 1).sum() / n;
    let avg_b = lab.index_axis(Axis(2), 2).sum() / n;

    let (h, w, _) = lab.dim();
    for r in 0..h {
        for c in 0..w {
            let weight = lab[[r, c, 0]] / MAX_INTENSITY * WB_GAIN;
            lab[[r, c, 1]] = (lab[[r, c, 1]] - (avg_a - 128.0) * weight).clamp(0.0, MAX_INTENSITY);
            lab[[r, c, 2]] = (lab[[r, c, 2]] - (avg_b - 128.0) * weight).clamp(0.0, MAX_INTENSITY);
        }
    }
    lab_to_rgb(&lab)
}

fn adjust_value(rgb: &Array3<f32>, curve: impl Fn(f32) -> f32) -> Array3<f32> {
    let mut hsv = rgb_to_hsv(rgb);
    hsv.index_axis_mut(Axis(2), 2)
        .mapv_inplace(|v| curve(v).clamp(0.0, MAX_INTENSITY));
    hsv_to_rgb(&hsv)
}

/// Dark-channel prior haze removal.
pub fn dehaze(rgb: &Array3<f32>) -> Array3<f32> {
    let (h, w, _) = rgb.dim();
    if h == 0 || w == 0 {
        return rgb.clone();
    }
    let img = rgb.mapv(|v| v / MAX_INTENSITY);

    let dark = min_filter(&channel_min(&img), DEHAZE_WINDOW_RADIUS);

    // Atmospheric light: mean color of the haziest 0.1%.
    let mut order: Vec<(usize, usize)> = (0..h).flat_map(|r| (0..w).map(move |c| (r, c))).collect();
    order.sort_by(|a, b| dark[[b.0, b.1]].total_cmp(&dark[[a.0, a.1]]));
    let n = ((h * w) as f32 * DEHAZE_TOP_FRACTION).max(1.0) as usize;
    let mut atmosphere = [0.0f32; 3];
    for &(r, c) in order.iter().take(n) {
        for (ch, a) in atmosphere.iter_mut().enumerate() {
            *a += img[[r, c, ch]];
        }
    }
    for a in &mut atmosphere {
        *a = (*a / n as f32).clamp(0.1, 1.0);
    }

    let mut normalized = img.clone();
    for (ch, mut plane) in normalized.axis_iter_mut(Axis(2)).enumerate() {
        plane.mapv_inplace(|v| v / atmosphere[ch]);
    }
    let transmission = min_filter(&channel_min(&normalized), DEHAZE_WINDOW_RADIUS)
        .mapv(|d| (1.0 - DEHAZE_STRENGTH * d).clamp(TRANSMISSION_FLOOR, 1.0));

    let mut out = img;
    Zip::indexed(&mut out).for_each(|(r, c, ch), v| {
        let a = atmosphere[ch];
        *v = ((*v - a) / transmission[[r, c]] + a).clamp(0.0, 1.0) * MAX_INTENSITY;
    });
    out
}

fn channel_min(img: &Array3<f32>) -> Array2<f32> {
    let (h, w, _) = img.dim();
    Array2::from_shape_fn((h, w), |(r, c)| img[[r, c, 0]].min(img[[r, c, 1]]).min(img[[r, c, 2]]))
}
