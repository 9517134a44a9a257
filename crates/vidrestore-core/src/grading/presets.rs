use std::fmt;

use ndarray::{Array2, Array3, Axis, Zip};
use rand::Rng;

use crate::consts::MAX_INTENSITY;
use crate::filters::bilateral::bilateral_filter;
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::filters::levels::scale_abs;
use crate::filters::noise::frame_rng;
use crate::filters::unsharp_mask::unsharp_mask;
use crate::frame::{blend_masked, luma_of, Frame};
use crate::pipeline::config::FilterConfig;
use crate::restore::grain::{add_masked_grain, GRAIN_LUMA_FLOOR};

use super::basic::scale_saturation;
use super::profile::GradingProfile;

const GRAIN_SALT: u64 = 101;

/// A fixed stylistic transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterPreset {
    /// Unsharp mask kept out of near-black areas.
    Sharpen,
    /// Slight exposure and saturation boost with a cool sky tint.
    Landscape,
    /// Faded blue shadows, warmer reds.
    Vintage,
    /// Blue shadows and warm highlights.
    Cinematic,
    /// Flattened shading with punchier color.
    Anime,
    Grain,
}

impl FilterPreset {
    /// Application order.
    pub const ORDER: [FilterPreset; 6] = [
        Self::Sharpen,
        Self::Landscape,
        Self::Vintage,
        Self::Cinematic,
        Self::Anime,
        Self::Grain,
    ];

    pub fn enabled_in(self, config: &FilterConfig) -> bool {
        match self {
            Self::Sharpen => config.sharpen,
            Self::Landscape => config.landscape,
            Self::Vintage => config.vintage,
            Self::Cinematic => config.cinematic,
            Self::Anime => config.anime,
            Self::Grain => config.grain,
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sharpen => write!(f, "sharpen"),
            Self::Landscape => write!(f, "landscape"),
            Self::Vintage => write!(f, "vintage"),
            Self::Cinematic => write!(f, "cinematic"),
            Self::Anime => write!(f, "anime"),
            Self::Grain => write!(f, "grain"),
        }
    }
}

/// Apply every enabled preset in [`FilterPreset::ORDER`].
pub fn apply_filters(frame: &Frame, config: &FilterConfig, seed: Option<u64>) -> Frame {
    if !config.any() {
        return frame.clone();
    }
    let profile = GradingProfile::for_intensity(config.intensity);
    let mut rng = frame_rng(seed, frame.index(), GRAIN_SALT);

    let mut rgb = frame.to_f32();
    for preset in FilterPreset::ORDER {
        if preset.enabled_in(config) {
            rgb = apply_preset(&rgb, preset, profile, &mut rng)
                .mapv(|v| v.round().clamp(0.0, MAX_INTENSITY));
        }
    }
    frame.with_f32(&rgb)
}

/// Apply a single preset to an RGB image in [0, 255].
pub fn apply_preset<R: Rng>(
    rgb: &Array3<f32>,
    preset: FilterPreset,
    profile: &GradingProfile,
    rng: &mut R,
) -> Array3<f32> {
    match preset {
        FilterPreset::Sharpen => {
            let mask = luma_mask(rgb);
            let sharpened = unsharp_mask(rgb, 2.0, profile.sharpen);
            blend_masked(rgb, &sharpened, &mask)
        }
        FilterPreset::Landscape => {
            let brighter = scale_abs(rgb, 1.1, 0.0);
            let mut out = scale_saturation(&brighter, 1.2);
            out.index_axis_mut(Axis(2), 2)
                .mapv_inplace(|b| (b + 12.0).min(MAX_INTENSITY));
            out
        }
        FilterPreset::Vintage => {
            let mut out = rgb.mapv(|v| v / MAX_INTENSITY);
            for mut px in out.lanes_mut(Axis(2)) {
                let (r, b) = (px[0], px[2]);
                px[2] = b + (1.0 - b) * 0.2 * (1.0 - r);
                px[0] = r * 1.2;
            }
            out.mapv(|v| v.clamp(0.0, 1.0) * MAX_INTENSITY)
        }
        FilterPreset::Cinematic => {
            let gray = luma_of(rgb).mapv(|v| v / MAX_INTENSITY);
            let mut out = rgb.clone();
            Zip::indexed(&mut out).for_each(|(r, c, ch), v| {
                let g = gray[[r, c]];
                match ch {
                    0 => *v += g * 10.0 * 0.25,
                    2 => *v += (1.0 - g) * 15.0 * 0.25,
                    _ => {}
                }
            });
            out
        }
        FilterPreset::Anime => {
            let smoothed = bilateral_filter(rgb, 9, 75.0, 75.0);
            scale_saturation(&smoothed, 1.2)
        }
        FilterPreset::Grain => add_masked_grain(rgb, &luma_of(rgb), profile.grain, rng),
    }
}

/// Blurred 1/0 mask of pixels brighter than the grain floor.
fn luma_mask(rgb: &Array3<f32>) -> Array2<f32> {
    let bright = luma_of(rgb).mapv(|v| if v > GRAIN_LUMA_FLOOR { 1.0 } else { 0.0 });
    gaussian_blur_array(&bright, 5.0)
}
