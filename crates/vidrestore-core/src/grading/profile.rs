use crate::pipeline::config::Intensity;

/// Tuning for basic grading and the filter presets.
///
/// Kept separate from the restoration table so the two can be tuned
/// independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradingProfile {
    /// Added to every channel.
    pub brightness: f32,
    /// Multiplier in the contrast adjustment.
    pub contrast: f32,
    /// HSV saturation multiplier.
    pub saturation: f32,
    /// Unsharp amount of the sharpen preset.
    pub sharpen: f32,
    /// Sigma of the grain preset.
    pub grain: f32,
    /// Non-local means strength.
    pub denoise: f32,
}

pub const LIGHT: GradingProfile = GradingProfile {
    brightness: 5.0,
    contrast: 1.08,
    saturation: 1.15,
    sharpen: 0.3,
    grain: 2.5,
    denoise: 3.0,
};

pub const MEDIUM: GradingProfile = GradingProfile {
    brightness: 10.0,
    contrast: 1.15,
    saturation: 1.3,
    sharpen: 0.5,
    grain: 4.5,
    denoise: 5.0,
};

pub const HEAVY: GradingProfile = GradingProfile {
    brightness: 18.0,
    contrast: 1.25,
    saturation: 1.45,
    sharpen: 0.7,
    grain: 6.5,
    denoise: 8.0,
};

impl GradingProfile {
    pub fn for_intensity(intensity: Intensity) -> &'static GradingProfile {
        match intensity {
            Intensity::Light => &LIGHT,
            Intensity::Medium => &MEDIUM,
            Intensity::Heavy => &HEAVY,
        }
    }
}
