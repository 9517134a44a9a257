use crate::pipeline::config::Intensity;

/// Per-step tuning for the restoration pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestorationProfile {
    pub deblock_strength: f32,
    /// Largest block-boundary step still treated as an artifact.
    pub deblock_threshold: f32,
    /// Local standard deviation below which a region counts as banded.
    pub deband_threshold: f32,
    pub deband_dither: f32,
    pub pre_sharpen_contrast: f32,
    /// Unsharp amount in percent.
    pub pre_sharpen_strength: f32,
    pub contrast_rollback: f32,
    pub aa_strength: f32,
    pub edge_refine: f32,
    pub denoise_strength: f32,
    pub denoise_preserve: f32,
    pub face_strength: f32,
    pub hair_protect: f32,
    pub final_sharpen: f32,
    /// Grain sigma in 8-bit levels.
    pub grain_strength: f32,
}

pub const LIGHT: RestorationProfile = RestorationProfile {
    deblock_strength: 0.5,
    deblock_threshold: 18.0,
    deband_threshold: 10.0,
    deband_dither: 0.4,
    pre_sharpen_contrast: 1.2,
    pre_sharpen_strength: 70.0,
    contrast_rollback: 0.88,
    aa_strength: 0.6,
    edge_refine: 0.5,
    denoise_strength: 0.4,
    denoise_preserve: 0.9,
    face_strength: 0.4,
    hair_protect: 0.9,
    final_sharpen: 0.4,
    grain_strength: 2.0,
};

pub const MEDIUM: RestorationProfile = RestorationProfile {
    deblock_strength: 0.7,
    deblock_threshold: 14.0,
    deband_threshold: 7.0,
    deband_dither: 0.55,
    pre_sharpen_contrast: 1.4,
    pre_sharpen_strength: 100.0,
    contrast_rollback: 0.83,
    aa_strength: 0.75,
    edge_refine: 0.65,
    denoise_strength: 0.55,
    denoise_preserve: 0.82,
    face_strength: 0.5,
    hair_protect: 0.85,
    final_sharpen: 0.55,
    grain_strength: 4.0,
};

pub const HEAVY: RestorationProfile = RestorationProfile {
    deblock_strength: 0.88,
    deblock_threshold: 10.0,
    deband_threshold: 5.0,
    deband_dither: 0.7,
    pre_sharpen_contrast: 1.6,
    pre_sharpen_strength: 130.0,
    contrast_rollback: 0.78,
    aa_strength: 0.9,
    edge_refine: 0.8,
    denoise_strength: 0.72,
    denoise_preserve: 0.72,
    face_strength: 0.6,
    hair_protect: 0.78,
    final_sharpen: 0.7,
    grain_strength: 6.0,
};

impl RestorationProfile {
    pub fn for_intensity(intensity: Intensity) -> &'static RestorationProfile {
        match intensity {
            Intensity::Light => &LIGHT,
            Intensity::Medium => &MEDIUM,
            Intensity::Heavy => &HEAVY,
        }
    }
}
