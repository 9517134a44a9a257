use ndarray::Axis;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::convert::rgb_to_hsv;
use crate::consts::{HIGHLIGHT_LUMA, SHADOW_LUMA};
use crate::frame::Frame;

use super::artifacts::{aliasing_score, block_artifact_score};
use super::laplacian::{laplacian_variance, noise_sigma};

/// Scalar measurements of one sampled frame, on a 0..255 intensity scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean luma.
    pub brightness: f64,
    pub brightness_std: f64,
    /// Luma standard deviation.
    pub contrast: f64,
    /// Mean HSV saturation.
    pub saturation: f64,
    /// Laplacian variance.
    pub sharpness: f64,
    pub noise: f64,
    /// Mean red minus blue; positive is warm.
    pub color_temp: f64,
    pub highlight_ratio: f64,
    pub shadow_ratio: f64,
    pub block_artifact: f64,
    /// Edge direction discontinuity, 0..1.
    pub aliasing: f64,
}

impl Default for QualityMetrics {
    fn default() -> Self {
        Self {
            brightness: 128.0,
            brightness_std: 50.0,
            contrast: 50.0,
            saturation: 100.0,
            sharpness: 300.0,
            noise: 10.0,
            color_temp: 0.0,
            highlight_ratio: 0.0,
            shadow_ratio: 0.0,
            block_artifact: 20.0,
            aliasing: 0.2,
        }
    }
}

/// Measure a frame. Never fails: degenerate input yields the defaults and any
/// estimator that cannot produce a finite value falls back individually.
pub fn analyze(frame: &Frame) -> QualityMetrics {
    let defaults = QualityMetrics::default();
    let (h, w) = (frame.height(), frame.width());
    if h == 0 || w == 0 {
        warn!(width = w, height = h, "Empty frame, using default quality metrics");
        return defaults;
    }

    let rgb = frame.to_f32();
    let gray = frame.luma();
    let n = gray.len() as f64;

    let brightness = gray.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = gray
        .iter()
        .map(|&v| {
            let d = v as f64 - brightness;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = variance.sqrt();

    let hsv = rgb_to_hsv(&rgb);
    let saturation = hsv.index_axis(Axis(2), 1).iter().map(|&v| v as f64).sum::<f64>() / n;

    let color_temp = rgb
        .lanes(Axis(2))
        .into_iter()
        .map(|px| (px[0] - px[2]) as f64)
        .sum::<f64>()
        / n;

    let highlight_ratio = gray.iter().filter(|&&v| v > HIGHLIGHT_LUMA).count() as f64 / n;
    let shadow_ratio = gray.iter().filter(|&&v| v < SHADOW_LUMA).count() as f64 / n;

    let ((sharpness, noise), (block_artifact, aliasing)) = rayon::join(
        || (laplacian_variance(&gray), noise_sigma(&gray)),
        || (block_artifact_score(&gray), aliasing_score(&gray)),
    );

    let metrics = QualityMetrics {
        brightness: finite_or(Some(brightness), defaults.brightness),
        brightness_std: finite_or(Some(std), defaults.brightness_std),
        contrast: finite_or(Some(std), defaults.contrast),
        saturation: finite_or(Some(saturation), defaults.saturation),
        sharpness: finite_or(sharpness, defaults.sharpness),
        noise: finite_or(noise, defaults.noise),
        color_temp: finite_or(Some(color_temp), defaults.color_temp),
        highlight_ratio: finite_or(Some(highlight_ratio), defaults.highlight_ratio),
        shadow_ratio: finite_or(Some(shadow_ratio), defaults.shadow_ratio),
        block_artifact: finite_or(block_artifact, defaults.block_artifact),
        aliasing: finite_or(aliasing, defaults.aliasing),
    };

    debug!(
        brightness = metrics.brightness,
        contrast = metrics.contrast,
        saturation = metrics.saturation,
        sharpness = metrics.sharpness,
        noise = metrics.noise,
        block = metrics.block_artifact,
        aliasing = metrics.aliasing,
        "Frame analyzed"
    );
    metrics
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}
