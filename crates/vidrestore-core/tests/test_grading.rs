mod common;

use ndarray::Array3;

use vidrestore_core::frame::Frame;
use vidrestore_core::grading::advanced::{auto_white_balance, dehaze};
use vidrestore_core::grading::basic::shift_temperature;
use vidrestore_core::grading::{apply_advanced, apply_basic, apply_filters, FilterPreset};
use vidrestore_core::pipeline::config::{AdvancedConfig, BasicConfig, FilterConfig, Intensity};
use vidrestore_core::quality::{analyze, recommend};

use common::{checkerboard, gray_frame, textured_frame};

fn basic_off() -> BasicConfig {
    BasicConfig {
        brightness: false,
        contrast: false,
        saturation: false,
        temperature: false,
        highlight: false,
        ..BasicConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Basic grading
// ---------------------------------------------------------------------------

#[test]
fn test_basic_with_nothing_selected_is_identity() {
    let frame = textured_frame(40, 30);
    assert_eq!(apply_basic(&frame, &basic_off(), None), frame);
}

#[test]
fn test_temperature_shift_on_gray() {
    let rgb = Array3::from_elem((2, 2, 3), 128.0f32);
    let out = shift_temperature(&rgb);
    assert_eq!(out[[0, 0, 0]], 123.0);
    assert_eq!(out[[0, 0, 1]], 128.0);
    assert_eq!(out[[0, 0, 2]], 136.0);
}

#[test]
fn test_temperature_shift_clamps() {
    let frame = Frame::solid(4, 4, [2, 0, 252]);
    let config = BasicConfig {
        temperature: true,
        ..basic_off()
    };
    let out = apply_basic(&frame, &config, None);
    assert_eq!(out.data[[0, 0, 0]], 0);
    assert_eq!(out.data[[0, 0, 2]], 255);
}

#[test]
fn test_basic_brightness_lifts_dark_frame() {
    let frame = Frame::solid(16, 16, [40, 40, 40]);
    let config = BasicConfig {
        brightness: true,
        intensity: Intensity::Heavy,
        ..basic_off()
    };
    let out = apply_basic(&frame, &config, None);
    assert!(out.data[[0, 0, 0]] > 40);
}

#[test]
fn test_smart_mode_skips_favorable_brightness() {
    // Mean 128, contrast 58: brightness and contrast are both in their bands.
    let frame = checkerboard(64, 64, 8, 70, 186);
    let recommendations = recommend(&analyze(&frame));
    let config = BasicConfig {
        brightness: true,
        contrast: true,
        ..basic_off()
    };
    assert_eq!(apply_basic(&frame, &config, Some(&recommendations)), frame);
    assert_ne!(apply_basic(&frame, &config, None), frame);
}

// ---------------------------------------------------------------------------
// Advanced grading
// ---------------------------------------------------------------------------

#[test]
fn test_advanced_keeps_dimensions() {
    let frame = textured_frame(32, 24);
    let config = AdvancedConfig {
        dehaze: true,
        ..AdvancedConfig::default()
    };
    let out = apply_advanced(&frame, &config, None);
    assert_eq!(out.data.dim(), frame.data.dim());
}

#[test]
fn test_white_balance_keeps_neutral_gray() {
    let rgb = Array3::from_elem((8, 8, 3), 128.0f32);
    let out = auto_white_balance(&rgb);
    for v in out.iter() {
        assert!((v - 128.0).abs() < 2.0, "got {v}");
    }
}

#[test]
fn test_dehaze_stays_in_range() {
    let rgb = textured_frame(24, 24).to_f32();
    let out = dehaze(&rgb);
    assert_eq!(out.dim(), rgb.dim());
    assert!(out.iter().all(|v| v.is_finite() && (0.0..=255.0).contains(v)));
}

// ---------------------------------------------------------------------------
// Filter presets
// ---------------------------------------------------------------------------

#[test]
fn test_no_filters_is_clone() {
    let frame = textured_frame(20, 20);
    assert_eq!(apply_filters(&frame, &FilterConfig::default(), Some(1)), frame);
}

#[test]
fn test_every_preset_keeps_dimensions() {
    let frame = textured_frame(32, 24);
    for preset in FilterPreset::ORDER {
        let config = FilterConfig {
            sharpen: preset == FilterPreset::Sharpen,
            landscape: preset == FilterPreset::Landscape,
            vintage: preset == FilterPreset::Vintage,
            cinematic: preset == FilterPreset::Cinematic,
            anime: preset == FilterPreset::Anime,
            grain: preset == FilterPreset::Grain,
            ..FilterConfig::default()
        };
        assert!(preset.enabled_in(&config));
        let out = apply_filters(&frame, &config, Some(9));
        assert_eq!(out.data.dim(), frame.data.dim(), "{preset}");
    }
}

#[test]
fn test_cinematic_tints_gray() {
    let frame = gray_frame(8, 8);
    let config = FilterConfig {
        cinematic: true,
        ..FilterConfig::default()
    };
    let out = apply_filters(&frame, &config, None);
    let px = |ch| out.data[[4, 4, ch]];
    assert!(px(0) > 128);
    assert_eq!(px(1), 128);
    assert!(px(2) > 128);
}

#[test]
fn test_vintage_leaves_white_alone() {
    let frame = Frame::solid(8, 8, [255, 255, 255]);
    let config = FilterConfig {
        vintage: true,
        ..FilterConfig::default()
    };
    assert_eq!(apply_filters(&frame, &config, None), frame);
}

#[test]
fn test_seeded_filter_grain_is_reproducible() {
    let frame = gray_frame(24, 24).with_index(3);
    let config = FilterConfig {
        grain: true,
        ..FilterConfig::default()
    };
    let a = apply_filters(&frame, &config, Some(5));
    let b = apply_filters(&frame, &config, Some(5));
    assert_eq!(a, b);
}
