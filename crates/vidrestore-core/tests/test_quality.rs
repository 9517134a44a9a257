mod common;

use approx::assert_relative_eq;
use ndarray::{Array2, Array3};

use vidrestore_core::frame::Frame;
use vidrestore_core::quality::laplacian::{laplacian_variance, noise_sigma};
use vidrestore_core::quality::{analyze, recommend, Adjustment, QualityMetrics};

use common::{checkerboard, gray_frame, textured_frame};

// ---------------------------------------------------------------------------
// Laplacian kernels
// ---------------------------------------------------------------------------

#[test]
fn test_flat_plane_has_zero_variance() {
    let plane = Array2::<f32>::from_elem((10, 10), 128.0);
    assert_eq!(laplacian_variance(&plane), Some(0.0));
    assert_eq!(noise_sigma(&plane), Some(0.0));
}

#[test]
fn test_sharp_beats_smooth() {
    let sharp = Array2::from_shape_fn((16, 16), |(r, c)| if (r + c) % 2 == 0 { 255.0 } else { 0.0 });
    let smooth = Array2::from_shape_fn((16, 16), |(r, c)| (r + c) as f32 * 8.0);
    let sharp_score = laplacian_variance(&sharp).unwrap();
    let smooth_score = laplacian_variance(&smooth).unwrap();
    assert!(
        sharp_score > smooth_score,
        "Sharp plane ({sharp_score}) should score higher than smooth ({smooth_score})"
    );
}

#[test]
fn test_tiny_plane_has_no_estimate() {
    let plane = Array2::<f32>::zeros((2, 5));
    assert_eq!(laplacian_variance(&plane), None);
    assert_eq!(noise_sigma(&plane), None);
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

#[test]
fn test_analyze_is_idempotent() {
    let frame = textured_frame(96, 64);
    assert_eq!(analyze(&frame), analyze(&frame));
}

#[test]
fn test_analyze_solid_color_is_finite() {
    let m = analyze(&Frame::solid(32, 32, [200, 40, 40]));
    for v in [
        m.brightness,
        m.contrast,
        m.saturation,
        m.sharpness,
        m.noise,
        m.color_temp,
        m.block_artifact,
        m.aliasing,
    ] {
        assert!(v.is_finite());
    }
    assert_relative_eq!(m.contrast, 0.0, epsilon = 1e-3);
    assert_relative_eq!(m.sharpness, 0.0, epsilon = 1e-6);
    assert_relative_eq!(m.color_temp, 160.0, epsilon = 1e-3);
}

#[test]
fn test_analyze_empty_frame_falls_back_to_defaults() {
    let empty = Frame::new(Array3::<u8>::zeros((0, 0, 3)));
    assert_eq!(analyze(&empty), QualityMetrics::default());
}

#[test]
fn test_checkerboard_statistics() {
    let m = analyze(&checkerboard(64, 64, 8, 70, 186));
    assert_relative_eq!(m.brightness, 128.0, epsilon = 0.05);
    assert_relative_eq!(m.contrast, 58.0, epsilon = 0.05);
    assert_relative_eq!(m.saturation, 0.0, epsilon = 1e-3);
    assert!(m.aliasing >= 0.0 && m.aliasing <= 1.0);
}

#[test]
fn test_shadow_and_highlight_ratios() {
    let half = Frame::new(Array3::from_shape_fn((10, 10, 3), |(r, _, _)| if r < 5 { 5 } else { 250 }));
    let m = analyze(&half);
    assert_relative_eq!(m.shadow_ratio, 0.5, epsilon = 1e-9);
    assert_relative_eq!(m.highlight_ratio, 0.5, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[test]
fn test_optimal_brightness_and_contrast_are_skipped() {
    let recs = recommend(&analyze(&checkerboard(64, 64, 8, 70, 186)));
    assert!(recs.should_skip(Adjustment::Brightness));
    assert!(recs.should_skip(Adjustment::Contrast));
    assert!(recs.is_needed(Adjustment::Saturation));
    assert!(recs.should_skip(Adjustment::WhiteBalance));
}

#[test]
fn test_dark_flat_frame_needs_work() {
    let recs = recommend(&analyze(&Frame::solid(32, 32, [40, 40, 40])));
    assert!(recs.is_needed(Adjustment::Brightness));
    assert!(recs.is_needed(Adjustment::Contrast));
    assert!(recs.is_needed(Adjustment::AutoLevels));
    assert!(!recs.should_skip(Adjustment::Dehaze));
}

#[test]
fn test_sharpness_band() {
    let mut m = QualityMetrics::default();
    m.sharpness = 50.0;
    assert!(recommend(&m).is_needed(Adjustment::Sharpness));
    m.sharpness = 900.0;
    assert!(recommend(&m).should_skip(Adjustment::Sharpness));
}

#[test]
fn test_every_adjustment_has_a_reason() {
    let recs = recommend(&analyze(&gray_frame(32, 32)));
    assert_eq!(recs.iter().count(), 12);
    assert!(recs.iter().all(|(_, r)| !r.reason.is_empty() && !(r.needed && r.skip)));
}
