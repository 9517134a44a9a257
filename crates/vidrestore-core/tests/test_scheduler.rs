mod common;

use vidrestore_core::detection::NullDetector;
use vidrestore_core::pipeline::config::{Intensity, RestorationConfig};
use vidrestore_core::quality::analyze;
use vidrestore_core::restore::scheduler::{build_plan, merge_by_edges};
use vidrestore_core::restore::{worker_count, StageKind, StageScheduler};

use common::{checkerboard, gray_frame, textured_frame};

// ---------------------------------------------------------------------------
// Worker pool sizing
// ---------------------------------------------------------------------------

#[test]
fn test_worker_count_clamps() {
    assert_eq!(worker_count(1, 0.7), 2);
    assert_eq!(worker_count(4, 0.7), 2);
    assert_eq!(worker_count(8, 0.5), 4);
    assert_eq!(worker_count(16, 0.7), 8);
    assert_eq!(worker_count(64, 1.0), 8);
    assert_eq!(worker_count(8, 0.0), 2);
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[test]
fn test_plan_keeps_pipeline_order() {
    let config = RestorationConfig::all_steps(Intensity::Heavy);
    assert_eq!(build_plan(&config, false), StageKind::ALL.to_vec());
}

#[test]
fn test_plan_drops_final_sharpen_when_filter_sharpens() {
    let config = RestorationConfig::all_steps(Intensity::Medium);
    let plan = build_plan(&config, true);
    assert_eq!(plan.len(), 7);
    assert!(!plan.contains(&StageKind::FinalSharpen));
}

#[test]
fn test_plan_respects_switches() {
    let config = RestorationConfig {
        deblock: false,
        face_repair: false,
        hair_protect: false,
        grain: false,
        ..RestorationConfig::default()
    };
    assert_eq!(
        build_plan(&config, false),
        vec![
            StageKind::PreSharpen,
            StageKind::AntiAlias,
            StageKind::Denoise,
            StageKind::FinalSharpen,
        ]
    );
}

// ---------------------------------------------------------------------------
// Edge merge
// ---------------------------------------------------------------------------

#[test]
fn test_merge_of_identical_frames_is_identity() {
    let frame = textured_frame(48, 32);
    assert_eq!(merge_by_edges(&frame, &frame, &frame), frame);
}

#[test]
fn test_merge_is_deterministic() {
    let input = checkerboard(48, 48, 8, 40, 200);
    let aa = gray_frame(48, 48);
    let dn = textured_frame(48, 48);
    let a = merge_by_edges(&input, &aa, &dn);
    let b = merge_by_edges(&input, &aa, &dn);
    assert_eq!(a, b);
}

#[test]
fn test_merge_takes_denoised_away_from_edges() {
    let input = gray_frame(32, 32);
    let aa = checkerboard(32, 32, 4, 0, 255);
    let dn = textured_frame(32, 32);
    // A flat input has no edges, so the denoised frame wins everywhere.
    assert_eq!(merge_by_edges(&input, &aa, &dn), dn);
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[test]
fn test_scheduler_reports_plan_and_workers() {
    let config = RestorationConfig::all_steps(Intensity::Light);
    let scheduler = StageScheduler::new(&config, false, 0.7, Box::new(NullDetector)).unwrap();
    assert_eq!(scheduler.plan(), &StageKind::ALL[..]);
    assert!((2..=8).contains(&scheduler.workers()));
}

#[test]
fn test_seeded_run_is_reproducible() {
    let config = RestorationConfig::all_steps(Intensity::Medium);
    let scheduler = StageScheduler::new(&config, false, 0.7, Box::new(NullDetector)).unwrap();
    let frame = textured_frame(64, 48).with_index(4);
    let metrics = analyze(&frame);

    let a = scheduler.run(frame.clone(), &frame, Some(&metrics), Some(42));
    let b = scheduler.run(frame.clone(), &frame, Some(&metrics), Some(42));
    assert_eq!(a.frame, b.frame);
    assert_eq!(a.frame.data.dim(), frame.data.dim());
    assert!(a.faces.is_empty());
}

#[test]
fn test_scheduler_without_steps_is_identity() {
    let config = RestorationConfig {
        deblock: false,
        pre_sharpen: false,
        anti_alias: false,
        denoise: false,
        face_repair: false,
        hair_protect: false,
        final_sharpen: false,
        grain: false,
        ..RestorationConfig::default()
    };
    let scheduler = StageScheduler::new(&config, false, 0.5, Box::new(NullDetector)).unwrap();
    assert!(scheduler.plan().is_empty());

    let frame = textured_frame(32, 32);
    assert_eq!(scheduler.run(frame.clone(), &frame, None, None).frame, frame);
}
