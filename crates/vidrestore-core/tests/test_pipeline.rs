mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vidrestore_core::detection::{NullDetector, SkinRegionDetector};
use vidrestore_core::frame::Frame;
use vidrestore_core::io::{MemorySource, NoAudio};
use vidrestore_core::pipeline::config::{Intensity, RestorationConfig, StageConfig, TaskConfig};
use vidrestore_core::pipeline::{
    default_output_path, CallbackReporter, FramePipeline, NoOpReporter, RunIo, Task, TaskControl,
    TaskStatus,
};

use common::{checkerboard, gray_frame, sequence, CountingDetector, RecordingEncoder};

fn config_with(stages: StageConfig) -> TaskConfig {
    let mut config = TaskConfig::new("in.mp4", "out.mp4");
    config.stages = stages;
    config.seed = Some(7);
    config
}

/// Only the temporal stabilizer and the default filters (none) run.
fn passthrough() -> StageConfig {
    let mut stages = StageConfig::default();
    stages.restoration.enabled = false;
    stages.basic.enabled = false;
    stages.advanced.enabled = false;
    stages.smart_mode = false;
    stages
}

fn run(
    config: TaskConfig,
    frames: Vec<Frame>,
    encoder: &RecordingEncoder,
    fallback: &RecordingEncoder,
    control: &TaskControl,
    reporter: &dyn vidrestore_core::pipeline::ProgressReporter,
) -> (Task, vidrestore_core::pipeline::RunSummary) {
    let mut task = Task::new("t1", config);
    let mut pipeline = FramePipeline::new(&task.config, Box::new(NullDetector)).unwrap();
    let mut source = MemorySource::new(frames, 25.0).unwrap();
    let summary = pipeline
        .run(
            &mut task,
            RunIo {
                source: &mut source,
                audio: &NoAudio,
                encoder,
                fallback,
            },
            control,
            reporter,
        )
        .unwrap();
    (task, summary)
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_full_restoration_keeps_frame_count_and_size() {
    let mut stages = StageConfig::default();
    stages.restoration = RestorationConfig::all_steps(Intensity::Medium);
    stages.advanced.enabled = false;
    stages.smart_mode = false;
    let config = config_with(stages);

    let found = Arc::new(AtomicUsize::new(0));
    let detector = CountingDetector {
        inner: SkinRegionDetector::default(),
        found: Arc::clone(&found),
    };
    let mut task = Task::new("full", config);
    let mut pipeline = FramePipeline::new(&task.config, Box::new(detector)).unwrap();
    let mut source = MemorySource::new(sequence(&gray_frame(320, 240), 10), 25.0).unwrap();
    let encoder = RecordingEncoder::default();
    let fallback = RecordingEncoder::default();

    let summary = pipeline
        .run(
            &mut task,
            RunIo {
                source: &mut source,
                audio: &NoAudio,
                encoder: &encoder,
                fallback: &fallback,
            },
            &TaskControl::new(),
            &NoOpReporter,
        )
        .unwrap();

    assert_eq!(summary.status, TaskStatus::Completed);
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(summary.frames_processed, 10);
    assert_eq!(summary.encoder.as_deref(), Some("recording"));
    assert_eq!(task.progress.current, 10);
    assert_eq!(task.progress.total, Some(10));
    assert!((task.progress.percent - 100.0).abs() < 1e-3);

    let frames = encoder.frames();
    assert_eq!(frames.len(), 10);
    assert!(frames.iter().all(|f| f.width() == 320 && f.height() == 240));
    assert_eq!(found.load(Ordering::SeqCst), 0);
    assert_eq!(fallback.calls(), 0);
}

#[test]
fn test_passthrough_preserves_frames() {
    let frames = sequence(&checkerboard(32, 32, 4, 60, 180), 4);
    let encoder = RecordingEncoder::default();
    let (task, summary) = run(
        config_with(passthrough()),
        frames.clone(),
        &encoder,
        &RecordingEncoder::default(),
        &TaskControl::new(),
        &NoOpReporter,
    );
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(summary.frames_processed, 4);
    let written: Vec<_> = encoder.frames().into_iter().map(|f| f.data).collect();
    let expected: Vec<_> = frames.into_iter().map(|f| f.data).collect();
    assert_eq!(written, expected);
}

#[test]
fn test_smart_mode_skips_favorable_adjustments() {
    // Brightness and contrast are already in band, so smart basic grading
    // leaves the restored frames untouched.
    let frames = sequence(&checkerboard(64, 64, 8, 70, 186), 3);
    let restored = |basic: bool| {
        let mut stages = passthrough();
        stages.restoration = RestorationConfig::all_steps(Intensity::Medium);
        stages.smart_mode = true;
        stages.basic.enabled = basic;
        stages.basic.saturation = false;
        stages.basic.temperature = false;
        stages.basic.highlight = false;

        let encoder = RecordingEncoder::default();
        let (task, _) = run(
            config_with(stages),
            frames.clone(),
            &encoder,
            &RecordingEncoder::default(),
            &TaskControl::new(),
            &NoOpReporter,
        );
        assert_eq!(task.status(), TaskStatus::Completed);
        encoder.frames()
    };

    let with_basic = restored(true);
    let without_basic = restored(false);
    assert_eq!(with_basic.len(), 3);
    assert_eq!(with_basic, without_basic);
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

#[test]
fn test_stop_keeps_processed_frames_and_skips_encoding() {
    const STOP_AFTER: usize = 3;
    let control = Arc::new(TaskControl::new());
    let stopper = Arc::clone(&control);
    let reporter = CallbackReporter::new(
        move |p| {
            if p.current == STOP_AFTER {
                stopper.stop();
            }
        },
        |_, _| {},
        |_| {},
    );

    let encoder = RecordingEncoder::default();
    let (task, summary) = run(
        config_with(passthrough()),
        sequence(&gray_frame(16, 16), 10),
        &encoder,
        &RecordingEncoder::default(),
        &control,
        &reporter,
    );

    assert_eq!(summary.status, TaskStatus::Stopped);
    assert_eq!(task.status(), TaskStatus::Stopped);
    assert_eq!(summary.frames_processed, STOP_AFTER);
    assert_eq!(summary.encoder, None);
    assert_eq!(encoder.calls(), 0);
}

#[test]
fn test_pause_then_resume_completes() {
    let control = Arc::new(TaskControl::new());
    let statuses = Arc::new(Mutex::new(Vec::new()));

    let pauser = Arc::clone(&control);
    let seen = Arc::clone(&statuses);
    let reporter = CallbackReporter::new(
        move |p| {
            if p.current == 2 {
                pauser.pause();
                let resumer = Arc::clone(&pauser);
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(50));
                    resumer.resume();
                });
            }
        },
        |_, _| {},
        move |s| seen.lock().unwrap().push(s),
    );

    let encoder = RecordingEncoder::default();
    let (task, summary) = run(
        config_with(passthrough()),
        sequence(&gray_frame(16, 16), 5),
        &encoder,
        &RecordingEncoder::default(),
        &control,
        &reporter,
    );

    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(summary.frames_processed, 5);
    assert_eq!(encoder.frames().len(), 5);
    assert_eq!(
        *statuses.lock().unwrap(),
        vec![
            TaskStatus::Running,
            TaskStatus::Paused,
            TaskStatus::Running,
            TaskStatus::Completed,
        ]
    );
}

#[test]
fn test_stop_while_paused() {
    let control = Arc::new(TaskControl::new());
    let pauser = Arc::clone(&control);
    let reporter = CallbackReporter::new(
        move |p| {
            if p.current == 1 {
                pauser.pause();
                let stopper = Arc::clone(&pauser);
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(20));
                    stopper.stop();
                });
            }
        },
        |_, _| {},
        |_| {},
    );

    let (task, summary) = run(
        config_with(passthrough()),
        sequence(&gray_frame(16, 16), 5),
        &RecordingEncoder::default(),
        &RecordingEncoder::default(),
        &control,
        &reporter,
    );
    assert_eq!(task.status(), TaskStatus::Stopped);
    assert_eq!(summary.frames_processed, 1);
}

// ---------------------------------------------------------------------------
// Encoding fallbacks
// ---------------------------------------------------------------------------

#[test]
fn test_fallback_encoder_used_when_primary_fails() {
    let primary = RecordingEncoder::failing();
    let fallback = RecordingEncoder::default();
    let (task, summary) = run(
        config_with(passthrough()),
        sequence(&gray_frame(16, 16), 4),
        &primary,
        &fallback,
        &TaskControl::new(),
        &NoOpReporter,
    );

    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(summary.encoder.as_deref(), Some("recording"));
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.frames().len(), 4);
}

#[test]
fn test_both_encoders_failing_fails_task() {
    let (task, summary) = run(
        config_with(passthrough()),
        sequence(&gray_frame(16, 16), 2),
        &RecordingEncoder::failing(),
        &RecordingEncoder::failing(),
        &TaskControl::new(),
        &NoOpReporter,
    );

    assert_eq!(summary.status, TaskStatus::Failed);
    assert_eq!(task.status(), TaskStatus::Failed);
    assert!(task.failure().is_some_and(|f| f.contains("refused")));
}

#[test]
fn test_task_runs_only_once() {
    let config = config_with(passthrough());
    let mut task = Task::new("again", config);
    let mut pipeline = FramePipeline::new(&task.config, Box::new(NullDetector)).unwrap();
    let encoder = RecordingEncoder::default();

    for expect_ok in [true, false] {
        let mut source = MemorySource::new(sequence(&gray_frame(8, 8), 2), 25.0).unwrap();
        let result = pipeline.run(
            &mut task,
            RunIo {
                source: &mut source,
                audio: &NoAudio,
                encoder: &encoder,
                fallback: &encoder,
            },
            &TaskControl::new(),
            &NoOpReporter,
        );
        assert_eq!(result.is_ok(), expect_ok);
    }
    assert_eq!(task.status(), TaskStatus::Completed);
}

#[test]
fn test_default_output_path() {
    assert_eq!(
        default_output_path(std::path::Path::new("/videos/clip.mov")),
        std::path::PathBuf::from("/videos/clip_restored.mp4")
    );
}
