use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::consts::FPS_WINDOW;
use crate::detection::FaceDetector;
use crate::error::{RestoreError, Result};
use crate::frame::Frame;
use crate::io::audio::{AudioExtractor, FfmpegAudioExtractor};
use crate::io::encoder::{EncodeJob, Encoder, FallbackEncoder, H264Encoder};
use crate::io::ffmpeg::FfmpegSource;
use crate::io::frame_store::FrameStore;
use crate::io::video::VideoSource;

use super::config::TaskConfig;
use super::control::TaskControl;
use super::processor::FrameProcessor;
use super::task::{FpsMeter, Task, TaskStatus};
use super::types::ProgressReporter;

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub frames_processed: usize,
    pub elapsed: Duration,
    pub status: TaskStatus,
    /// The encoder that produced the output, when the task completed.
    pub encoder: Option<String>,
}

enum Flow {
    Completed(String),
    Stopped,
}

/// External collaborators of one run.
pub struct RunIo<'a> {
    pub source: &'a mut dyn VideoSource,
    pub audio: &'a dyn AudioExtractor,
    pub encoder: &'a dyn Encoder,
    pub fallback: &'a dyn Encoder,
}

/// Drives one task: read, process and store every frame in order, then encode.
pub struct FramePipeline {
    processor: FrameProcessor,
}

impl FramePipeline {
    pub fn new(config: &TaskConfig, detector: Box<dyn FaceDetector>) -> Result<Self> {
        Ok(Self {
            processor: FrameProcessor::new(config, detector)?,
        })
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }

    /// Run `task` to a terminal state.
    ///
    /// Source and encoder failures end as [`TaskStatus::Failed`] with the
    /// reason in [`Task::failure`]; only a task that is not `Pending` is an error.
    pub fn run(
        &mut self,
        task: &mut Task,
        io: RunIo<'_>,
        control: &TaskControl,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunSummary> {
        task.transition(TaskStatus::Running)?;
        reporter.status(TaskStatus::Running);
        info!(task = %task.id, input = %task.config.input.display(), "Task started");

        self.processor.reset();
        let started = Instant::now();
        let result = self.execute(task, io, control, reporter, started);
        self.processor.reset();

        let (status, encoder) = match result {
            Ok(Flow::Completed(encoder)) => (TaskStatus::Completed, Some(encoder)),
            Ok(Flow::Stopped) => (TaskStatus::Stopped, None),
            Err(e) => {
                error!(task = %task.id, error = %e, "Task failed");
                task.fail(e.to_string())?;
                (TaskStatus::Failed, None)
            }
        };
        task.transition(status)?;
        reporter.status(status);

        let elapsed = started.elapsed();
        info!(
            task = %task.id,
            status = %status,
            frames = task.progress.current,
            elapsed_ms = elapsed.as_millis() as u64,
            "Task finished"
        );
        Ok(RunSummary {
            frames_processed: task.progress.current,
            elapsed,
            status,
            encoder,
        })
    }

    fn execute(
        &mut self,
        task: &mut Task,
        io: RunIo<'_>,
        control: &TaskControl,
        reporter: &dyn ProgressReporter,
        started: Instant,
    ) -> Result<Flow> {
        let RunIo {
            source,
            audio,
            encoder,
            fallback,
        } = io;
        let info = source.info().clone();

        let scratch = tempfile::Builder::new().prefix("vidrestore-").tempdir()?;
        let mut store = FrameStore::new(&scratch.path().join("frames"))?;

        match representative_frame(source)? {
            Some(frame) => {
                self.processor.calibrate(&frame);
            }
            None => warn!("No frame available for quality sampling"),
        }

        let mut meter = FpsMeter::new(FPS_WINDOW);
        let mut size = (info.width, info.height);
        loop {
            if control.is_paused() {
                task.transition(TaskStatus::Paused)?;
                reporter.status(TaskStatus::Paused);
                info!(task = %task.id, "Paused");
                if !control.wait_while_paused() {
                    task.transition(TaskStatus::Running)?;
                    reporter.status(TaskStatus::Running);
                    info!(task = %task.id, "Resumed");
                }
            }
            if control.is_stopped() {
                info!(task = %task.id, frames = store.count(), "Stopped");
                return Ok(Flow::Stopped);
            }

            let Some(frame) = source.read_frame()? else {
                break;
            };
            let tick = Instant::now();
            let processed = self.processor.process(frame);

            if control.is_stopped() {
                info!(task = %task.id, frames = store.count(), "Stopped before writing frame");
                return Ok(Flow::Stopped);
            }
            size = (processed.frame.width(), processed.frame.height());
            store.push(&processed.frame)?;
            meter.record(tick.elapsed());

            task.progress
                .update(store.count(), info.frame_count, meter.fps(), started.elapsed());
            reporter.progress(&task.progress);
            reporter.time(task.progress.elapsed, task.progress.eta);
        }

        if store.count() == 0 {
            return Err(RestoreError::Decode {
                index: 0,
                reason: "source produced no frames".into(),
            });
        }
        if control.is_stopped() {
            return Ok(Flow::Stopped);
        }

        let audio = match audio.extract(&task.config.input, scratch.path()) {
            Ok(track) => track,
            Err(e) => {
                warn!(error = %e, "Audio extraction failed, encoding without audio");
                None
            }
        };
        let job = EncodeJob {
            frames_dir: store.dir().to_path_buf(),
            frame_count: store.count(),
            width: size.0,
            height: size.1,
            fps: info.fps,
            audio,
            output: task.config.output.clone(),
        };
        encode(&job, encoder, fallback).map(Flow::Completed)
    }
}

/// The mid-video frame when the length is known, else the first frame.
pub fn representative_frame(source: &mut dyn VideoSource) -> Result<Option<Frame>> {
    if let Some(total) = source.info().frame_count.filter(|&n| n > 1) {
        if let Some(frame) = source.sample_frame(total / 2)? {
            return Ok(Some(frame));
        }
    }
    source.sample_frame(0)
}

/// Primary encoder, then the fallback. Returns the name of the one that succeeded.
fn encode(job: &EncodeJob, primary: &dyn Encoder, fallback: &dyn Encoder) -> Result<String> {
    let primary_err = match primary.encode(job) {
        Ok(()) => return Ok(primary.name().to_string()),
        Err(e) => e,
    };
    warn!(
        encoder = primary.name(),
        error = %primary_err,
        fallback = fallback.name(),
        "Primary encoder failed, using fallback"
    );
    match fallback.encode(job) {
        Ok(()) => Ok(fallback.name().to_string()),
        Err(e) => Err(RestoreError::Encode(format!(
            "{}: {primary_err}; {}: {e}",
            primary.name(),
            fallback.name()
        ))),
    }
}

/// Run `task` against its input file with the ffmpeg-backed collaborators.
///
/// A source that cannot be opened fails the task without entering `Running`.
pub fn run_ffmpeg_task(
    task: &mut Task,
    detector: Box<dyn FaceDetector>,
    control: &TaskControl,
    reporter: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let settings = task.config.encoder.clone();
    let mut source = match FfmpegSource::open(&task.config.input, &settings.tools) {
        Ok(source) => source,
        Err(e) => {
            error!(task = %task.id, error = %e, "Cannot open source");
            task.fail(e.to_string())?;
            reporter.status(TaskStatus::Failed);
            return Ok(RunSummary {
                frames_processed: 0,
                elapsed: Duration::ZERO,
                status: TaskStatus::Failed,
                encoder: None,
            });
        }
    };

    let mut pipeline = FramePipeline::new(&task.config, detector)?;
    let audio = FfmpegAudioExtractor::new(settings.tools.clone());
    let encoder = H264Encoder::new(settings.clone());
    let fallback = FallbackEncoder::new(settings);
    pipeline.run(
        task,
        RunIo {
            source: &mut source,
            audio: &audio,
            encoder: &encoder,
            fallback: &fallback,
        },
        control,
        reporter,
    )
}

/// Default output path next to the input: `<stem>_restored.mp4`.
pub fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    input.with_file_name(format!("{stem}_restored.mp4"))
}
