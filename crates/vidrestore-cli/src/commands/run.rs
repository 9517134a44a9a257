use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use vidrestore_core::detection::SkinRegionDetector;
use vidrestore_core::pipeline::{
    default_output_path, run_ffmpeg_task, ProgressReporter, Task, TaskControl, TaskProgress,
    TaskStatus,
};

use super::stages::StageArgs;
use crate::summary::print_task_summary;

#[derive(Args)]
pub struct RunArgs {
    /// Input video file
    pub file: PathBuf,

    /// Output video path (default: <input>_restored.mp4)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub stages: StageArgs,

    /// x264 constant rate factor
    #[arg(long)]
    pub crf: Option<u8>,

    /// x264 speed preset
    #[arg(long)]
    pub preset: Option<String>,
}

/// Drives an indicatif bar from task callbacks.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:10} [{bar:40}] {pos}/{len} {per_sec} ETA {eta}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn progress(&self, progress: &TaskProgress) {
        if let Some(total) = progress.total {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(progress.current as u64);
    }

    fn status(&self, status: TaskStatus) {
        self.bar.set_message(status.to_string());
        if status.is_terminal() {
            self.bar.finish();
        }
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file));
    let mut config = args.stages.task_config(&args.file, &output)?;
    if let Some(crf) = args.crf {
        config.encoder.crf = crf;
    }
    if let Some(ref preset) = args.preset {
        config.encoder.preset = preset.clone();
    }

    print_task_summary(&config);

    let mut task = Task::new("cli", config);
    let reporter = BarReporter::new()?;
    let control = TaskControl::new();
    let summary = run_ffmpeg_task(
        &mut task,
        Box::new(SkinRegionDetector::default()),
        &control,
        &reporter,
    )?;

    match summary.status {
        TaskStatus::Completed => {
            println!(
                "\n{} frames in {:.1}s, encoded with {}",
                summary.frames_processed,
                summary.elapsed.as_secs_f64(),
                summary.encoder.as_deref().unwrap_or("unknown")
            );
            println!("Output saved to {}", task.config.output.display());
            Ok(())
        }
        status => bail!(
            "Task {status}: {}",
            task.failure().unwrap_or("no reason recorded")
        ),
    }
}
