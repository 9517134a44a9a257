use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use vidrestore_core::frame::Frame;
use vidrestore_core::io::{FfmpegSource, FfmpegTools, MemorySource, VideoSource};
use vidrestore_core::pipeline::representative_frame;
use vidrestore_core::quality::{analyze, recommend, QualityMetrics, Recommendations};

use crate::summary::print_quality_report;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input video or image file
    pub file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    file: &'a Path,
    frame: usize,
    metrics: &'a QualityMetrics,
    recommendations: &'a Recommendations,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let frame = sample(&args.file)?;
    let metrics = analyze(&frame);
    let recommendations = recommend(&metrics);

    if args.json {
        let report = Report {
            file: &args.file,
            frame: frame.index(),
            metrics: &metrics,
            recommendations: &recommendations,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_quality_report(&args.file, frame.index(), &metrics, &recommendations);
    }
    Ok(())
}

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// The frame quality is measured on: the image itself, or the mid-video frame.
fn sample(path: &Path) -> Result<Frame> {
    let mut source: Box<dyn VideoSource> = if is_image(path) {
        Box::new(
            MemorySource::from_image(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        )
    } else {
        Box::new(
            FfmpegSource::open(path, &FfmpegTools::default())
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )
    };
    representative_frame(source.as_mut())?
        .ok_or_else(|| anyhow!("{} has no frames", path.display()))
}
