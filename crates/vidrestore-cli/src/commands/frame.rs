use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vidrestore_core::detection::SkinRegionDetector;
use vidrestore_core::io::image_io::{load_frame, save_frame};
use vidrestore_core::pipeline::FrameProcessor;

use super::stages::StageArgs;

#[derive(Args)]
pub struct FrameArgs {
    /// Input image (PNG, JPEG, TIFF)
    pub file: PathBuf,

    /// Output image path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub stages: StageArgs,
}

pub fn run(args: &FrameArgs) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".into());
        args.file.with_file_name(format!("{stem}_restored.png"))
    });
    let config = args.stages.task_config(&args.file, &output)?;

    let frame =
        load_frame(&args.file).with_context(|| format!("Failed to load {}", args.file.display()))?;
    println!(
        "Loaded {} ({}x{})",
        args.file.display(),
        frame.width(),
        frame.height()
    );

    let mut processor = FrameProcessor::new(&config, Box::new(SkinRegionDetector::default()))?;
    processor.calibrate(&frame);
    let processed = processor.process(frame);

    save_frame(&processed.frame, &output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    println!(
        "Saved {} ({} face region(s) found)",
        output.display(),
        processed.faces.len()
    );
    Ok(())
}
