use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vidrestore_core::io::ffmpeg::{probe, FfmpegTools};

#[derive(Args)]
pub struct InfoArgs {
    /// Input video file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let output = probe(&FfmpegTools::default(), &args.file)
        .with_context(|| format!("Failed to probe {}", args.file.display()))?;
    let info = output.video_info()?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Frame rate:  {:.3} fps", info.fps);
    match info.frame_count {
        Some(n) => println!("Frames:      {n}"),
        None => println!("Frames:      unknown"),
    }
    println!("Audio:       {}", if output.has_audio() { "yes" } else { "no" });

    if let Some(n) = info.frame_count.filter(|_| info.fps > 0.0) {
        println!("Duration:    {:.1} s", n as f64 / info.fps);
    }
    let frame_bytes = info.width * info.height * 3;
    if let Some(n) = info.frame_count {
        let total_mb = (frame_bytes * n) as f64 / (1024.0 * 1024.0);
        println!("Scratch:     {:.1} MB decoded", total_mb);
    }

    Ok(())
}
