use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::io::ffmpeg::{probe, run_tool, FfmpegTools};

/// Pulls the audio track out of a source video.
pub trait AudioExtractor: Send + Sync {
    /// Write the audio track into `scratch_dir`.
    ///
    /// A source without audio is not an error and yields `Ok(None)`.
    fn extract(&self, video: &Path, scratch_dir: &Path) -> Result<Option<PathBuf>>;
}

/// For sources that never carry audio (stills, in-memory frames).
pub struct NoAudio;

impl AudioExtractor for NoAudio {
    fn extract(&self, _video: &Path, _scratch_dir: &Path) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Stream-copies the first audio track into a Matroska audio file, which
/// accepts any source codec.
pub struct FfmpegAudioExtractor {
    tools: FfmpegTools,
}

impl FfmpegAudioExtractor {
    pub fn new(tools: FfmpegTools) -> Self {
        Self { tools }
    }
}

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract(&self, video: &Path, scratch_dir: &Path) -> Result<Option<PathBuf>> {
        if !probe(&self.tools, video)?.has_audio() {
            debug!(path = %video.display(), "Source has no audio stream");
            return Ok(None);
        }

        let target = scratch_dir.join("audio.mka");
        run_tool(
            self.tools
                .ffmpeg()
                .arg("-i")
                .arg(video)
                .args(["-vn", "-map", "0:a:0", "-acodec", "copy", "-y"])
                .arg(&target),
            "ffmpeg",
        )?;

        let size = std::fs::metadata(&target).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Ok(None);
        }
        info!(path = %target.display(), bytes = size, "Extracted audio track");
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_audio_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = NoAudio.extract(Path::new("clip.mp4"), dir.path()).unwrap();
        assert!(audio.is_none());
    }
}
