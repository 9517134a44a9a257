//! Turning the processed frame sequence back into a video file.
//!
//! [`H264Encoder`] is the primary path. [`FallbackEncoder`] assembles the
//! sequence into a raw AVI itself and only asks ffmpeg to attach audio (or
//! to re-encode when there is none).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{GOP_FPS_BOUNDARY, GOP_HIGH_FPS, GOP_STANDARD, MIN_OUTPUT_BYTES};
use crate::error::{RestoreError, Result};
use crate::io::avi_writer::RawAviWriter;
use crate::io::ffmpeg::{run_tool, FfmpegTools};
use crate::io::frame_store::frame_path;
use crate::io::image_io::load_frame;

/// Containers that can carry the raw AVI video stream without re-encoding.
const RAW_VIDEO_CONTAINERS: [&str; 3] = ["avi", "mkv", "mov"];

/// Encoder parameters. Serialized as the `[encoder]` table of a task config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub tools: FfmpegTools,
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 speed preset.
    pub preset: String,
    pub audio_bitrate: String,
    /// Outputs at or below this size are treated as failed.
    pub min_output_bytes: u64,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            tools: FfmpegTools::default(),
            crf: 23,
            preset: "medium".into(),
            audio_bitrate: "128k".into(),
            min_output_bytes: MIN_OUTPUT_BYTES,
        }
    }
}

/// `(gop, keyint_min)` for a frame rate.
pub fn gop_policy(fps: f64) -> (u32, u32) {
    if fps <= GOP_FPS_BOUNDARY {
        GOP_STANDARD
    } else {
        GOP_HIGH_FPS
    }
}

/// Everything an encoder needs to produce the output file.
#[derive(Clone, Debug)]
pub struct EncodeJob {
    /// Directory holding `frame_000000.png`, `frame_000001.png`, ...
    pub frames_dir: PathBuf,
    pub frame_count: usize,
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
}

impl EncodeJob {
    fn frame_pattern(&self) -> PathBuf {
        self.frames_dir.join(crate::consts::FRAME_FILE_PATTERN)
    }

    fn output_extension(&self) -> String {
        self.output
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }

    fn ensure_frames(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(RestoreError::Encode("no frames to encode".into()));
        }
        Ok(())
    }
}

/// Produces the output video for a finished frame sequence.
pub trait Encoder: Send + Sync {
    fn name(&self) -> &str;

    /// Write `job.output`. On error no file that looks valid is left behind.
    fn encode(&self, job: &EncodeJob) -> Result<()>;
}

/// Check the output exists and is larger than `min_bytes`; remove it otherwise.
pub fn validate_output(path: &Path, min_bytes: u64) -> Result<u64> {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size <= min_bytes {
        let _ = std::fs::remove_file(path);
        return Err(RestoreError::Encode(format!(
            "{} is missing or too small ({size} bytes)",
            path.display()
        )));
    }
    Ok(size)
}

/// Run an ffmpeg invocation that writes `output`, removing partial files on failure.
fn run_writing(tools: &FfmpegTools, args: &[OsString], output: &Path, min_bytes: u64) -> Result<u64> {
    if let Err(e) = run_tool(tools.ffmpeg().args(args), "ffmpeg") {
        let _ = std::fs::remove_file(output);
        return Err(e);
    }
    validate_output(output, min_bytes)
}

fn os<S: Into<OsString>>(s: S) -> OsString {
    s.into()
}

fn h264_video_args(settings: &EncoderSettings, fps: f64) -> Vec<OsString> {
    let (gop, keyint_min) = gop_policy(fps);
    [
        "-c:v", "libx264", "-profile:v", "main", "-level", "4.0", "-preset",
    ]
    .into_iter()
    .map(os)
    .chain([
        os(settings.preset.as_str()),
        os("-crf"),
        os(settings.crf.to_string()),
        os("-pix_fmt"),
        os("yuv420p"),
        os("-g"),
        os(gop.to_string()),
        os("-keyint_min"),
        os(keyint_min.to_string()),
        os("-bf"),
        os("2"),
        os("-movflags"),
        os("+faststart"),
    ])
    .collect()
}

fn audio_args(settings: &EncoderSettings) -> Vec<OsString> {
    [
        os("-map"),
        os("0:v:0"),
        os("-map"),
        os("1:a:0"),
        os("-c:a"),
        os("aac"),
        os("-b:a"),
        os(settings.audio_bitrate.as_str()),
        os("-ac"),
        os("2"),
        os("-shortest"),
    ]
    .into()
}

/// H.264/AAC MP4 straight from the PNG sequence.
pub struct H264Encoder {
    settings: EncoderSettings,
}

impl H264Encoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    /// Full ffmpeg argument list for `job`.
    pub fn args(&self, job: &EncodeJob) -> Vec<OsString> {
        let mut args = vec![
            os("-y"),
            os("-framerate"),
            os(format!("{}", job.fps)),
            os("-start_number"),
            os("0"),
            os("-i"),
            job.frame_pattern().into_os_string(),
        ];
        if let Some(audio) = &job.audio {
            args.push(os("-i"));
            args.push(audio.clone().into_os_string());
        }
        args.extend(h264_video_args(&self.settings, job.fps));
        if job.audio.is_some() {
            args.extend(audio_args(&self.settings));
        }
        args.push(job.output.clone().into_os_string());
        args
    }
}

impl Encoder for H264Encoder {
    fn name(&self) -> &str {
        "h264"
    }

    fn encode(&self, job: &EncodeJob) -> Result<()> {
        job.ensure_frames()?;
        let size = run_writing(
            &self.settings.tools,
            &self.args(job),
            &job.output,
            self.settings.min_output_bytes,
        )?;
        info!(output = %job.output.display(), bytes = size, frames = job.frame_count, "Encoded video");
        Ok(())
    }
}

/// Builds a raw AVI in-process, then muxes audio or re-encodes with ffmpeg.
pub struct FallbackEncoder {
    settings: EncoderSettings,
}

impl FallbackEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    fn write_raw(&self, job: &EncodeJob, path: &Path) -> Result<()> {
        let mut writer = RawAviWriter::create(path, job.width, job.height, job.fps)?;
        for i in 0..job.frame_count {
            writer.write_frame(&load_frame(&frame_path(&job.frames_dir, i))?)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Arguments for attaching `audio` to the raw video.
    pub fn mux_args(&self, raw: &Path, audio: &Path, job: &EncodeJob) -> Vec<OsString> {
        let mut args = vec![
            os("-y"),
            os("-i"),
            raw.as_os_str().to_owned(),
            os("-i"),
            audio.as_os_str().to_owned(),
        ];
        if RAW_VIDEO_CONTAINERS.contains(&job.output_extension().as_str()) {
            args.extend([os("-c:v"), os("copy")]);
        } else {
            args.extend([os("-c:v"), os("mpeg4"), os("-q:v"), os("2")]);
        }
        args.extend([
            os("-map"),
            os("0:v:0"),
            os("-map"),
            os("1:a:0"),
            os("-c:a"),
            os("aac"),
            os("-b:a"),
            os(self.settings.audio_bitrate.as_str()),
            os("-shortest"),
        ]);
        args.push(job.output.clone().into_os_string());
        args
    }

    fn reencode_args(&self, raw: &Path, job: &EncodeJob) -> Vec<OsString> {
        let mut args = vec![os("-y"), os("-i"), raw.as_os_str().to_owned()];
        args.extend(h264_video_args(&self.settings, job.fps));
        args.push(job.output.clone().into_os_string());
        args
    }
}

impl Encoder for FallbackEncoder {
    fn name(&self) -> &str {
        "raw-fallback"
    }

    fn encode(&self, job: &EncodeJob) -> Result<()> {
        job.ensure_frames()?;
        let raw = job.frames_dir.join("fallback_raw.avi");
        self.write_raw(job, &raw)?;

        let min = self.settings.min_output_bytes;
        let tools = &self.settings.tools;
        let size = match &job.audio {
            Some(audio) => run_writing(tools, &self.mux_args(&raw, audio, job), &job.output, min)?,
            None if job.output_extension() == "avi" => {
                if std::fs::rename(&raw, &job.output).is_err() {
                    std::fs::copy(&raw, &job.output)?;
                }
                validate_output(&job.output, min)?
            }
            None => {
                warn!("No audio track; re-encoding raw fallback to H.264");
                run_writing(tools, &self.reencode_args(&raw, job), &job.output, min)?
            }
        };
        let _ = std::fs::remove_file(&raw);
        info!(output = %job.output.display(), bytes = size, "Fallback encode finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_pair(args: &[OsString], key: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == key && w[1] == value)
    }

    fn job(audio: Option<&str>, output: &str) -> EncodeJob {
        EncodeJob {
            frames_dir: PathBuf::from("/tmp/frames"),
            frame_count: 10,
            width: 64,
            height: 48,
            fps: 60.0,
            audio: audio.map(PathBuf::from),
            output: PathBuf::from(output),
        }
    }

    #[test]
    fn h264_args_follow_gop_policy() {
        let encoder = H264Encoder::new(EncoderSettings::default());
        let args = encoder.args(&job(Some("/tmp/audio.mka"), "out.mp4"));
        assert!(has_pair(&args, "-g", "180"));
        assert!(has_pair(&args, "-keyint_min", "60"));
        assert!(has_pair(&args, "-pix_fmt", "yuv420p"));
        assert!(has_pair(&args, "-movflags", "+faststart"));
        assert!(has_pair(&args, "-c:a", "aac"));
        assert!(has_pair(&args, "-crf", "23"));
    }

    #[test]
    fn h264_args_without_audio() {
        let encoder = H264Encoder::new(EncoderSettings::default());
        let args = encoder.args(&job(None, "out.mp4"));
        assert!(!args.iter().any(|a| a == "-c:a"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn mux_copies_video_only_into_raw_friendly_containers() {
        let encoder = FallbackEncoder::new(EncoderSettings::default());
        let raw = Path::new("raw.avi");
        let audio = Path::new("audio.mka");
        assert!(has_pair(&encoder.mux_args(raw, audio, &job(None, "out.mkv")), "-c:v", "copy"));
        assert!(has_pair(&encoder.mux_args(raw, audio, &job(None, "out.mp4")), "-c:v", "mpeg4"));
    }

    #[test]
    fn validate_removes_small_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.mp4");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(validate_output(&path, 1000).is_err());
        assert!(!path.exists());
    }
}
