//! `ffmpeg`/`ffprobe` process plumbing: probing, raw RGB decoding and a
//! shared command runner.

use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Output, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{COLOR_CHANNEL_COUNT, DEFAULT_FPS};
use crate::error::{RestoreError, Result};
use crate::frame::Frame;
use crate::io::video::{VideoInfo, VideoSource};

/// Longest stderr excerpt kept in a [`RestoreError::ToolFailed`].
const STDERR_EXCERPT: usize = 800;

/// Locations of the external binaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegTools {
    pub fn ffmpeg(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin", "-v", "error"]);
        cmd
    }

    pub fn ffprobe(&self) -> Command {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error"]);
        cmd
    }
}

// ---------------------------------------------------------------------------
// ffprobe JSON output
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    /// e.g. "30/1" or "24000/1001"
    pub r_frame_rate: Option<String>,
    pub nb_frames: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

impl FfprobeOutput {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RestoreError::Probe(e.to_string()))
    }

    fn stream_of(&self, kind: &str) -> Option<&FfprobeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    }

    pub fn has_audio(&self) -> bool {
        self.stream_of("audio").is_some()
    }

    /// Stream properties of the first video stream.
    pub fn video_info(&self) -> Result<VideoInfo> {
        let stream = self
            .stream_of("video")
            .ok_or_else(|| RestoreError::Probe("no video stream".into()))?;
        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            (w, h) => {
                return Err(RestoreError::InvalidDimensions {
                    width: w.unwrap_or(0),
                    height: h.unwrap_or(0),
                })
            }
        };
        let fps = stream
            .r_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .unwrap_or(DEFAULT_FPS);

        let duration = stream
            .duration
            .as_deref()
            .or(self.format.as_ref().and_then(|f| f.duration.as_deref()))
            .and_then(|d| d.parse::<f64>().ok());
        let frame_count = stream
            .nb_frames
            .as_deref()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .or_else(|| duration.map(|d| (d * fps).round() as usize).filter(|&n| n > 0));

        Ok(VideoInfo {
            width,
            height,
            fps,
            frame_count,
        })
    }
}

/// Parse an ffprobe rational ("30000/1001") or decimal frame rate.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let fps = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.trim().parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

// ---------------------------------------------------------------------------
// Process helpers
// ---------------------------------------------------------------------------

/// Run a command to completion, mapping spawn failures and non-zero exits
/// to [`RestoreError::ToolFailed`].
pub fn run_tool(cmd: &mut Command, tool: &str) -> Result<Output> {
    debug!(command = ?cmd, "Running {tool}");
    let output = cmd.output().map_err(|e| RestoreError::ToolFailed {
        tool: tool.to_string(),
        exit_code: None,
        stderr: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(RestoreError::ToolFailed {
            tool: tool.to_string(),
            exit_code: output.status.code(),
            stderr: stderr_excerpt(&output.stderr),
        });
    }
    Ok(output)
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .rev()
        .nth(STDERR_EXCERPT)
        .map_or(0, |(i, _)| i);
    text[start..].to_string()
}

/// Probe a media file with `ffprobe -print_format json`.
pub fn probe(tools: &FfmpegTools, path: &Path) -> Result<FfprobeOutput> {
    if !path.exists() {
        return Err(RestoreError::SourceOpen {
            path: path.display().to_string(),
            reason: "file not found".into(),
        });
    }
    let output = run_tool(
        tools
            .ffprobe()
            .args(["-print_format", "json", "-show_format", "-show_streams"])
            .arg(path),
        "ffprobe",
    )?;
    FfprobeOutput::parse(&String::from_utf8_lossy(&output.stdout))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a video file through an `ffmpeg` child writing raw RGB24 to a pipe.
pub struct FfmpegSource {
    path: PathBuf,
    tools: FfmpegTools,
    info: VideoInfo,
    child: Child,
    stdout: BufReader<ChildStdout>,
    next_index: usize,
    finished: bool,
}

impl FfmpegSource {
    pub fn open(path: &Path, tools: &FfmpegTools) -> Result<Self> {
        let info = probe(tools, path)
            .and_then(|p| p.video_info())
            .map_err(|e| RestoreError::SourceOpen {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        info!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = ?info.frame_count,
            "Opened video source"
        );

        let mut child = tools
            .ffmpeg()
            .arg("-i")
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RestoreError::SourceOpen {
                path: path.display().to_string(),
                reason: format!("cannot spawn ffmpeg: {e}"),
            })?;
        let stdout = child.stdout.take().ok_or_else(|| RestoreError::SourceOpen {
            path: path.display().to_string(),
            reason: "ffmpeg stdout unavailable".into(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            tools: tools.clone(),
            info,
            child,
            stdout: BufReader::new(stdout),
            next_index: 0,
            finished: false,
        })
    }

    fn frame_bytes(&self) -> usize {
        self.info.width * self.info.height * COLOR_CHANNEL_COUNT
    }

    /// Reap the decoder once its output is exhausted.
    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        let status = self.child.wait()?;
        if !status.success() && self.next_index == 0 {
            return Err(RestoreError::Decode {
                index: 0,
                reason: format!("ffmpeg exited with {status}"),
            });
        }
        Ok(())
    }
}

impl VideoSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.frame_bytes()];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finish()?;
                return Ok(None);
            }
            Err(e) => {
                return Err(RestoreError::Decode {
                    index: self.next_index,
                    reason: e.to_string(),
                })
            }
        }
        let frame = Frame::from_rgb_bytes(self.info.width, self.info.height, buf)?
            .with_index(self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn sample_frame(&mut self, index: usize) -> Result<Option<Frame>> {
        let seconds = index as f64 / self.info.fps;
        let output = run_tool(
            self.tools
                .ffmpeg()
                .args(["-ss", &format!("{seconds:.3}"), "-i"])
                .arg(&self.path)
                .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]),
            "ffmpeg",
        )?;
        let mut bytes = output.stdout;
        if bytes.len() < self.frame_bytes() {
            return Ok(None);
        }
        bytes.truncate(self.frame_bytes());
        Ok(Some(
            Frame::from_rgb_bytes(self.info.width, self.info.height, bytes)?.with_index(index),
        ))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_forms() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn probe_json_video_info() {
        let json = r#"{
            "streams": [
                {"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "codec_name": "h264", "width": 640,
                 "height": 360, "r_frame_rate": "24000/1001", "nb_frames": "240"}
            ],
            "format": {"duration": "10.01"}
        }"#;
        let probe = FfprobeOutput::parse(json).unwrap();
        assert!(probe.has_audio());
        let info = probe.video_info().unwrap();
        assert_eq!((info.width, info.height), (640, 360));
        assert_eq!(info.frame_count, Some(240));
    }

    #[test]
    fn frame_count_from_duration() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 8, "height": 8, "r_frame_rate": "25/1"}],
            "format": {"duration": "2.0"}
        }"#;
        let info = FfprobeOutput::parse(json).unwrap().video_info().unwrap();
        assert_eq!(info.frame_count, Some(50));
    }

    #[test]
    fn probe_without_video_fails() {
        let json = r#"{"streams": [{"codec_type": "audio"}]}"#;
        let probe = FfprobeOutput::parse(json).unwrap();
        assert!(probe.has_audio());
        assert!(probe.video_info().is_err());
    }

    #[test]
    fn missing_tool_reports_failure() {
        let err = run_tool(&mut Command::new("vidrestore-no-such-tool"), "missing").unwrap_err();
        assert!(matches!(err, RestoreError::ToolFailed { exit_code: None, .. }));
    }
}
