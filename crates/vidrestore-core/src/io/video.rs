use std::path::Path;

use serde::Serialize;

use crate::consts::DEFAULT_FPS;
use crate::error::{RestoreError, Result};
use crate::frame::Frame;
use crate::io::image_io::load_frame;

/// Stream properties of a video source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VideoInfo {
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    /// `None` when the container does not report a frame count.
    pub frame_count: Option<usize>,
}

/// A sequential frame decoder.
pub trait VideoSource: Send {
    fn info(&self) -> &VideoInfo;

    /// Next frame in presentation order, or `None` once the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Decode the frame at `index` without disturbing the sequential position.
    fn sample_frame(&mut self, index: usize) -> Result<Option<Frame>>;
}

/// Frames held in memory. Used for still images and tests.
pub struct MemorySource {
    info: VideoInfo,
    frames: Vec<Frame>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>, fps: f64) -> Result<Self> {
        let first = frames.first().ok_or_else(|| RestoreError::SourceOpen {
            path: "<memory>".into(),
            reason: "no frames".into(),
        })?;
        if let Some(bad) = frames.iter().find(|f| !f.same_shape(first)) {
            return Err(RestoreError::InvalidDimensions {
                width: bad.width(),
                height: bad.height(),
            });
        }
        let info = VideoInfo {
            width: first.width(),
            height: first.height(),
            fps,
            frame_count: Some(frames.len()),
        };
        Ok(Self {
            info,
            frames,
            cursor: 0,
        })
    }

    /// A one-frame source from an image file.
    pub fn from_image(path: &Path) -> Result<Self> {
        Self::new(vec![load_frame(path)?], DEFAULT_FPS)
    }
}

impl VideoSource for MemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let Some(frame) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        let frame = frame.clone().with_index(self.cursor);
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn sample_frame(&mut self, index: usize) -> Result<Option<Frame>> {
        Ok(self.frames.get(index).map(|f| f.clone().with_index(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reads_in_order() {
        let frames = (0..3).map(|i| Frame::solid(4, 2, [i * 10, 0, 0])).collect();
        let mut source = MemorySource::new(frames, 30.0).unwrap();
        assert_eq!(source.info().frame_count, Some(3));

        let mut seen = Vec::new();
        while let Some(frame) = source.read_frame().unwrap() {
            seen.push((frame.index(), frame.data[[0, 0, 0]]));
        }
        assert_eq!(seen, vec![(0, 0), (1, 10), (2, 20)]);
        assert_eq!(source.sample_frame(1).unwrap().unwrap().data[[0, 0, 0]], 10);
    }

    #[test]
    fn memory_source_rejects_mixed_sizes() {
        let frames = vec![Frame::solid(4, 2, [0; 3]), Frame::solid(2, 2, [0; 3])];
        assert!(MemorySource::new(frames, 30.0).is_err());
        assert!(MemorySource::new(Vec::new(), 30.0).is_err());
    }
}
