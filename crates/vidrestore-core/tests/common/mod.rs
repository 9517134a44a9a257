#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::Array3;

use vidrestore_core::detection::FaceDetector;
use vidrestore_core::error::{RestoreError, Result};
use vidrestore_core::frame::{BoundingBox, Frame};
use vidrestore_core::io::encoder::{EncodeJob, Encoder};
use vidrestore_core::io::frame_store::frame_path;
use vidrestore_core::io::image_io::load_frame;

/// Solid mid-gray frame.
pub fn gray_frame(width: usize, height: usize) -> Frame {
    Frame::solid(width, height, [128, 128, 128])
}

/// Gray checkerboard of `cell`-pixel squares alternating between `dark` and `light`.
pub fn checkerboard(width: usize, height: usize, cell: usize, dark: u8, light: u8) -> Frame {
    Frame::new(Array3::from_shape_fn((height, width, 3), |(r, c, _)| {
        if (r / cell + c / cell) % 2 == 0 {
            dark
        } else {
            light
        }
    }))
}

/// Colorful frame with smooth gradients and a few hard edges.
pub fn textured_frame(width: usize, height: usize) -> Frame {
    Frame::new(Array3::from_shape_fn((height, width, 3), |(r, c, ch)| {
        let base = match ch {
            0 => (c * 255 / width.max(1)) as i32,
            1 => (r * 255 / height.max(1)) as i32,
            _ => 128,
        };
        let stripe = if (c / 6) % 2 == 0 { 30 } else { -30 };
        (base + stripe).clamp(0, 255) as u8
    }))
}

/// `count` copies of `frame`, indexed in order.
pub fn sequence(frame: &Frame, count: usize) -> Vec<Frame> {
    (0..count).map(|i| frame.clone().with_index(i)).collect()
}

/// Encoder that loads the frame sequence back instead of producing a video.
#[derive(Default)]
pub struct RecordingEncoder {
    pub frames: Mutex<Vec<Frame>>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl RecordingEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }
}

impl Encoder for RecordingEncoder {
    fn name(&self) -> &str {
        if self.fail {
            "failing"
        } else {
            "recording"
        }
    }

    fn encode(&self, job: &EncodeJob) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RestoreError::Encode("refused".into()));
        }
        let mut frames = self.frames.lock().unwrap();
        for i in 0..job.frame_count {
            frames.push(load_frame(&frame_path(&job.frames_dir, i))?);
        }
        Ok(())
    }
}

/// Wraps a detector and counts every face it reports.
pub struct CountingDetector<D> {
    pub inner: D,
    pub found: Arc<AtomicUsize>,
}

impl<D: FaceDetector> FaceDetector for CountingDetector<D> {
    fn name(&self) -> &str {
        "counting"
    }

    fn detect(&self, frame: &Frame) -> Vec<BoundingBox> {
        let faces = self.inner.detect(frame);
        self.found.fetch_add(faces.len(), Ordering::SeqCst);
        faces
    }
}

/// Largest absolute per-sample difference between two frames.
pub fn max_abs_diff(a: &Frame, b: &Frame) -> u8 {
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}
