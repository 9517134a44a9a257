use std::collections::VecDeque;

use ndarray::{Array2, Array3, Zip};
use tracing::debug;

use crate::consts::{TEMPORAL_BUFFER_MAX, TEMPORAL_STABLE_THRESHOLD, TEMPORAL_WEIGHT};
use crate::filters::gaussian_blur::gaussian_blur_sized;
use crate::frame::Frame;

/// Flicker reduction across consecutive frames of one task.
///
/// Holds up to [`TEMPORAL_BUFFER_MAX`] prior input frames. Each new frame is
/// blended with the stable (low-difference) regions of those priors, weighted
/// `TEMPORAL_WEIGHT * 0.5^distance`. Call [`reset`](Self::reset) before
/// starting another source.
#[derive(Debug)]
pub struct TemporalStabilizer {
    buffer: VecDeque<Array3<f32>>,
    capacity: usize,
}

impl Default for TemporalStabilizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalStabilizer {
    pub fn new() -> Self {
        Self::with_capacity(TEMPORAL_BUFFER_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Number of prior frames currently held.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn stabilize(&mut self, frame: Frame) -> Frame {
        let current = frame.to_f32();

        if self.buffer.front().is_some_and(|prev| prev.dim() != current.dim()) {
            debug!(index = frame.index(), "Frame size changed, clearing temporal buffer");
            self.buffer.clear();
        }

        let out = if self.buffer.is_empty() {
            frame
        } else {
            let blended = self.blend(&current);
            frame.with_f32(&blended)
        };

        self.buffer.push_back(current);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
        out
    }

    fn blend(&self, current: &Array3<f32>) -> Array3<f32> {
        let (h, w, _) = current.dim();
        let mut acc = current.clone();
        let mut total = Array2::<f32>::ones((h, w));
        let n = self.buffer.len();

        for (i, prev) in self.buffer.iter().enumerate() {
            let distance = (n - i) as i32;
            let weight = TEMPORAL_WEIGHT * 0.5f32.powi(distance);

            let stable = stability_mask(current, prev);
            Zip::indexed(&mut acc).and(prev).for_each(|(r, c, _), a, &p| {
                *a += p * weight * stable[[r, c]];
            });
            Zip::from(&mut total)
                .and(&stable)
                .for_each(|t, &s| *t += weight * s);
        }

        Zip::indexed(&mut acc).for_each(|(r, c, _), a| *a /= total[[r, c]]);
        acc
    }
}

/// Smoothed 1/0 mask of pixels whose mean channel difference is below the threshold.
fn stability_mask(current: &Array3<f32>, prev: &Array3<f32>) -> Array2<f32> {
    let (h, w, channels) = current.dim();
    let raw = Array2::from_shape_fn((h, w), |(r, c)| {
        let diff: f32 = (0..channels)
            .map(|ch| (current[[r, c, ch]] - prev[[r, c, ch]]).abs())
            .sum::<f32>()
            / channels as f32;
        if diff < TEMPORAL_STABLE_THRESHOLD {
            1.0
        } else {
            0.0
        }
    });
    gaussian_blur_sized(&raw, 9, 2.0)
}
