use ndarray::{Array2, Array3, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_CHANNEL_COUNT, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, MAX_INTENSITY};
use crate::error::{RestoreError, Result};

/// A single decoded video frame.
///
/// Pixel data is 8-bit RGB, shape = (height, width, 3). Stages treat a frame
/// as immutable and return a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub data: Array3<u8>,
    pub metadata: FrameMetadata,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetadata {
    /// Zero-based position in the source video.
    pub index: usize,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a frame from an interleaved RGB buffer (`width * height * 3` bytes).
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self> {
        let data = Array3::from_shape_vec((height, width, COLOR_CHANNEL_COUNT), bytes)
            .map_err(|_| RestoreError::InvalidDimensions { width, height })?;
        Ok(Self::new(data))
    }

    /// A frame filled with a single color.
    pub fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self::new(Array3::from_shape_fn((height, width, COLOR_CHANNEL_COUNT), |(_, _, c)| {
            rgb[c]
        }))
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.metadata.index = index;
        self
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn index(&self) -> usize {
        self.metadata.index
    }

    /// Same shape and channel count as `other`.
    pub fn same_shape(&self, other: &Frame) -> bool {
        self.data.dim() == other.data.dim()
    }

    /// Error unless the frame is at least `min` pixels in both directions.
    pub fn ensure_min_size(&self, min: usize) -> Result<()> {
        let (h, w, c) = self.data.dim();
        if h < min || w < min || c != COLOR_CHANNEL_COUNT {
            return Err(RestoreError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        Ok(())
    }

    /// Float copy of the pixel data, values in [0, 255].
    pub fn to_f32(&self) -> Array3<f32> {
        self.data.mapv(|v| v as f32)
    }

    /// Round and clamp float data back into a frame carrying this frame's metadata.
    pub fn with_f32(&self, data: &Array3<f32>) -> Frame {
        Frame {
            data: quantize(data),
            metadata: self.metadata.clone(),
        }
    }

    /// Single channel as a float plane.
    pub fn channel(&self, c: usize) -> Array2<f32> {
        self.data.index_axis(Axis(2), c).mapv(|v| v as f32)
    }

    /// BT.601 luma plane, values in [0, 255].
    pub fn luma(&self) -> Array2<f32> {
        luma_of(&self.to_f32())
    }

    /// Raw interleaved RGB bytes in row-major order.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }
}

/// Round and clamp float samples into 8-bit storage.
pub fn quantize(data: &Array3<f32>) -> Array3<u8> {
    data.mapv(|v| {
        if v.is_finite() {
            v.round().clamp(0.0, MAX_INTENSITY) as u8
        } else {
            0
        }
    })
}

/// BT.601 luma of an RGB float image.
pub fn luma_of(rgb: &Array3<f32>) -> Array2<f32> {
    let (h, w, _) = rgb.dim();
    Array2::from_shape_fn((h, w), |(r, c)| {
        LUMINANCE_R * rgb[[r, c, 0]] + LUMINANCE_G * rgb[[r, c, 1]] + LUMINANCE_B * rgb[[r, c, 2]]
    })
}

/// Blend `a` toward `b` per pixel: `a * (1 - m) + b * m`, with a single-plane mask.
pub fn blend_masked(a: &Array3<f32>, b: &Array3<f32>, mask: &Array2<f32>) -> Array3<f32> {
    let mut out = a.clone();
    Zip::indexed(&mut out).and(b).for_each(|(r, c, _), o, &bv| {
        let m = mask[[r, c]];
        *o = *o * (1.0 - m) + bv * m;
    });
    out
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> usize {
        self.x + self.width
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Grow by `pad` pixels on each side, clipped to a `width` x `height` frame.
    pub fn padded(&self, pad: usize, width: usize, height: usize) -> BoundingBox {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = (self.right() + pad).min(width);
        let y1 = (self.bottom() + pad).min(height);
        BoundingBox::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
