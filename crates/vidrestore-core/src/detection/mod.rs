pub mod components;
pub mod morphology;

use ndarray::{Array2, Axis, Zip};
use tracing::debug;

use crate::color::convert::rgb_to_hsv;
use crate::frame::{BoundingBox, Frame};

use components::connected_components;
use morphology::opening;

/// Anything that can locate faces in a frame.
///
/// Implementations must be cheap to call once per frame; a detector that
/// cannot run returns no detections rather than failing the caller.
pub trait FaceDetector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, frame: &Frame) -> Vec<BoundingBox>;
}

/// Detector that never finds anything. Face repair and hair protection become no-ops.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDetector;

impl FaceDetector for NullDetector {
    fn name(&self) -> &str {
        "null"
    }

    fn detect(&self, _frame: &Frame) -> Vec<BoundingBox> {
        Vec::new()
    }
}

/// Heuristic face locator: skin-tone regions of face-like size and shape.
#[derive(Clone, Debug)]
pub struct SkinRegionDetector {
    /// Inclusive HSV hue range (0..180 scale).
    pub hue: (f32, f32),
    pub saturation: (f32, f32),
    pub value: (f32, f32),
    /// Smallest accepted region side, in pixels.
    pub min_size: usize,
    /// Accepted width / height range.
    pub aspect: (f32, f32),
    /// Minimum fraction of the bounding box covered by skin.
    pub min_fill: f32,
    /// Regions covering more than this fraction of the frame are rejected.
    pub max_frame_fraction: f32,
    pub max_faces: usize,
    pub opening_radius: usize,
}

impl Default for SkinRegionDetector {
    fn default() -> Self {
        Self {
            hue: (0.0, 20.0),
            saturation: (40.0, 200.0),
            value: (70.0, 255.0),
            min_size: 30,
            aspect: (0.6, 1.6),
            min_fill: 0.45,
            max_frame_fraction: 0.5,
            max_faces: 8,
            opening_radius: 2,
        }
    }
}

impl SkinRegionDetector {
    fn skin_mask(&self, frame: &Frame) -> Array2<bool> {
        let hsv = rgb_to_hsv(&frame.to_f32());
        let h = hsv.index_axis(Axis(2), 0);
        let s = hsv.index_axis(Axis(2), 1);
        let v = hsv.index_axis(Axis(2), 2);
        Zip::from(&h).and(&s).and(&v).map_collect(|&h, &s, &v| {
            in_range(h, self.hue) && in_range(s, self.saturation) && in_range(v, self.value)
        })
    }
}

fn in_range(v: f32, (lo, hi): (f32, f32)) -> bool {
    v >= lo && v <= hi
}

impl FaceDetector for SkinRegionDetector {
    fn name(&self) -> &str {
        "skin-region"
    }

    fn detect(&self, frame: &Frame) -> Vec<BoundingBox> {
        let (h, w) = (frame.height(), frame.width());
        if h < self.min_size || w < self.min_size {
            return Vec::new();
        }

        let mask = opening(&self.skin_mask(frame), self.opening_radius);
        let frame_area = (h * w) as f32;

        let faces: Vec<BoundingBox> = connected_components(&mask)
            .into_iter()
            .filter(|c| c.bbox.width >= self.min_size && c.bbox.height >= self.min_size)
            .filter(|c| in_range(c.aspect(), self.aspect))
            .filter(|c| c.fill_ratio() >= self.min_fill)
            .filter(|c| ((c.bbox.width * c.bbox.height) as f32) <= frame_area * self.max_frame_fraction)
            .take(self.max_faces)
            .map(|c| c.bbox)
            .collect();

        debug!(detector = self.name(), faces = faces.len(), "Face detection");
        faces
    }
}
