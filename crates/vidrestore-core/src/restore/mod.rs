//! The eight-step restoration pipeline and the temporal stabilizer.
//!
//! Every step is a [`Stage`]: a pure transform from one frame to a new frame
//! of identical shape. A stage that hits an internal failure hands back its
//! input unchanged, so a degenerate frame never aborts a task.

pub mod antialias;
pub mod deblock;
pub mod denoise;
pub mod face;
pub mod final_sharpen;
pub mod grain;
pub mod hair;
pub mod presharpen;
pub mod profile;
pub mod scheduler;
pub mod temporal;

use std::fmt;

use rand::rngs::StdRng;
use tracing::warn;

use crate::error::Result;
use crate::filters::noise::frame_rng;
use crate::frame::{BoundingBox, Frame};
use crate::quality::QualityMetrics;

pub use profile::RestorationProfile;
pub use scheduler::{worker_count, RestorationOutcome, StageScheduler};
pub use temporal::TemporalStabilizer;

/// Per-frame inputs shared by all stages.
#[derive(Clone, Copy, Debug)]
pub struct StageContext<'a> {
    pub profile: &'a RestorationProfile,
    pub metrics: Option<&'a QualityMetrics>,
    /// The frame as read from the source, before any processing.
    pub original: &'a Frame,
    /// Face detections for this frame; empty when detection is off or found nothing.
    pub faces: &'a [BoundingBox],
    pub seed: Option<u64>,
    pub frame_index: usize,
}

impl<'a> StageContext<'a> {
    pub fn new(profile: &'a RestorationProfile, original: &'a Frame) -> Self {
        Self {
            profile,
            metrics: None,
            original,
            faces: &[],
            seed: None,
            frame_index: original.index(),
        }
    }

    pub fn with_metrics(mut self, metrics: Option<&'a QualityMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_faces(mut self, faces: &'a [BoundingBox]) -> Self {
        self.faces = faces;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// RNG for a stochastic stage; `salt` separates streams of different stages.
    pub fn rng(&self, salt: u64) -> StdRng {
        frame_rng(self.seed, self.frame_index, salt)
    }
}

/// Identifies one restoration step, in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    Deblock,
    PreSharpen,
    AntiAlias,
    Denoise,
    FaceRepair,
    HairProtect,
    FinalSharpen,
    Grain,
}

impl StageKind {
    pub const ALL: [StageKind; 8] = [
        Self::Deblock,
        Self::PreSharpen,
        Self::AntiAlias,
        Self::Denoise,
        Self::FaceRepair,
        Self::HairProtect,
        Self::FinalSharpen,
        Self::Grain,
    ];

    /// Construct the stage object for this step.
    pub fn build(self) -> Box<dyn Stage> {
        match self {
            Self::Deblock => Box::new(deblock::Deblock),
            Self::PreSharpen => Box::new(presharpen::PreSharpen),
            Self::AntiAlias => Box::new(antialias::AntiAlias),
            Self::Denoise => Box::new(denoise::Denoise),
            Self::FaceRepair => Box::new(face::FaceRepair),
            Self::HairProtect => Box::new(hair::HairProtect),
            Self::FinalSharpen => Box::new(final_sharpen::FinalSharpen),
            Self::Grain => Box::new(grain::Grain),
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deblock => write!(f, "Deblock/deband"),
            Self::PreSharpen => write!(f, "Pre-sharpen"),
            Self::AntiAlias => write!(f, "Anti-alias"),
            Self::Denoise => write!(f, "Denoise"),
            Self::FaceRepair => write!(f, "Face repair"),
            Self::HairProtect => write!(f, "Hair protection"),
            Self::FinalSharpen => write!(f, "Final sharpen"),
            Self::Grain => write!(f, "Grain"),
        }
    }
}

/// One restoration transform.
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    /// The transform itself. May fail; callers normally go through [`Stage::apply`].
    fn process(&self, frame: &Frame, ctx: &StageContext<'_>) -> Result<Frame>;

    /// Run the stage, returning the input unchanged if it fails or
    /// produces a frame of a different shape.
    fn apply(&self, frame: Frame, ctx: &StageContext<'_>) -> Frame {
        match self.process(&frame, ctx) {
            Ok(out) if out.same_shape(&frame) => out,
            Ok(out) => {
                warn!(
                    stage = %self.kind(),
                    expected = ?frame.data.dim(),
                    got = ?out.data.dim(),
                    "Stage changed frame shape, keeping input"
                );
                frame
            }
            Err(e) => {
                warn!(stage = %self.kind(), error = %e, "Stage failed, keeping input");
                frame
            }
        }
    }
}
