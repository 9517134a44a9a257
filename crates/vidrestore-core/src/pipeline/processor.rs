use tracing::{debug, info};

use crate::detection::FaceDetector;
use crate::error::Result;
use crate::frame::{BoundingBox, Frame};
use crate::grading::{apply_advanced, apply_basic, apply_filters};
use crate::quality::{analyze, recommend, QualityMetrics, Recommendations};
use crate::restore::{StageScheduler, TemporalStabilizer};

use super::config::{StageConfig, TaskConfig};

/// A frame after the full per-frame chain.
#[derive(Clone, Debug)]
pub struct ProcessedFrame {
    pub frame: Frame,
    pub faces: Vec<BoundingBox>,
}

/// Per-task frame chain: temporal stabilize, restoration, basic grading,
/// advanced grading, filters.
///
/// Owns all state that lives for one task (stabilizer buffer, worker pool,
/// detector, sampled metrics). Build one per task.
pub struct FrameProcessor {
    stages: StageConfig,
    seed: Option<u64>,
    scheduler: Option<StageScheduler>,
    stabilizer: TemporalStabilizer,
    metrics: Option<QualityMetrics>,
    recommendations: Option<Recommendations>,
}

impl FrameProcessor {
    pub fn new(config: &TaskConfig, detector: Box<dyn FaceDetector>) -> Result<Self> {
        let stages = config.stages.clone();
        let restoration = &stages.restoration;
        let scheduler = if restoration.enabled && restoration.any_step() {
            Some(StageScheduler::new(
                restoration,
                stages.filters.sharpen,
                config.resource_ratio,
                detector,
            )?)
        } else {
            debug!("Restoration disabled");
            None
        };

        Ok(Self {
            stages,
            seed: config.seed,
            scheduler,
            stabilizer: TemporalStabilizer::new(),
            metrics: None,
            recommendations: None,
        })
    }

    /// Measure the representative frame once per task.
    ///
    /// Recommendations are only kept in smart mode.
    pub fn calibrate(&mut self, sample: &Frame) -> &QualityMetrics {
        let metrics = analyze(sample);
        info!(
            index = sample.index(),
            brightness = metrics.brightness,
            contrast = metrics.contrast,
            sharpness = metrics.sharpness,
            noise = metrics.noise,
            block_artifact = metrics.block_artifact,
            aliasing = metrics.aliasing,
            "Sampled quality metrics"
        );
        self.recommendations = self.stages.smart_mode.then(|| recommend(&metrics));
        self.metrics.insert(metrics)
    }

    pub fn metrics(&self) -> Option<&QualityMetrics> {
        self.metrics.as_ref()
    }

    pub fn recommendations(&self) -> Option<&Recommendations> {
        self.recommendations.as_ref()
    }

    pub fn scheduler(&self) -> Option<&StageScheduler> {
        self.scheduler.as_ref()
    }

    pub fn stabilizer(&self) -> &TemporalStabilizer {
        &self.stabilizer
    }

    /// Forget everything tied to the previous source.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
        self.metrics = None;
        self.recommendations = None;
    }

    pub fn process(&mut self, frame: Frame) -> ProcessedFrame {
        let original = frame.clone();
        let mut frame = self.stabilizer.stabilize(frame);
        let mut faces = Vec::new();

        if let Some(scheduler) = &self.scheduler {
            let outcome = scheduler.run(frame, &original, self.metrics.as_ref(), self.seed);
            frame = outcome.frame;
            faces = outcome.faces;
        }

        let recommendations = self.recommendations.as_ref();
        if self.stages.basic.enabled {
            frame = apply_basic(&frame, &self.stages.basic, recommendations);
        }
        if self.stages.advanced.enabled {
            frame = apply_advanced(&frame, &self.stages.advanced, recommendations);
        }
        frame = apply_filters(&frame, &self.stages.filters, self.seed);

        ProcessedFrame { frame, faces }
    }
}
