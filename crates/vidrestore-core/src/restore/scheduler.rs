use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::consts::{MAX_WORKERS, MIN_WORKERS};
use crate::detection::morphology::{dilate, to_float};
use crate::detection::FaceDetector;
use crate::error::{RestoreError, Result};
use crate::filters::edges::canny;
use crate::filters::gaussian_blur::gaussian_blur_sized;
use crate::frame::{blend_masked, BoundingBox, Frame};
use crate::pipeline::config::RestorationConfig;
use crate::quality::QualityMetrics;

use super::profile::RestorationProfile;
use super::{Stage, StageContext, StageKind};

/// Size of the per-task worker pool: `clamp(floor(cores * ratio), 2, 8)`.
pub fn worker_count(cores: usize, resource_ratio: f32) -> usize {
    let scaled = (cores as f32 * resource_ratio.max(0.0)).floor() as usize;
    scaled.clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Result of running the restoration steps on one frame.
#[derive(Clone, Debug)]
pub struct RestorationOutcome {
    pub frame: Frame,
    /// Faces found for steps 5 and 6. Empty when neither step is enabled.
    pub faces: Vec<BoundingBox>,
}

/// Runs the enabled restoration steps in order on a bounded worker pool.
///
/// Steps 1-2 run sequentially, then anti-alias and denoise run concurrently
/// on the same intermediate frame and are merged by an edge mask, then
/// steps 5-8 run sequentially.
pub struct StageScheduler {
    plan: Vec<StageKind>,
    pre: Vec<Box<dyn Stage>>,
    anti_alias: Option<Box<dyn Stage>>,
    denoise: Option<Box<dyn Stage>>,
    face: Option<Box<dyn Stage>>,
    hair: Option<Box<dyn Stage>>,
    post: Vec<Box<dyn Stage>>,
    profile: &'static RestorationProfile,
    detector: Box<dyn FaceDetector>,
    pool: ThreadPool,
    workers: usize,
}

impl StageScheduler {
    /// Build the stage plan for `config`.
    ///
    /// `skip_final_sharpen` drops step 7, used when the sharpen filter preset
    /// will sharpen the frame anyway.
    pub fn new(
        config: &RestorationConfig,
        skip_final_sharpen: bool,
        resource_ratio: f32,
        detector: Box<dyn FaceDetector>,
    ) -> Result<Self> {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(MIN_WORKERS);
        let workers = worker_count(cores, resource_ratio);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vidrestore-worker-{i}"))
            .build()
            .map_err(|e| RestoreError::Pipeline(format!("cannot build worker pool: {e}")))?;

        let plan = build_plan(config, skip_final_sharpen);
        let take = |kind: StageKind| plan.contains(&kind).then(|| kind.build());

        let pre = [StageKind::Deblock, StageKind::PreSharpen]
            .into_iter()
            .filter_map(take)
            .collect();
        let post = [StageKind::FinalSharpen, StageKind::Grain]
            .into_iter()
            .filter_map(take)
            .collect();

        info!(
            workers,
            cores,
            intensity = %config.intensity,
            stages = plan.len(),
            detector = detector.name(),
            "Stage scheduler ready"
        );

        Ok(Self {
            anti_alias: take(StageKind::AntiAlias),
            denoise: take(StageKind::Denoise),
            face: take(StageKind::FaceRepair),
            hair: take(StageKind::HairProtect),
            pre,
            post,
            plan,
            profile: RestorationProfile::for_intensity(config.intensity),
            detector,
            pool,
            workers,
        })
    }

    /// The enabled steps in execution order.
    pub fn plan(&self) -> &[StageKind] {
        &self.plan
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn profile(&self) -> &RestorationProfile {
        self.profile
    }

    /// Run all enabled steps on `frame`. `original` is the unprocessed source frame.
    pub fn run(
        &self,
        frame: Frame,
        original: &Frame,
        metrics: Option<&QualityMetrics>,
        seed: Option<u64>,
    ) -> RestorationOutcome {
        self.pool.install(|| self.run_in_pool(frame, original, metrics, seed))
    }

    fn run_in_pool(
        &self,
        frame: Frame,
        original: &Frame,
        metrics: Option<&QualityMetrics>,
        seed: Option<u64>,
    ) -> RestorationOutcome {
        let ctx = StageContext::new(self.profile, original)
            .with_metrics(metrics)
            .with_seed(seed);

        let mut frame = self.pre.iter().fold(frame, |f, stage| stage.apply(f, &ctx));

        frame = match (&self.anti_alias, &self.denoise) {
            (Some(aa), Some(dn)) => {
                let (aa_out, dn_out) = self
                    .pool
                    .join(|| aa.apply(frame.clone(), &ctx), || dn.apply(frame.clone(), &ctx));
                merge_by_edges(&frame, &aa_out, &dn_out)
            }
            (Some(aa), None) => aa.apply(frame, &ctx),
            (None, Some(dn)) => {
                let dn_out = dn.apply(frame.clone(), &ctx);
                merge_by_edges(&frame, &frame, &dn_out)
            }
            (None, None) => frame,
        };

        let faces = if self.face.is_some() || self.hair.is_some() {
            let faces = self.detector.detect(&frame);
            debug!(index = frame.index(), faces = faces.len(), "Faces detected");
            faces
        } else {
            Vec::new()
        };
        let ctx = ctx.with_faces(&faces);

        for stage in [&self.face, &self.hair].into_iter().flatten() {
            frame = stage.apply(frame, &ctx);
        }
        frame = self.post.iter().fold(frame, |f, stage| stage.apply(f, &ctx));

        RestorationOutcome { frame, faces }
    }
}

/// Ordered list of enabled steps.
pub fn build_plan(config: &RestorationConfig, skip_final_sharpen: bool) -> Vec<StageKind> {
    StageKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            StageKind::Deblock => config.deblock,
            StageKind::PreSharpen => config.pre_sharpen,
            StageKind::AntiAlias => config.anti_alias,
            StageKind::Denoise => config.denoise,
            StageKind::FaceRepair => config.face_repair,
            StageKind::HairProtect => config.hair_protect,
            StageKind::FinalSharpen => config.final_sharpen && !skip_final_sharpen,
            StageKind::Grain => config.grain,
        })
        .collect()
}

/// Edge pixels of `input` take the anti-aliased result, the rest take the
/// denoised result. Depends only on the three frames, never on timing.
pub fn merge_by_edges(input: &Frame, anti_aliased: &Frame, denoised: &Frame) -> Frame {
    let edges = dilate(&canny(&input.luma(), 50.0, 150.0), 1);
    let mask = gaussian_blur_sized(&to_float(&edges), 5, 1.0).mapv(|m| m.clamp(0.0, 1.0));
    let merged = blend_masked(&denoised.to_f32(), &anti_aliased.to_f32(), &mask);
    input.with_f32(&merged)
}
