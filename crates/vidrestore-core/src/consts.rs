/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-6;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Largest representable sample value.
pub const MAX_INTENSITY: f32 = 255.0;

// ---------------------------------------------------------------------------
// Quality analysis
// ---------------------------------------------------------------------------

/// Median absolute deviation to Gaussian sigma scale factor.
pub const MAD_TO_SIGMA: f64 = 0.6745;

/// Block grid spacing used by codecs (8x8 transform, 16x16 macroblock).
pub const BLOCK_GRID: usize = 8;

/// Largest boundary step still attributed to compression rather than content.
pub const BLOCK_STEP_MAX: f32 = 40.0;

/// Gradient magnitude above which a pixel counts as a strong edge for aliasing.
pub const ALIASING_EDGE_MAGNITUDE: f32 = 30.0;

/// Luma above which a pixel counts toward the highlight ratio.
pub const HIGHLIGHT_LUMA: f32 = 240.0;

/// Luma below which a pixel counts toward the shadow ratio.
pub const SHADOW_LUMA: f32 = 15.0;

/// Sharpness (Laplacian variance) above which final sharpening is skipped.
pub const SHARPNESS_SUFFICIENT: f64 = 600.0;

// ---------------------------------------------------------------------------
// Temporal stabilization
// ---------------------------------------------------------------------------

/// Maximum number of prior frames kept by the stabilizer.
pub const TEMPORAL_BUFFER_MAX: usize = 3;

/// Base blend weight of a prior frame, halved per frame of distance.
pub const TEMPORAL_WEIGHT: f32 = 0.2;

/// Mean per-pixel difference below which a pixel is considered stable.
pub const TEMPORAL_STABLE_THRESHOLD: f32 = 25.0;

// ---------------------------------------------------------------------------
// Scheduling and driver
// ---------------------------------------------------------------------------

/// Default fraction of logical cores handed to the per-task worker pool.
pub const DEFAULT_RESOURCE_RATIO: f32 = 0.7;

/// Lower bound on the per-task worker pool size.
pub const MIN_WORKERS: usize = 2;

/// Upper bound on the per-task worker pool size.
pub const MAX_WORKERS: usize = 8;

/// Number of recent frame latencies used for the rolling fps figure.
pub const FPS_WINDOW: usize = 30;

/// Frame file name pattern inside the intermediate sequence directory.
pub const FRAME_FILE_PATTERN: &str = "frame_%06d.png";

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Outputs at or below this size are treated as failed encodes.
pub const MIN_OUTPUT_BYTES: u64 = 1000;

/// Frame rate at or below which the short GOP policy applies.
pub const GOP_FPS_BOUNDARY: f64 = 30.0;

/// (gop, keyint_min) for sources at or below 30 fps.
pub const GOP_STANDARD: (u32, u32) = (90, 30);

/// (gop, keyint_min) for sources above 30 fps.
pub const GOP_HIGH_FPS: (u32, u32) = (180, 60);

/// Frame rate assumed when the source does not report one.
pub const DEFAULT_FPS: f64 = 25.0;
