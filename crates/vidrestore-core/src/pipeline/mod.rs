pub mod config;
pub mod control;
pub mod driver;
pub mod processor;
pub mod task;
mod types;

pub use config::{
    AdvancedConfig, BasicConfig, FilterConfig, Intensity, RestorationConfig, StageConfig,
    TaskConfig,
};
pub use control::TaskControl;
pub use driver::{
    default_output_path, representative_frame, run_ffmpeg_task, FramePipeline, RunIo, RunSummary,
};
pub use processor::{FrameProcessor, ProcessedFrame};
pub use task::{FpsMeter, Task, TaskProgress, TaskStatus};
pub use types::{CallbackReporter, NoOpReporter, ProgressReporter};
