pub mod audio;
pub mod avi_writer;
pub mod encoder;
pub mod ffmpeg;
pub mod frame_store;
pub mod image_io;
pub mod video;

pub use audio::{AudioExtractor, FfmpegAudioExtractor, NoAudio};
pub use encoder::{gop_policy, EncodeJob, Encoder, EncoderSettings, FallbackEncoder, H264Encoder};
pub use ffmpeg::{FfmpegSource, FfmpegTools};
pub use frame_store::FrameStore;
pub use video::{MemorySource, VideoInfo, VideoSource};
