pub mod convert;
pub mod process;

pub use convert::{hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab};
pub use process::{merge_channels, process_channels, split_channels};
