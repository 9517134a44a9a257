use std::path::Path;

use image::RgbImage;

use crate::error::{RestoreError, Result};
use crate::frame::Frame;

/// Save a frame as 8-bit RGB, choosing the format from the file extension.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width(), frame.height());
    let img = RgbImage::from_raw(w as u32, h as u32, frame.to_rgb_bytes())
        .ok_or(RestoreError::InvalidDimensions { width: w, height: h })?;
    img.save(path)?;
    Ok(())
}

/// Load any image the `image` crate understands as an 8-bit RGB frame.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let rgb = image::open(path)?.to_rgb8();
    let (w, h) = rgb.dimensions();
    Frame::from_rgb_bytes(w as usize, h as usize, rgb.into_raw())
}
