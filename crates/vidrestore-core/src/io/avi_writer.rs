use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{RestoreError, Result};
use crate::frame::Frame;

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;
const RATE_SCALE: u32 = 1000;

// Byte offsets of the fields patched in `finalize`.
const RIFF_SIZE_OFFSET: u64 = 4;
const AVIH_TOTAL_FRAMES_OFFSET: u64 = 48;
const STRH_LENGTH_OFFSET: u64 = 140;
const MOVI_LIST_OFFSET: u64 = 212;

/// Writes an uncompressed 24-bit RIFF AVI, one `00db` chunk per frame.
pub struct RawAviWriter {
    writer: BufWriter<File>,
    width: usize,
    height: usize,
    frame_size: u32,
    index: Vec<(u32, u32)>,
}

impl RawAviWriter {
    /// Create the file and write the header with zeroed frame counts.
    pub fn create(path: &Path, width: usize, height: usize, fps: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RestoreError::InvalidDimensions { width, height });
        }
        let frame_size = (row_stride(width) * height) as u32;
        let mut writer = BufWriter::new(File::create(path)?);
        write_header(&mut writer, width, height, fps, frame_size)?;
        Ok(Self {
            writer,
            width,
            height,
            frame_size,
            index: Vec::new(),
        })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(RestoreError::InvalidDimensions {
                width: frame.width(),
                height: frame.height(),
            });
        }
        let offset = (self.writer.stream_position()? - (MOVI_LIST_OFFSET + 8)) as u32;
        self.writer.write_all(b"00db")?;
        self.writer.write_all(&self.frame_size.to_le_bytes())?;

        // Bottom-up BGR rows padded to four bytes.
        let mut row = vec![0u8; row_stride(self.width)];
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                row[x * 3] = frame.data[[y, x, 2]];
                row[x * 3 + 1] = frame.data[[y, x, 1]];
                row[x * 3 + 2] = frame.data[[y, x, 0]];
            }
            self.writer.write_all(&row)?;
        }
        self.index.push((offset, self.frame_size));
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.index.len()
    }

    /// Write the index, patch sizes and frame counts, and flush.
    pub fn finalize(mut self) -> Result<usize> {
        let movi_end = self.writer.stream_position()?;
        let frames = self.index.len() as u32;

        self.writer.write_all(b"idx1")?;
        self.writer.write_all(&(frames * 16).to_le_bytes())?;
        for &(offset, size) in &self.index {
            self.writer.write_all(b"00db")?;
            self.writer.write_all(&AVIIF_KEYFRAME.to_le_bytes())?;
            self.writer.write_all(&offset.to_le_bytes())?;
            self.writer.write_all(&size.to_le_bytes())?;
        }
        let file_end = self.writer.stream_position()?;

        patch_u32(&mut self.writer, RIFF_SIZE_OFFSET, (file_end - 8) as u32)?;
        patch_u32(&mut self.writer, MOVI_LIST_OFFSET + 4, (movi_end - MOVI_LIST_OFFSET - 8) as u32)?;
        patch_u32(&mut self.writer, AVIH_TOTAL_FRAMES_OFFSET, frames)?;
        patch_u32(&mut self.writer, STRH_LENGTH_OFFSET, frames)?;
        self.writer.flush()?;
        Ok(self.index.len())
    }
}

fn row_stride(width: usize) -> usize {
    (width * 3).div_ceil(4) * 4
}

fn patch_u32(w: &mut (impl Write + Seek), at: u64, value: u32) -> Result<()> {
    w.seek(SeekFrom::Start(at))?;
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_header(
    w: &mut impl Write,
    width: usize,
    height: usize,
    fps: f64,
    frame_size: u32,
) -> Result<()> {
    let fps = if fps.is_finite() && fps > 0.0 { fps } else { 25.0 };
    let (width, height) = (width as u32, height as u32);

    // RIFF (12 bytes), size patched later
    w.write_all(b"RIFF")?;
    w.write_all(&0u32.to_le_bytes())?;
    w.write_all(b"AVI ")?;

    // hdrl LIST: "hdrl" + avih chunk (64) + strl LIST (124)
    w.write_all(b"LIST")?;
    w.write_all(&192u32.to_le_bytes())?;
    w.write_all(b"hdrl")?;

    // avih (8 + 56 bytes)
    w.write_all(b"avih")?;
    w.write_all(&56u32.to_le_bytes())?;
    w.write_all(&((1_000_000.0 / fps).round() as u32).to_le_bytes())?;
    w.write_all(&((frame_size as f64 * fps) as u32).to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?; // padding granularity
    w.write_all(&AVIF_HASINDEX.to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?; // total frames
    w.write_all(&0u32.to_le_bytes())?; // initial frames
    w.write_all(&1u32.to_le_bytes())?; // streams
    w.write_all(&frame_size.to_le_bytes())?;
    w.write_all(&width.to_le_bytes())?;
    w.write_all(&height.to_le_bytes())?;
    w.write_all(&[0u8; 16])?;

    // strl LIST: "strl" + strh (64) + strf (48)
    w.write_all(b"LIST")?;
    w.write_all(&116u32.to_le_bytes())?;
    w.write_all(b"strl")?;

    // strh (8 + 56 bytes)
    w.write_all(b"strh")?;
    w.write_all(&56u32.to_le_bytes())?;
    w.write_all(b"vids")?;
    w.write_all(b"DIB ")?;
    w.write_all(&0u32.to_le_bytes())?; // flags
    w.write_all(&0u16.to_le_bytes())?; // priority
    w.write_all(&0u16.to_le_bytes())?; // language
    w.write_all(&0u32.to_le_bytes())?; // initial frames
    w.write_all(&RATE_SCALE.to_le_bytes())?;
    w.write_all(&((fps * RATE_SCALE as f64).round() as u32).to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?; // start
    w.write_all(&0u32.to_le_bytes())?; // length
    w.write_all(&frame_size.to_le_bytes())?;
    w.write_all(&u32::MAX.to_le_bytes())?; // quality: default
    w.write_all(&frame_size.to_le_bytes())?; // sample size
    for v in [0u16, 0, width as u16, height as u16] {
        w.write_all(&v.to_le_bytes())?;
    }

    // strf: BITMAPINFOHEADER (8 + 40 bytes)
    w.write_all(b"strf")?;
    w.write_all(&40u32.to_le_bytes())?;
    w.write_all(&40u32.to_le_bytes())?;
    w.write_all(&(width as i32).to_le_bytes())?;
    w.write_all(&(height as i32).to_le_bytes())?; // positive: bottom-up
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&24u16.to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?; // BI_RGB
    w.write_all(&frame_size.to_le_bytes())?;
    w.write_all(&[0u8; 16])?;

    // movi LIST, size patched later
    w.write_all(b"LIST")?;
    w.write_all(&0u32.to_le_bytes())?;
    w.write_all(b"movi")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn header_layout_and_patched_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.avi");

        let mut writer = RawAviWriter::create(&path, 5, 2, 30.0).unwrap();
        writer.write_frame(&Frame::solid(5, 2, [10, 20, 30])).unwrap();
        writer.write_frame(&Frame::solid(5, 2, [40, 50, 60])).unwrap();
        assert_eq!(writer.frames_written(), 2);
        assert_eq!(writer.finalize().unwrap(), 2);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"AVI ");
        assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8);
        assert_eq!(&bytes[24..28], b"avih");
        assert_eq!(u32_at(&bytes, AVIH_TOTAL_FRAMES_OFFSET as usize), 2);
        assert_eq!(u32_at(&bytes, STRH_LENGTH_OFFSET as usize), 2);
        assert_eq!(&bytes[MOVI_LIST_OFFSET as usize + 8..MOVI_LIST_OFFSET as usize + 12], b"movi");

        // Width 5 pads each 15-byte row to 16.
        let first = MOVI_LIST_OFFSET as usize + 12;
        assert_eq!(&bytes[first..first + 4], b"00db");
        assert_eq!(u32_at(&bytes, first + 4), 32);
        assert_eq!(&bytes[first + 8..first + 11], &[30, 20, 10]);
        assert_eq!(&bytes[bytes.len() - 40..bytes.len() - 36], b"idx1");
    }

    #[test]
    fn rejects_mismatched_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RawAviWriter::create(&dir.path().join("a.avi"), 4, 4, 25.0).unwrap();
        assert!(writer.write_frame(&Frame::solid(2, 2, [0; 3])).is_err());
    }
}
