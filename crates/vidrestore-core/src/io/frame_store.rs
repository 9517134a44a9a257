use std::path::{Path, PathBuf};

use crate::consts::FRAME_FILE_PATTERN;
use crate::error::Result;
use crate::frame::Frame;
use crate::io::image_io::{load_frame, save_frame};

/// Ordered PNG sequence in a scratch directory, numbered from zero.
pub struct FrameStore {
    dir: PathBuf,
    count: usize,
}

impl FrameStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            count: 0,
        })
    }

    /// Append a frame as the next file of the sequence.
    pub fn push(&mut self, frame: &Frame) -> Result<PathBuf> {
        let path = self.path(self.count);
        save_frame(frame, &path)?;
        self.count += 1;
        Ok(path)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `printf`-style pattern understood by the ffmpeg image2 demuxer.
    pub fn pattern(&self) -> PathBuf {
        self.dir.join(FRAME_FILE_PATTERN)
    }

    pub fn path(&self, index: usize) -> PathBuf {
        frame_path(&self.dir, index)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        (0..self.count).map(|i| self.path(i)).collect()
    }

    pub fn load(&self, index: usize) -> Result<Frame> {
        Ok(load_frame(&self.path(index))?.with_index(index))
    }
}

/// File name of frame `index` inside a sequence directory.
pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:06}.png"))
}
