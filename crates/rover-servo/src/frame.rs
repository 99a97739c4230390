//! Frame acquisition and conversion between `image` buffers and core views.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use log::{debug, info};
use rover_servo_core::{RgbImage, RgbImageView};

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to decode frame {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no PNG or JPEG frames in {0}")]
    EmptyDirectory(PathBuf),
}

/// Pull-based source of color frames. `Ok(None)` ends the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError>;
}

impl<F: FrameSource + ?Sized> FrameSource for Box<F> {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError> {
        (**self).next_frame()
    }
}

/// Borrow an `image::RgbImage` as a core frame view.
pub fn rgb_view(img: &image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

pub fn from_image_rgb(img: image::RgbImage) -> RgbImage {
    RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    }
}

/// `None` when the buffer length does not match the dimensions.
pub fn to_image_rgb(frame: &RgbImage) -> Option<image::RgbImage> {
    let width = u32::try_from(frame.width).ok()?;
    let height = u32::try_from(frame.height).ok()?;
    image::RgbImage::from_raw(width, height, frame.data.clone())
}

/// Decode any supported image file into an RGB frame.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbImage, FrameError> {
    let path = path.as_ref();
    let decoded = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| FrameError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(from_image_rgb(decoded.to_rgb8()))
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

/// Directory of PNG/JPEG frames replayed in lexical file-name order.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    looping: bool,
}

impl ImageSequence {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, FrameError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_frame_file(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(FrameError::EmptyDirectory(dir.to_path_buf()));
        }
        paths.sort();
        info!("{} frames in {}", paths.len(), dir.display());
        Ok(Self {
            paths,
            next: 0,
            looping: false,
        })
    }

    /// Restart from the first frame instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError> {
        if self.next >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            self.next = 0;
        }
        let path = &self.paths[self.next];
        self.next += 1;
        debug!("frame {}", path.display());
        load_frame(path).map(Some)
    }
}

/// In-memory frames, consumed front to back.
#[derive(Clone, Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<RgbImage>,
}

impl FrameQueue {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: RgbImage) {
        self.frames.push_back(frame);
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError> {
        Ok(self.frames.pop_front())
    }
}
