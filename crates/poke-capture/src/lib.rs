use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod store;

pub use store::{canonical_size, FrameStore};

/// Errors raised while building frames or reading the frame store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame must have non-zero dimensions, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
    #[error("pixel buffer has {actual} bytes, expected {expected} for an RGB frame")]
    BufferSize { expected: usize, actual: usize },
    #[error("canonical frame requested before resize()")]
    NotResized,
}

/// A captured frame: 3-channel RGB, row-major, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Result<Self, FrameError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame { width, height });
        }
        Ok(Self { image })
    }

    /// Build a frame from a capture buffer that carries an alpha channel.
    pub fn from_rgba(rgba: &RgbaImage) -> Result<Self, FrameError> {
        let rgb = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let px = rgba.get_pixel(x, y);
            image::Rgb([px[0], px[1], px[2]])
        });
        Self::new(rgb)
    }

    /// Build a frame from a raw interleaved RGB buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        let actual = data.len();
        let image = RgbImage::from_raw(width, height, data)
            .ok_or(FrameError::BufferSize { expected, actual })?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Pixel rectangle in canonical-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// True when the whole rectangle lies inside a `width`x`height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.area() > 0 && self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Intersect with a `width`x`height` frame. `None` if nothing is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Region> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Region::new(self.x, self.y, w, h))
    }
}

/// Crop a region out of a frame, clamped to the frame bounds.
/// Returns `None` when the region misses the frame entirely.
pub fn crop_region(frame: &Frame, region: &Region) -> Option<RgbImage> {
    let (w, h) = frame.dimensions();
    let clipped = region.clip_to(w, h)?;
    Some(
        image::imageops::crop_imm(
            frame.image(),
            clipped.x,
            clipped.y,
            clipped.width,
            clipped.height,
        )
        .to_image(),
    )
}
