//! RGBA pixel buffers and bilinear sampling

use serde::{Deserialize, Serialize};

use crate::error::BufferError;

/// One RGBA sample, 8 bits per channel
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// What the sampler reads for neighbors outside the source raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Use the nearest edge pixel
    #[default]
    Clamp,
    /// Treat outside neighbors as fully transparent black
    Transparent,
}

impl EdgePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgePolicy::Clamp => "clamp",
            EdgePolicy::Transparent => "transparent",
        }
    }
}

/// A width x height grid of RGBA samples, row-major, top-left origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub const CHANNELS: usize = 4;

    /// Largest raster any constructor will allocate (1 gigapixel, 4 GiB)
    pub const MAX_PIXELS: u64 = 1 << 30;

    /// Byte length of a `width` x `height` RGBA raster. Every buffer is at
    /// least 1x1 and at most [`Self::MAX_PIXELS`].
    pub fn byte_len(width: u32, height: u32) -> Result<usize, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroSize { width, height });
        }
        let pixels = width as u64 * height as u64;
        if pixels > Self::MAX_PIXELS {
            return Err(BufferError::TooLarge { width, height });
        }
        usize::try_from(pixels)
            .ok()
            .and_then(|p| p.checked_mul(Self::CHANNELS))
            .ok_or(BufferError::TooLarge { width, height })
    }

    /// Allocate a zeroed (transparent) buffer
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        let len = Self::byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// A buffer with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self, BufferError> {
        let len = Self::byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: color.repeat(len / Self::CHANNELS),
        })
    }

    /// Wrap raw RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * Self::CHANNELS
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the raster
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * Self::CHANNELS;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + Self::CHANNELS]);
        Some(px)
    }

    /// Write a pixel; writes outside the raster are ignored
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y as usize * self.stride() + x as usize * Self::CHANNELS;
        self.data[offset..offset + Self::CHANNELS].copy_from_slice(&color);
    }

    /// Neighbor lookup under an edge policy, with signed coordinates
    #[inline]
    fn neighbor(&self, x: i64, y: i64, policy: EdgePolicy) -> Rgba {
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        match policy {
            EdgePolicy::Clamp => {
                let cx = x.clamp(0, max_x) as u32;
                let cy = y.clamp(0, max_y) as u32;
                self.get(cx, cy).unwrap_or(TRANSPARENT)
            }
            EdgePolicy::Transparent => {
                if x < 0 || y < 0 || x > max_x || y > max_y {
                    TRANSPARENT
                } else {
                    self.get(x as u32, y as u32).unwrap_or(TRANSPARENT)
                }
            }
        }
    }

    /// Bilinear sample at fractional coordinates; each channel is blended
    /// independently and rounded to the nearest value
    #[inline]
    pub fn sample(&self, x: f64, y: f64, policy: EdgePolicy) -> Rgba {
        if !x.is_finite() || !y.is_finite() {
            return TRANSPARENT;
        }

        let xf = x.floor();
        let yf = y.floor();
        let fx = x - xf;
        let fy = y - yf;

        // Saturating casts keep far-away coordinates from overflowing
        let x0 = xf as i64;
        let y0 = yf as i64;
        let x1 = x0.saturating_add(1);
        let y1 = y0.saturating_add(1);

        let p00 = self.neighbor(x0, y0, policy);
        let p10 = self.neighbor(x1, y0, policy);
        let p01 = self.neighbor(x0, y1, policy);
        let p11 = self.neighbor(x1, y1, policy);

        let mut result = [0u8; 4];
        for c in 0..Self::CHANNELS {
            let value = p00[c] as f64 * (1.0 - fx) * (1.0 - fy)
                + p10[c] as f64 * fx * (1.0 - fy)
                + p01[c] as f64 * (1.0 - fx) * fy
                + p11[c] as f64 * fx * fy;

            result[c] = value.round().clamp(0.0, 255.0) as u8;
        }

        result
    }
}

/// Free-function form of [`PixelBuffer::sample`] with the default edge policy
#[inline]
pub fn sample(buffer: &PixelBuffer, x: f64, y: f64) -> Rgba {
    buffer.sample(x, y, EdgePolicy::default())
}

impl TryFrom<image::RgbaImage> for PixelBuffer {
    type Error = BufferError;

    fn try_from(img: image::RgbaImage) -> Result<Self, BufferError> {
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.into_raw())
    }
}

impl TryFrom<PixelBuffer> for image::RgbaImage {
    type Error = BufferError;

    fn try_from(buf: PixelBuffer) -> Result<Self, BufferError> {
        let (width, height) = (buf.width, buf.height);
        let actual = buf.data.len();
        image::RgbaImage::from_raw(width, height, buf.data).ok_or(BufferError::LengthMismatch {
            expected: width as usize * height as usize * PixelBuffer::CHANNELS,
            actual,
        })
    }
}
