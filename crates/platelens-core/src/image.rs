//! Host-side RGBA image buffer.
//!
//! [`ImageBuffer`] is the unit of kernel I/O: an owned, rectangular grid
//! of RGBA f32 samples, each channel nominally normalized to [0, 1].
//! Kernels that read a 3x3 neighborhood use [`ImageBuffer::sample_clamped`]
//! so that edge pixels replicate rather than wrap or read out of bounds.

use crate::{Error, Result};

/// Channels per pixel. Buffers are always RGBA.
pub const CHANNELS: usize = 4;

/// Owned rectangular grid of normalized RGBA f32 samples.
///
/// Data is stored row-major, 4 floats per pixel. Two buffers exist per
/// analysis call (input and output) and both are always allocated with
/// identical dimensions; there is no resampling anywhere in the
/// pipeline.
#[derive(Clone)]
pub struct ImageBuffer {
    data: Vec<f32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageBuffer {
    /// Create a zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height));
        }
        let size = (width as usize) * (height as usize) * CHANNELS;
        Ok(Self {
            data: vec![0.0; size],
            width,
            height,
        })
    }

    /// Create from interleaved RGBA f32 data.
    ///
    /// `data.len()` must equal `width * height * 4`.
    pub fn from_rgba(data: Vec<f32>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height));
        }
        let expected = (width as usize) * (height as usize) * CHANNELS;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a buffer with every pixel set to the same RGBA value.
    pub fn splat(rgba: [f32; 4], width: u32, height: u32) -> Result<Self> {
        let count = (width as usize) * (height as usize);
        if count == 0 {
            return Err(Error::invalid_dimensions(width, height));
        }
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self::from_rgba(data, width, height)
    }

    /// Raw pixel data, row-major RGBA.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw pixel data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the buffer, returning the raw data.
    #[inline]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Buffer dimensions `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Size in bytes of the f32 payload.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// `true` if the buffer holds no pixels.
    ///
    /// Constructors reject zero dimensions, so this only reports `true`
    /// for buffers built through [`ImageBuffer::empty`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// A deliberately empty 0x0 buffer.
    ///
    /// Exists so callers (and tests) can exercise the `InvalidImage`
    /// rejection path of the dispatchers.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Result<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(self.pixel_unchecked(x, y))
    }

    #[inline]
    fn pixel_unchecked(&self, x: u32, y: u32) -> [f32; 4] {
        let base = ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS;
        [
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
            self.data[base + 3],
        ]
    }

    /// Write the RGBA value at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [f32; 4]) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        let base = ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS;
        self.data[base..base + CHANNELS].copy_from_slice(&rgba);
        Ok(())
    }

    /// RGBA value at signed coordinates, clamped to the buffer edges.
    ///
    /// This is the neighborhood access rule every kernel uses: no
    /// wraparound, no out-of-bounds reads. Must not be called on an
    /// empty buffer.
    #[inline]
    pub fn sample_clamped(&self, x: i32, y: i32) -> [f32; 4] {
        let sx = x.clamp(0, self.width as i32 - 1) as u32;
        let sy = y.clamp(0, self.height as i32 - 1) as u32;
        self.pixel_unchecked(sx, sy)
    }

    /// Mean of one channel over the whole buffer.
    ///
    /// Channel 0 = R, 1 = G, 2 = B, 3 = A. Returns 0.0 for an empty
    /// buffer.
    pub fn channel_mean(&self, channel: usize) -> f32 {
        assert!(channel < CHANNELS, "channel index out of range");
        let count = self.pixel_count();
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .data
            .chunks_exact(CHANNELS)
            .map(|px| px[channel] as f64)
            .sum();
        (sum / count as f64) as f32
    }

    /// Maximum of one channel over the whole buffer.
    pub fn channel_max(&self, channel: usize) -> f32 {
        assert!(channel < CHANNELS, "channel index out of range");
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| px[channel])
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_rgba_size_check() {
        let err = ImageBuffer::from_rgba(vec![0.0; 7], 2, 2).unwrap_err();
        assert!(matches!(err, Error::BufferSizeMismatch { expected: 16, actual: 7 }));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(ImageBuffer::new(0, 4).is_err());
        assert!(ImageBuffer::new(4, 0).is_err());
        assert!(ImageBuffer::from_rgba(Vec::new(), 0, 0).is_err());
    }

    #[test]
    fn test_pixel_roundtrip() {
        let mut img = ImageBuffer::new(3, 2).unwrap();
        img.set_pixel(2, 1, [0.1, 0.2, 0.3, 1.0]).unwrap();
        let px = img.pixel(2, 1).unwrap();
        assert_relative_eq!(px[0], 0.1);
        assert_relative_eq!(px[2], 0.3);
        assert!(img.pixel(3, 0).is_err());
    }

    #[test]
    fn test_sample_clamped_edges() {
        let mut img = ImageBuffer::new(2, 2).unwrap();
        img.set_pixel(0, 0, [1.0, 0.0, 0.0, 1.0]).unwrap();
        img.set_pixel(1, 1, [0.0, 1.0, 0.0, 1.0]).unwrap();

        // Negative coordinates clamp to (0, 0).
        assert_eq!(img.sample_clamped(-5, -5)[0], 1.0);
        // Overflowing coordinates clamp to (1, 1).
        assert_eq!(img.sample_clamped(9, 9)[1], 1.0);
    }

    #[test]
    fn test_channel_mean_and_max() {
        let img = ImageBuffer::from_rgba(
            vec![
                0.0, 0.5, 0.0, 1.0, //
                1.0, 0.5, 0.0, 1.0,
            ],
            2,
            1,
        )
        .unwrap();
        assert_relative_eq!(img.channel_mean(0), 0.5);
        assert_relative_eq!(img.channel_mean(1), 0.5);
        assert_relative_eq!(img.channel_max(0), 1.0);
    }

    #[test]
    fn test_empty_buffer() {
        let img = ImageBuffer::empty();
        assert!(img.is_empty());
        assert_eq!(img.pixel_count(), 0);
        assert_eq!(img.channel_mean(0), 0.0);
    }
}
