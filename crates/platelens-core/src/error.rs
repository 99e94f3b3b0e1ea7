//! Error types for core buffer operations.
//!
//! The [`Error`] enum covers the failure modes of [`crate::image::ImageBuffer`]
//! construction and access: size mismatches, degenerate dimensions, and
//! out-of-bounds pixel addressing.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during buffer construction and access.
#[derive(Debug, Error)]
pub enum Error {
    /// Supplied pixel data does not match `width * height * 4`.
    #[error("buffer size mismatch: expected {expected} floats, got {actual}")]
    BufferSizeMismatch {
        /// Number of floats required by the dimensions.
        expected: usize,
        /// Number of floats actually supplied.
        actual: usize,
    },

    /// Width or height is zero.
    ///
    /// A zero-area buffer has no pixels to analyze; constructors reject
    /// it up front so downstream code never has to special-case it.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Pixel coordinates are outside the buffer.
    #[error("pixel ({x}, {y}) out of bounds for buffer {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was accessed.
        x: u32,
        /// Y coordinate that was accessed.
        y: u32,
        /// Buffer width.
        width: u32,
        /// Buffer height.
        height: u32,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32) -> Self {
        Self::InvalidDimensions { width, height }
    }

    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}
