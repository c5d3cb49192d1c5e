//! Error types for the rectification core
//!
//! Every failure here is local, synchronous and deterministic: the same input
//! always produces the same error, so none of them is worth retrying without
//! changed corners.

use thiserror::Error;

/// The 8x8 homography system has no unique solution for the given corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("homography system is singular or ill-conditioned")]
pub struct SingularTransform;

/// A 3x3 matrix with a near-zero determinant cannot be inverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("matrix is singular (determinant near zero)")]
pub struct SingularMatrix;

/// A homogeneous point with near-zero weight has no finite pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("point lies at infinity (homogeneous weight near zero)")]
pub struct AtInfinity;

/// Dimensions or raw pixel data that do not describe a usable RGBA raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("pixel buffer must be at least 1x1, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("pixel buffer of {width}x{height} exceeds the allocation limit")]
    TooLarge { width: u32, height: u32 },

    #[error("RGBA data length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Failure of a whole crop attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CropError {
    /// Corners are degenerate, self-intersecting or wound the wrong way.
    /// The user should adjust the corners.
    #[error("invalid quadrilateral: adjust the corners")]
    InvalidQuad,

    #[error(transparent)]
    SingularTransform(#[from] SingularTransform),

    #[error(transparent)]
    SingularMatrix(#[from] SingularMatrix),

    /// A destination pixel mapped to infinity; the inverse transform is not
    /// defined over the whole output rectangle.
    #[error(transparent)]
    AtInfinity(#[from] AtInfinity),

    /// The output raster implied by the corners cannot be allocated
    #[error("output raster: {0}")]
    Buffer(#[from] BufferError),

    #[error("rectification cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_errors_convert() {
        let e: CropError = SingularMatrix.into();
        assert_eq!(e, CropError::SingularMatrix(SingularMatrix));
        assert_eq!(e.to_string(), "matrix is singular (determinant near zero)");

        let e: CropError = AtInfinity.into();
        assert!(matches!(e, CropError::AtInfinity(_)));
    }

    #[test]
    fn test_buffer_error_converts() {
        let e: CropError = BufferError::TooLarge { width: 7, height: 9 }.into();
        assert_eq!(e.to_string(), "output raster: pixel buffer of 7x9 exceeds the allocation limit");
    }

    #[test]
    fn test_buffer_error_message() {
        let e = BufferError::LengthMismatch { expected: 16, actual: 12 };
        assert_eq!(e.to_string(), "RGBA data length mismatch: expected 16 bytes, got 12");
    }
}
