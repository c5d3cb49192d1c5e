//! Perspective rectification
//!
//! This module ties the geometry together: it validates the user's quad,
//! sizes the output from the quad's edges, solves the forward homography onto
//! the output rectangle, inverts it and pulls every destination pixel back
//! from the source image with bilinear interpolation.
//!
//! Destination rows are independent, so the warp runs row-parallel on the
//! rayon pool. Each row owns its slice of the output buffer and only reads
//! the shared source and inverse matrix.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::{AtInfinity, CropError};
use crate::geometry::{Point, Quad};
use crate::homography::compute_homography;
use crate::matrix::{invert, project, to_point, HomogeneousPoint, Matrix3};
use crate::pixel::{EdgePolicy, PixelBuffer};
use crate::quad;

/// Resampling options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectifyOptions {
    /// What to read for neighbors outside the source image
    #[serde(default)]
    pub edge_policy: EdgePolicy,
    /// Spread destination rows over the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for RectifyOptions {
    fn default() -> Self {
        Self {
            edge_policy: EdgePolicy::default(),
            parallel: true,
        }
    }
}

/// Perspective transformation from a source quad onto an upright rectangle
#[derive(Debug, Clone)]
pub struct PerspectiveTransform {
    /// Source to destination, row-major, `H[2][2] == 1`
    matrix: Matrix3,
    /// Destination to source, used for warping
    inverse: Matrix3,
    /// Destination image dimensions
    dst_width: u32,
    dst_height: u32,
}

impl PerspectiveTransform {
    /// Build the transform for a quad, sizing the output from its edges
    pub fn from_quad(quad: &Quad) -> Result<Self, CropError> {
        if !quad::is_valid(quad) {
            return Err(CropError::InvalidQuad);
        }

        let (dst_width, dst_height) = quad::output_size(quad);
        PixelBuffer::byte_len(dst_width, dst_height)?;
        Self::compute(quad, dst_width, dst_height)
    }

    /// Build the transform from a quad onto a `dst_width` x `dst_height`
    /// rectangle. The quad is not validated here.
    pub fn compute(src: &Quad, dst_width: u32, dst_height: u32) -> Result<Self, CropError> {
        let dst = Quad::rectangle(dst_width, dst_height);

        let matrix = compute_homography(src, &dst)?;
        let inverse = invert(&matrix)?;

        debug!(
            "Perspective transform ready: {}x{} output, H = {:?}",
            dst_width, dst_height, matrix.0
        );

        Ok(Self {
            matrix,
            inverse,
            dst_width,
            dst_height,
        })
    }

    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix3 {
        &self.inverse
    }

    /// Destination size as `(width, height)`
    pub fn output_size(&self) -> (u32, u32) {
        (self.dst_width, self.dst_height)
    }

    /// Transform a point from source to destination coordinates
    #[inline]
    pub fn transform_point(&self, p: Point) -> Result<Point, AtInfinity> {
        self.matrix.transform_point(p)
    }

    /// Transform a point from destination to source coordinates (inverse)
    #[inline]
    pub fn inverse_transform_point(&self, p: Point) -> Result<Point, AtInfinity> {
        self.inverse.transform_point(p)
    }

    /// Warp `src` into a freshly allocated destination buffer.
    ///
    /// `cancel` is polled once per row; a cancelled pass drops the partial
    /// buffer and returns [`CropError::Cancelled`].
    pub fn warp(
        &self,
        src: &PixelBuffer,
        options: &RectifyOptions,
        cancel: Option<&AtomicBool>,
    ) -> Result<PixelBuffer, CropError> {
        let mut dst = PixelBuffer::new(self.dst_width, self.dst_height)?;
        let stride = dst.stride();

        let policy = options.edge_policy;
        let warp_row = |(dst_y, row): (usize, &mut [u8])| -> Result<(), CropError> {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(CropError::Cancelled);
            }
            self.warp_row(src, dst_y, row, policy)
        };

        let raw = dst.as_raw_mut();
        if options.parallel {
            raw.par_chunks_mut(stride).enumerate().try_for_each(warp_row)?;
        } else {
            raw.chunks_mut(stride).enumerate().try_for_each(warp_row)?;
        }

        Ok(dst)
    }

    /// Fill one destination row
    #[inline]
    fn warp_row(
        &self,
        src: &PixelBuffer,
        dst_y: usize,
        row: &mut [u8],
        policy: EdgePolicy,
    ) -> Result<(), CropError> {
        for (dst_x, px) in row.chunks_exact_mut(PixelBuffer::CHANNELS).enumerate() {
            // Map destination pixel to source coordinates
            let hp = project(
                &self.inverse,
                HomogeneousPoint::new(dst_x as f64, dst_y as f64, 1.0),
            );
            let Point { x, y } = to_point(hp)?;

            px.copy_from_slice(&src.sample(x, y, policy));
        }
        Ok(())
    }
}

/// Rectify the region of `source` inside `quad` with default options
pub fn rectify(source: &PixelBuffer, quad: &Quad) -> Result<PixelBuffer, CropError> {
    rectify_with(source, quad, &RectifyOptions::default(), None)
}

/// Rectify with explicit options and an optional cancellation flag
pub fn rectify_with(
    source: &PixelBuffer,
    quad: &Quad,
    options: &RectifyOptions,
    cancel: Option<&AtomicBool>,
) -> Result<PixelBuffer, CropError> {
    let start = Instant::now();

    let transform = PerspectiveTransform::from_quad(quad)?;
    let result = transform.warp(source, options, cancel);

    match &result {
        Ok(out) => debug!(
            "Rectified {}x{} source into {}x{} in {:.2} ms (edge policy {}, parallel {})",
            source.width(),
            source.height(),
            out.width(),
            out.height(),
            start.elapsed().as_secs_f64() * 1000.0,
            options.edge_policy.as_str(),
            options.parallel
        ),
        Err(CropError::Cancelled) => warn!("Rectification cancelled, partial output discarded"),
        Err(e) => debug!("Rectification failed: {}", e),
    }

    result
}
