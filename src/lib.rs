//! docrectify - perspective rectification of photographed documents
//!
//! Given four user-placed corners of a document in a photo, produce an
//! upright rectangular raster as if the page had been photographed head-on.
//!
//! ```no_run
//! use docrectify::{rectify, PixelBuffer, Quad};
//!
//! let photo = PixelBuffer::filled(800, 600, [255, 255, 255, 255])?;
//! let quad = Quad::from_pixels([(120.0, 40.0), (700.0, 90.0), (660.0, 560.0), (90.0, 520.0)]);
//! let page = rectify(&photo, &quad)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod corners;
pub mod error;
pub mod geometry;
pub mod homography;
pub mod matrix;
pub mod pixel;
pub mod quad;
pub mod transform;

pub use corners::CornerEditor;
pub use error::{AtInfinity, BufferError, CropError, SingularMatrix, SingularTransform};
pub use geometry::{Point, Quad};
pub use homography::compute_homography;
pub use matrix::{invert, project, to_point, HomogeneousPoint, Matrix3};
pub use pixel::{sample, EdgePolicy, PixelBuffer, Rgba};
pub use quad::{is_valid, output_size};
pub use transform::{rectify, rectify_with, PerspectiveTransform, RectifyOptions};
