//! Points and quadrilaterals in pixel space

use serde::{Deserialize, Serialize};
use std::ops::{Index, Sub};
use std::str::FromStr;

/// A 2D point in source- or destination-pixel units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert normalized (0.0 to 1.0) coordinates to pixel coordinates
    pub fn to_pixels(&self, width: u32, height: u32) -> Point {
        Point::new(self.x * width as f64, self.y * height as f64)
    }

    /// Normalize pixel coordinates against a `width` x `height` image
    pub fn normalized_from_pixels(px: f64, py: f64, width: u32, height: u32) -> Self {
        Self {
            x: px / width as f64,
            y: py / height as f64,
        }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    /// Length of this point taken as a vector from the origin
    #[inline]
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Z component of the cross product of two vectors
    #[inline]
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Parses `"x,y"`, as typed on the command line
impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got {:?}", s))?;
        let x = x
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid x coordinate {:?}: {}", x, e))?;
        let y = y
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid y coordinate {:?}: {}", y, e))?;
        if !x.is_finite() || !y.is_finite() {
            return Err(format!("coordinates must be finite: {:?}", s));
        }
        Ok(Point::new(x, y))
    }
}

/// Index of each corner within a [`Quad`]
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Four ordered corners: top-left, top-right, bottom-right, bottom-left.
///
/// The order decides which source region lands on which destination corner
/// and the winding sign the validator expects. A quad is a plain value; the
/// core never keeps one across calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            corners: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Build a quad from pixel coordinate pairs in TL, TR, BR, BL order
    pub fn from_pixels(corners: [(f64, f64); 4]) -> Self {
        Self {
            corners: corners.map(Point::from),
        }
    }

    /// The axis-aligned rectangle `(0,0) (w,0) (w,h) (0,h)`
    pub fn rectangle(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::from_pixels([
            (0.0, 0.0), // Top-left
            (w, 0.0),   // Top-right
            (w, h),     // Bottom-right
            (0.0, h),   // Bottom-left
        ])
    }

    pub fn top_left(&self) -> Point {
        self.corners[TOP_LEFT]
    }

    pub fn top_right(&self) -> Point {
        self.corners[TOP_RIGHT]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[BOTTOM_RIGHT]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[BOTTOM_LEFT]
    }

    /// Edge vectors in winding order: top, right, bottom, left
    pub fn edges(&self) -> [Point; 4] {
        let c = &self.corners;
        [c[1] - c[0], c[2] - c[1], c[3] - c[2], c[0] - c[3]]
    }

    /// Signed shoelace area; positive for clockwise winding on a y-down raster
    pub fn signed_area(&self) -> f64 {
        let c = &self.corners;
        (0..4)
            .map(|i| c[i].cross(c[(i + 1) % 4]))
            .sum::<f64>()
            * 0.5
    }
}

impl Index<usize> for Quad {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.corners[index]
    }
}
