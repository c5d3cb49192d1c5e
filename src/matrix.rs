//! 3x3 projective matrices and homogeneous points

use std::ops::Mul;

use crate::error::{AtInfinity, SingularMatrix};
use crate::geometry::Point;

/// Relative determinant tolerance for inversion, scaled by the cube of the
/// largest entry so the test does not depend on pixel units.
pub const DET_EPSILON: f64 = 1e-12;

/// Homogeneous weights smaller than this are treated as zero
pub const W_EPSILON: f64 = 1e-10;

/// A 3x3 projective transform, row-major
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3(pub [f64; 9]);

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    /// Entry at `row`, `col`
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.0[row * 3 + col]
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// Transpose of the cofactor matrix
    pub fn adjugate(&self) -> Matrix3 {
        let m = &self.0;
        Matrix3([
            m[4] * m[8] - m[5] * m[7],
            m[2] * m[7] - m[1] * m[8],
            m[1] * m[5] - m[2] * m[4],
            m[5] * m[6] - m[3] * m[8],
            m[0] * m[8] - m[2] * m[6],
            m[2] * m[3] - m[0] * m[5],
            m[3] * m[7] - m[4] * m[6],
            m[1] * m[6] - m[0] * m[7],
            m[0] * m[4] - m[1] * m[3],
        ])
    }

    /// Largest absolute entry
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
    }

    /// Divide every entry so that the bottom-right entry is 1
    pub fn normalized(&self) -> Option<Matrix3> {
        let s = self.0[8];
        if s.abs() < W_EPSILON {
            return None;
        }
        Some(Matrix3(self.0.map(|v| v / s)))
    }

    /// True when every entry is within `tol` of `other`
    pub fn approx_eq(&self, other: &Matrix3, tol: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// Map a pixel through this transform, including the perspective divide
    #[inline]
    pub fn transform_point(&self, p: Point) -> Result<Point, AtInfinity> {
        to_point(project(self, HomogeneousPoint::from(p)))
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, b: Matrix3) -> Matrix3 {
        let a = &self.0;
        let b = &b.0;
        let mut out = [0.0f64; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
            }
        }
        Matrix3(out)
    }
}

/// A 2D point in homogeneous form `(x, y, w)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomogeneousPoint {
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl HomogeneousPoint {
    pub fn new(x: f64, y: f64, w: f64) -> Self {
        Self { x, y, w }
    }
}

impl From<Point> for HomogeneousPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y, 1.0)
    }
}

/// Invert a 3x3 matrix via its adjugate divided by the determinant
pub fn invert(m: &Matrix3) -> Result<Matrix3, SingularMatrix> {
    let det = m.determinant();
    let scale = m.max_abs();
    if !det.is_finite() || scale == 0.0 || det.abs() <= DET_EPSILON * scale * scale * scale {
        return Err(SingularMatrix);
    }

    let inv_det = 1.0 / det;
    Ok(Matrix3(m.adjugate().0.map(|v| v * inv_det)))
}

/// Raw matrix-vector product in homogeneous coordinates
#[inline]
pub fn project(m: &Matrix3, p: HomogeneousPoint) -> HomogeneousPoint {
    let h = &m.0;
    HomogeneousPoint {
        x: h[0] * p.x + h[1] * p.y + h[2] * p.w,
        y: h[3] * p.x + h[4] * p.y + h[5] * p.w,
        w: h[6] * p.x + h[7] * p.y + h[8] * p.w,
    }
}

/// Perspective divide
#[inline]
pub fn to_point(hp: HomogeneousPoint) -> Result<Point, AtInfinity> {
    if !(hp.w.abs() >= W_EPSILON) {
        return Err(AtInfinity);
    }
    Ok(Point::new(hp.x / hp.w, hp.y / hp.w))
}
