//! Homography estimation from four point correspondences
//!
//! Each correspondence `(x, y) -> (x', y')` contributes two rows of the
//! classic direct linear transform with `h9` fixed to 1:
//!
//! ```text
//! x*h1 + y*h2 + h3 - x'*x*h7 - x'*y*h8 = x'
//! x*h4 + y*h5 + h6 - y'*x*h7 - y'*y*h8 = y'
//! ```
//!
//! The resulting 8x8 system is solved by Gaussian elimination with partial
//! pivoting. Points are first shifted to their centroid and scaled to a mean
//! distance of sqrt(2); the pivot tolerance applies in those units.

use crate::error::SingularTransform;
use crate::geometry::{Point, Quad};
use crate::matrix::Matrix3;

/// Pivots smaller than this (in normalized coordinates) make the system singular
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Compute the 3x3 homography `H` with `H * src[i] ~ dst[i]` and `H[2][2] == 1`
pub fn compute_homography(src: &Quad, dst: &Quad) -> Result<Matrix3, SingularTransform> {
    let (t_src, src_n) = normalize_points(&src.corners)?;
    let (t_dst, dst_n) = normalize_points(&dst.corners)?;

    let mut a = [[0.0f64; 8]; 8];
    let mut b = [0.0f64; 8];

    for i in 0..4 {
        let Point { x, y } = src_n[i];
        let Point { x: xp, y: yp } = dst_n[i];

        let row1 = i * 2;
        let row2 = i * 2 + 1;

        a[row1] = [x, y, 1.0, 0.0, 0.0, 0.0, -xp * x, -xp * y];
        b[row1] = xp;

        a[row2] = [0.0, 0.0, 0.0, x, y, 1.0, -yp * x, -yp * y];
        b[row2] = yp;
    }

    let h = solve_linear_system(&mut a, &mut b)?;
    let h_n = Matrix3([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]);

    // Undo the normalization: H = T_dst^-1 * Hn * T_src
    let h = denormalize(&t_dst) * h_n * t_src;
    let h = h.normalized().ok_or(SingularTransform)?;

    if h.0.iter().all(|v| v.is_finite()) {
        Ok(h)
    } else {
        Err(SingularTransform)
    }
}

/// Similarity moving the centroid to the origin with mean distance sqrt(2).
/// Returns `(scale, cx, cy)` packed as a matrix plus the mapped points.
fn normalize_points(pts: &[Point; 4]) -> Result<(Matrix3, [Point; 4]), SingularTransform> {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let centroid = Point::new(cx, cy);

    let mean_dist = pts.iter().map(|p| p.distance(centroid)).sum::<f64>() / 4.0;
    if !mean_dist.is_finite() || mean_dist < 1e-12 {
        return Err(SingularTransform);
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3([s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0]);
    let mapped = pts.map(|p| Point::new(s * (p.x - cx), s * (p.y - cy)));

    Ok((t, mapped))
}

/// Closed-form inverse of a normalizing similarity
fn denormalize(t: &Matrix3) -> Matrix3 {
    let s = t.at(0, 0);
    let cx = -t.at(0, 2) / s;
    let cy = -t.at(1, 2) / s;
    Matrix3([1.0 / s, 0.0, cx, 0.0, 1.0 / s, cy, 0.0, 0.0, 1.0])
}

/// Solve an 8x8 linear system using Gaussian elimination with partial pivoting
fn solve_linear_system(
    a: &mut [[f64; 8]; 8],
    b: &mut [f64; 8],
) -> Result<[f64; 8], SingularTransform> {
    let n = 8;

    // Forward elimination with partial pivoting
    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        let mut max_val = a[col][col].abs();
        for row in (col + 1)..n {
            if a[row][col].abs() > max_val {
                max_val = a[row][col].abs();
                max_row = row;
            }
        }

        // Swap rows
        if max_row != col {
            a.swap(col, max_row);
            b.swap(col, max_row);
        }

        // The determinant is the product of the pivots; any tiny one sinks it
        let pivot = a[col][col];
        if !(pivot.abs() >= PIVOT_EPSILON) {
            return Err(SingularTransform);
        }

        for row in (col + 1)..n {
            let factor = a[row][col] / pivot;
            for j in col..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::invert;
    use crate::quad;

    fn assert_maps(h: &Matrix3, src: &Quad, dst: &Quad) {
        for i in 0..4 {
            let p = h.transform_point(src[i]).unwrap();
            assert!(
                (p.x - dst[i].x).abs() < 1e-6 && (p.y - dst[i].y).abs() < 1e-6,
                "corner {} mapped to {:?}, expected {:?}",
                i,
                p,
                dst[i]
            );
        }
    }

    #[test]
    fn test_identity_transform() {
        let rect = Quad::rectangle(100, 100);
        let h = compute_homography(&rect, &rect).unwrap();
        assert!(h.approx_eq(&Matrix3::IDENTITY, 1e-9));
    }

    #[test]
    fn test_simple_transform() {
        let src = Quad::from_pixels([(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)]);
        let dst = Quad::rectangle(100, 100);

        let h = compute_homography(&src, &dst).unwrap();
        assert_maps(&h, &src, &dst);

        // Pure scale and translation: no perspective terms
        assert!(h.at(2, 0).abs() < 1e-12);
        assert!(h.at(2, 1).abs() < 1e-12);
        assert!((h.at(0, 0) - 1.25).abs() < 1e-9);
        assert!((h.at(0, 2) + 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_perspective_corners() {
        let src = Quad::from_pixels([(132.4, 88.1), (901.7, 140.9), (860.2, 1210.5), (95.0, 1150.3)]);
        let dst = Quad::rectangle(768, 1066);

        let h = compute_homography(&src, &dst).unwrap();
        assert_eq!(h.at(2, 2), 1.0);
        assert_maps(&h, &src, &dst);
    }

    #[test]
    fn test_general_destination_quad() {
        let src = Quad::from_pixels([(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)]);
        let dst = Quad::from_pixels([(20.0, 5.0), (180.0, 30.0), (170.0, 140.0), (10.0, 90.0)]);

        let h = compute_homography(&src, &dst).unwrap();
        assert_maps(&h, &src, &dst);
    }

    #[test]
    fn test_round_trip_with_inverse() {
        let quads = [
            // Skewed phone shot
            [(30.0, 50.0), (420.0, 12.0), (460.0, 610.0), (8.0, 580.0)],
            // Strong keystone
            [(180.0, 40.0), (620.0, 40.0), (790.0, 590.0), (10.0, 590.0)],
            // Thin receipt strip
            [(12.0, 300.0), (412.0, 296.0), (413.0, 302.5), (12.5, 306.0)],
            // Tall and narrow, leaning
            [(500.0, 3.0), (509.0, 4.0), (530.0, 900.0), (519.0, 899.0)],
            // Hugging the borders of a 1280x960 photo
            [(0.0, 0.5), (1279.5, 0.0), (1280.0, 959.0), (0.2, 960.0)],
        ];

        for corners in quads {
            let src = Quad::from_pixels(corners);
            assert!(quad::is_valid(&src), "{:?} should be a valid quad", corners);
            let (w, h_px) = quad::output_size(&src);
            let dst = Quad::rectangle(w, h_px);

            let h = compute_homography(&src, &dst).unwrap();
            assert_maps(&h, &src, &dst);

            let inv = invert(&h).unwrap();
            assert!(
                (inv * h).approx_eq(&Matrix3::IDENTITY, 1e-9),
                "inv * H is not identity for {:?}",
                corners
            );
            assert!(
                (h * inv).approx_eq(&Matrix3::IDENTITY, 1e-9),
                "H * inv is not identity for {:?}",
                corners
            );
            assert_maps(&inv, &dst, &src);
        }
    }

    #[test]
    fn test_collinear_source_is_singular() {
        let src = Quad::from_pixels([(0.0, 0.0), (10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
        let dst = Quad::rectangle(10, 10);
        assert_eq!(compute_homography(&src, &dst), Err(SingularTransform));
    }

    #[test]
    fn test_coincident_source_is_singular() {
        let p = (5.0, 5.0);
        let src = Quad::from_pixels([p, p, p, p]);
        let dst = Quad::rectangle(10, 10);
        assert_eq!(compute_homography(&src, &dst), Err(SingularTransform));
    }
}
