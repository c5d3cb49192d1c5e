//! Quadrilateral validation and output sizing
//!
//! A usable quad has four distinct consecutive corners, is strictly convex
//! (which for four vertices also means simple) and turns clockwise on a
//! y-down raster, i.e. the corners really are TL, TR, BR, BL.

use tracing::debug;

use crate::geometry::Quad;

/// Minimum distance between consecutive corners, in pixels
pub const MIN_CORNER_DISTANCE: f64 = 1e-6;

/// Minimum sine of the turn angle at each corner. Smaller turns are treated
/// as collinear.
pub const MIN_TURN_SINE: f64 = 1e-6;

/// Minimum enclosed area, in square pixels
pub const MIN_AREA: f64 = 1e-6;

/// Reason a quad was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadDefect {
    NonFinite,
    CoincidentCorners,
    Collinear,
    NotConvex,
    WrongWinding,
    ZeroArea,
}

/// Check whether four ordered corners form a usable quadrilateral
pub fn is_valid(quad: &Quad) -> bool {
    match check(quad) {
        Ok(()) => true,
        Err(defect) => {
            debug!("Rejected quad {:?}: {:?}", quad.corners, defect);
            false
        }
    }
}

/// Like [`is_valid`], but reports why the quad is unusable
pub fn check(quad: &Quad) -> Result<(), QuadDefect> {
    if quad
        .corners
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(QuadDefect::NonFinite);
    }

    let edges = quad.edges();
    let lengths = edges.map(|e| e.length());
    if lengths.iter().any(|&l| l < MIN_CORNER_DISTANCE) {
        return Err(QuadDefect::CoincidentCorners);
    }

    // Turn at corner i+1 between edge i and edge i+1, normalized to a sine
    let mut positive = 0;
    let mut negative = 0;
    for i in 0..4 {
        let j = (i + 1) % 4;
        let sine = edges[i].cross(edges[j]) / (lengths[i] * lengths[j]);
        if sine.abs() < MIN_TURN_SINE {
            return Err(QuadDefect::Collinear);
        }
        if sine > 0.0 {
            positive += 1;
        } else {
            negative += 1;
        }
    }

    if positive != 4 {
        return Err(if negative == 4 {
            QuadDefect::WrongWinding
        } else {
            QuadDefect::NotConvex
        });
    }

    if quad.signed_area() < MIN_AREA {
        return Err(QuadDefect::ZeroArea);
    }

    Ok(())
}

/// Output raster size for a quad: the rounded mean of the top and bottom
/// edge lengths by the rounded mean of the left and right edge lengths,
/// each at least one pixel.
pub fn output_size(quad: &Quad) -> (u32, u32) {
    let top = quad.top_left().distance(quad.top_right());
    let bottom = quad.bottom_left().distance(quad.bottom_right());
    let left = quad.top_left().distance(quad.bottom_left());
    let right = quad.top_right().distance(quad.bottom_right());

    let width = ((top + bottom) / 2.0).round().max(1.0);
    let height = ((left + right) / 2.0).round().max(1.0);

    (width.min(u32::MAX as f64) as u32, height.min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn quad(c: [(f64, f64); 4]) -> Quad {
        Quad::from_pixels(c)
    }

    #[test]
    fn test_square_is_valid() {
        assert!(is_valid(&Quad::rectangle(100, 100)));
    }

    #[test]
    fn test_rectangle_is_valid() {
        assert!(is_valid(&quad([(10.0, 20.0), (310.0, 20.0), (310.0, 120.0), (10.0, 120.0)])));
    }

    #[test]
    fn test_trapezoid_is_valid() {
        assert!(is_valid(&quad([(10.0, 10.0), (90.0, 10.0), (80.0, 60.0), (20.0, 60.0)])));
    }

    #[test]
    fn test_skewed_photo_quad_is_valid() {
        assert!(is_valid(&quad([(132.4, 88.1), (901.7, 140.9), (860.2, 1210.5), (95.0, 1150.3)])));
    }

    #[test]
    fn test_repeated_point_is_invalid() {
        let q = quad([(0.0, 0.0), (0.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        assert_eq!(check(&q), Err(QuadDefect::CoincidentCorners));
        assert!(!is_valid(&q));
    }

    #[test]
    fn test_bowtie_is_invalid() {
        // TR and BR swapped: edges cross in the middle
        let q = quad([(0.0, 0.0), (100.0, 100.0), (100.0, 0.0), (0.0, 100.0)]);
        assert_eq!(check(&q), Err(QuadDefect::NotConvex));
        assert!(!is_valid(&q));
    }

    #[test]
    fn test_three_collinear_points_are_invalid() {
        let q = quad([(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        assert_eq!(check(&q), Err(QuadDefect::Collinear));
        assert!(!is_valid(&q));
    }

    #[test]
    fn test_counter_clockwise_is_invalid() {
        // TL, BL, BR, TR
        let q = quad([(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)]);
        assert_eq!(check(&q), Err(QuadDefect::WrongWinding));
    }

    #[test]
    fn test_concave_is_invalid() {
        // BR pushed inside the triangle TL, TR, BL
        let q = quad([(0.0, 0.0), (100.0, 0.0), (30.0, 30.0), (0.0, 100.0)]);
        assert_eq!(check(&q), Err(QuadDefect::NotConvex));
    }

    #[test]
    fn test_non_finite_is_invalid() {
        let mut q = Quad::rectangle(10, 10);
        q.corners[2] = Point::new(f64::NAN, 10.0);
        assert_eq!(check(&q), Err(QuadDefect::NonFinite));
    }

    #[test]
    fn test_output_size_square() {
        assert_eq!(output_size(&Quad::rectangle(100, 100)), (100, 100));
    }

    #[test]
    fn test_output_size_trapezoid() {
        // top 80, bottom 60, sides sqrt(10^2 + 50^2) = 50.99
        let q = quad([(10.0, 10.0), (90.0, 10.0), (80.0, 60.0), (20.0, 60.0)]);
        assert_eq!(output_size(&q), (70, 51));
    }

    #[test]
    fn test_output_size_floors_at_one() {
        let q = quad([(0.0, 0.0), (0.2, 0.0), (0.2, 0.2), (0.0, 0.2)]);
        assert_eq!(output_size(&q), (1, 1));
    }
}
