//! Predicates and measures of a single triangle.

use crate::{Coordinate, Orientation};

/// Tests whether the point lies in the triangle or on its boundary. The triangle may have either
/// orientation.
pub fn intersects(a: &Coordinate, b: &Coordinate, c: &Coordinate, p: &Coordinate) -> bool {
    let exterior = if is_ccw(a, b, c) {
        Orientation::Clockwise
    } else {
        Orientation::Counterclockwise
    };

    exterior != Orientation::index(a, b, p)
        && exterior != Orientation::index(b, c, p)
        && exterior != Orientation::index(c, a, p)
}

/// Whether the vertices are in counterclockwise order.
pub fn is_ccw(a: &Coordinate, b: &Coordinate, c: &Coordinate) -> bool {
    Orientation::index(a, b, c) == Orientation::Counterclockwise
}

/// Signed area, positive for counterclockwise triangles.
pub fn signed_area(a: &Coordinate, b: &Coordinate, c: &Coordinate) -> f64 {
    ((c.x - a.x) * (b.y - a.y) - (b.x - a.x) * (c.y - a.y)) / -2.0
}

/// Unsigned area.
pub fn area(a: &Coordinate, b: &Coordinate, c: &Coordinate) -> f64 {
    signed_area(a, b, c).abs()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn point_in_triangle() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(4.0, 0.0);
        let c = Coordinate::new(0.0, 4.0);
        assert!(intersects(&a, &b, &c, &Coordinate::new(1.0, 1.0)));
        assert!(intersects(&a, &c, &b, &Coordinate::new(1.0, 1.0)));
        assert!(intersects(&a, &b, &c, &Coordinate::new(2.0, 2.0)));
        assert!(!intersects(&a, &b, &c, &Coordinate::new(3.0, 3.0)));
    }

    #[test]
    fn triangle_area() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(4.0, 0.0);
        let c = Coordinate::new(0.0, 4.0);
        assert_abs_diff_eq!(signed_area(&a, &b, &c), 8.0);
        assert_abs_diff_eq!(signed_area(&a, &c, &b), -8.0);
        assert_abs_diff_eq!(area(&a, &c, &b), 8.0);
    }
}
