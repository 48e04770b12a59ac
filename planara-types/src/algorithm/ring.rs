//! Algorithms on closed coordinate sequences (rings) and open lines.

use crate::{Coordinate, Envelope, Location, Orientation};

/// Signed area of a ring, positive for counterclockwise rings.
///
/// The ring is expected to be closed. Returns `0` for rings with fewer than 3 points.
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    // Shift coordinates towards the first point to reduce rounding errors.
    let x0 = ring[0].x;
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let x = ring[i].x - x0;
        let y1 = ring[i + 1].y;
        let y2 = ring[i - 1].y;
        sum += x * (y2 - y1);
    }

    -sum / 2.0
}

/// Unsigned area of a ring.
pub fn area(ring: &[Coordinate]) -> f64 {
    signed_area(ring).abs()
}

/// Length of a line through all the points.
pub fn length(line: &[Coordinate]) -> f64 {
    line.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Tests whether a closed ring is oriented counterclockwise.
///
/// The orientation is determined by the highest point of the ring, so the result is robust for
/// rings with flat segments or repeated points. Returns `false` for rings with fewer than 3
/// distinct vertices or rings that are completely flat.
pub fn is_ccw(ring: &[Coordinate]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    let n = ring.len() - 1;

    let mut up_hi = ring[0];
    let mut up_low = ring[0];
    let mut i_up_hi = 0;
    let mut prev_y = up_hi.y;
    for i in 1..=n {
        let py = ring[i].y;
        if py > prev_y && py >= up_hi.y {
            up_hi = ring[i];
            i_up_hi = i;
            up_low = ring[i - 1];
        }
        prev_y = py;
    }

    if i_up_hi == 0 {
        return false;
    }

    let mut i_down_low = i_up_hi;
    loop {
        i_down_low = (i_down_low + 1) % n;
        if i_down_low == i_up_hi || ring[i_down_low].y != up_hi.y {
            break;
        }
    }

    let down_low = ring[i_down_low];
    let i_down_hi = if i_down_low > 0 { i_down_low - 1 } else { n - 1 };
    let down_hi = ring[i_down_hi];

    if up_hi.equals_2d(&down_hi) {
        if up_low.equals_2d(&up_hi) || down_low.equals_2d(&up_hi) || up_low.equals_2d(&down_low)
        {
            return false;
        }

        Orientation::index(&up_low, &up_hi, &down_low) == Orientation::Counterclockwise
    } else {
        down_hi.x - up_hi.x < 0.0
    }
}

/// Determines the location of the point relative to a closed ring using ray crossing counting.
///
/// Returns [`Location::Boundary`] if the point lies on one of the ring segments.
pub fn locate_point_in_ring(p: &Coordinate, ring: &[Coordinate]) -> Location {
    let mut crossings = 0usize;
    for i in 1..ring.len() {
        let p1 = &ring[i];
        let p2 = &ring[i - 1];

        if p1.x < p.x && p2.x < p.x {
            continue;
        }

        if p.equals_2d(p2) {
            return Location::Boundary;
        }

        if p1.y == p.y && p2.y == p.y {
            let min_x = p1.x.min(p2.x);
            let max_x = p1.x.max(p2.x);
            if p.x >= min_x && p.x <= max_x {
                return Location::Boundary;
            }
            continue;
        }

        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = Orientation::index(p1, p2, p).as_i32();
            if orient == 0 {
                return Location::Boundary;
            }
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient > 0 {
                crossings += 1;
            }
        }
    }

    if crossings % 2 == 1 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// Tests whether the point lies inside the ring or on its boundary.
pub fn is_in_ring(p: &Coordinate, ring: &[Coordinate]) -> bool {
    locate_point_in_ring(p, ring) != Location::Exterior
}

/// Tests whether the point lies on one of the segments of the line.
pub fn is_on_line(p: &Coordinate, line: &[Coordinate]) -> bool {
    line.windows(2).any(|w| is_on_segment(p, &w[0], &w[1]))
}

/// Tests whether the point lies on the segment `p0`-`p1`.
pub fn is_on_segment(p: &Coordinate, p0: &Coordinate, p1: &Coordinate) -> bool {
    Envelope::segment_contains(p0, p1, p) && Orientation::index(p0, p1, p) == Orientation::Collinear
}

/// Returns true if the sequence has at least two consecutive equal points.
pub fn has_repeated_points(coords: &[Coordinate]) -> bool {
    coords.windows(2).any(|w| w[0].equals_2d(&w[1]))
}

/// Returns the coordinates with consecutive duplicates removed.
pub fn remove_repeated_points(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut result: Vec<Coordinate> = Vec::with_capacity(coords.len());
    for c in coords {
        if result.last().is_some_and(|last| last.equals_2d(c)) {
            continue;
        }
        result.push(*c);
    }
    result
}

/// Finds the first point of `test_pts` that is not a vertex of `pts`.
pub fn point_not_in_list(test_pts: &[Coordinate], pts: &[Coordinate]) -> Option<Coordinate> {
    test_pts
        .iter()
        .find(|p| !pts.iter().any(|q| q.equals_2d(p)))
        .copied()
}

/// Returns the index of the minimum coordinate of the sequence.
pub fn min_coordinate_index(coords: &[Coordinate]) -> Option<usize> {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.compare_xy(b))
        .map(|(i, _)| i)
}

/// Rotates a closed ring so that it starts (and ends) at the vertex with the given index.
pub fn scroll_ring(ring: &mut Vec<Coordinate>, index: usize) {
    if ring.len() < 2 || index == 0 || index >= ring.len() - 1 {
        return;
    }
    ring.pop();
    ring.rotate_left(index);
    let first = ring[0];
    ring.push(first);
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn coords(v: &[(f64, f64)]) -> Vec<Coordinate> {
        v.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    fn square_ccw() -> Vec<Coordinate> {
        coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
    }

    #[test]
    fn area_and_orientation() {
        let mut ring = square_ccw();
        assert_abs_diff_eq!(signed_area(&ring), 100.0);
        assert!(is_ccw(&ring));
        ring.reverse();
        assert_abs_diff_eq!(signed_area(&ring), -100.0);
        assert!(!is_ccw(&ring));
    }

    #[test]
    fn orientation_with_flat_top() {
        let ring = coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (5.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        assert!(is_ccw(&ring));
    }

    #[test]
    fn flat_ring_is_not_ccw() {
        let ring = coords(&[(0.0, 0.0), (10.0, 0.0), (5.0, 0.0), (0.0, 0.0)]);
        assert!(!is_ccw(&ring));
    }

    #[test]
    fn point_in_ring() {
        let ring = square_ccw();
        assert_eq!(
            locate_point_in_ring(&Coordinate::new(5.0, 5.0), &ring),
            Location::Interior
        );
        assert_eq!(
            locate_point_in_ring(&Coordinate::new(10.0, 5.0), &ring),
            Location::Boundary
        );
        assert_eq!(
            locate_point_in_ring(&Coordinate::new(0.0, 0.0), &ring),
            Location::Boundary
        );
        assert_eq!(
            locate_point_in_ring(&Coordinate::new(5.0, 0.0), &ring),
            Location::Boundary
        );
        assert_eq!(
            locate_point_in_ring(&Coordinate::new(15.0, 5.0), &ring),
            Location::Exterior
        );
        assert_eq!(
            locate_point_in_ring(&Coordinate::new(-5.0, 10.0), &ring),
            Location::Exterior
        );
    }

    #[test]
    fn repeated_points() {
        let line = coords(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0), (1.0, 1.0), (2.0, 0.0)]);
        assert!(has_repeated_points(&line));
        assert_eq!(
            remove_repeated_points(&line),
            coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])
        );
    }

    #[test]
    fn scroll() {
        let mut ring = coords(&[(1.0, 1.0), (2.0, 0.0), (0.0, 0.0), (1.0, 1.0)]);
        let min = min_coordinate_index(&ring[..ring.len() - 1]);
        assert_eq!(min, Some(2));
        scroll_ring(&mut ring, 2);
        assert_eq!(
            ring,
            coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (0.0, 0.0)])
        );
    }
}
