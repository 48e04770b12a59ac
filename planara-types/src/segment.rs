use serde::{Deserialize, Serialize};

use crate::{Coordinate, Envelope, Orientation};

/// A straight line segment between two points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Start point.
    pub p0: Coordinate,
    /// End point.
    pub p1: Coordinate,
}

impl Segment {
    /// Creates a new segment.
    pub fn new(p0: Coordinate, p1: Coordinate) -> Self {
        Self { p0, p1 }
    }

    /// Bounding box of the segment.
    pub fn envelope(&self) -> Envelope {
        Envelope::from_coords(&self.p0, &self.p1)
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.p0.distance(&self.p1)
    }

    /// The same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.p1, self.p0)
    }

    /// Orientation of the point relative to the segment direction.
    pub fn orientation_of(&self, q: &Coordinate) -> Orientation {
        Orientation::index(&self.p0, &self.p1, q)
    }

    /// Angle of the segment direction against the positive x axis, in radians in `(-pi, pi]`.
    pub fn angle(&self) -> f64 {
        (self.p1.y - self.p0.y).atan2(self.p1.x - self.p0.x)
    }

    /// Shortest euclidian distance (squared) between a point and the segment:
    ///
    /// * if the normal from the point to the segment ends inside the segment, the returned value is the squared length
    ///   of the normal
    /// * if the normal from the point to the segment ends outside of the segment, the returned value is the smaller one
    ///   of the distances between the point and the segment's endpoints
    pub fn distance_to_point_sq(&self, point: &Coordinate) -> f64 {
        if self.p0.equals_2d(&self.p1) {
            return self.p0.distance_sq(point);
        }

        let dsx = self.p1.x - self.p0.x;
        let dsy = self.p1.y - self.p0.y;
        let dpx = point.x - self.p0.x;
        let dpy = point.y - self.p0.y;
        let ds_len = dsx * dsx + dsy * dsy;

        let r = (dpx * dsx + dpy * dsy) / ds_len;
        if r <= 0.0 {
            self.p0.distance_sq(point)
        } else if r >= 1.0 {
            self.p1.distance_sq(point)
        } else {
            let s = (dpy * dsx - dpx * dsy) / ds_len;
            (s * s) * ds_len
        }
    }

    /// Distance between a point and the segment.
    pub fn distance_to_point(&self, point: &Coordinate) -> f64 {
        self.distance_to_point_sq(point).sqrt()
    }

    /// Returns true, if the segment has at least one common point with the `other` segment.
    pub fn intersects(&self, other: &Segment) -> bool {
        if !Envelope::segments_intersect(&self.p0, &self.p1, &other.p0, &other.p1) {
            return false;
        }

        let o1 = self.orientation_of(&other.p0);
        let o2 = self.orientation_of(&other.p1);
        let o3 = other.orientation_of(&self.p0);
        let o4 = other.orientation_of(&self.p1);

        if o1 != o2 && o3 != o4 {
            return true;
        }

        (o1 == Orientation::Collinear && Envelope::segment_contains(&self.p0, &self.p1, &other.p0))
            || (o2 == Orientation::Collinear
                && Envelope::segment_contains(&self.p0, &self.p1, &other.p1))
            || (o3 == Orientation::Collinear
                && Envelope::segment_contains(&other.p0, &other.p1, &self.p0))
            || (o4 == Orientation::Collinear
                && Envelope::segment_contains(&other.p0, &other.p1, &self.p1))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Coordinate::new(x0, y0), Coordinate::new(x1, y1))
    }

    #[test]
    fn distance_to_point() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        assert_abs_diff_eq!(s.distance_to_point(&Coordinate::new(5.0, 3.0)), 3.0);
        assert_abs_diff_eq!(s.distance_to_point(&Coordinate::new(13.0, 4.0)), 5.0);
        assert_abs_diff_eq!(s.distance_to_point(&Coordinate::new(-3.0, 0.0)), 3.0);
    }

    #[test]
    fn intersects() {
        assert!(seg(0.0, 0.0, 10.0, 10.0).intersects(&seg(0.0, 10.0, 10.0, 0.0)));
        assert!(seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(5.0, 0.0, 5.0, 5.0)));
        assert!(seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(5.0, 0.0, 15.0, 0.0)));
        assert!(!seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(11.0, 0.0, 15.0, 0.0)));
        assert!(!seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(0.0, 1.0, 10.0, 1.0)));
    }
}
