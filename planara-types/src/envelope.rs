use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Axis-aligned bounding rectangle.
///
/// An envelope is either *null* (it contains nothing, the envelope of an empty geometry) or
/// satisfies `min_x <= max_x && min_y <= max_y`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::null()
    }
}

impl Envelope {
    /// Creates an envelope spanning the two given ranges. The bounds may be given in any order.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    /// The null envelope.
    pub const fn null() -> Self {
        Self {
            min_x: 0.0,
            max_x: -1.0,
            min_y: 0.0,
            max_y: -1.0,
        }
    }

    /// Envelope of a single point.
    pub fn from_coord(p: &Coordinate) -> Self {
        Self {
            min_x: p.x,
            max_x: p.x,
            min_y: p.y,
            max_y: p.y,
        }
    }

    /// Envelope of a segment.
    pub fn from_coords(p1: &Coordinate, p2: &Coordinate) -> Self {
        Self::new(p1.x, p2.x, p1.y, p2.y)
    }

    /// Envelope of all the points. Returns the null envelope for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut env = Self::null();
        for p in points {
            env.expand_to_include_coord(p);
        }
        env
    }

    /// Whether this is the null envelope.
    pub fn is_null(&self) -> bool {
        self.max_x < self.min_x
    }

    /// Minimum x value.
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Maximum x value.
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Minimum y value.
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Maximum y value.
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Width of the envelope, `0` for the null envelope.
    pub fn width(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        self.max_x - self.min_x
    }

    /// Height of the envelope, `0` for the null envelope.
    pub fn height(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        self.max_y - self.min_y
    }

    /// Area of the envelope.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The smaller of width and height.
    pub fn min_extent(&self) -> f64 {
        self.width().min(self.height())
    }

    /// The larger of width and height.
    pub fn max_extent(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Centre of the envelope, `None` for the null envelope.
    pub fn centre(&self) -> Option<Coordinate> {
        if self.is_null() {
            return None;
        }
        Some(Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ))
    }

    /// Enlarges the envelope to contain the point.
    pub fn expand_to_include_coord(&mut self, p: &Coordinate) {
        if self.is_null() {
            *self = Self::from_coord(p);
            return;
        }
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    /// Enlarges the envelope to contain the other envelope.
    pub fn expand_to_include(&mut self, other: &Envelope) {
        if other.is_null() {
            return;
        }
        if self.is_null() {
            *self = *other;
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Returns the smallest envelope containing both.
    pub fn merge(&self, other: &Envelope) -> Self {
        let mut merged = *self;
        merged.expand_to_include(other);
        merged
    }

    /// Returns the envelope grown by `distance` on every side.
    pub fn expanded_by(&self, distance: f64) -> Self {
        if self.is_null() {
            return *self;
        }
        let env = Self {
            min_x: self.min_x - distance,
            max_x: self.max_x + distance,
            min_y: self.min_y - distance,
            max_y: self.max_y + distance,
        };
        if env.min_x > env.max_x || env.min_y > env.max_y {
            return Self::null();
        }
        env
    }

    /// Whether the envelopes have at least one common point.
    pub fn intersects(&self, other: &Envelope) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    /// Whether the point lies in the envelope or on its boundary.
    pub fn intersects_coord(&self, p: &Coordinate) -> bool {
        self.contains_coord(p)
    }

    /// Whether the other envelope lies completely in this one (boundary included).
    pub fn contains(&self, other: &Envelope) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Whether the point lies in the envelope or on its boundary.
    pub fn contains_coord(&self, p: &Coordinate) -> bool {
        if self.is_null() {
            return false;
        }
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Common part of the envelopes, null if they do not intersect.
    pub fn intersection(&self, other: &Envelope) -> Self {
        if !self.intersects(other) {
            return Self::null();
        }
        Self {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Euclidean distance between the envelopes, `0` if they intersect.
    pub fn distance(&self, other: &Envelope) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }

        let dx = if self.max_x < other.min_x {
            other.min_x - self.max_x
        } else if self.min_x > other.max_x {
            self.min_x - other.max_x
        } else {
            0.0
        };
        let dy = if self.max_y < other.min_y {
            other.min_y - self.max_y
        } else if self.min_y > other.max_y {
            self.min_y - other.max_y
        } else {
            0.0
        };

        if dx == 0.0 {
            return dy;
        }
        if dy == 0.0 {
            return dx;
        }
        dx.hypot(dy)
    }

    /// Tests whether the point `q` lies in the envelope of the segment `p1`-`p2`.
    pub fn segment_contains(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> bool {
        q.x >= p1.x.min(p2.x) && q.x <= p1.x.max(p2.x) && q.y >= p1.y.min(p2.y) && q.y <= p1.y.max(p2.y)
    }

    /// Tests whether the envelopes of the segments `p1`-`p2` and `q1`-`q2` intersect.
    pub fn segments_intersect(
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> bool {
        let min_q = q1.x.min(q2.x);
        let max_q = q1.x.max(q2.x);
        let min_p = p1.x.min(p2.x);
        let max_p = p1.x.max(p2.x);
        if min_p > max_q || max_p < min_q {
            return false;
        }

        let min_q = q1.y.min(q2.y);
        let max_q = q1.y.max(q2.y);
        let min_p = p1.y.min(p2.y);
        let max_p = p1.y.max(p2.y);
        !(min_p > max_q || max_p < min_q)
    }

    /// Orders envelopes by `min_x`, `min_y`, `max_x`, `max_y`. Null envelopes sort first.
    pub fn compare(&self, other: &Envelope) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        self.min_x
            .total_cmp(&other.min_x)
            .then_with(|| self.min_y.total_cmp(&other.min_y))
            .then_with(|| self.max_x.total_cmp(&other.max_x))
            .then_with(|| self.max_y.total_cmp(&other.max_y))
    }
}

impl FromIterator<Envelope> for Envelope {
    fn from_iter<T: IntoIterator<Item = Envelope>>(iter: T) -> Self {
        let mut curr = Envelope::null();
        for env in iter {
            curr.expand_to_include(&env);
        }
        curr
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn null_envelope() {
        let env = Envelope::null();
        assert!(env.is_null());
        assert_eq!(env.width(), 0.0);
        assert!(!env.intersects(&Envelope::new(0.0, 1.0, 0.0, 1.0)));
        assert!(!env.contains_coord(&Coordinate::new(0.0, 0.0)));
        assert_eq!(env.centre(), None);
    }

    #[test]
    fn expand() {
        let mut env = Envelope::null();
        env.expand_to_include_coord(&Coordinate::new(1.0, 2.0));
        assert_eq!(env, Envelope::new(1.0, 1.0, 2.0, 2.0));
        env.expand_to_include(&Envelope::new(-1.0, 0.0, 5.0, 6.0));
        assert_eq!(env, Envelope::new(-1.0, 1.0, 2.0, 6.0));
        env.expand_to_include(&Envelope::null());
        assert_eq!(env, Envelope::new(-1.0, 1.0, 2.0, 6.0));
    }

    #[test]
    fn intersects_and_contains() {
        let a = Envelope::new(0.0, 10.0, 0.0, 10.0);
        let b = Envelope::new(10.0, 20.0, 5.0, 6.0);
        let c = Envelope::new(2.0, 3.0, 2.0, 3.0);
        assert!(a.intersects(&b));
        assert!(!a.contains(&b));
        assert!(a.contains(&c));
        assert!(a.contains(&a));
        assert_eq!(a.intersection(&b), Envelope::new(10.0, 10.0, 5.0, 6.0));
    }

    #[test]
    fn distance() {
        let a = Envelope::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(a.distance(&Envelope::new(3.0, 4.0, 0.0, 1.0)), 2.0);
        assert_abs_diff_eq!(
            a.distance(&Envelope::new(4.0, 5.0, 5.0, 6.0)),
            5.0,
            epsilon = 1e-12
        );
        assert_eq!(a.distance(&Envelope::new(0.5, 4.0, 0.5, 1.0)), 0.0);
    }

    #[test]
    fn compare_orders_by_min_corner() {
        let a = Envelope::new(0.0, 5.0, 1.0, 2.0);
        let b = Envelope::new(0.0, 1.0, 3.0, 4.0);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&a), Ordering::Equal);
    }
}
