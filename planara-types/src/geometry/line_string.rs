use serde::{Deserialize, Serialize};

use crate::algorithm::ring;
use crate::error::TypesError;
use crate::{Coordinate, Envelope};

/// A sequence of connected straight segments.
///
/// A non-empty line string has at least two points. The constructor does not check this, so that
/// invalid input can be represented and reported by the validity checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    coords: Vec<Coordinate>,
}

impl LineString {
    /// Creates a new line string without validating the number of points.
    pub fn new(coords: Vec<Coordinate>) -> Self {
        Self { coords }
    }

    /// Creates a new line string, checking that it has either zero or at least two points.
    pub fn try_new(coords: Vec<Coordinate>) -> Result<Self, TypesError> {
        if coords.len() == 1 {
            return Err(TypesError::TooFewPoints {
                kind: "line string",
                count: 1,
            });
        }
        Ok(Self { coords })
    }

    /// Points of the line.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Mutable access to the points of the line.
    pub fn coords_mut(&mut self) -> &mut [Coordinate] {
        &mut self.coords
    }

    /// Consumes the line and returns its points.
    pub fn into_coords(self) -> Vec<Coordinate> {
        self.coords
    }

    /// Number of points.
    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    /// Whether the line has no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// First point of the line.
    pub fn start_point(&self) -> Option<&Coordinate> {
        self.coords.first()
    }

    /// Last point of the line.
    pub fn end_point(&self) -> Option<&Coordinate> {
        self.coords.last()
    }

    /// A non-empty line whose first and last points are equal.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => false,
        }
    }

    /// Bounding box of the line.
    pub fn envelope(&self) -> Envelope {
        Envelope::from_points(&self.coords)
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        ring::length(&self.coords)
    }

    /// Reverses the direction of the line.
    pub fn reverse(&mut self) {
        self.coords.reverse();
    }

    /// Orients the line so that its first point is not greater than its last one.
    pub fn normalize(&mut self) {
        let n = self.coords.len();
        for i in 0..n / 2 {
            let j = n - 1 - i;
            if !self.coords[i].equals_2d(&self.coords[j]) {
                if self.coords[i] > self.coords[j] {
                    self.coords.reverse();
                }
                return;
            }
        }
    }
}

impl From<LinearRing> for LineString {
    fn from(value: LinearRing) -> Self {
        Self::new(value.into_coords())
    }
}

/// A closed line string used as a boundary of a polygon.
///
/// As with [`LineString`], closure and number of points are only checked by
/// [`LinearRing::try_new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRing {
    coords: Vec<Coordinate>,
}

impl LinearRing {
    /// Minimum number of points of a valid non-empty ring.
    pub const MINIMUM_VALID_SIZE: usize = 4;

    /// Creates a ring without validation.
    pub fn new(coords: Vec<Coordinate>) -> Self {
        Self { coords }
    }

    /// Creates a ring, checking that it is either empty or closed with at least 4 points.
    pub fn try_new(coords: Vec<Coordinate>) -> Result<Self, TypesError> {
        if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
            if !first.equals_2d(last) {
                return Err(TypesError::RingNotClosed(*first));
            }
            if coords.len() < Self::MINIMUM_VALID_SIZE {
                return Err(TypesError::TooFewPoints {
                    kind: "linear ring",
                    count: coords.len(),
                });
            }
        }
        Ok(Self { coords })
    }

    /// Points of the ring.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Mutable access to the points of the ring.
    pub fn coords_mut(&mut self) -> &mut [Coordinate] {
        &mut self.coords
    }

    /// Consumes the ring and returns its points.
    pub fn into_coords(self) -> Vec<Coordinate> {
        self.coords
    }

    /// Number of points, including the closing one.
    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    /// Whether the ring has no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Whether the first and last points are equal. Empty rings are considered closed.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => true,
        }
    }

    /// Bounding box of the ring.
    pub fn envelope(&self) -> Envelope {
        Envelope::from_points(&self.coords)
    }

    /// Perimeter of the ring.
    pub fn length(&self) -> f64 {
        ring::length(&self.coords)
    }

    /// Signed area, positive for counterclockwise rings.
    pub fn signed_area(&self) -> f64 {
        ring::signed_area(&self.coords)
    }

    /// Whether the ring is oriented counterclockwise.
    pub fn is_ccw(&self) -> bool {
        ring::is_ccw(&self.coords)
    }

    /// Reverses the direction of the ring.
    pub fn reverse(&mut self) {
        self.coords.reverse();
    }

    /// Rotates the ring to start at its minimum coordinate and orients it clockwise or
    /// counterclockwise.
    pub fn normalize(&mut self, clockwise: bool) {
        if self.coords.len() < 2 {
            return;
        }
        if let Some(min_index) = ring::min_coordinate_index(&self.coords[..self.coords.len() - 1])
        {
            ring::scroll_ring(&mut self.coords, min_index);
        }
        if self.is_ccw() == clockwise {
            self.coords.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn coords(v: &[(f64, f64)]) -> Vec<Coordinate> {
        v.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn ring_validation() {
        assert_matches!(
            LinearRing::try_new(coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])),
            Err(TypesError::RingNotClosed(_))
        );
        assert_matches!(
            LinearRing::try_new(coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)])),
            Err(TypesError::TooFewPoints { count: 3, .. })
        );
        assert!(LinearRing::try_new(vec![]).is_ok());
        assert_matches!(
            LineString::try_new(coords(&[(0.0, 0.0)])),
            Err(TypesError::TooFewPoints { count: 1, .. })
        );
    }

    #[test]
    fn normalize_line() {
        let mut line = LineString::new(coords(&[(5.0, 5.0), (1.0, 1.0), (0.0, 0.0)]));
        line.normalize();
        assert_eq!(line.coords()[0], Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn normalize_ring() {
        let mut ring = LinearRing::new(coords(&[
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
        ]));
        ring.normalize(true);
        assert_eq!(
            ring.coords(),
            coords(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])
        );
        assert!(!ring.is_ccw());
    }
}
