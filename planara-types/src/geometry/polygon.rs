use serde::{Deserialize, Serialize};

use crate::geometry::LinearRing;
use crate::{Coordinate, Envelope};

/// Polygon with an outer boundary (shell) and zero or more holes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    shell: LinearRing,
    holes: Vec<LinearRing>,
}

impl Polygon {
    /// Creates a new polygon.
    pub fn new(shell: LinearRing, holes: Vec<LinearRing>) -> Self {
        Self { shell, holes }
    }

    /// Creates a polygon without holes from the points of the shell.
    pub fn from_coords(shell: Vec<Coordinate>) -> Self {
        Self::new(LinearRing::new(shell), vec![])
    }

    /// Outer boundary.
    pub fn exterior(&self) -> &LinearRing {
        &self.shell
    }

    /// Holes.
    pub fn interiors(&self) -> &[LinearRing] {
        &self.holes
    }

    /// Iterates over all rings: the shell first, then the holes.
    pub fn rings(&self) -> impl Iterator<Item = &LinearRing> {
        std::iter::once(&self.shell).chain(self.holes.iter())
    }

    pub(crate) fn rings_mut(&mut self) -> impl Iterator<Item = &mut LinearRing> {
        std::iter::once(&mut self.shell).chain(self.holes.iter_mut())
    }

    /// Number of holes.
    pub fn num_interior_rings(&self) -> usize {
        self.holes.len()
    }

    /// Number of points in all rings.
    pub fn num_points(&self) -> usize {
        self.rings().map(LinearRing::num_points).sum()
    }

    /// A polygon with an empty shell is empty.
    pub fn is_empty(&self) -> bool {
        self.shell.is_empty()
    }

    /// Bounding box of the shell.
    pub fn envelope(&self) -> Envelope {
        self.shell.envelope()
    }

    /// Area of the shell minus area of the holes.
    pub fn area(&self) -> f64 {
        self.shell.signed_area().abs()
            - self
                .holes
                .iter()
                .map(|h| h.signed_area().abs())
                .sum::<f64>()
    }

    /// Total length of all rings.
    pub fn length(&self) -> f64 {
        self.rings().map(LinearRing::length).sum()
    }

    /// Orients the shell clockwise and the holes counterclockwise, starts every ring at its
    /// minimum point and sorts the holes.
    pub fn normalize(&mut self) {
        self.shell.normalize(true);
        for hole in &mut self.holes {
            hole.normalize(false);
        }
        self.holes
            .sort_by(|a, b| super::compare_coords(a.coords(), b.coords()));
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn ring(v: &[(f64, f64)]) -> LinearRing {
        LinearRing::new(v.iter().map(|&(x, y)| Coordinate::new(x, y)).collect())
    }

    #[test]
    fn area_with_hole() {
        let polygon = Polygon::new(
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![ring(&[(2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0), (2.0, 2.0)])],
        );
        assert_abs_diff_eq!(polygon.area(), 96.0);
        assert_abs_diff_eq!(polygon.length(), 48.0);
        assert_eq!(polygon.num_points(), 10);
    }

    #[test]
    fn normalize_orients_rings() {
        let mut polygon = Polygon::new(
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![ring(&[(2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0), (2.0, 2.0)])],
        );
        polygon.normalize();
        assert!(!polygon.exterior().is_ccw());
        assert!(polygon.interiors()[0].is_ccw());
    }
}
