use std::cmp::Ordering;

use planara_types::{Coordinate, Orientation};

use super::label::Label;
use super::quadrant::Quadrant;
use super::EdgeId;

/// The start of an edge at a node, pointing along the edge.
///
/// Edge ends around a node are ordered counterclockwise by their direction, starting from the
/// positive x axis.
#[derive(Debug, Clone)]
pub struct EdgeEnd {
    edge: EdgeId,
    p0: Coordinate,
    p1: Coordinate,
    dx: f64,
    dy: f64,
    quadrant: Quadrant,
    pub(crate) label: Label,
}

impl EdgeEnd {
    /// Creates an end of the edge at `p0`, pointing to `p1`.
    pub fn new(edge: EdgeId, p0: Coordinate, p1: Coordinate, label: Label) -> Self {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        Self {
            edge,
            p0,
            p1,
            dx,
            dy,
            quadrant: Quadrant::of(dx, dy),
            label,
        }
    }

    /// Edge the end belongs to.
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Node point of the end.
    pub fn coordinate(&self) -> Coordinate {
        self.p0
    }

    /// Next point along the edge.
    pub fn directed_coordinate(&self) -> Coordinate {
        self.p1
    }

    /// Quadrant of the direction.
    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    /// Labelling of the end.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Compares the directions of two ends starting at the same point.
    ///
    /// Quadrants are compared first, so the comparison is exact; ends in the same quadrant are
    /// ordered with the orientation predicate.
    pub fn compare_direction(&self, other: &EdgeEnd) -> Ordering {
        if self.dx == other.dx && self.dy == other.dy {
            return Ordering::Equal;
        }

        self.quadrant.cmp(&other.quadrant).then_with(|| {
            match Orientation::index(&other.p0, &other.p1, &self.p1) {
                Orientation::Counterclockwise => Ordering::Greater,
                Orientation::Clockwise => Ordering::Less,
                Orientation::Collinear => Ordering::Equal,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(x: f64, y: f64) -> EdgeEnd {
        EdgeEnd::new(0, Coordinate::new(0.0, 0.0), Coordinate::new(x, y), Label::default())
    }

    #[test]
    fn ends_sort_counterclockwise() {
        let mut ends = vec![
            end(1.0, -1.0),
            end(-1.0, 0.5),
            end(1.0, 2.0),
            end(2.0, 1.0),
            end(-1.0, -1.0),
        ];
        ends.sort_by(EdgeEnd::compare_direction);

        let order: Vec<_> = ends.iter().map(|e| e.directed_coordinate()).collect();
        assert_eq!(
            order,
            vec![
                Coordinate::new(2.0, 1.0),
                Coordinate::new(1.0, 2.0),
                Coordinate::new(-1.0, 0.5),
                Coordinate::new(-1.0, -1.0),
                Coordinate::new(1.0, -1.0),
            ]
        );
        assert_eq!(end(1.0, 1.0).compare_direction(&end(2.0, 2.0)), Ordering::Equal);
    }
}
