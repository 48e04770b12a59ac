use planara_types::{Location, Position};

use super::edge::Edge;
use super::edge_end::EdgeEnd;
use super::label::Label;
use super::{DirEdgeId, EdgeId, NodeId, RingId};

/// One of the two traversal directions of an edge.
///
/// Directed edges are allocated in pairs: the forward edge has an even id and the reverse one
/// the next odd id, so the opposite of any directed edge is `id ^ 1`.
#[derive(Debug, Clone)]
pub struct DirectedEdge {
    pub(crate) end: EdgeEnd,
    is_forward: bool,
    node: NodeId,
    pub(crate) next: Option<DirEdgeId>,
    pub(crate) next_min: Option<DirEdgeId>,
    pub(crate) edge_ring: Option<RingId>,
    pub(crate) min_edge_ring: Option<RingId>,
    pub(crate) in_result: bool,
    pub(crate) visited: bool,
}

/// Opposite directed edge.
pub fn sym(id: DirEdgeId) -> DirEdgeId {
    id ^ 1
}

impl DirectedEdge {
    /// Creates a directed edge starting at `node`. The label of the edge is flipped for the
    /// reverse direction.
    pub fn new(edge_id: EdgeId, edge: &Edge, is_forward: bool, node: NodeId) -> Self {
        let pts = edge.coords();
        let (p0, p1) = if is_forward {
            (pts[0], pts[1])
        } else {
            let n = pts.len() - 1;
            (pts[n], pts[n - 1])
        };

        let mut label = *edge.label();
        if !is_forward {
            label.flip();
        }

        Self {
            end: EdgeEnd::new(edge_id, p0, p1, label),
            is_forward,
            node,
            next: None,
            next_min: None,
            edge_ring: None,
            min_edge_ring: None,
            in_result: false,
            visited: false,
        }
    }

    /// Underlying edge.
    pub fn edge(&self) -> EdgeId {
        self.end.edge()
    }

    /// Start and direction of the edge.
    pub fn end(&self) -> &EdgeEnd {
        &self.end
    }

    /// Labelling of the directed edge.
    pub fn label(&self) -> &Label {
        &self.end.label
    }

    /// Whether the direction follows the points of the edge.
    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    /// Start node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Next directed edge of the result ring.
    pub fn next(&self) -> Option<DirEdgeId> {
        self.next
    }

    /// Maximal edge ring the edge belongs to.
    pub fn edge_ring(&self) -> Option<RingId> {
        self.edge_ring
    }

    /// Minimal edge ring the edge belongs to.
    pub fn min_edge_ring(&self) -> Option<RingId> {
        self.min_edge_ring
    }

    /// Whether the directed edge is a part of a result area boundary.
    pub fn is_in_result(&self) -> bool {
        self.in_result
    }

    /// Whether the directed edge was visited by a traversal.
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// A line edge is a line of at least one geometry and is not inside an area of either
    /// geometry.
    pub fn is_line_edge(&self) -> bool {
        let label = self.label();
        let is_line = label.is_line(0) || label.is_line(1);
        let is_exterior_if_area = |i| {
            !label.is_area_for(i) || label.all_positions_equal(i, Location::Exterior)
        };
        is_line && is_exterior_if_area(0) && is_exterior_if_area(1)
    }

    /// An interior area edge has the interior of both geometries on both sides. Such an edge is
    /// never part of a result boundary.
    pub fn is_interior_area_edge(&self) -> bool {
        let label = self.label();
        (0..2).all(|i| {
            label.is_area_for(i)
                && label.location_at(i, Position::Left) == Some(Location::Interior)
                && label.location_at(i, Position::Right) == Some(Location::Interior)
        })
    }
}

#[cfg(test)]
mod tests {
    use planara_types::Coordinate;

    use super::*;

    #[test]
    fn reverse_edge_flips_label() {
        let edge = Edge::new(
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 0.0),
                Coordinate::new(2.0, 1.0),
            ],
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        );
        let forward = DirectedEdge::new(0, &edge, true, 0);
        let reverse = DirectedEdge::new(0, &edge, false, 1);

        assert_eq!(forward.end().directed_coordinate(), Coordinate::new(1.0, 0.0));
        assert_eq!(reverse.end().coordinate(), Coordinate::new(2.0, 1.0));
        assert_eq!(reverse.end().directed_coordinate(), Coordinate::new(1.0, 0.0));
        assert_eq!(
            reverse.label().location_at(0, Position::Left),
            Some(Location::Interior)
        );
        assert!(!forward.is_line_edge());
        assert!(!forward.is_interior_area_edge());
        assert_eq!(sym(4), 5);
        assert_eq!(sym(5), 4);
    }

    #[test]
    fn line_edges() {
        let edge = Edge::new(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)],
            Label::line(0, Location::Interior),
        );
        let mut de = DirectedEdge::new(0, &edge, true, 0);
        assert!(de.is_line_edge());

        de.end.label.merge(&Label::area(
            1,
            Location::Interior,
            Location::Interior,
            Location::Interior,
        ));
        assert!(!de.is_line_edge());
    }
}
