use planara_types::algorithm::ring::{is_ccw, is_in_ring, point_not_in_list};
use planara_types::{Coordinate, Envelope, GeometryFactory, LinearRing, Polygon, Position};

use super::label::Label;
use super::planar_graph::PlanarGraph;
use super::{DirEdgeId, RingId};
use crate::error::PlanaraError;

/// How the directed edges of a ring are linked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RingKind {
    /// Follows `next` links of the directed edges. A maximal ring may touch itself at nodes.
    Maximal,
    /// Follows `next_min` links. A minimal ring never self-touches.
    Minimal,
}

/// A ring of directed edges forming the boundary of a result area.
#[derive(Debug, Clone)]
pub struct EdgeRing {
    kind: RingKind,
    start: DirEdgeId,
    dir_edges: Vec<DirEdgeId>,
    pts: Vec<Coordinate>,
    label: Label,
    is_hole: bool,
    envelope: Envelope,
    shell: Option<RingId>,
    holes: Vec<RingId>,
}

impl EdgeRing {
    /// Linking kind of the ring.
    pub fn kind(&self) -> RingKind {
        self.kind
    }

    /// Directed edge the ring was built from.
    pub fn start(&self) -> DirEdgeId {
        self.start
    }

    /// Directed edges of the ring in traversal order.
    pub fn dir_edges(&self) -> &[DirEdgeId] {
        &self.dir_edges
    }

    /// Points of the ring. The ring is closed.
    pub fn coords(&self) -> &[Coordinate] {
        &self.pts
    }

    /// Locations of the area to the right of the ring.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// A hole is a counterclockwise ring: the area of the result is outside of it.
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Whether the ring is a shell.
    pub fn is_shell(&self) -> bool {
        !self.is_hole
    }

    /// Bounding box of the ring.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Shell the hole is assigned to.
    pub fn shell(&self) -> Option<RingId> {
        self.shell
    }

    /// Holes assigned to the shell.
    pub fn holes(&self) -> &[RingId] {
        &self.holes
    }

    /// The ring as a linear ring geometry.
    pub fn linear_ring(&self) -> LinearRing {
        LinearRing::new(self.pts.clone())
    }

    fn add_points(&mut self, pts: &[Coordinate], is_forward: bool, is_first_edge: bool) {
        let skip = usize::from(!is_first_edge);
        if is_forward {
            self.pts.extend(pts.iter().skip(skip));
        } else {
            self.pts.extend(pts.iter().rev().skip(skip));
        }
    }

    fn merge_label(&mut self, de_label: &Label) {
        for geom_index in 0..2 {
            let Some(location) = de_label.location_at(geom_index, Position::Right) else {
                continue;
            };
            if self.label.location(geom_index).is_none() {
                self.label.set_location(geom_index, location);
            }
        }
    }
}

/// Arena of the edge rings built over a planar graph.
///
/// Directed edges of the graph refer to rings by their index in the arena.
#[derive(Debug, Clone, Default)]
pub struct EdgeRings {
    rings: Vec<EdgeRing>,
}

impl EdgeRings {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring with the given id.
    pub fn get(&self, id: RingId) -> &EdgeRing {
        &self.rings[id]
    }

    /// Number of rings built.
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// Whether no ring was built.
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Builds a ring by following the links of the directed edges starting from `start`, and
    /// assigns the ring to all of them.
    pub fn build(
        &mut self,
        graph: &mut PlanarGraph,
        start: DirEdgeId,
        kind: RingKind,
    ) -> Result<RingId, PlanaraError> {
        let id = self.rings.len();
        let mut ring = EdgeRing {
            kind,
            start,
            dir_edges: vec![],
            pts: vec![],
            label: Label::default(),
            is_hole: false,
            envelope: Envelope::null(),
            shell: None,
            holes: vec![],
        };

        let mut current = start;
        let mut is_first_edge = true;
        loop {
            let de = graph.dir_edge(current);
            let assigned = match kind {
                RingKind::Maximal => de.edge_ring(),
                RingKind::Minimal => de.min_edge_ring(),
            };
            if assigned == Some(id) {
                return Err(PlanaraError::topology(
                    "directed edge visited twice during ring-building",
                    Some(de.end().coordinate()),
                ));
            }
            if !de.label().is_area() {
                return Err(PlanaraError::Assertion(
                    "edge ring contains a non-area edge".into(),
                ));
            }

            ring.dir_edges.push(current);
            ring.merge_label(de.label());
            let is_forward = de.is_forward();
            ring.add_points(graph.edge(de.edge()).coords(), is_forward, is_first_edge);
            is_first_edge = false;

            let next = match kind {
                RingKind::Maximal => de.next(),
                RingKind::Minimal => graph.dir_edge(current).next_min,
            };
            let de = graph.dir_edge_mut(current);
            match kind {
                RingKind::Maximal => de.edge_ring = Some(id),
                RingKind::Minimal => de.min_edge_ring = Some(id),
            }

            let Some(next) = next else {
                return Err(PlanaraError::topology(
                    "found null directed edge",
                    Some(de.end().coordinate()),
                ));
            };
            if next == start {
                break;
            }
            current = next;
        }

        ring.is_hole = is_ccw(&ring.pts);
        ring.envelope = Envelope::from_points(&ring.pts);
        self.rings.push(ring);
        Ok(id)
    }

    /// Largest number of ring edges incident to a node of the ring. A value greater than two
    /// means that the ring touches itself.
    pub fn max_node_degree(&self, graph: &PlanarGraph, id: RingId) -> usize {
        self.rings[id]
            .dir_edges
            .iter()
            .map(|de| graph.outgoing_degree(graph.dir_edge(*de).node(), id))
            .max()
            .unwrap_or(0)
            * 2
    }

    /// Links the directed edges around every node of the maximal ring into minimal rings.
    pub fn link_directed_edges_for_minimal_rings(
        &self,
        graph: &mut PlanarGraph,
        id: RingId,
    ) -> Result<(), PlanaraError> {
        for de in &self.rings[id].dir_edges {
            let node = graph.dir_edge(*de).node();
            graph.link_minimal_directed_edges(node, id)?;
        }
        Ok(())
    }

    /// Builds the minimal rings the maximal ring consists of. Minimal links must be computed
    /// first.
    pub fn build_minimal_rings(
        &mut self,
        graph: &mut PlanarGraph,
        id: RingId,
    ) -> Result<Vec<RingId>, PlanaraError> {
        let dir_edges = self.rings[id].dir_edges.clone();
        let mut minimal = vec![];
        for de in dir_edges {
            if graph.dir_edge(de).min_edge_ring().is_none() {
                minimal.push(self.build(graph, de, RingKind::Minimal)?);
            }
        }
        Ok(minimal)
    }

    /// Marks the edges of the ring as belonging to the result.
    pub fn set_in_result(&self, graph: &mut PlanarGraph, id: RingId) {
        for de in &self.rings[id].dir_edges {
            let edge = graph.dir_edge(*de).edge();
            graph.edge_mut(edge).set_in_result(true);
        }
    }

    /// Assigns the ring to the shell. A hole is added to the holes of the shell.
    pub fn set_shell(&mut self, id: RingId, shell: RingId) {
        self.rings[id].shell = Some(shell);
        if id != shell {
            self.rings[shell].holes.push(id);
        }
    }

    /// Whether the point is inside the area bounded by the shell and its holes.
    pub fn contains_point(&self, shell: RingId, p: &Coordinate) -> bool {
        let ring = &self.rings[shell];
        if !ring.envelope.contains_coord(p) || !is_in_ring(p, &ring.pts) {
            return false;
        }
        !ring
            .holes
            .iter()
            .any(|hole| is_in_ring(p, &self.rings[*hole].pts))
    }

    /// Finds the innermost of the shells that contains the ring.
    pub fn find_containing_shell(&self, ring: RingId, shells: &[RingId]) -> Option<RingId> {
        let test = &self.rings[ring];
        let mut min_shell: Option<RingId> = None;
        for shell_id in shells {
            let shell = &self.rings[*shell_id];
            if !shell.envelope.contains(&test.envelope) {
                continue;
            }
            let test_pt = point_not_in_list(&test.pts, &shell.pts).unwrap_or(test.pts[0]);
            if !is_in_ring(&test_pt, &shell.pts) {
                continue;
            }
            let is_smaller = min_shell
                .map_or(true, |min| self.rings[min].envelope.contains(&shell.envelope));
            if is_smaller {
                min_shell = Some(*shell_id);
            }
        }
        min_shell
    }

    /// Polygon with the shell and all holes assigned to it.
    pub fn to_polygon(&self, shell: RingId, factory: &GeometryFactory) -> Polygon {
        let ring = &self.rings[shell];
        factory.create_polygon(
            ring.linear_ring(),
            ring.holes
                .iter()
                .map(|hole| self.rings[*hole].linear_ring())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use planara_types::Location;

    use super::*;
    use crate::geomgraph::edge::Edge;

    fn square_graph(coords: &[(f64, f64)]) -> PlanarGraph {
        let mut graph = PlanarGraph::new();
        graph.add_edges([Edge::new(
            coords.iter().map(|c| Coordinate::from(*c)).collect(),
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        )]);
        graph
    }

    #[test]
    fn ring_of_single_edge() {
        // Clockwise ring with the interior on the right.
        let mut graph = square_graph(&[
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]);
        graph.dir_edge_mut(0).in_result = true;
        graph.link_result_directed_edges().expect("linking");
        assert_eq!(graph.dir_edge(0).next(), Some(0));

        let mut rings = EdgeRings::new();
        let id = rings.build(&mut graph, 0, RingKind::Maximal).expect("ring");
        let ring = rings.get(id);
        assert!(ring.is_shell());
        assert_eq!(ring.coords().len(), 5);
        assert_eq!(ring.label().location(0), Some(Location::Interior));
        assert_eq!(rings.max_node_degree(&graph, id), 2);
        assert_eq!(graph.dir_edge(0).edge_ring(), Some(id));

        rings.set_in_result(&mut graph, id);
        assert!(graph.edge(0).is_in_result());
        assert!(rings.contains_point(id, &Coordinate::new(0.5, 0.5)));
        assert!(!rings.contains_point(id, &Coordinate::new(1.5, 0.5)));

        let polygon = rings.to_polygon(id, &GeometryFactory::default());
        assert!(polygon.interiors().is_empty());
        assert_eq!(polygon.exterior().coords().len(), 5);
    }

    #[test]
    fn unlinked_edge_is_an_error() {
        let mut graph = square_graph(&[
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]);
        let mut rings = EdgeRings::new();
        assert!(rings.build(&mut graph, 0, RingKind::Maximal).is_err());
    }
}
