use std::cmp::Ordering;

use planara_types::algorithm::locate_in_area;
use planara_types::{Coordinate, Geometry, Location, Orientation, Position};

use super::directed_edge::{sym, DirectedEdge};
use super::edge::Edge;
use super::label::Label;
use super::node::{Node, NodeMap};
use super::quadrant::Quadrant;
use super::{DirEdgeId, EdgeId, NodeId, RingId};
use crate::error::PlanaraError;

/// A planar graph of edges and nodes.
///
/// The graph owns all its components in arenas: edges, directed edges and nodes reference each
/// other by ids. Every edge is represented by two directed edges, see [`sym`]. The outgoing
/// directed edges of every node are kept ordered counterclockwise.
#[derive(Debug, Clone, Default)]
pub struct PlanarGraph {
    edges: Vec<Edge>,
    dir_edges: Vec<DirectedEdge>,
    nodes: NodeMap,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LinkState {
    ScanningForIncoming,
    LinkingToOutgoing,
}

impl PlanarGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node at the point if it does not exist yet.
    pub fn add_node(&mut self, coord: Coordinate) -> NodeId {
        self.nodes.add_node(coord)
    }

    /// Adds edges to the graph, creating both directed edges for every one of them and nodes at
    /// their endpoints.
    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            let edge_id = self.edges.len();
            let pts = edge.coords();
            let (Some(first), Some(last)) = (pts.first().copied(), pts.last().copied()) else {
                continue;
            };
            if pts.len() < 2 {
                continue;
            }

            let start = self.nodes.add_node(first);
            let end = self.nodes.add_node(last);
            let forward = DirectedEdge::new(edge_id, &edge, true, start);
            let reverse = DirectedEdge::new(edge_id, &edge, false, end);
            self.edges.push(edge);

            let forward_id = self.dir_edges.len();
            self.dir_edges.push(forward);
            self.dir_edges.push(reverse);
            self.insert_into_star(start, forward_id);
            self.insert_into_star(end, sym(forward_id));
        }
    }

    fn insert_into_star(&mut self, node: NodeId, de: DirEdgeId) {
        let end = &self.dir_edges[de].end;
        let position = self.nodes.get(node).star.partition_point(|other| {
            self.dir_edges[*other].end.compare_direction(end) != Ordering::Greater
        });
        self.nodes.get_mut(node).star.insert(position, de);
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge with the given id.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    /// All directed edges.
    pub fn dir_edges(&self) -> &[DirectedEdge] {
        &self.dir_edges
    }

    /// Directed edge with the given id.
    pub fn dir_edge(&self, id: DirEdgeId) -> &DirectedEdge {
        &self.dir_edges[id]
    }

    pub(crate) fn dir_edge_mut(&mut self, id: DirEdgeId) -> &mut DirectedEdge {
        &mut self.dir_edges[id]
    }

    /// Directed edge following the points of the edge.
    pub fn forward_dir_edge(edge: EdgeId) -> DirEdgeId {
        edge * 2
    }

    /// Nodes of the graph.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Node with the given id.
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id)
    }

    /// Finds an edge that starts or ends at `p0` and leaves it in the direction of `p1`.
    pub fn find_edge_in_same_direction(&self, p0: &Coordinate, p1: &Coordinate) -> Option<EdgeId> {
        let matches = |ep0: &Coordinate, ep1: &Coordinate| {
            p0.equals_2d(ep0)
                && Orientation::index(p0, p1, ep1) == Orientation::Collinear
                && Quadrant::of_segment(p0, p1) == Quadrant::of_segment(ep0, ep1)
        };

        self.edges.iter().position(|edge| {
            let pts = edge.coords();
            let n = pts.len();
            n >= 2 && (matches(&pts[0], &pts[1]) || matches(&pts[n - 1], &pts[n - 2]))
        })
    }

    /// Whether any edge incident to the node is in the result.
    pub fn is_incident_edge_in_result(&self, node: NodeId) -> bool {
        self.nodes
            .get(node)
            .star
            .iter()
            .any(|de| self.edges[self.dir_edges[*de].edge()].is_in_result())
    }

    /// Completes the labels of the directed edges around the node.
    ///
    /// Side locations are propagated around the star, and locations that are still unknown are
    /// found by locating the node in the input geometries. Returns the label of the node implied
    /// by its edges: interior for every geometry that has an edge through the node.
    pub(crate) fn compute_star_labelling(
        &mut self,
        node: NodeId,
        geometries: [&Geometry; 2],
    ) -> Result<Label, PlanaraError> {
        let coord = self.nodes.get(node).coordinate();
        let star = self.nodes.get(node).star.clone();

        for geom_index in 0..2 {
            self.propagate_side_labels(coord, &star, geom_index)?;
        }

        // An area collapsed to a line at the node means the node is not inside that area.
        let mut has_dimensional_collapse = [false; 2];
        for de in &star {
            let label = self.dir_edges[*de].label();
            for (i, collapse) in has_dimensional_collapse.iter_mut().enumerate() {
                if label.is_line(i) && label.location(i) == Some(Location::Boundary) {
                    *collapse = true;
                }
            }
        }

        let mut area_location: [Option<Location>; 2] = [None; 2];
        for de in &star {
            for i in 0..2 {
                if !self.dir_edges[*de].label().is_any_null(i) {
                    continue;
                }
                let location = if has_dimensional_collapse[i] {
                    Location::Exterior
                } else {
                    *area_location[i].get_or_insert_with(|| locate_in_area(&coord, geometries[i]))
                };
                self.dir_edges[*de]
                    .end
                    .label
                    .set_all_locations_if_null(i, location);
            }
        }

        let mut node_label = Label::default();
        for de in &star {
            let edge_label = self.edges[self.dir_edges[*de].edge()].label();
            for i in 0..2 {
                if matches!(
                    edge_label.location(i),
                    Some(Location::Interior | Location::Boundary)
                ) {
                    node_label.set_location(i, Location::Interior);
                }
            }
        }

        Ok(node_label)
    }

    fn propagate_side_labels(
        &mut self,
        coord: Coordinate,
        star: &[DirEdgeId],
        geom_index: usize,
    ) -> Result<(), PlanaraError> {
        let start = star
            .iter()
            .filter_map(|de| {
                let label = self.dir_edges[*de].label();
                if label.is_area_for(geom_index) {
                    label.location_at(geom_index, Position::Left)
                } else {
                    None
                }
            })
            .last();
        let Some(mut current) = start else {
            return Ok(());
        };

        for de in star {
            // Components without a location take the location of the sector they lie in.
            let label = &mut self.dir_edges[*de].end.label;
            if label.location(geom_index).is_none() {
                label.set_location(geom_index, current);
            }
            if !label.is_area_for(geom_index) {
                continue;
            }

            let left = label.location_at(geom_index, Position::Left);
            match label.location_at(geom_index, Position::Right) {
                Some(right) => {
                    if right != current {
                        return Err(PlanaraError::topology(
                            "side location conflict",
                            Some(coord),
                        ));
                    }
                    current = left.ok_or_else(|| {
                        PlanaraError::topology("found single null side", Some(coord))
                    })?;
                }
                None => {
                    if left.is_some() {
                        return Err(PlanaraError::topology(
                            "found single null side",
                            Some(coord),
                        ));
                    }
                    label.set_location_at(geom_index, Position::Right, current);
                    label.set_location_at(geom_index, Position::Left, current);
                }
            }
        }

        Ok(())
    }

    /// Fills unknown locations of the directed edges around the node from their opposite edges.
    pub(crate) fn merge_sym_labels(&mut self, node: NodeId) {
        for i in 0..self.nodes.get(node).star.len() {
            let de = self.nodes.get(node).star[i];
            let sym_label = *self.dir_edges[sym(de)].label();
            self.dir_edges[de].end.label.merge(&sym_label);
        }
    }

    /// Fills unknown locations of the directed edges around the node from the node label.
    pub(crate) fn update_star_labelling(&mut self, node: NodeId) {
        let node_label = *self.nodes.get(node).label();
        for i in 0..self.nodes.get(node).star.len() {
            let de = self.nodes.get(node).star[i];
            let label = &mut self.dir_edges[de].end.label;
            for geom_index in 0..2 {
                if let Some(location) = node_label.location(geom_index) {
                    label.set_all_locations_if_null(geom_index, location);
                }
            }
        }
    }

    fn result_area_edges(&self, node: NodeId) -> Vec<DirEdgeId> {
        self.nodes
            .get(node)
            .star
            .iter()
            .copied()
            .filter(|de| self.dir_edges[*de].in_result || self.dir_edges[sym(*de)].in_result)
            .collect()
    }

    /// Links every incoming result directed edge to the next outgoing result edge around its
    /// end node, forming the maximal result rings.
    pub fn link_result_directed_edges(&mut self) -> Result<(), PlanaraError> {
        for node in self.nodes.ids() {
            self.link_result_star(node)?;
        }
        Ok(())
    }

    fn link_result_star(&mut self, node: NodeId) -> Result<(), PlanaraError> {
        let mut first_out = None;
        let mut incoming = None;
        let mut state = LinkState::ScanningForIncoming;

        for next_out in self.result_area_edges(node) {
            let next_in = sym(next_out);
            if !self.dir_edges[next_out].label().is_area() {
                continue;
            }
            if first_out.is_none() && self.dir_edges[next_out].in_result {
                first_out = Some(next_out);
            }

            match state {
                LinkState::ScanningForIncoming => {
                    if self.dir_edges[next_in].in_result {
                        incoming = Some(next_in);
                        state = LinkState::LinkingToOutgoing;
                    }
                }
                LinkState::LinkingToOutgoing => {
                    if self.dir_edges[next_out].in_result {
                        if let Some(incoming) = incoming {
                            self.dir_edges[incoming].next = Some(next_out);
                        }
                        state = LinkState::ScanningForIncoming;
                    }
                }
            }
        }

        if state == LinkState::LinkingToOutgoing {
            let coord = self.nodes.get(node).coordinate();
            let first_out = first_out.ok_or_else(|| {
                PlanaraError::topology("no outgoing directed edge found", Some(coord))
            })?;
            if let Some(incoming) = incoming {
                self.dir_edges[incoming].next = Some(first_out);
            }
        }

        Ok(())
    }

    /// Links the directed edges of the maximal ring around the node into minimal rings, taking
    /// the first outgoing edge of the ring clockwise from every incoming edge.
    pub(crate) fn link_minimal_directed_edges(
        &mut self,
        node: NodeId,
        ring: RingId,
    ) -> Result<(), PlanaraError> {
        let mut first_out = None;
        let mut incoming = None;
        let mut state = LinkState::ScanningForIncoming;

        for next_out in self.result_area_edges(node).into_iter().rev() {
            let next_in = sym(next_out);
            if first_out.is_none() && self.dir_edges[next_out].edge_ring == Some(ring) {
                first_out = Some(next_out);
            }

            match state {
                LinkState::ScanningForIncoming => {
                    if self.dir_edges[next_in].edge_ring == Some(ring) {
                        incoming = Some(next_in);
                        state = LinkState::LinkingToOutgoing;
                    }
                }
                LinkState::LinkingToOutgoing => {
                    if self.dir_edges[next_out].edge_ring == Some(ring) {
                        if let Some(incoming) = incoming {
                            self.dir_edges[incoming].next_min = Some(next_out);
                        }
                        state = LinkState::ScanningForIncoming;
                    }
                }
            }
        }

        if state == LinkState::LinkingToOutgoing {
            let (Some(first_out), Some(incoming)) = (first_out, incoming) else {
                return Err(PlanaraError::Assertion(
                    "found no first outgoing directed edge of a ring".into(),
                ));
            };
            self.dir_edges[incoming].next_min = Some(first_out);
        }

        Ok(())
    }

    /// Number of outgoing directed edges of the node belonging to the maximal ring.
    pub(crate) fn outgoing_degree(&self, node: NodeId, ring: RingId) -> usize {
        self.nodes
            .get(node)
            .star
            .iter()
            .filter(|de| self.dir_edges[**de].edge_ring == Some(ring))
            .count()
    }

    /// Marks the line edges around the node that lie inside a result area as covered.
    ///
    /// Result area edges split the space around the node into interior and exterior sectors,
    /// so the location of every line edge follows from the result edges preceding it.
    pub(crate) fn find_covered_line_edges(&mut self, node: NodeId) {
        let star = self.nodes.get(node).star.clone();

        let mut start = None;
        for de in &star {
            let next_out = &self.dir_edges[*de];
            let next_in = &self.dir_edges[sym(*de)];
            if !next_out.is_line_edge() {
                if next_out.in_result {
                    start = Some(Location::Interior);
                    break;
                }
                if next_in.in_result {
                    start = Some(Location::Exterior);
                    break;
                }
            }
        }
        let Some(mut current) = start else {
            return;
        };

        for de in &star {
            let next_out = &self.dir_edges[*de];
            if next_out.is_line_edge() {
                let edge = next_out.edge();
                self.edges[edge].set_covered(current == Location::Interior);
            } else {
                if next_out.in_result {
                    current = Location::Exterior;
                }
                if self.dir_edges[sym(*de)].in_result {
                    current = Location::Interior;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use planara_types::Location;

    use super::*;

    fn edge(coords: &[(f64, f64)]) -> Edge {
        Edge::new(
            coords.iter().map(|c| Coordinate::from(*c)).collect(),
            Label::line(0, Location::Interior),
        )
    }

    #[test]
    fn stars_are_sorted() {
        let mut graph = PlanarGraph::new();
        graph.add_edges([
            edge(&[(0.0, 0.0), (0.0, -1.0)]),
            edge(&[(0.0, 0.0), (1.0, 1.0)]),
            edge(&[(-1.0, 0.0), (0.0, 0.0)]),
            edge(&[(0.0, 0.0), (1.0, 0.0)]),
        ]);
        assert_eq!(graph.edges().len(), 4);
        assert_eq!(graph.dir_edges().len(), 8);
        assert_eq!(graph.nodes().len(), 5);

        let center = graph
            .nodes()
            .find(&Coordinate::new(0.0, 0.0))
            .expect("center node");
        let directions: Vec<_> = graph
            .node(center)
            .star()
            .iter()
            .map(|de| graph.dir_edge(*de).end().directed_coordinate())
            .collect();
        assert_eq!(
            directions,
            vec![
                Coordinate::new(1.0, 0.0),
                Coordinate::new(1.0, 1.0),
                Coordinate::new(-1.0, 0.0),
                Coordinate::new(0.0, -1.0),
            ]
        );

        for (id, de) in graph.dir_edges().iter().enumerate() {
            let opposite = graph.dir_edge(sym(id));
            assert_eq!(de.edge(), opposite.edge());
            assert_ne!(de.node(), opposite.node());
            assert_ne!(de.is_forward(), opposite.is_forward());
        }
    }

    #[test]
    fn find_edge_by_direction() {
        let mut graph = PlanarGraph::new();
        graph.add_edges([
            edge(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)]),
            edge(&[(5.0, 5.0), (3.0, 3.0)]),
        ]);
        let p = |x, y| Coordinate::new(x, y);
        assert_eq!(graph.find_edge_in_same_direction(&p(0.0, 0.0), &p(1.0, 0.0)), Some(0));
        assert_eq!(graph.find_edge_in_same_direction(&p(2.0, 2.0), &p(2.0, 1.0)), Some(0));
        assert_eq!(graph.find_edge_in_same_direction(&p(3.0, 3.0), &p(4.0, 4.0)), Some(1));
        assert_eq!(graph.find_edge_in_same_direction(&p(0.0, 0.0), &p(-1.0, 0.0)), None);
        assert_eq!(PlanarGraph::forward_dir_edge(1), 2);
    }
}
