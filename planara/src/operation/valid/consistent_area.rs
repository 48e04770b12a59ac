use std::cmp::Ordering;
use std::collections::BTreeMap;

use planara_types::algorithm::LineIntersector;
use planara_types::{Coordinate, Location, Position};

use crate::error::PlanaraError;
use crate::geomgraph::geometry_graph::determine_boundary;
use crate::geomgraph::{Edge, EdgeEnd, EdgeId, EdgeIntersection, GeometryGraph, TopologyLocation};

/// Checks that the rings of an area geometry form a consistent topology.
///
/// The rings must not cross each other, and around every node the sides of the ring edges must
/// alternate between interior and exterior. Rings touching at points are accepted; identical
/// ring edges are reported separately as duplicates.
#[derive(Debug)]
pub struct ConsistentAreaTester<'a, 'g> {
    graph: &'g mut GeometryGraph<'a>,
    nodes: BTreeMap<Coordinate, Vec<EdgeEndBundle>>,
    invalid_point: Option<Coordinate>,
}

/// Edge ends leaving a node in the same direction.
#[derive(Debug)]
struct EdgeEndBundle {
    ends: Vec<EdgeEnd>,
    label: TopologyLocation,
}

impl EdgeEndBundle {
    fn new(end: EdgeEnd) -> Self {
        Self {
            ends: vec![end],
            label: TopologyLocation::default(),
        }
    }

    fn first(&self) -> &EdgeEnd {
        &self.ends[0]
    }

    fn compute_label(&mut self, geom_index: usize) {
        let is_area = self.ends.iter().any(|e| e.label().is_area_for(geom_index));
        let mut label = if is_area {
            TopologyLocation::area(None, None, None)
        } else {
            TopologyLocation::line(None)
        };

        let locations = || self.ends.iter().map(|e| e.label().location(geom_index));
        let boundary_count = locations()
            .filter(|loc| *loc == Some(Location::Boundary))
            .count();
        let mut on = locations()
            .any(|loc| loc == Some(Location::Interior))
            .then_some(Location::Interior);
        if boundary_count > 0 {
            on = Some(determine_boundary(boundary_count));
        }
        label.set(Position::On, on);

        if is_area {
            for side in [Position::Left, Position::Right] {
                label.set(side, self.side_location(geom_index, side));
            }
        }
        self.label = label;
    }

    fn side_location(&self, geom_index: usize, side: Position) -> Option<Location> {
        let mut location = None;
        for end in self.ends.iter().filter(|e| e.label().is_area_for(geom_index)) {
            match end.label().location_at(geom_index, side) {
                Some(Location::Interior) => return Some(Location::Interior),
                Some(Location::Exterior) => location = Some(Location::Exterior),
                _ => {}
            }
        }
        location
    }
}

impl<'a, 'g> ConsistentAreaTester<'a, 'g> {
    /// Creates a tester for the graph of an area geometry.
    pub fn new(graph: &'g mut GeometryGraph<'a>) -> Self {
        Self {
            graph,
            nodes: BTreeMap::new(),
            invalid_point: None,
        }
    }

    /// Point where the last check failed.
    pub fn invalid_point(&self) -> Option<Coordinate> {
        self.invalid_point
    }

    /// Nodes the graph and checks that the rings do not cross and that the area labels around
    /// every node are consistent.
    pub fn is_node_consistent_area(&mut self) -> Result<bool, PlanaraError> {
        let si = self
            .graph
            .compute_self_nodes(LineIntersector::new(), true, true)?;
        if let Some(pt) = si.proper_intersection_point() {
            self.invalid_point = Some(pt);
            return Ok(false);
        }

        self.build_node_graph();
        for (coord, bundles) in &mut self.nodes {
            for bundle in bundles.iter_mut() {
                bundle.compute_label(0);
            }
            if !is_area_labels_consistent(bundles)? {
                self.invalid_point = Some(*coord);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether two rings share an edge. Must be called after
    /// [`is_node_consistent_area`](Self::is_node_consistent_area) returned `true`.
    pub fn has_duplicate_rings(&mut self) -> bool {
        for bundles in self.nodes.values() {
            if let Some(bundle) = bundles.iter().find(|b| b.ends.len() > 1) {
                let edge = bundle.first().edge();
                self.invalid_point = Some(self.graph.edges()[edge].coordinate(0));
                return true;
            }
        }
        false
    }

    fn build_node_graph(&mut self) {
        self.nodes.clear();
        for node in self.graph.nodes().iter() {
            self.nodes.entry(node.coordinate()).or_default();
        }

        let mut ends = vec![];
        for (id, edge) in self.graph.edges_mut().iter_mut().enumerate() {
            compute_edge_ends(id, edge, &mut ends);
        }
        for end in ends {
            let bundles = self.nodes.entry(end.coordinate()).or_default();
            insert_into_star(bundles, end);
        }
    }
}

/// Adds the end to the bundle with the same direction, keeping bundles ordered counterclockwise.
fn insert_into_star(bundles: &mut Vec<EdgeEndBundle>, end: EdgeEnd) {
    let position = bundles.partition_point(|b| b.first().compare_direction(&end) == Ordering::Less);
    match bundles.get_mut(position) {
        Some(bundle) if bundle.first().compare_direction(&end) == Ordering::Equal => {
            bundle.ends.push(end);
        }
        _ => bundles.insert(position, EdgeEndBundle::new(end)),
    }
}

/// Walking around the node, the location to the right of every edge must be the location to
/// the left of the previous one.
fn is_area_labels_consistent(bundles: &[EdgeEndBundle]) -> Result<bool, PlanaraError> {
    let Some(last) = bundles.last() else {
        return Ok(true);
    };
    let mut current = last
        .label
        .get(Position::Left)
        .ok_or_else(|| PlanaraError::Assertion("found unlabelled area edge".into()))?;

    for bundle in bundles {
        if !bundle.label.is_area() {
            return Err(PlanaraError::Assertion("found non-area edge".into()));
        }
        let left = bundle.label.get(Position::Left);
        let right = bundle.label.get(Position::Right);
        if left == right || right != Some(current) {
            return Ok(false);
        }
        let Some(left) = left else {
            return Ok(false);
        };
        current = left;
    }
    Ok(true)
}

/// Creates the edge ends on both sides of every intersection of the edge, including its
/// endpoints.
fn compute_edge_ends(id: EdgeId, edge: &mut Edge, out: &mut Vec<EdgeEnd>) {
    edge.add_endpoint_intersections();
    let intersections: Vec<EdgeIntersection> = edge.intersections().iter().copied().collect();

    for (i, current) in intersections.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| &intersections[p]);
        let next = intersections.get(i + 1);
        if let Some(end) = edge_end_for_prev(id, edge, current, prev) {
            out.push(end);
        }
        if let Some(end) = edge_end_for_next(id, edge, current, next) {
            out.push(end);
        }
    }
}

/// End pointing back along the edge. The label is flipped to match the direction.
fn edge_end_for_prev(
    id: EdgeId,
    edge: &Edge,
    current: &EdgeIntersection,
    prev: Option<&EdgeIntersection>,
) -> Option<EdgeEnd> {
    let mut prev_index = current.segment_index;
    if current.dist == 0.0 {
        if prev_index == 0 {
            return None;
        }
        prev_index -= 1;
    }

    let mut prev_pt = edge.coordinate(prev_index);
    if let Some(prev) = prev.filter(|p| p.segment_index >= prev_index) {
        prev_pt = prev.coord;
    }

    let mut label = *edge.label();
    label.flip();
    Some(EdgeEnd::new(id, current.coord, prev_pt, label))
}

fn edge_end_for_next(
    id: EdgeId,
    edge: &Edge,
    current: &EdgeIntersection,
    next: Option<&EdgeIntersection>,
) -> Option<EdgeEnd> {
    let next_index = current.segment_index + 1;
    if next_index >= edge.num_points() {
        return None;
    }

    let mut next_pt = edge.coordinate(next_index);
    if let Some(next) = next.filter(|n| n.segment_index == current.segment_index) {
        next_pt = next.coord;
    }
    Some(EdgeEnd::new(id, current.coord, next_pt, *edge.label()))
}
