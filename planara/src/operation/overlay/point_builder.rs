use planara_types::{Coordinate, GeometryFactory, Point};

use super::{is_label_in_result, OverlayOpCode};
use crate::geomgraph::PlanarGraph;

/// Builds the result points from the nodes of the graph that are not covered by result lines or
/// areas.
#[derive(Debug)]
pub struct PointBuilder {
    factory: GeometryFactory,
}

impl PointBuilder {
    /// Creates a builder producing points with the factory.
    pub fn new(factory: GeometryFactory) -> Self {
        Self { factory }
    }

    /// Builds the result points. `is_covered` tells whether a point is covered by the result
    /// lines or areas built before.
    ///
    /// Only isolated nodes can become points, except for intersections where two inputs may
    /// touch at a node with edges.
    pub fn build(
        &self,
        graph: &PlanarGraph,
        is_covered: impl Fn(&Coordinate) -> bool,
        op: OverlayOpCode,
    ) -> Vec<Point> {
        graph
            .nodes()
            .ids()
            .into_iter()
            .filter(|node| !graph.is_incident_edge_in_result(*node))
            .map(|node| graph.node(node))
            .filter(|node| node.degree() == 0 || op == OverlayOpCode::Intersection)
            .filter(|node| is_label_in_result(node.label(), op))
            .map(|node| node.coordinate())
            .filter(|coord| !is_covered(coord))
            .map(|coord| self.factory.create_point(Some(coord)))
            .collect()
    }
}
