use planara_types::{Coordinate, Geometry, LinearRing, Location, Position};

use crate::error::PlanaraError;
use crate::geomgraph::{sym, EdgeRings, GeometryGraph, PlanarGraph, RingId, RingKind};

/// Checks that the interior of an area geometry is connected.
///
/// Holes touching each other or the shell at points may split the interior of a polygon into
/// several parts. The tester builds the minimal rings around the interior and walks from every
/// shell along the rings it is linked to. A shell ring that is never reached bounds a separate
/// part of the interior.
///
/// The rings of the geometry must already be noded and consistent.
#[derive(Debug)]
pub struct ConnectedInteriorTester<'a, 'g> {
    graph: &'g mut GeometryGraph<'a>,
    disconnected_point: Option<Coordinate>,
}

impl<'a, 'g> ConnectedInteriorTester<'a, 'g> {
    /// Creates a tester for the graph of an area geometry.
    pub fn new(graph: &'g mut GeometryGraph<'a>) -> Self {
        Self {
            graph,
            disconnected_point: None,
        }
    }

    /// A point on the boundary of a disconnected part of the interior.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.disconnected_point
    }

    /// Whether the interior is connected.
    pub fn is_interiors_connected(&mut self) -> Result<bool, PlanaraError> {
        let mut split_edges = vec![];
        self.graph.compute_split_edges(&mut split_edges);

        let mut graph = PlanarGraph::new();
        graph.add_edges(split_edges);
        for de in 0..graph.dir_edges().len() {
            if graph.dir_edge(de).label().location_at(0, Position::Right)
                == Some(Location::Interior)
            {
                graph.dir_edge_mut(de).in_result = true;
            }
        }
        graph.link_result_directed_edges()?;

        let mut rings = EdgeRings::new();
        let min_rings = build_edge_rings(&mut graph, &mut rings)?;

        visit_shell_interiors(self.graph.geometry(), &mut graph)?;

        self.disconnected_point = find_unvisited_shell_edge(&graph, &rings, &min_rings);
        Ok(self.disconnected_point.is_none())
    }
}

fn build_edge_rings(
    graph: &mut PlanarGraph,
    rings: &mut EdgeRings,
) -> Result<Vec<RingId>, PlanaraError> {
    let mut min_rings = vec![];
    for de in 0..graph.dir_edges().len() {
        let dir_edge = graph.dir_edge(de);
        if dir_edge.is_in_result() && dir_edge.edge_ring().is_none() {
            let ring = rings.build(graph, de, RingKind::Maximal)?;
            rings.link_directed_edges_for_minimal_rings(graph, ring)?;
            min_rings.extend(rings.build_minimal_rings(graph, ring)?);
        }
    }
    Ok(min_rings)
}

fn visit_shell_interiors(geometry: &Geometry, graph: &mut PlanarGraph) -> Result<(), PlanaraError> {
    match geometry {
        Geometry::Polygon(polygon) => visit_interior_ring(polygon.exterior(), graph),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons.parts() {
                visit_interior_ring(polygon.exterior(), graph)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Marks all directed edges reachable from the interior side of the ring as visited.
fn visit_interior_ring(ring: &LinearRing, graph: &mut PlanarGraph) -> Result<(), PlanaraError> {
    let pts = ring.coords();
    let Some(pt0) = pts.first() else {
        return Ok(());
    };
    let Some(pt1) = pts.iter().find(|p| !p.equals_2d(pt0)) else {
        return Ok(());
    };

    let edge = graph.find_edge_in_same_direction(pt0, pt1).ok_or_else(|| {
        PlanaraError::Assertion("unable to find an edge of the shell ring".into())
    })?;
    let de = PlanarGraph::forward_dir_edge(edge);
    let is_interior_right = |de: usize| {
        graph.dir_edge(de).label().location_at(0, Position::Right) == Some(Location::Interior)
    };
    let start = if is_interior_right(de) {
        de
    } else if is_interior_right(sym(de)) {
        sym(de)
    } else {
        return Err(PlanaraError::Assertion(
            "unable to find a directed edge with interior on the right".into(),
        ));
    };

    let mut current = start;
    loop {
        graph.dir_edge_mut(current).visited = true;
        current = graph.dir_edge(current).next().ok_or_else(|| {
            PlanaraError::topology(
                "found null directed edge",
                Some(graph.dir_edge(current).end().coordinate()),
            )
        })?;
        if current == start {
            return Ok(());
        }
    }
}

/// Finds a directed edge of a shell ring bounding the interior that was never visited.
fn find_unvisited_shell_edge(
    graph: &PlanarGraph,
    rings: &EdgeRings,
    min_rings: &[RingId],
) -> Option<Coordinate> {
    for ring in min_rings.iter().map(|id| rings.get(*id)) {
        if ring.is_hole() {
            continue;
        }
        let Some(first) = ring.dir_edges().first() else {
            continue;
        };
        if graph.dir_edge(*first).label().location_at(0, Position::Right)
            != Some(Location::Interior)
        {
            continue;
        }

        if let Some(de) = ring
            .dir_edges()
            .iter()
            .find(|de| !graph.dir_edge(**de).is_visited())
        {
            return Some(graph.dir_edge(*de).end().coordinate());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use planara_types::Polygon;

    use super::*;
    use crate::operation::valid::ConsistentAreaTester;

    fn ring(points: &[(f64, f64)]) -> LinearRing {
        LinearRing::new(points.iter().map(|p| Coordinate::from(*p)).collect())
    }

    fn is_connected(hole: LinearRing) -> (bool, Option<Coordinate>) {
        let shell = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let geometry: Geometry = Polygon::new(shell, vec![hole]).into();
        let mut graph = GeometryGraph::new(0, &geometry);
        assert!(ConsistentAreaTester::new(&mut graph)
            .is_node_consistent_area()
            .expect("noding"));

        let mut tester = ConnectedInteriorTester::new(&mut graph);
        let connected = tester.is_interiors_connected().expect("check completes");
        (connected, tester.coordinate())
    }

    #[test]
    fn hole_touching_shell_once() {
        let hole = ring(&[(0.0, 5.0), (5.0, 8.0), (5.0, 2.0), (0.0, 5.0)]);
        assert_eq!(is_connected(hole), (true, None));
    }

    #[test]
    fn hole_touching_shell_twice() {
        let hole = ring(&[(0.0, 5.0), (5.0, 8.0), (10.0, 5.0), (5.0, 2.0), (0.0, 5.0)]);
        let (connected, pt) = is_connected(hole);
        assert!(!connected);
        assert!(pt.is_some());
    }
}
