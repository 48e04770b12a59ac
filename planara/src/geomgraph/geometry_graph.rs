use planara_types::algorithm::ring::{is_ccw, remove_repeated_points};
use planara_types::algorithm::LineIntersector;
use planara_types::{
    Coordinate, Geometry, LineString, LinearRing, Location, Point, Polygon, Position,
};

use super::edge::Edge;
use super::label::Label;
use super::node::NodeMap;
use super::noding::{compute_cross_intersections, compute_self_intersections, SegmentIntersector};
use super::EdgeId;
use crate::error::PlanaraError;

/// The topology graph of a single input geometry of an operation.
///
/// Every line and ring of the geometry becomes an edge labelled with its location relative to
/// the geometry. Nodes are created for points, ring start points and line endpoints. Line
/// endpoints follow the mod-2 boundary rule: an endpoint shared by an even number of lines is
/// in the interior.
#[derive(Debug, Clone)]
pub struct GeometryGraph<'a> {
    arg_index: usize,
    geometry: &'a Geometry,
    edges: Vec<Edge>,
    nodes: NodeMap,
    ring_edges: Vec<(&'a LinearRing, EdgeId)>,
    use_boundary_determination_rule: bool,
    has_too_few_points: bool,
    invalid_point: Option<Coordinate>,
}

impl<'a> GeometryGraph<'a> {
    /// Builds the graph of the geometry, which is the input with index `arg_index` (0 or 1).
    pub fn new(arg_index: usize, geometry: &'a Geometry) -> Self {
        let mut graph = Self {
            arg_index,
            geometry,
            edges: vec![],
            nodes: NodeMap::default(),
            ring_edges: vec![],
            use_boundary_determination_rule: true,
            has_too_few_points: false,
            invalid_point: None,
        };
        graph.add(geometry);
        graph
    }

    /// The geometry of the graph.
    pub fn geometry(&self) -> &'a Geometry {
        self.geometry
    }

    /// Index of the geometry in the operation.
    pub fn arg_index(&self) -> usize {
        self.arg_index
    }

    /// Edges of the graph.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Nodes of the graph.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Whether a line or a ring of the geometry has too few distinct points to form an edge.
    pub fn has_too_few_points(&self) -> bool {
        self.has_too_few_points
    }

    /// A point of the first line or ring with too few points.
    pub fn invalid_point(&self) -> Option<Coordinate> {
        self.invalid_point
    }

    /// Edge created for the ring. The ring is looked up by identity, so it must be a part of
    /// the geometry of the graph.
    pub fn find_edge(&self, ring: &LinearRing) -> Option<&Edge> {
        self.ring_edges
            .iter()
            .find(|(r, _)| std::ptr::eq(*r, ring))
            .map(|(_, edge)| &self.edges[*edge])
    }

    /// Points of the nodes that are on the boundary of the geometry.
    pub fn boundary_points(&self) -> Vec<Coordinate> {
        self.nodes
            .iter()
            .filter(|node| node.label().location(self.arg_index) == Some(Location::Boundary))
            .map(|node| node.coordinate())
            .collect()
    }

    fn add(&mut self, geometry: &'a Geometry) {
        if geometry.is_empty() {
            return;
        }

        match geometry {
            Geometry::Point(p) => self.add_point(p),
            Geometry::LineString(line) => self.add_line_string(line.coords()),
            Geometry::LinearRing(ring) => self.add_line_string(ring.coords()),
            Geometry::Polygon(p) => self.add_polygon(p),
            Geometry::MultiPoint(mp) => mp.parts().iter().for_each(|p| self.add_point(p)),
            Geometry::MultiLineString(ml) => ml
                .parts()
                .iter()
                .for_each(|line| self.add_line_string(line.coords())),
            Geometry::MultiPolygon(mp) => {
                // Polygons of a multi polygon may touch only at points, so ring start points
                // are never boundary points of lines.
                self.use_boundary_determination_rule = false;
                mp.parts().iter().for_each(|p| self.add_polygon(p));
            }
            Geometry::GeometryCollection(gc) => gc.parts().iter().for_each(|g| self.add(g)),
        }
    }

    fn add_point(&mut self, point: &Point) {
        if let Some(coord) = point.coord() {
            self.insert_point(*coord, Location::Interior);
        }
    }

    fn add_polygon(&mut self, polygon: &'a Polygon) {
        self.add_polygon_ring(polygon.exterior(), Location::Exterior, Location::Interior);
        for hole in polygon.interiors() {
            // Holes are oriented opposite to the shell, so the sides are swapped.
            self.add_polygon_ring(hole, Location::Interior, Location::Exterior);
        }
    }

    fn add_polygon_ring(&mut self, ring: &'a LinearRing, cw_left: Location, cw_right: Location) {
        if ring.is_empty() {
            return;
        }

        let coords = remove_repeated_points(ring.coords());
        if coords.len() < LinearRing::MINIMUM_VALID_SIZE {
            self.set_too_few_points(coords.first().copied());
            return;
        }

        let (left, right) = if is_ccw(&coords) {
            (cw_right, cw_left)
        } else {
            (cw_left, cw_right)
        };
        let start = coords[0];
        let label = Label::area(self.arg_index, Location::Boundary, left, right);
        self.ring_edges.push((ring, self.edges.len()));
        self.edges.push(Edge::new(coords, label));
        self.insert_point(start, Location::Boundary);
    }

    fn add_line_string(&mut self, coords: &[Coordinate]) {
        let coords = remove_repeated_points(coords);
        let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) else {
            return;
        };
        if coords.len() < 2 {
            self.set_too_few_points(Some(first));
            return;
        }

        self.edges.push(Edge::new(
            coords,
            Label::line(self.arg_index, Location::Interior),
        ));
        self.insert_boundary_point(first);
        self.insert_boundary_point(last);
    }

    fn set_too_few_points(&mut self, point: Option<Coordinate>) {
        if !self.has_too_few_points {
            self.has_too_few_points = true;
            self.invalid_point = point;
        }
    }

    fn insert_point(&mut self, coord: Coordinate, location: Location) {
        let node = self.nodes.add_node(coord);
        self.nodes
            .get_mut(node)
            .label
            .set_location(self.arg_index, location);
    }

    fn insert_boundary_point(&mut self, coord: Coordinate) {
        let node = self.nodes.add_node(coord);
        let label = &mut self.nodes.get_mut(node).label;
        let boundary_count = match label.location_at(self.arg_index, Position::On) {
            Some(Location::Boundary) => 2,
            _ => 1,
        };
        label.set_location(self.arg_index, determine_boundary(boundary_count));
    }

    fn is_rings(&self) -> bool {
        matches!(
            self.geometry,
            Geometry::LinearRing(_) | Geometry::Polygon(_) | Geometry::MultiPolygon(_)
        )
    }

    /// Computes the intersections of the edges of the graph with each other and adds nodes for
    /// them.
    ///
    /// Segments of the same ring are only tested against each other with
    /// `compute_ring_self_nodes`: rings of valid areal geometries do not self-intersect. With
    /// `is_done_if_proper` the computation stops at the first proper intersection.
    pub fn compute_self_nodes(
        &mut self,
        li: LineIntersector,
        compute_ring_self_nodes: bool,
        is_done_if_proper: bool,
    ) -> Result<SegmentIntersector, PlanaraError> {
        let mut si = SegmentIntersector::new(li, true).with_done_if_proper(is_done_if_proper);
        let test_all_segments = compute_ring_self_nodes || !self.is_rings();
        compute_self_intersections(&mut self.edges, &mut si, test_all_segments)?;
        self.add_self_intersection_nodes();
        Ok(si)
    }

    /// Computes the intersections between the edges of this graph and another one. The nodes
    /// for them are not added.
    pub fn compute_edge_intersections(
        &mut self,
        other: &mut GeometryGraph<'_>,
        li: LineIntersector,
        include_proper: bool,
    ) -> Result<SegmentIntersector, PlanaraError> {
        let mut si = SegmentIntersector::new(li, include_proper);
        compute_cross_intersections(&mut self.edges, &mut other.edges, &mut si)?;
        Ok(si)
    }

    fn add_self_intersection_nodes(&mut self) {
        let points: Vec<_> = self
            .edges
            .iter()
            .flat_map(|edge| {
                let location = edge.label().location(self.arg_index);
                edge.intersections()
                    .iter()
                    .map(move |ei| (ei.coord, location))
            })
            .collect();

        for (coord, location) in points {
            let Some(location) = location else {
                continue;
            };
            self.add_self_intersection_node(coord, location);
        }
    }

    fn add_self_intersection_node(&mut self, coord: Coordinate, location: Location) {
        if self.is_boundary_node(&coord) {
            return;
        }

        if location == Location::Boundary && self.use_boundary_determination_rule {
            self.insert_boundary_point(coord);
        } else {
            self.insert_point(coord, location);
        }
    }

    fn is_boundary_node(&self, coord: &Coordinate) -> bool {
        self.nodes.find(coord).is_some_and(|node| {
            self.nodes.get(node).label().location(self.arg_index) == Some(Location::Boundary)
        })
    }

    /// Splits every edge at its intersections, adding the parts to `out`.
    pub fn compute_split_edges(&mut self, out: &mut Vec<Edge>) {
        for edge in &mut self.edges {
            edge.add_split_edges(out);
        }
    }
}

/// Location of a point that is an endpoint of `boundary_count` lines, by the mod-2 rule.
pub fn determine_boundary(boundary_count: usize) -> Location {
    if boundary_count % 2 == 1 {
        Location::Boundary
    } else {
        Location::Interior
    }
}

#[cfg(test)]
mod tests {
    use planara_types::{MultiLineString, Polygon};

    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|p| Coordinate::from(*p)).collect()
    }

    #[test]
    fn polygon_ring_labels() {
        // Counterclockwise shell: interior on the left.
        let polygon: Geometry = Polygon::new(
            LinearRing::new(coords(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ])),
            vec![LinearRing::new(coords(&[
                (2.0, 2.0),
                (2.0, 4.0),
                (4.0, 4.0),
                (4.0, 2.0),
                (2.0, 2.0),
            ]))],
        )
        .into();
        let graph = GeometryGraph::new(0, &polygon);

        assert_eq!(graph.edges().len(), 2);
        let shell = graph.edges()[0].label();
        assert_eq!(shell.location_at(0, Position::Left), Some(Location::Interior));
        assert_eq!(shell.location_at(0, Position::Right), Some(Location::Exterior));
        // Clockwise hole: interior of the polygon on the left as well.
        let hole = graph.edges()[1].label();
        assert_eq!(hole.location_at(0, Position::Left), Some(Location::Interior));
        assert_eq!(hole.location_at(0, Position::Right), Some(Location::Exterior));

        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.boundary_points().len(), 2);

        let Geometry::Polygon(p) = &polygon else {
            unreachable!()
        };
        assert!(graph.find_edge(&p.interiors()[0]).is_some());
        let other_ring = p.interiors()[0].clone();
        assert!(graph.find_edge(&other_ring).is_none());
    }

    #[test]
    fn mod_2_boundary_rule() {
        let lines: Geometry = MultiLineString::new(vec![
            LineString::new(coords(&[(0.0, 0.0), (1.0, 0.0)])),
            LineString::new(coords(&[(1.0, 0.0), (2.0, 0.0)])),
            LineString::new(coords(&[(5.0, 5.0), (6.0, 6.0)])),
        ])
        .into();
        let graph = GeometryGraph::new(1, &lines);
        let node_location = |x, y| {
            let node = graph
                .nodes()
                .find(&Coordinate::new(x, y))
                .expect("node exists");
            graph.nodes().get(node).label().location(1)
        };

        assert_eq!(node_location(0.0, 0.0), Some(Location::Boundary));
        // Shared by two line ends.
        assert_eq!(node_location(1.0, 0.0), Some(Location::Interior));
        assert_eq!(node_location(2.0, 0.0), Some(Location::Boundary));
    }

    #[test]
    fn too_few_points() {
        let ring: Geometry = Polygon::new(
            LinearRing::new(coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (0.0, 0.0)])),
            vec![],
        )
        .into();
        let graph = GeometryGraph::new(0, &ring);
        assert!(graph.has_too_few_points());
        assert_eq!(graph.invalid_point(), Some(Coordinate::new(0.0, 0.0)));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn self_nodes_of_crossing_lines() {
        let lines: Geometry = MultiLineString::new(vec![
            LineString::new(coords(&[(0.0, 0.0), (2.0, 2.0)])),
            LineString::new(coords(&[(0.0, 2.0), (2.0, 0.0)])),
        ])
        .into();
        let mut graph = GeometryGraph::new(0, &lines);
        let si = graph
            .compute_self_nodes(LineIntersector::new(), false, false)
            .expect("noding");
        assert!(si.has_proper_intersection());
        assert_eq!(graph.nodes().len(), 5);

        let mut split = vec![];
        graph.compute_split_edges(&mut split);
        assert_eq!(split.len(), 4);
    }
}
