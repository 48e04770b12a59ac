//! Validity checking of geometries against the OGC Simple Features rules.
//!
//! The checks run in a fixed order and stop at the first problem found, so the reported error
//! is always the most basic one.

mod connected_interior;
mod consistent_area;
mod nested_ring;

use std::fmt::{Display, Formatter};

use planara_types::algorithm::ring::{is_in_ring, locate_point_in_ring};
use planara_types::algorithm::LineIntersector;
use planara_types::{Coordinate, Geometry, LinearRing, Location, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

pub use connected_interior::ConnectedInteriorTester;
pub use consistent_area::ConsistentAreaTester;
pub use nested_ring::{NestedRingStrategy, NestedRingTester};

use crate::error::PlanaraError;
use crate::geomgraph::GeometryGraph;

/// Kind of a validity problem.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// A coordinate is not finite.
    InvalidCoordinate,
    /// The first and the last points of a ring differ.
    RingNotClosed,
    /// A line or a ring has too few distinct points.
    TooFewPoints,
    /// Rings of an area cross each other or the same ring twice.
    SelfIntersection,
    /// A ring touches itself.
    RingSelfIntersection,
    /// A hole lies outside of its shell.
    HoleOutsideShell,
    /// A hole lies inside another hole of the same polygon.
    NestedHoles,
    /// Holes split the interior of a polygon into parts.
    DisconnectedInterior,
    /// A polygon of a multi polygon lies inside another one.
    NestedShells,
    /// Two rings are identical.
    DuplicateRings,
}

impl Display for ValidationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ValidationErrorKind::InvalidCoordinate => "Invalid Coordinate",
            ValidationErrorKind::RingNotClosed => "Ring is not closed",
            ValidationErrorKind::TooFewPoints => "Too few distinct points in geometry component",
            ValidationErrorKind::SelfIntersection => "Self-intersection",
            ValidationErrorKind::RingSelfIntersection => "Ring Self-intersection",
            ValidationErrorKind::HoleOutsideShell => "Hole lies outside shell",
            ValidationErrorKind::NestedHoles => "Holes are nested",
            ValidationErrorKind::DisconnectedInterior => "Interior is disconnected",
            ValidationErrorKind::NestedShells => "Nested shells",
            ValidationErrorKind::DuplicateRings => "Duplicate Rings",
        };
        f.write_str(message)
    }
}

/// A validity problem found in a geometry.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyValidationError {
    /// What is wrong.
    pub kind: ValidationErrorKind,
    /// Where the problem is, if it can be located.
    pub coordinate: Option<Coordinate>,
}

impl TopologyValidationError {
    fn new(kind: ValidationErrorKind, coordinate: Option<Coordinate>) -> Self {
        Self { kind, coordinate }
    }
}

impl Display for TopologyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.coordinate {
            Some(c) => write!(f, "{} at or near point {c}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

type Check = Result<Option<TopologyValidationError>, PlanaraError>;

/// Returns the problem if one was found.
macro_rules! check {
    ($e:expr) => {
        if let Some(err) = $e {
            return Ok(Some(err));
        }
    };
}

/// Checks whether a geometry is valid.
///
/// Invalid geometries are reported with [`TopologyValidationError`]. An `Err` means that the
/// check itself could not be completed.
#[derive(Debug, Clone)]
pub struct IsValidOp<'a> {
    geometry: &'a Geometry,
    is_self_touching_ring_forming_hole_valid: bool,
    nested_ring_strategy: NestedRingStrategy,
}

impl<'a> IsValidOp<'a> {
    /// Prepares the check of the geometry.
    pub fn new(geometry: &'a Geometry) -> Self {
        Self {
            geometry,
            is_self_touching_ring_forming_hole_valid: false,
            nested_ring_strategy: NestedRingStrategy::default(),
        }
    }

    /// Accepts shells that touch themselves at a point to enclose a hole (the "inverted shell"
    /// model used by some systems). Such rings are invalid by default.
    pub fn with_self_touching_ring_forming_hole_valid(mut self, is_valid: bool) -> Self {
        self.is_self_touching_ring_forming_hole_valid = is_valid;
        self
    }

    /// Index used to find nested holes.
    pub fn with_nested_ring_strategy(mut self, strategy: NestedRingStrategy) -> Self {
        self.nested_ring_strategy = strategy;
        self
    }

    /// Whether the geometry is valid.
    pub fn is_valid(&self) -> Result<bool, PlanaraError> {
        Ok(self.validation_error()?.is_none())
    }

    /// The first problem found in the geometry, or `None` if it is valid.
    pub fn validation_error(&self) -> Result<Option<TopologyValidationError>, PlanaraError> {
        let result = self.check_valid(self.geometry);
        if let Ok(Some(err)) = &result {
            log::debug!("Geometry is invalid: {err}");
        }
        result
    }

    fn check_valid(&self, geometry: &'a Geometry) -> Check {
        if geometry.is_empty() {
            return Ok(None);
        }

        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => {
                Ok(check_invalid_coordinates(&geometry.coordinates()))
            }
            Geometry::LineString(_) | Geometry::MultiLineString(_) => self.check_lines(geometry),
            Geometry::LinearRing(ring) => self.check_linear_ring(geometry, ring),
            Geometry::Polygon(polygon) => self.check_polygon(geometry, polygon),
            Geometry::MultiPolygon(polygons) => self.check_multi_polygon(geometry, polygons),
            Geometry::GeometryCollection(collection) => {
                for part in collection.parts() {
                    check!(self.check_valid(part)?);
                }
                Ok(None)
            }
        }
    }

    fn check_lines(&self, geometry: &'a Geometry) -> Check {
        check!(check_invalid_coordinates(&geometry.coordinates()));
        let graph = GeometryGraph::new(0, geometry);
        Ok(check_too_few_points(&graph))
    }

    fn check_linear_ring(&self, geometry: &'a Geometry, ring: &LinearRing) -> Check {
        check!(check_invalid_coordinates(ring.coords()));
        check!(check_closed_ring(ring));

        let mut graph = GeometryGraph::new(0, geometry);
        check!(check_too_few_points(&graph));
        graph.compute_self_nodes(LineIntersector::new(), true, true)?;
        Ok(check_no_self_intersecting_rings(&mut graph))
    }

    fn check_polygon(&self, geometry: &'a Geometry, polygon: &'a Polygon) -> Check {
        check!(check_invalid_coordinates(&geometry.coordinates()));
        check!(check_closed_rings(polygon));

        let mut graph = GeometryGraph::new(0, geometry);
        check!(check_too_few_points(&graph));
        check!(check_consistent_area(&mut graph)?);
        if !self.is_self_touching_ring_forming_hole_valid {
            check!(check_no_self_intersecting_rings(&mut graph));
        }
        check!(check_holes_in_shell(polygon, &graph));
        check!(self.check_holes_not_nested(polygon, &graph)?);
        check_connected_interiors(&mut graph)
    }

    fn check_multi_polygon(&self, geometry: &'a Geometry, polygons: &'a MultiPolygon) -> Check {
        check!(check_invalid_coordinates(&geometry.coordinates()));
        for polygon in polygons.parts() {
            check!(check_closed_rings(polygon));
        }

        let mut graph = GeometryGraph::new(0, geometry);
        check!(check_too_few_points(&graph));
        check!(check_consistent_area(&mut graph)?);
        if !self.is_self_touching_ring_forming_hole_valid {
            check!(check_no_self_intersecting_rings(&mut graph));
        }
        for polygon in polygons.parts() {
            check!(check_holes_in_shell(polygon, &graph));
        }
        for polygon in polygons.parts() {
            check!(self.check_holes_not_nested(polygon, &graph)?);
        }
        check!(check_shells_not_nested(polygons, &graph)?);
        check_connected_interiors(&mut graph)
    }

    fn check_holes_not_nested(&self, polygon: &'a Polygon, graph: &GeometryGraph<'a>) -> Check {
        if polygon.interiors().is_empty() {
            return Ok(None);
        }

        let mut tester = NestedRingTester::new(graph, self.nested_ring_strategy);
        for hole in polygon.interiors().iter().filter(|h| !h.is_empty()) {
            tester.add(hole);
        }
        Ok(tester
            .find_nested_point()?
            .map(|pt| TopologyValidationError::new(ValidationErrorKind::NestedHoles, Some(pt))))
    }
}

fn check_invalid_coordinates(coords: &[Coordinate]) -> Option<TopologyValidationError> {
    coords.iter().find(|c| !c.is_valid()).map(|c| {
        TopologyValidationError::new(ValidationErrorKind::InvalidCoordinate, Some(*c))
    })
}

fn check_closed_rings(polygon: &Polygon) -> Option<TopologyValidationError> {
    polygon.rings().find_map(check_closed_ring)
}

fn check_closed_ring(ring: &LinearRing) -> Option<TopologyValidationError> {
    if ring.is_closed() {
        return None;
    }
    Some(TopologyValidationError::new(
        ValidationErrorKind::RingNotClosed,
        ring.coords().first().copied(),
    ))
}

fn check_too_few_points(graph: &GeometryGraph<'_>) -> Option<TopologyValidationError> {
    graph.has_too_few_points().then(|| {
        TopologyValidationError::new(ValidationErrorKind::TooFewPoints, graph.invalid_point())
    })
}

fn check_consistent_area(graph: &mut GeometryGraph<'_>) -> Check {
    let mut tester = ConsistentAreaTester::new(graph);
    if !tester.is_node_consistent_area()? {
        return Ok(Some(TopologyValidationError::new(
            ValidationErrorKind::SelfIntersection,
            tester.invalid_point(),
        )));
    }
    if tester.has_duplicate_rings() {
        return Ok(Some(TopologyValidationError::new(
            ValidationErrorKind::DuplicateRings,
            tester.invalid_point(),
        )));
    }
    Ok(None)
}

/// Every intersection of a ring with itself must be at a distinct point. An edge visiting the same
/// node twice touches itself.
fn check_no_self_intersecting_rings(
    graph: &mut GeometryGraph<'_>,
) -> Option<TopologyValidationError> {
    for edge in graph.edges_mut() {
        edge.add_endpoint_intersections();
        let mut nodes = std::collections::BTreeSet::new();
        for ei in edge.intersections().iter().skip(1) {
            if !nodes.insert(ei.coord) {
                return Some(TopologyValidationError::new(
                    ValidationErrorKind::RingSelfIntersection,
                    Some(ei.coord),
                ));
            }
        }
    }
    None
}

/// Finds a point of `test_coords` that is not a node of the edge of `search_ring`.
pub(crate) fn find_point_not_node(
    test_coords: &[Coordinate],
    search_ring: &LinearRing,
    graph: &GeometryGraph<'_>,
) -> Option<Coordinate> {
    let search_edge = graph.find_edge(search_ring)?;
    let intersections = search_edge.intersections();
    test_coords
        .iter()
        .find(|pt| !intersections.is_intersection(pt))
        .copied()
}

fn check_holes_in_shell(
    polygon: &Polygon,
    graph: &GeometryGraph<'_>,
) -> Option<TopologyValidationError> {
    let shell = polygon.exterior();
    let is_shell_empty = shell.is_empty();

    for hole in polygon.interiors().iter().filter(|h| !h.is_empty()) {
        let hole_pt = if is_shell_empty {
            hole.coords().first().copied()
        } else {
            find_point_not_node(hole.coords(), shell, graph)
        };
        // All hole points are nodes: the hole is checked by the nested rings test.
        let hole_pt = hole_pt?;

        let is_outside =
            is_shell_empty || locate_point_in_ring(&hole_pt, shell.coords()) == Location::Exterior;
        if is_outside {
            return Some(TopologyValidationError::new(
                ValidationErrorKind::HoleOutsideShell,
                Some(hole_pt),
            ));
        }
    }
    None
}

/// A shell of a multi polygon may only be inside another polygon if it is inside one of its
/// holes.
fn check_shells_not_nested(polygons: &MultiPolygon, graph: &GeometryGraph<'_>) -> Check {
    let parts = polygons.parts();
    for (i, polygon) in parts.iter().enumerate() {
        let shell = polygon.exterior();
        if shell.is_empty() {
            continue;
        }
        for (j, other) in parts.iter().enumerate() {
            if i == j || other.exterior().is_empty() {
                continue;
            }
            if let Some(pt) = check_shell_not_nested(shell, other, graph)? {
                return Ok(Some(TopologyValidationError::new(
                    ValidationErrorKind::NestedShells,
                    Some(pt),
                )));
            }
        }
    }
    Ok(None)
}

fn check_shell_not_nested(
    shell: &LinearRing,
    polygon: &Polygon,
    graph: &GeometryGraph<'_>,
) -> Result<Option<Coordinate>, PlanaraError> {
    let poly_shell = polygon.exterior();
    let Some(shell_pt) = find_point_not_node(shell.coords(), poly_shell, graph) else {
        return Ok(None);
    };
    if !is_in_ring(&shell_pt, poly_shell.coords()) {
        return Ok(None);
    }
    if polygon.interiors().is_empty() {
        return Ok(Some(shell_pt));
    }

    let mut bad_nested_pt = None;
    for hole in polygon.interiors() {
        bad_nested_pt = check_shell_inside_hole(shell, hole, graph)?;
        if bad_nested_pt.is_none() {
            return Ok(None);
        }
    }
    Ok(bad_nested_pt)
}

/// Returns a point of the shell or the hole showing that the shell is not inside the hole.
fn check_shell_inside_hole(
    shell: &LinearRing,
    hole: &LinearRing,
    graph: &GeometryGraph<'_>,
) -> Result<Option<Coordinate>, PlanaraError> {
    if let Some(shell_pt) = find_point_not_node(shell.coords(), hole, graph) {
        if !is_in_ring(&shell_pt, hole.coords()) {
            return Ok(Some(shell_pt));
        }
    }

    if let Some(hole_pt) = find_point_not_node(hole.coords(), shell, graph) {
        if is_in_ring(&hole_pt, shell.coords()) {
            return Ok(Some(hole_pt));
        }
        return Ok(None);
    }

    Err(PlanaraError::Assertion(
        "points in shell and hole appear to be equal".into(),
    ))
}

fn check_connected_interiors(graph: &mut GeometryGraph<'_>) -> Check {
    let mut tester = ConnectedInteriorTester::new(graph);
    if tester.is_interiors_connected()? {
        return Ok(None);
    }
    Ok(Some(TopologyValidationError::new(
        ValidationErrorKind::DisconnectedInterior,
        tester.coordinate(),
    )))
}
