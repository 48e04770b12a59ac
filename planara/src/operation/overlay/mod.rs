//! Boolean overlay of two geometries.
//!
//! Both inputs are noded against themselves and each other, and the split edges are merged into
//! one planar graph labelled with the locations relative to both inputs. The result is then read
//! from the graph in a fixed order: areas first, then lines not covered by the result areas, then
//! points not covered by either.

mod line_builder;
mod point_builder;
mod polygon_builder;

use std::fmt::{Display, Formatter};

use planara_types::algorithm::locate::{locate_in_polygon, locate_on_line_string};
use planara_types::algorithm::{LineIntersector, PointLocator};
use planara_types::{
    Coordinate, Geometry, GeometryFactory, LineString, Location, Point, Polygon, Position,
};
use serde::{Deserialize, Serialize};

pub use line_builder::LineBuilder;
pub use point_builder::PointBuilder;
pub use polygon_builder::PolygonBuilder;

use crate::error::PlanaraError;
use crate::geomgraph::{sym, Edge, EdgeList, GeometryGraph, Label, PlanarGraph};

/// Boolean overlay operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayOpCode {
    /// Points in both geometries.
    Intersection,
    /// Points in either geometry.
    Union,
    /// Points in the first geometry but not in the second one.
    Difference,
    /// Points in exactly one of the geometries.
    SymDifference,
}

impl Display for OverlayOpCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OverlayOpCode::Intersection => "intersection",
            OverlayOpCode::Union => "union",
            OverlayOpCode::Difference => "difference",
            OverlayOpCode::SymDifference => "symmetric difference",
        };
        f.write_str(name)
    }
}

/// Decides whether a point with the given locations relative to the two inputs is a part of
/// the result of the operation. Points on the boundary count as interior.
pub fn is_result_of_op(loc0: Location, loc1: Location, op: OverlayOpCode) -> bool {
    let in0 = loc0 != Location::Exterior;
    let in1 = loc1 != Location::Exterior;
    match op {
        OverlayOpCode::Intersection => in0 && in1,
        OverlayOpCode::Union => in0 || in1,
        OverlayOpCode::Difference => in0 && !in1,
        OverlayOpCode::SymDifference => in0 != in1,
    }
}

/// Unknown locations are treated as exterior.
pub(crate) fn is_label_in_result(label: &Label, op: OverlayOpCode) -> bool {
    is_result_of_op(
        label.location(0).unwrap_or(Location::Exterior),
        label.location(1).unwrap_or(Location::Exterior),
        op,
    )
}

fn is_side_in_result(label: &Label, position: Position, op: OverlayOpCode) -> bool {
    is_result_of_op(
        label.location_at(0, position).unwrap_or(Location::Exterior),
        label.location_at(1, position).unwrap_or(Location::Exterior),
        op,
    )
}

/// Computes the overlay of two geometries.
///
/// An instance computes one operation; the result parts stay available for coverage queries
/// afterwards.
#[derive(Debug)]
pub struct OverlayOp<'a> {
    args: [GeometryGraph<'a>; 2],
    factory: GeometryFactory,
    li: LineIntersector,
    graph: PlanarGraph,
    result_polys: Vec<Polygon>,
    result_lines: Vec<LineString>,
    result_points: Vec<Point>,
    result: Option<(OverlayOpCode, Geometry)>,
}

impl<'a> OverlayOp<'a> {
    /// Prepares the overlay of the two geometries with the default factory.
    pub fn new(g0: &'a Geometry, g1: &'a Geometry) -> Self {
        Self::with_factory(g0, g1, GeometryFactory::default())
    }

    /// Prepares the overlay of the two geometries. Results are built with the factory and
    /// computed intersection points are rounded to its precision model.
    pub fn with_factory(g0: &'a Geometry, g1: &'a Geometry, factory: GeometryFactory) -> Self {
        Self {
            args: [GeometryGraph::new(0, g0), GeometryGraph::new(1, g1)],
            factory,
            li: LineIntersector::with_precision_model(factory.precision_model()),
            graph: PlanarGraph::new(),
            result_polys: vec![],
            result_lines: vec![],
            result_points: vec![],
            result: None,
        }
    }

    /// Computes the overlay of the two geometries.
    pub fn overlay(
        g0: &Geometry,
        g1: &Geometry,
        op: OverlayOpCode,
    ) -> Result<Geometry, PlanaraError> {
        OverlayOp::new(g0, g1).result_geometry(op)
    }

    /// Result of the operation. The overlay is computed on the first call; asking an instance
    /// for a different operation afterwards is an error.
    pub fn result_geometry(&mut self, op: OverlayOpCode) -> Result<Geometry, PlanaraError> {
        match &self.result {
            Some((computed, geometry)) if *computed == op => return Ok(geometry.clone()),
            Some((computed, _)) => {
                return Err(PlanaraError::Assertion(format!(
                    "overlay was already computed for {computed}"
                )))
            }
            None => {}
        }

        let geometry = self
            .compute_overlay(op)
            .map_err(|source| PlanaraError::Overlay {
                op,
                source: Box::new(source),
            })?;
        self.result = Some((op, geometry.clone()));
        Ok(geometry)
    }

    /// The graph built for the operation.
    pub fn graph(&self) -> &PlanarGraph {
        &self.graph
    }

    /// Whether the point is covered by a result line or a result area computed so far.
    pub fn is_covered_by_line_or_area(&self, coord: &Coordinate) -> bool {
        is_covered_by_lines(coord, &self.result_lines) || self.is_covered_by_area(coord)
    }

    /// Whether the point is covered by a result area computed so far.
    pub fn is_covered_by_area(&self, coord: &Coordinate) -> bool {
        is_covered_by_polygons(coord, &self.result_polys)
    }

    fn compute_overlay(&mut self, op: OverlayOpCode) -> Result<Geometry, PlanaraError> {
        // Nodes of the inputs must be kept even if no edge ends at them.
        self.copy_points(0);
        self.copy_points(1);

        let [arg0, arg1] = &mut self.args;
        arg0.compute_self_nodes(self.li.clone(), false, false)?;
        arg1.compute_self_nodes(self.li.clone(), false, false)?;
        arg0.compute_edge_intersections(arg1, self.li.clone(), true)?;

        let mut split_edges = vec![];
        arg0.compute_split_edges(&mut split_edges);
        arg1.compute_split_edges(&mut split_edges);

        let mut edge_list = EdgeList::new();
        for edge in split_edges {
            insert_unique_edge(&mut edge_list, edge);
        }
        compute_labels_from_depths(&mut edge_list);
        let edges = replace_collapsed_edges(edge_list);
        log::debug!(
            "Overlay graph for {op}: {} edges from {} and {} input edges",
            edges.len(),
            self.args[0].edges().len(),
            self.args[1].edges().len()
        );
        self.graph.add_edges(edges);

        self.compute_labelling()?;
        self.label_incomplete_nodes();
        self.find_result_area_edges(op);
        self.cancel_duplicate_result_edges();

        let mut polygon_builder = PolygonBuilder::new(self.factory);
        polygon_builder.add(&mut self.graph)?;
        self.result_polys = polygon_builder.into_polygons();

        let line_builder = LineBuilder::new(self.factory);
        self.result_lines = line_builder.build(&mut self.graph, &self.result_polys, op);

        let point_builder = PointBuilder::new(self.factory);
        self.result_points = point_builder.build(
            &self.graph,
            |coord| self.is_covered_by_line_or_area(coord),
            op,
        );

        log::debug!(
            "Overlay {op} result: {} polygons, {} lines, {} points",
            self.result_polys.len(),
            self.result_lines.len(),
            self.result_points.len()
        );

        Ok(self.compute_geometry(op))
    }

    fn copy_points(&mut self, arg_index: usize) {
        for node in self.args[arg_index].nodes().iter() {
            let id = self.graph.add_node(node.coordinate());
            if let Some(location) = node.label().location(arg_index) {
                self.graph
                    .node_mut(id)
                    .label
                    .set_location(arg_index, location);
            }
        }
    }

    fn compute_labelling(&mut self) -> Result<(), PlanaraError> {
        let geometries = [self.args[0].geometry(), self.args[1].geometry()];
        let nodes = self.graph.nodes().ids();

        let mut star_labels = Vec::with_capacity(nodes.len());
        for node in &nodes {
            star_labels.push(self.graph.compute_star_labelling(*node, geometries)?);
        }
        for node in &nodes {
            self.graph.merge_sym_labels(*node);
        }
        for (node, star_label) in nodes.iter().zip(&star_labels) {
            self.graph.node_mut(*node).label.merge(star_label);
        }
        Ok(())
    }

    /// Locates the nodes known to only one of the inputs in the other one.
    fn label_incomplete_nodes(&mut self) {
        let mut locator = PointLocator::new();
        for node in self.graph.nodes().ids() {
            let n = self.graph.node(node);
            if n.is_isolated() {
                let target = if n.label().is_null(0) { 0 } else { 1 };
                let location = locator.locate(&n.coordinate(), self.args[target].geometry());
                self.graph.node_mut(node).label.set_location(target, location);
            }
            self.graph.update_star_labelling(node);
        }
    }

    fn find_result_area_edges(&mut self, op: OverlayOpCode) {
        for id in 0..self.graph.dir_edges().len() {
            let de = self.graph.dir_edge(id);
            let label = de.label();
            if label.is_area()
                && !de.is_interior_area_edge()
                && is_side_in_result(label, Position::Right, op)
            {
                self.graph.dir_edge_mut(id).in_result = true;
            }
        }
    }

    /// A boundary traversed in both directions has the result area on both sides, so it is not
    /// a boundary of the result.
    fn cancel_duplicate_result_edges(&mut self) {
        for id in 0..self.graph.dir_edges().len() {
            if self.graph.dir_edge(id).in_result && self.graph.dir_edge(sym(id)).in_result {
                self.graph.dir_edge_mut(id).in_result = false;
                self.graph.dir_edge_mut(sym(id)).in_result = false;
            }
        }
    }

    fn compute_geometry(&self, op: OverlayOpCode) -> Geometry {
        let parts: Vec<Geometry> = self
            .result_points
            .iter()
            .copied()
            .map(Geometry::from)
            .chain(self.result_lines.iter().cloned().map(Geometry::from))
            .chain(self.result_polys.iter().cloned().map(Geometry::from))
            .collect();

        if parts.is_empty() {
            let dim0 = self.args[0].geometry().dimension();
            let dim1 = self.args[1].geometry().dimension();
            let dimension = match op {
                OverlayOpCode::Intersection => dim0.min(dim1),
                OverlayOpCode::Union | OverlayOpCode::SymDifference => dim0.max(dim1),
                OverlayOpCode::Difference => dim0,
            };
            return self.factory.create_empty(dimension);
        }

        self.factory.build_geometry(parts)
    }
}

/// Adds the edge to the list, or merges its label into an equal edge already in the list.
///
/// The depths of merged edges count how many times an area lies on each side, which shows areas
/// collapsed to lines.
fn insert_unique_edge(edge_list: &mut EdgeList, edge: Edge) {
    let Some(existing_id) = edge_list.find_equal_edge(&edge) else {
        edge_list.add(edge);
        return;
    };

    let existing = edge_list.get_mut(existing_id);
    let mut label_to_merge = *edge.label();
    if !existing.is_pointwise_equal(&edge) {
        label_to_merge.flip();
    }
    if existing.depth.is_null() {
        let existing_label = existing.label;
        existing.depth.add(&existing_label);
    }
    existing.depth.add(&label_to_merge);
    existing.label.merge(&label_to_merge);
}

fn compute_labels_from_depths(edge_list: &mut EdgeList) {
    for edge in edge_list.edges_mut() {
        if edge.depth.is_null() {
            continue;
        }

        edge.depth.normalize();
        for i in 0..2 {
            if edge.label.is_null(i) || !edge.label.is_area() || edge.depth.is_null_for(i) {
                continue;
            }

            if edge.depth.delta(i) == 0 {
                // Same location on both sides: the area collapsed to a line.
                edge.label.to_line(i);
            } else {
                let left = edge.depth.location(i, Position::Left);
                let right = edge.depth.location(i, Position::Right);
                edge.label.set_location_at(i, Position::Left, left);
                edge.label.set_location_at(i, Position::Right, right);
            }
        }
    }
}

fn replace_collapsed_edges(edge_list: EdgeList) -> Vec<Edge> {
    let (collapsed, mut edges): (Vec<Edge>, Vec<Edge>) = edge_list
        .into_edges()
        .into_iter()
        .partition(Edge::is_collapsed);
    edges.extend(collapsed.iter().map(Edge::collapsed_edge));
    edges
}

fn is_covered_by_lines(coord: &Coordinate, lines: &[LineString]) -> bool {
    lines
        .iter()
        .any(|line| locate_on_line_string(coord, line) != Location::Exterior)
}

fn is_covered_by_polygons(coord: &Coordinate, polygons: &[Polygon]) -> bool {
    polygons
        .iter()
        .any(|polygon| locate_in_polygon(coord, polygon) != Location::Exterior)
}
