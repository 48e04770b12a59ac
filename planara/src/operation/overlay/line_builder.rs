use planara_types::{GeometryFactory, LineString, Polygon};

use super::{is_covered_by_polygons, is_label_in_result, OverlayOpCode};
use crate::geomgraph::{sym, EdgeId, PlanarGraph};

/// Builds the result lines from the line edges of the graph.
///
/// Line edges inside a result area are covered by it and are skipped. For intersections, area
/// boundaries of both inputs touching along an edge also form result lines.
#[derive(Debug)]
pub struct LineBuilder {
    factory: GeometryFactory,
}

impl LineBuilder {
    /// Creates a builder producing lines with the factory.
    pub fn new(factory: GeometryFactory) -> Self {
        Self { factory }
    }

    /// Builds the result lines. `result_polys` are the result areas built before.
    pub fn build(
        &self,
        graph: &mut PlanarGraph,
        result_polys: &[Polygon],
        op: OverlayOpCode,
    ) -> Vec<LineString> {
        find_covered_line_edges(graph, result_polys);

        let mut line_edges = vec![];
        for de in 0..graph.dir_edges().len() {
            if let Some(edge) = collect_line_edge(graph, de, op) {
                line_edges.push(edge);
            } else if let Some(edge) = collect_boundary_touch_edge(graph, de, op) {
                line_edges.push(edge);
            }
        }

        line_edges
            .into_iter()
            .map(|edge| {
                graph.edge_mut(edge).set_in_result(true);
                LineString::new(
                    graph
                        .edge(edge)
                        .coords()
                        .iter()
                        .map(|c| {
                            let mut c = *c;
                            self.factory.precision_model().make_precise_coord(&mut c);
                            c
                        })
                        .collect(),
                )
            })
            .collect()
    }
}

fn find_covered_line_edges(graph: &mut PlanarGraph, result_polys: &[Polygon]) {
    for node in graph.nodes().ids() {
        graph.find_covered_line_edges(node);
    }

    // Line edges not incident to any result area edge are located directly.
    for de in 0..graph.dir_edges().len() {
        let dir_edge = graph.dir_edge(de);
        let edge = dir_edge.edge();
        if dir_edge.is_line_edge() && !graph.edge(edge).is_covered_set() {
            let covered = is_covered_by_polygons(&dir_edge.end().coordinate(), result_polys);
            graph.edge_mut(edge).set_covered(covered);
        }
    }
}

fn mark_visited(graph: &mut PlanarGraph, de: usize) {
    graph.dir_edge_mut(de).visited = true;
    graph.dir_edge_mut(sym(de)).visited = true;
}

fn collect_line_edge(graph: &mut PlanarGraph, de: usize, op: OverlayOpCode) -> Option<EdgeId> {
    let dir_edge = graph.dir_edge(de);
    let edge = dir_edge.edge();
    if !dir_edge.is_line_edge()
        || dir_edge.is_visited()
        || !is_label_in_result(dir_edge.label(), op)
        || graph.edge(edge).is_covered()
    {
        return None;
    }

    mark_visited(graph, de);
    Some(edge)
}

/// An area edge not in the result may still be a result line if both areas touch along it.
fn collect_boundary_touch_edge(
    graph: &mut PlanarGraph,
    de: usize,
    op: OverlayOpCode,
) -> Option<EdgeId> {
    if op != OverlayOpCode::Intersection {
        return None;
    }

    let dir_edge = graph.dir_edge(de);
    let edge = dir_edge.edge();
    if dir_edge.is_line_edge()
        || dir_edge.is_visited()
        || dir_edge.is_interior_area_edge()
        || graph.edge(edge).is_in_result()
        || !is_label_in_result(dir_edge.label(), op)
    {
        return None;
    }

    mark_visited(graph, de);
    Some(edge)
}
