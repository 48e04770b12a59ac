use std::cmp::Ordering;
use std::collections::BTreeMap;

use planara_types::algorithm::LineIntersector;
use planara_types::{Coordinate, Envelope};

use super::depth::Depth;
use super::label::Label;

/// A point at which an edge is intersected by another edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeIntersection {
    /// The intersection point.
    pub coord: Coordinate,
    /// Index of the edge segment containing the point. A point equal to the start of a segment
    /// is recorded with that segment.
    pub segment_index: usize,
    /// Distance of the point along the segment, see
    /// [`compute_edge_distance`](planara_types::algorithm::line_intersector::compute_edge_distance).
    pub dist: f64,
}

#[derive(Debug, Copy, Clone)]
struct IntersectionKey {
    segment_index: usize,
    dist: f64,
}

impl PartialEq for IntersectionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IntersectionKey {}

impl PartialOrd for IntersectionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntersectionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segment_index
            .cmp(&other.segment_index)
            .then_with(|| self.dist.total_cmp(&other.dist))
    }
}

/// Intersections of an edge, ordered along the edge. Every intersection is stored once.
#[derive(Debug, Clone, Default)]
pub struct EdgeIntersectionList {
    intersections: BTreeMap<IntersectionKey, EdgeIntersection>,
}

impl EdgeIntersectionList {
    /// Adds an intersection unless the same one is already present.
    pub fn add(&mut self, coord: Coordinate, segment_index: usize, dist: f64) {
        self.intersections
            .entry(IntersectionKey {
                segment_index,
                dist,
            })
            .or_insert(EdgeIntersection {
                coord,
                segment_index,
                dist,
            });
    }

    /// Adds the endpoints of the edge with the given points.
    pub fn add_endpoints(&mut self, pts: &[Coordinate]) {
        let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
            return;
        };
        self.add(*first, 0, 0.0);
        self.add(*last, pts.len() - 1, 0.0);
    }

    /// Intersections in the order along the edge.
    pub fn iter(&self) -> impl Iterator<Item = &EdgeIntersection> {
        self.intersections.values()
    }

    /// Number of intersections.
    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    /// Whether there are no intersections.
    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Whether the point is one of the intersections.
    pub fn is_intersection(&self, pt: &Coordinate) -> bool {
        self.iter().any(|ei| ei.coord.equals_2d(pt))
    }
}

/// An edge of a topology graph: a line between two nodes with its labelling.
#[derive(Debug, Clone)]
pub struct Edge {
    pts: Vec<Coordinate>,
    envelope: Envelope,
    pub(crate) label: Label,
    pub(crate) depth: Depth,
    intersections: EdgeIntersectionList,
    in_result: bool,
    covered: Option<bool>,
}

impl Edge {
    /// Creates a new edge. The points must not contain repeated points and there must be at least
    /// two of them.
    pub fn new(pts: Vec<Coordinate>, label: Label) -> Self {
        Self {
            envelope: Envelope::from_points(&pts),
            pts,
            label,
            depth: Depth::default(),
            intersections: EdgeIntersectionList::default(),
            in_result: false,
            covered: None,
        }
    }

    /// Points of the edge.
    pub fn coords(&self) -> &[Coordinate] {
        &self.pts
    }

    /// Number of points.
    pub fn num_points(&self) -> usize {
        self.pts.len()
    }

    /// Number of segments.
    pub fn num_segments(&self) -> usize {
        self.pts.len().saturating_sub(1)
    }

    /// Point with the given index.
    pub fn coordinate(&self, index: usize) -> Coordinate {
        self.pts[index]
    }

    /// Bounding box of the edge.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Labelling of the edge.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Accumulated depths of the edge.
    pub fn depth(&self) -> &Depth {
        &self.depth
    }

    /// Intersections found on the edge.
    pub fn intersections(&self) -> &EdgeIntersectionList {
        &self.intersections
    }

    /// Adds the endpoints to the intersection list.
    pub fn add_endpoint_intersections(&mut self) {
        self.intersections.add_endpoints(&self.pts);
    }

    /// Whether the first and the last points are equal.
    pub fn is_closed(&self) -> bool {
        match (self.pts.first(), self.pts.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => false,
        }
    }

    /// An area edge that goes out and returns along the same segment. Such edges appear when an
    /// area collapses to a line.
    pub fn is_collapsed(&self) -> bool {
        self.label.is_area() && self.pts.len() == 3 && self.pts[0].equals_2d(&self.pts[2])
    }

    /// Line edge replacing a collapsed edge.
    pub fn collapsed_edge(&self) -> Edge {
        Edge::new(vec![self.pts[0], self.pts[1]], self.label.to_line_label())
    }

    /// Whether the other edge has the same points in the same order.
    pub fn is_pointwise_equal(&self, other: &Edge) -> bool {
        self.pts.len() == other.pts.len()
            && self
                .pts
                .iter()
                .zip(&other.pts)
                .all(|(a, b)| a.equals_2d(b))
    }

    /// Records all intersections found by the intersector for the segment of the edge. The
    /// edge is the input with `geom_index` in the intersector computation.
    pub fn add_intersections(
        &mut self,
        li: &LineIntersector,
        segment_index: usize,
        geom_index: usize,
    ) {
        for int_index in 0..li.intersection_num() {
            self.add_intersection(li, segment_index, geom_index, int_index);
        }
    }

    fn add_intersection(
        &mut self,
        li: &LineIntersector,
        segment_index: usize,
        geom_index: usize,
        int_index: usize,
    ) {
        let int_pt = li.intersection_point(int_index);
        let mut normalized_index = segment_index;
        let mut dist = li.edge_distance(geom_index, int_index);

        // An intersection at the end of the segment is the start of the next one.
        let next_index = segment_index + 1;
        if next_index < self.pts.len() && int_pt.equals_2d(&self.pts[next_index]) {
            normalized_index = next_index;
            dist = 0.0;
        }

        self.intersections.add(int_pt, normalized_index, dist);
    }

    /// Splits the edge at its intersections and its endpoints, adding the parts to `out`.
    pub fn add_split_edges(&mut self, out: &mut Vec<Edge>) {
        self.add_endpoint_intersections();

        let mut intersections = self.intersections.iter();
        let Some(mut prev) = intersections.next() else {
            return;
        };
        for ei in intersections {
            out.push(self.create_split_edge(prev, ei));
            prev = ei;
        }
    }

    fn create_split_edge(&self, ei0: &EdgeIntersection, ei1: &EdgeIntersection) -> Edge {
        let last_segment_start = self.pts[ei1.segment_index];
        // The end point is only added if it is not a vertex of the edge already.
        let use_end_point = ei1.dist > 0.0 || !ei1.coord.equals_2d(&last_segment_start);

        let mut pts = Vec::with_capacity(ei1.segment_index - ei0.segment_index + 2);
        pts.push(ei0.coord);
        pts.extend_from_slice(&self.pts[ei0.segment_index + 1..=ei1.segment_index]);
        if use_end_point {
            pts.push(ei1.coord);
        }

        Edge::new(pts, self.label)
    }

    /// Whether an area edge of the edge ring is part of the result, or the line edge was added
    /// to the result.
    pub fn is_in_result(&self) -> bool {
        self.in_result
    }

    pub(crate) fn set_in_result(&mut self, in_result: bool) {
        self.in_result = in_result;
    }

    /// Whether the line edge is covered by a result area.
    pub fn is_covered(&self) -> bool {
        self.covered.unwrap_or(false)
    }

    /// Whether the covering of the edge was computed.
    pub fn is_covered_set(&self) -> bool {
        self.covered.is_some()
    }

    pub(crate) fn set_covered(&mut self, covered: bool) {
        self.covered = Some(covered);
    }
}

#[cfg(test)]
mod tests {
    use planara_types::Location;

    use super::*;

    fn line(coords: &[(f64, f64)]) -> Edge {
        Edge::new(
            coords.iter().map(|c| Coordinate::from(*c)).collect(),
            Label::line(0, Location::Interior),
        )
    }

    #[test]
    fn split_at_intersections() {
        let mut edge = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let mut li = LineIntersector::new();
        li.compute_intersection(
            &Coordinate::new(5.0, -1.0),
            &Coordinate::new(5.0, 1.0),
            &Coordinate::new(0.0, 0.0),
            &Coordinate::new(10.0, 0.0),
        );
        edge.add_intersections(&li, 0, 1);

        // Intersection at a vertex is recorded with the segment starting there.
        li.compute_intersection(
            &Coordinate::new(9.0, 0.0),
            &Coordinate::new(11.0, 0.0),
            &Coordinate::new(10.0, 0.0),
            &Coordinate::new(10.0, 10.0),
        );
        assert!(li.has_intersection());
        edge.add_intersections(&li, 1, 1);
        assert_eq!(edge.intersections().len(), 2);

        let mut parts = vec![];
        edge.add_split_edges(&mut parts);
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0].coords(),
            &[Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 0.0)]
        );
        assert_eq!(
            parts[1].coords(),
            &[Coordinate::new(5.0, 0.0), Coordinate::new(10.0, 0.0)]
        );
        assert_eq!(
            parts[2].coords(),
            &[Coordinate::new(10.0, 0.0), Coordinate::new(10.0, 10.0)]
        );
        assert!(parts.iter().all(|p| p.label() == edge.label()));
    }

    #[test]
    fn unsplit_edge_is_copied() {
        let mut edge = line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let mut parts = vec![];
        edge.add_split_edges(&mut parts);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_pointwise_equal(&edge));
    }

    #[test]
    fn collapsed_edges() {
        let edge = Edge::new(
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 0.0),
                Coordinate::new(0.0, 0.0),
            ],
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        );
        assert!(edge.is_collapsed());
        let collapsed = edge.collapsed_edge();
        assert_eq!(collapsed.num_points(), 2);
        assert!(!collapsed.label().is_area());
        assert_eq!(collapsed.label().location(0), Some(Location::Boundary));
        assert!(!line(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]).is_collapsed());
    }
}
