//! Finding intersections between the edges of topology graphs.

use planara_types::algorithm::LineIntersector;
use planara_types::{Coordinate, Envelope};

use super::edge::Edge;
use crate::error::PlanaraError;
use crate::index::strtree::StrTree;

/// Computes intersections of edge segments and records the non-trivial ones.
///
/// An intersection of a segment with an adjacent segment of the same edge at their common
/// vertex is trivial and is not recorded.
#[derive(Debug, Clone)]
pub struct SegmentIntersector {
    li: LineIntersector,
    include_proper: bool,
    is_done_if_proper: bool,
    is_done: bool,
    has_intersection: bool,
    proper_point: Option<Coordinate>,
    num_tests: usize,
}

impl SegmentIntersector {
    /// Creates an intersector. Proper intersections are only recorded in the edges if
    /// `include_proper` is set.
    pub fn new(li: LineIntersector, include_proper: bool) -> Self {
        Self {
            li,
            include_proper,
            is_done_if_proper: false,
            is_done: false,
            has_intersection: false,
            proper_point: None,
            num_tests: 0,
        }
    }

    /// Stops the search at the first proper intersection.
    pub fn with_done_if_proper(mut self, is_done_if_proper: bool) -> Self {
        self.is_done_if_proper = is_done_if_proper;
        self
    }

    /// Whether the search can be stopped.
    pub fn is_done(&self) -> bool {
        self.is_done
    }

    /// Whether any non-trivial intersection was found.
    pub fn has_intersection(&self) -> bool {
        self.has_intersection
    }

    /// Whether a proper intersection was found.
    pub fn has_proper_intersection(&self) -> bool {
        self.proper_point.is_some()
    }

    /// The last proper intersection found.
    pub fn proper_intersection_point(&self) -> Option<Coordinate> {
        self.proper_point
    }

    /// Number of segment pairs tested.
    pub fn num_tests(&self) -> usize {
        self.num_tests
    }

    /// Intersector with the result of the last test.
    pub fn line_intersector(&self) -> &LineIntersector {
        &self.li
    }

    /// Tests segment `seg0` of `e0` against segment `seg1` of `e1`. Returns whether the found
    /// intersection points must be added to the edges.
    fn process(&mut self, e0: &Edge, seg0: usize, e1: &Edge, seg1: usize, same_edge: bool) -> bool {
        if same_edge && seg0 == seg1 {
            return false;
        }

        self.num_tests += 1;
        self.li.compute_intersection(
            &e0.coordinate(seg0),
            &e0.coordinate(seg0 + 1),
            &e1.coordinate(seg1),
            &e1.coordinate(seg1 + 1),
        );
        if !self.li.has_intersection() || self.is_trivial(e0, seg0, seg1, same_edge) {
            return false;
        }

        self.has_intersection = true;
        if self.li.is_proper() {
            self.proper_point = Some(self.li.intersection_point(0));
            if self.is_done_if_proper {
                self.is_done = true;
            }
        }

        self.include_proper || !self.li.is_proper()
    }

    fn is_trivial(&self, edge: &Edge, seg0: usize, seg1: usize, same_edge: bool) -> bool {
        if !same_edge || self.li.intersection_num() != 1 {
            return false;
        }
        if seg0.abs_diff(seg1) == 1 {
            return true;
        }

        let last_segment = edge.num_segments() - 1;
        edge.is_closed()
            && ((seg0 == 0 && seg1 == last_segment) || (seg1 == 0 && seg0 == last_segment))
    }
}

fn segment_envelope(edge: &Edge, segment: usize) -> Envelope {
    Envelope::from_coords(&edge.coordinate(segment), &edge.coordinate(segment + 1))
}

fn segment_index(edges: &[Edge]) -> Result<StrTree<(usize, usize)>, PlanaraError> {
    let mut tree = StrTree::new();
    for (edge_index, edge) in edges.iter().enumerate() {
        for segment in 0..edge.num_segments() {
            tree.insert(&segment_envelope(edge, segment), (edge_index, segment))?;
        }
    }
    Ok(tree)
}

/// Computes the intersections between the edges of one set.
///
/// If `test_all_segments` is not set, segments of the same edge are not tested against each
/// other. Candidate segment pairs are found with an STR tree over the segment envelopes.
pub fn compute_self_intersections(
    edges: &mut [Edge],
    si: &mut SegmentIntersector,
    test_all_segments: bool,
) -> Result<(), PlanaraError> {
    let tree = segment_index(edges)?;
    for e0 in 0..edges.len() {
        for seg0 in 0..edges[e0].num_segments() {
            let candidates: Vec<(usize, usize)> = tree
                .query(&segment_envelope(&edges[e0], seg0))
                .into_iter()
                .copied()
                .filter(|candidate| *candidate > (e0, seg0))
                .filter(|(e1, _)| test_all_segments || *e1 != e0)
                .collect();

            for (e1, seg1) in candidates {
                if si.process(&edges[e0], seg0, &edges[e1], seg1, e0 == e1) {
                    edges[e0].add_intersections(&si.li, seg0, 0);
                    edges[e1].add_intersections(&si.li, seg1, 1);
                }
                if si.is_done() {
                    return Ok(());
                }
            }
        }
    }

    log::trace!(
        "Self intersections of {} edges: {} segment pairs tested",
        edges.len(),
        si.num_tests()
    );
    Ok(())
}

/// Computes the intersections between the edges of two different sets.
pub fn compute_cross_intersections(
    edges0: &mut [Edge],
    edges1: &mut [Edge],
    si: &mut SegmentIntersector,
) -> Result<(), PlanaraError> {
    let tree = segment_index(edges1)?;
    for e0 in 0..edges0.len() {
        if tree.is_empty() {
            break;
        }

        for seg0 in 0..edges0[e0].num_segments() {
            let candidates: Vec<(usize, usize)> = tree
                .query(&segment_envelope(&edges0[e0], seg0))
                .into_iter()
                .copied()
                .collect();

            for (e1, seg1) in candidates {
                if si.process(&edges0[e0], seg0, &edges1[e1], seg1, false) {
                    edges0[e0].add_intersections(&si.li, seg0, 0);
                    edges1[e1].add_intersections(&si.li, seg1, 1);
                }
                if si.is_done() {
                    return Ok(());
                }
            }
        }
    }

    log::trace!(
        "Cross intersections of {} and {} edges: {} segment pairs tested",
        edges0.len(),
        edges1.len(),
        si.num_tests()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use planara_types::Location;

    use super::*;
    use crate::geomgraph::label::Label;

    fn edge(coords: &[(f64, f64)]) -> Edge {
        Edge::new(
            coords.iter().map(|c| Coordinate::from(*c)).collect(),
            Label::line(0, Location::Interior),
        )
    }

    #[test]
    fn self_intersection_of_one_edge() {
        // A bow tie: the first and the third segments cross.
        let mut edges = vec![edge(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)])];

        let mut si = SegmentIntersector::new(LineIntersector::new(), true);
        compute_self_intersections(&mut edges, &mut si, false).expect("noding");
        assert!(!si.has_intersection());

        let mut si = SegmentIntersector::new(LineIntersector::new(), true);
        compute_self_intersections(&mut edges, &mut si, true).expect("noding");
        assert!(si.has_intersection());
        let crossing = Coordinate::new(1.0, 1.0);
        let proper = si.proper_intersection_point().expect("proper intersection");
        assert!(proper.distance(&crossing) < 1e-12);
        // Both crossing segments record the point.
        assert_eq!(edges[0].intersections().len(), 2);
        assert!(edges[0]
            .intersections()
            .iter()
            .all(|ei| ei.coord.distance(&crossing) < 1e-12));
    }

    #[test]
    fn closed_ring_vertices_are_trivial() {
        let mut edges = vec![edge(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ])];
        let mut si = SegmentIntersector::new(LineIntersector::new(), true);
        compute_self_intersections(&mut edges, &mut si, true).expect("noding");
        assert!(!si.has_intersection());
        assert!(edges[0].intersections().is_empty());
    }

    #[test]
    fn cross_intersections() {
        let mut a = vec![edge(&[(0.0, 0.0), (10.0, 0.0)])];
        let mut b = vec![
            edge(&[(5.0, -5.0), (5.0, 5.0)]),
            edge(&[(7.0, 0.0), (8.0, 0.0)]),
            edge(&[(20.0, 20.0), (30.0, 30.0)]),
        ];
        let mut si = SegmentIntersector::new(LineIntersector::new(), true);
        compute_cross_intersections(&mut a, &mut b, &mut si).expect("noding");

        assert!(si.has_proper_intersection());
        // (5, 0) from the crossing, (7, 0) and (8, 0) from the overlap.
        assert_eq!(a[0].intersections().len(), 3);
        assert_eq!(b[0].intersections().len(), 1);
        assert_eq!(b[1].intersections().len(), 2);
        assert!(b[2].intersections().is_empty());
    }

    #[test]
    fn stop_at_first_proper_intersection() {
        let mut a = vec![edge(&[(0.0, 0.0), (10.0, 0.0)])];
        let mut b = vec![
            edge(&[(2.0, -1.0), (2.0, 1.0)]),
            edge(&[(4.0, -1.0), (4.0, 1.0)]),
        ];
        let mut si =
            SegmentIntersector::new(LineIntersector::new(), false).with_done_if_proper(true);
        compute_cross_intersections(&mut a, &mut b, &mut si).expect("noding");
        assert!(si.is_done());
        assert!(si.has_proper_intersection());
        // Proper intersections are not recorded without `include_proper`.
        assert!(a[0].intersections().is_empty());
    }
}
