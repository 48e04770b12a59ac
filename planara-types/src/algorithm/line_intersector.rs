//! Robust computation of the intersection of two line segments.

use crate::{Coordinate, Envelope, Orientation, PrecisionModel, Segment};

/// Kind of intersection found between two segments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IntersectionKind {
    /// The segments do not intersect.
    None,
    /// The segments intersect in a single point.
    Point,
    /// The segments are collinear and overlap in a segment.
    Collinear,
}

/// Computes the intersection of line segments and records the result of the last computation.
///
/// The intersector uses exact orientation predicates to decide whether the segments intersect,
/// so the topology of the answer is always right. The position of a proper intersection point is
/// computed with conditioned floating point arithmetic and is snapped to the nearest segment
/// endpoint if rounding would move it outside both segment envelopes.
#[derive(Debug, Clone)]
pub struct LineIntersector {
    precision_model: PrecisionModel,
    result: IntersectionKind,
    input: [[Coordinate; 2]; 2],
    int_pt: [Coordinate; 2],
    is_proper: bool,
}

impl Default for LineIntersector {
    fn default() -> Self {
        Self::new()
    }
}

impl LineIntersector {
    /// Creates an intersector with the floating precision model.
    pub fn new() -> Self {
        Self::with_precision_model(PrecisionModel::Floating)
    }

    /// Creates an intersector that rounds computed intersection points with the given model.
    pub fn with_precision_model(precision_model: PrecisionModel) -> Self {
        Self {
            precision_model,
            result: IntersectionKind::None,
            input: [[Coordinate::default(); 2]; 2],
            int_pt: [Coordinate::default(); 2],
            is_proper: false,
        }
    }

    /// Precision model applied to computed intersection points.
    pub fn precision_model(&self) -> PrecisionModel {
        self.precision_model
    }

    /// Computes the intersection of the point `p` with the segment `p1`-`p2`.
    pub fn compute_point_intersection(&mut self, p: &Coordinate, p1: &Coordinate, p2: &Coordinate) {
        self.is_proper = false;
        self.result = IntersectionKind::None;

        if Envelope::segment_contains(p1, p2, p)
            && Orientation::index(p1, p2, p) == Orientation::Collinear
            && Orientation::index(p2, p1, p) == Orientation::Collinear
        {
            self.is_proper = !(p.equals_2d(p1) || p.equals_2d(p2));
            self.int_pt[0] = *p;
            self.result = IntersectionKind::Point;
        }
    }

    /// Computes the intersection of the segments `p1`-`p2` and `q1`-`q2`.
    pub fn compute_intersection(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) {
        self.input = [[*p1, *p2], [*q1, *q2]];
        self.result = self.compute_intersect(p1, p2, q1, q2);
    }

    fn compute_intersect(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        self.is_proper = false;

        if !Envelope::segments_intersect(p1, p2, q1, q2) {
            return IntersectionKind::None;
        }

        let pq1 = Orientation::index(p1, p2, q1).as_i32();
        let pq2 = Orientation::index(p1, p2, q2).as_i32();
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return IntersectionKind::None;
        }

        let qp1 = Orientation::index(q1, q2, p1).as_i32();
        let qp2 = Orientation::index(q1, q2, p2).as_i32();
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return IntersectionKind::None;
        }

        if pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0 {
            return self.compute_collinear_intersection(p1, p2, q1, q2);
        }

        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            // Endpoint intersections are exact: an input point is returned as is.
            self.int_pt[0] = if p1.equals_2d(q1) || p1.equals_2d(q2) {
                *p1
            } else if p2.equals_2d(q1) || p2.equals_2d(q2) {
                *p2
            } else if pq1 == 0 {
                *q1
            } else if pq2 == 0 {
                *q2
            } else if qp1 == 0 {
                *p1
            } else {
                *p2
            };
        } else {
            self.is_proper = true;
            self.int_pt[0] = self.intersection(p1, p2, q1, q2);
        }

        IntersectionKind::Point
    }

    fn compute_collinear_intersection(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        let q1_in_p = Envelope::segment_contains(p1, p2, q1);
        let q2_in_p = Envelope::segment_contains(p1, p2, q2);
        let p1_in_q = Envelope::segment_contains(q1, q2, p1);
        let p2_in_q = Envelope::segment_contains(q1, q2, p2);

        let (a, b, single) = if q1_in_p && q2_in_p {
            (q1, q2, false)
        } else if p1_in_q && p2_in_q {
            (p1, p2, false)
        } else if q1_in_p && p1_in_q {
            (q1, p1, q1.equals_2d(p1) && !q2_in_p && !p2_in_q)
        } else if q1_in_p && p2_in_q {
            (q1, p2, q1.equals_2d(p2) && !q2_in_p && !p1_in_q)
        } else if q2_in_p && p1_in_q {
            (q2, p1, q2.equals_2d(p1) && !q1_in_p && !p2_in_q)
        } else if q2_in_p && p2_in_q {
            (q2, p2, q2.equals_2d(p2) && !q1_in_p && !p1_in_q)
        } else {
            return IntersectionKind::None;
        };

        self.int_pt = [*a, *b];
        if single {
            IntersectionKind::Point
        } else {
            IntersectionKind::Collinear
        }
    }

    fn intersection(
        &self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> Coordinate {
        let mut int_pt = intersection_conditioned(p1, p2, q1, q2)
            .unwrap_or_else(|| nearest_endpoint(p1, p2, q1, q2));

        if !self.is_in_segment_envelopes(&int_pt) {
            int_pt = nearest_endpoint(p1, p2, q1, q2);
        }

        self.precision_model.make_precise_coord(&mut int_pt);
        int_pt
    }

    fn is_in_segment_envelopes(&self, p: &Coordinate) -> bool {
        Envelope::segment_contains(&self.input[0][0], &self.input[0][1], p)
            && Envelope::segment_contains(&self.input[1][0], &self.input[1][1], p)
    }

    /// Kind of the last computed intersection.
    pub fn kind(&self) -> IntersectionKind {
        self.result
    }

    /// Whether the last computation found an intersection.
    pub fn has_intersection(&self) -> bool {
        self.result != IntersectionKind::None
    }

    /// Number of intersection points found: 0, 1 or 2.
    pub fn intersection_num(&self) -> usize {
        match self.result {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    /// The intersection point with the given index.
    pub fn intersection_point(&self, index: usize) -> Coordinate {
        self.int_pt[index]
    }

    /// Whether the last intersection was collinear.
    pub fn is_collinear(&self) -> bool {
        self.result == IntersectionKind::Collinear
    }

    /// A proper intersection is a single point in the interior of both segments.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.is_proper
    }

    /// Tests whether the point is one of the computed intersection points.
    pub fn is_intersection(&self, pt: &Coordinate) -> bool {
        self.int_pt[..self.intersection_num()]
            .iter()
            .any(|p| p.equals_2d(pt))
    }

    /// Whether any intersection point is in the interior of either input segment.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_for(0) || self.is_interior_intersection_for(1)
    }

    /// Whether any intersection point is in the interior of the given input segment.
    pub fn is_interior_intersection_for(&self, input_index: usize) -> bool {
        let [a, b] = &self.input[input_index];
        self.int_pt[..self.intersection_num()]
            .iter()
            .any(|p| !(p.equals_2d(a) || p.equals_2d(b)))
    }

    /// Distance of an intersection point along the given input segment.
    pub fn edge_distance(&self, segment_index: usize, int_index: usize) -> f64 {
        let [p0, p1] = &self.input[segment_index];
        compute_edge_distance(&self.int_pt[int_index], p0, p1)
    }
}

/// A robust and monotonic measure of the distance of the point `p` along the segment `p0`-`p1`.
///
/// The value is not the euclidean distance, but it preserves the order of points on the segment.
pub fn compute_edge_distance(p: &Coordinate, p0: &Coordinate, p1: &Coordinate) -> f64 {
    let dx = (p1.x - p0.x).abs();
    let dy = (p1.y - p0.y).abs();

    if p.equals_2d(p0) {
        return 0.0;
    }
    if p.equals_2d(p1) {
        return dx.max(dy);
    }

    let pdx = (p.x - p0.x).abs();
    let pdy = (p.y - p0.y).abs();
    let dist = if dx > dy { pdx } else { pdy };
    if dist == 0.0 {
        // The point is not p0, so it must be at some distance along the segment.
        pdx.max(pdy)
    } else {
        dist
    }
}

/// Intersection of the infinite lines through the segments, computed relative to the centre of
/// the segments' common envelope to reduce loss of precision. Returns `None` for parallel lines.
fn intersection_conditioned(
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> Option<Coordinate> {
    let min_x0 = p1.x.min(p2.x);
    let min_y0 = p1.y.min(p2.y);
    let max_x0 = p1.x.max(p2.x);
    let max_y0 = p1.y.max(p2.y);

    let min_x1 = q1.x.min(q2.x);
    let min_y1 = q1.y.min(q2.y);
    let max_x1 = q1.x.max(q2.x);
    let max_y1 = q1.y.max(q2.y);

    let int_min_x = min_x0.max(min_x1);
    let int_max_x = max_x0.min(max_x1);
    let int_min_y = min_y0.max(min_y1);
    let int_max_y = max_y0.min(max_y1);

    let mid_x = (int_min_x + int_max_x) / 2.0;
    let mid_y = (int_min_y + int_max_y) / 2.0;

    let p1x = p1.x - mid_x;
    let p1y = p1.y - mid_y;
    let p2x = p2.x - mid_x;
    let p2y = p2.y - mid_y;
    let q1x = q1.x - mid_x;
    let q1y = q1.y - mid_y;
    let q2x = q2.x - mid_x;
    let q2y = q2.y - mid_y;

    let px = p1y - p2y;
    let py = p2x - p1x;
    let pw = p1x * p2y - p2x * p1y;

    let qx = q1y - q2y;
    let qy = q2x - q1x;
    let qw = q1x * q2y - q2x * q1y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = x / w;
    let y_int = y / w;
    if !x_int.is_finite() || !y_int.is_finite() {
        return None;
    }

    Some(Coordinate::new(x_int + mid_x, y_int + mid_y))
}

fn nearest_endpoint(p1: &Coordinate, p2: &Coordinate, q1: &Coordinate, q2: &Coordinate) -> Coordinate {
    let candidates = [
        (p1, Segment::new(*q1, *q2)),
        (p2, Segment::new(*q1, *q2)),
        (q1, Segment::new(*p1, *p2)),
        (q2, Segment::new(*p1, *p2)),
    ];

    let mut nearest = *p1;
    let mut min_dist = f64::INFINITY;
    for (pt, segment) in candidates {
        let dist = segment.distance_to_point(pt);
        if dist < min_dist {
            min_dist = dist;
            nearest = *pt;
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn proper_intersection() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 10.0), &c(0.0, 10.0), &c(10.0, 0.0));
        assert_eq!(li.kind(), IntersectionKind::Point);
        assert!(li.is_proper());
        assert!(li.is_interior_intersection());
        let p = li.intersection_point(0);
        assert_abs_diff_eq!(p.x, 5.0);
        assert_abs_diff_eq!(p.y, 5.0);
    }

    #[test]
    fn endpoint_intersection_is_not_proper() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(10.0, 0.0), &c(10.0, 10.0));
        assert_eq!(li.kind(), IntersectionKind::Point);
        assert!(!li.is_proper());
        assert_eq!(li.intersection_point(0), c(10.0, 0.0));
        assert!(!li.is_interior_intersection());
    }

    #[test]
    fn touching_interior() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(5.0, 0.0), &c(5.0, 10.0));
        assert_eq!(li.kind(), IntersectionKind::Point);
        assert!(!li.is_proper());
        assert!(li.is_interior_intersection_for(0));
        assert!(!li.is_interior_intersection_for(1));
    }

    #[test]
    fn collinear_overlap() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(5.0, 0.0), &c(15.0, 0.0));
        assert_eq!(li.kind(), IntersectionKind::Collinear);
        assert_eq!(li.intersection_num(), 2);
        assert!(li.is_intersection(&c(5.0, 0.0)));
        assert!(li.is_intersection(&c(10.0, 0.0)));
    }

    #[test]
    fn collinear_touching_at_endpoint() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(10.0, 0.0), &c(15.0, 0.0));
        assert_eq!(li.kind(), IntersectionKind::Point);
        assert_eq!(li.intersection_point(0), c(10.0, 0.0));
    }

    #[test]
    fn disjoint() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(0.0, 1.0), &c(10.0, 1.0));
        assert!(!li.has_intersection());
    }

    #[test]
    fn fixed_precision_rounds_intersection() {
        let mut li = LineIntersector::with_precision_model(PrecisionModel::Fixed { scale: 1.0 });
        li.compute_intersection(&c(0.0, 0.0), &c(3.0, 1.0), &c(0.0, 1.0), &c(3.0, 0.0));
        assert_eq!(li.intersection_point(0), c(2.0, 1.0));
    }

    #[test]
    fn edge_distance_is_monotonic() {
        let p0 = c(0.0, 0.0);
        let p1 = c(10.0, 2.0);
        let d1 = compute_edge_distance(&c(2.0, 0.4), &p0, &p1);
        let d2 = compute_edge_distance(&c(6.0, 1.2), &p0, &p1);
        assert!(d1 < d2);
        assert_eq!(compute_edge_distance(&p0, &p0, &p1), 0.0);
        assert_eq!(compute_edge_distance(&p1, &p0, &p1), 10.0);
    }
}
