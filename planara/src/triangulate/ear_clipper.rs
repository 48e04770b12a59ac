use planara_types::algorithm::angle::angle_between_oriented;
use planara_types::algorithm::triangle;
use planara_types::{Coordinate, Envelope, Orientation};

use super::tri::Tri;
use crate::error::PlanaraError;
use crate::index::packed_rtree::VertexSequencePackedRtree;

/// Triangulates a ring by repeatedly clipping ears off it.
///
/// The ring must be clockwise and must not cross itself, though it may touch itself at
/// vertices (as the rings produced by [`PolygonHoleJoiner`](super::PolygonHoleJoiner) do).
/// Vertices are kept in a circular linked list, and a packed R-tree over the vertex positions
/// speeds up the check that no other vertex lies inside a candidate ear.
///
/// Corners are scanned in ring order and the scan moves on after every clipped ear, which
/// avoids fans of thin triangles around a single vertex.
#[derive(Debug)]
pub struct PolygonEarClipper {
    vertices: Vec<Coordinate>,
    next: Vec<usize>,
    vertex_size: usize,
    vertex_first: usize,
    corner: [usize; 3],
    vertex_index: VertexSequencePackedRtree,
    skip_flat_corners: bool,
}

impl PolygonEarClipper {
    /// Creates a clipper for a closed ring.
    pub fn new(ring: Vec<Coordinate>) -> Self {
        let vertex_size = ring.len().saturating_sub(1);
        let next = (0..vertex_size).map(|i| (i + 1) % vertex_size).collect();
        Self {
            vertex_index: VertexSequencePackedRtree::new(ring.clone()),
            vertices: ring,
            next,
            vertex_size,
            vertex_first: 0,
            corner: [0, 1, 2],
            skip_flat_corners: false,
        }
    }

    /// Triangulates the ring with the default options.
    pub fn triangulate(ring: Vec<Coordinate>) -> Result<Vec<Tri>, PlanaraError> {
        Self::new(ring).compute()
    }

    /// Whether collinear corners are dropped instead of being triangulated. Dropping them gives
    /// fewer triangles, but the triangulation no longer contains every vertex of the ring.
    pub fn with_skip_flat_corners(mut self, skip: bool) -> Self {
        self.skip_flat_corners = skip;
        self
    }

    /// Computes the triangles. The triangles are oriented clockwise.
    pub fn compute(mut self) -> Result<Vec<Tri>, PlanaraError> {
        let mut tris = vec![];
        if self.vertex_size < 3 {
            return Ok(tris);
        }

        let mut scan_count = 0;
        let mut corner = self.fetch_corner();
        loop {
            if !is_convex(&corner) {
                if has_repeated_point(&corner) || (self.skip_flat_corners && is_flat(&corner)) {
                    self.remove_corner();
                    scan_count = 0;
                } else {
                    scan_count += 1;
                }
                if scan_count > 2 * self.vertex_size {
                    return Err(ear_clipping_error("unable to find a convex corner", corner[1]));
                }
            } else if self.is_valid_ear(self.corner[1], &corner) {
                tris.push(Tri::new(corner[0], corner[1], corner[2]));
                self.remove_corner();
                scan_count = 0;
            } else {
                scan_count += 1;
            }

            if scan_count > 2 * self.vertex_size {
                return Err(ear_clipping_error("unable to find a valid ear", corner[1]));
            }
            if self.vertex_size < 3 {
                log::trace!("Ear clipping produced {} triangles", tris.len());
                return Ok(tris);
            }
            corner = self.next_corner();
        }
    }

    fn fetch_corner(&self) -> [Coordinate; 3] {
        self.corner.map(|i| self.vertices[i])
    }

    /// Moves to the corner at the next vertex. Done even after an ear is clipped.
    fn next_corner(&mut self) -> [Coordinate; 3] {
        self.corner[0] = self.next[self.corner[0]];
        self.corner[1] = self.next[self.corner[0]];
        self.corner[2] = self.next[self.corner[1]];
        self.fetch_corner()
    }

    fn remove_corner(&mut self) {
        let apex = self.corner[1];
        if self.vertex_first == apex {
            self.vertex_first = self.next[apex];
        }
        self.next[self.corner[0]] = self.next[apex];
        self.vertex_index.remove(apex);
        self.vertex_size -= 1;

        self.corner[1] = self.next[self.corner[0]];
        self.corner[2] = self.next[self.corner[1]];
    }

    fn is_valid_ear(&self, apex_index: usize, corner: &[Coordinate; 3]) -> bool {
        match self.find_intersecting_vertex(apex_index, corner) {
            None => true,
            // A duplicate of the apex, left by hole joining. Only its edges can tell whether the
            // ear is free.
            Some(index) if self.vertices[index].equals_2d(&corner[1]) => {
                self.is_valid_ear_scan(apex_index, corner)
            }
            Some(_) => false,
        }
    }

    /// Finds a live vertex inside the corner triangle. Vertices equal to the corner points do
    /// not count, except a duplicate of the apex, which is returned if nothing else is found.
    fn find_intersecting_vertex(
        &self,
        apex_index: usize,
        corner: &[Coordinate; 3],
    ) -> Option<usize> {
        let env = Envelope::from_points(corner);
        let closing_index = self.vertices.len() - 1;
        let mut duplicate_apex = None;

        for index in self.vertex_index.query(&env) {
            if index == apex_index || index == closing_index {
                continue;
            }
            let v = &self.vertices[index];
            if v.equals_2d(&corner[1]) {
                duplicate_apex = Some(index);
            } else if v.equals_2d(&corner[0]) || v.equals_2d(&corner[2]) {
                continue;
            } else if triangle::intersects(&corner[0], &corner[1], &corner[2], v) {
                return Some(index);
            }
        }
        duplicate_apex
    }

    /// Checks the edges at every duplicate of the apex. The ear is invalid if any of them lies
    /// inside the corner angle.
    fn is_valid_ear_scan(&self, apex_index: usize, corner: &[Coordinate; 3]) -> bool {
        let corner_angle = angle_between_oriented(&corner[0], &corner[1], &corner[2]);
        let mut current = self.next[self.vertex_first];
        let mut prev_pt = self.vertices[self.vertex_first];

        for _ in 0..self.vertex_size {
            let v = self.vertices[current];
            if current != apex_index && v.equals_2d(&corner[1]) {
                let next_pt = self.vertices[self.next[current]];
                let angle_out = angle_between_oriented(&corner[0], &corner[1], &next_pt);
                let angle_in = angle_between_oriented(&corner[0], &corner[1], &prev_pt);
                if angle_out > 0.0 && angle_out < corner_angle {
                    return false;
                }
                if angle_in > 0.0 && angle_in < corner_angle {
                    return false;
                }
                if angle_out == 0.0 && angle_in == corner_angle {
                    return false;
                }
            }
            prev_pt = v;
            current = self.next[current];
        }
        true
    }
}

fn is_convex(corner: &[Coordinate; 3]) -> bool {
    Orientation::index(&corner[0], &corner[1], &corner[2]) == Orientation::Clockwise
}

fn is_flat(corner: &[Coordinate; 3]) -> bool {
    Orientation::index(&corner[0], &corner[1], &corner[2]) == Orientation::Collinear
}

fn has_repeated_point(corner: &[Coordinate; 3]) -> bool {
    corner[1].equals_2d(&corner[0]) || corner[1].equals_2d(&corner[2])
}

fn ear_clipping_error(message: &str, coordinate: Coordinate) -> PlanaraError {
    PlanaraError::EarClipping {
        message: message.into(),
        coordinate,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|p| Coordinate::from(*p)).collect()
    }

    fn total_area(tris: &[Tri]) -> f64 {
        tris.iter().map(Tri::area).sum()
    }

    #[test]
    fn square() {
        let tris = PolygonEarClipper::triangulate(ring(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ]))
        .expect("triangulated");

        assert_eq!(tris.len(), 2);
        assert_abs_diff_eq!(total_area(&tris), 100.0);
        for tri in &tris {
            let [a, b, c] = tri.coordinates();
            assert!(!triangle::is_ccw(a, b, c));
        }
    }

    #[test]
    fn concave() {
        let tris = PolygonEarClipper::triangulate(ring(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (5.0, 10.0),
            (5.0, 5.0),
            (10.0, 5.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ]))
        .expect("triangulated");

        assert_eq!(tris.len(), 4);
        assert_abs_diff_eq!(total_area(&tris), 75.0);
    }

    #[test]
    fn flat_corners() {
        let points = ring(&[
            (0.0, 0.0),
            (0.0, 5.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (5.0, 0.0),
            (0.0, 0.0),
        ]);

        let tris = PolygonEarClipper::triangulate(points.clone()).expect("triangulated");
        assert_eq!(tris.len(), 4);
        assert_abs_diff_eq!(total_area(&tris), 100.0);

        let tris = PolygonEarClipper::new(points)
            .with_skip_flat_corners(true)
            .compute()
            .expect("triangulated");
        assert_eq!(tris.len(), 2);
        assert_abs_diff_eq!(total_area(&tris), 100.0);
    }

    #[test]
    fn degenerate_ring() {
        let points = ring(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        assert_matches!(
            PolygonEarClipper::triangulate(points.clone()),
            Err(PlanaraError::EarClipping { .. })
        );

        let tris = PolygonEarClipper::new(points)
            .with_skip_flat_corners(true)
            .compute()
            .expect("flat corners dropped");
        assert!(tris.is_empty());
    }

    #[test]
    fn too_few_vertices() {
        assert!(PolygonEarClipper::triangulate(vec![]).expect("empty").is_empty());
    }
}
