use std::collections::BTreeSet;
use std::ops::Bound;

use ahash::AHashMap;
use planara_types::algorithm::LineIntersector;
use planara_types::{Coordinate, Envelope, LinearRing, Orientation, Polygon, Segment};

use crate::error::PlanaraError;
use crate::index::strtree::StrTree;

/// Tolerance used to match vertices with the same x ordinate.
const EPS: f64 = 1e-4;

/// Joins the holes of a polygon to its shell, producing a single ring that can be triangulated
/// by ear clipping.
///
/// Every hole is connected to the shell by a cut from its leftmost vertex to a visible shell
/// vertex to the left of it. The hole ring is spliced into the shell at the join vertex, so the
/// resulting ring enters and leaves the hole through the same cut. The ring touches itself at
/// the cut vertices but never crosses itself.
///
/// A cut is only made where it does not cross the boundary, pass through another ring vertex or
/// run along an earlier cut. If no shell vertex to the left satisfies this, the hole is joined to
/// the lowest ordered vertex regardless, and ear clipping may then fail.
///
/// The polygon must be valid and normalized: shell clockwise and holes counterclockwise.
#[derive(Debug)]
pub struct PolygonHoleJoiner<'a> {
    polygon: &'a Polygon,
    shell_coords: Vec<Coordinate>,
    ordered_coords: BTreeSet<Coordinate>,
    // Hole vertices already joined to a shell vertex, and the reverse.
    cut_map: AHashMap<Coordinate, Vec<Coordinate>>,
    boundary: StrTree<Segment>,
    cuts: Vec<Segment>,
}

impl<'a> PolygonHoleJoiner<'a> {
    /// Joins the holes of the polygon to the shell and returns the resulting closed ring.
    pub fn join(polygon: &'a Polygon) -> Result<Vec<Coordinate>, PlanaraError> {
        let mut joiner = Self::new(polygon)?;
        joiner.compute()?;
        Ok(joiner.shell_coords)
    }

    fn new(polygon: &'a Polygon) -> Result<Self, PlanaraError> {
        let mut boundary = StrTree::new();
        for ring in polygon.rings() {
            for pts in ring.coords().windows(2) {
                let segment = Segment::new(pts[0], pts[1]);
                boundary.insert(&segment.envelope(), segment)?;
            }
        }

        Ok(Self {
            polygon,
            shell_coords: polygon.exterior().coords().to_vec(),
            ordered_coords: BTreeSet::new(),
            cut_map: AHashMap::new(),
            boundary,
            cuts: vec![],
        })
    }

    fn compute(&mut self) -> Result<(), PlanaraError> {
        if self.polygon.num_interior_rings() == 0 {
            return Ok(());
        }

        let polygon = self.polygon;
        self.ordered_coords.extend(self.shell_coords.iter().copied());
        let mut holes: Vec<&LinearRing> = polygon.interiors().iter().collect();
        holes.sort_by(|a, b| a.envelope().compare(&b.envelope()));
        for hole in holes {
            self.join_hole(hole)?;
        }
        Ok(())
    }

    fn join_hole(&mut self, hole: &LinearRing) -> Result<(), PlanaraError> {
        let hole_coords = hole.coords();
        let left_vertices = leftmost_vertices(hole);
        let Some(&first_left) = left_vertices.first() else {
            return Ok(());
        };

        let hole_coord = hole_coords[first_left];
        let candidates = self.left_shell_vertices(&hole_coord)?;
        let Some(&nearest) = candidates.first() else {
            return Err(no_join_vertex(hole_coord));
        };

        let mut shell_coord = nearest;
        let mut hole_index = first_left;
        // With several vertices on the same vertical line, the shortest joinable cut is taken.
        if (shell_coord.x - hole_coord.x).abs() < EPS {
            let mut shortest = f64::MAX;
            for &left in &left_vertices {
                for candidate in &candidates {
                    let length = (candidate.y - hole_coords[left].y).abs();
                    if length < shortest && self.is_joinable(&hole_coords[left], candidate) {
                        shortest = length;
                        hole_index = left;
                        shell_coord = *candidate;
                    }
                }
            }
            if shortest == f64::MAX {
                log::debug!("No joinable cut on the vertical line through {hole_coord}");
            }
        }

        let shell_index = self.shell_coord_index(shell_coord, hole_coords[hole_index])?;
        self.cuts.push(Segment::new(hole_coords[hole_index], shell_coord));
        self.add_hole_to_shell(shell_index, hole_coords, hole_index);
        Ok(())
    }

    /// Shell vertices to the left of the hole vertex that can be joined to it. If the nearest
    /// one has the same x ordinate as the hole vertex, all shell vertices on that vertical line
    /// are returned.
    fn left_shell_vertices(
        &self,
        hole_coord: &Coordinate,
    ) -> Result<Vec<Coordinate>, PlanaraError> {
        let Some(first) = self.ordered_coords.first().copied() else {
            return Err(no_join_vertex(*hole_coord));
        };

        let mut closest = self.higher(hole_coord).ok_or_else(|| no_join_vertex(*hole_coord))?;
        while closest.x == hole_coord.x {
            closest = self.higher(&closest).ok_or_else(|| no_join_vertex(*hole_coord))?;
        }
        loop {
            closest = self.lower(&closest).ok_or_else(|| no_join_vertex(*hole_coord))?;
            if self.is_joinable(hole_coord, &closest) || closest == first {
                break;
            }
        }

        if closest.x != hole_coord.x {
            return Ok(vec![closest]);
        }

        let chosen_x = closest.x;
        let mut vertices = vec![];
        let mut current = Some(closest);
        while let Some(c) = current.filter(|c| c.x == chosen_x) {
            vertices.push(c);
            current = self.lower(&c);
        }
        Ok(vertices)
    }

    fn higher(&self, c: &Coordinate) -> Option<Coordinate> {
        self.ordered_coords
            .range((Bound::Excluded(c), Bound::Unbounded))
            .next()
            .copied()
    }

    fn lower(&self, c: &Coordinate) -> Option<Coordinate> {
        self.ordered_coords.range(..c).next_back().copied()
    }

    /// A cut is joinable if it neither crosses nor touches the boundary of the polygon or an
    /// earlier cut anywhere but at its end points.
    fn is_joinable(&self, hole_coord: &Coordinate, shell_coord: &Coordinate) -> bool {
        let mut li = LineIntersector::new();
        let env = Envelope::from_points([hole_coord, shell_coord]);
        self.boundary
            .query(&env)
            .into_iter()
            .chain(&self.cuts)
            .all(|segment| !blocks_cut(&mut li, hole_coord, shell_coord, segment))
    }

    /// Index of the shell vertex to splice the hole into. When several holes are joined to the
    /// same shell vertex, the vertex occurs several times in the shell; the occurrence is picked
    /// by the vertical order of the joined hole vertices.
    fn shell_coord_index(
        &mut self,
        shell_vertex: Coordinate,
        hole_vertex: Coordinate,
    ) -> Result<usize, PlanaraError> {
        let mut num_skip = 0;
        match self.cut_map.get_mut(&shell_vertex) {
            Some(joined) => {
                num_skip = joined.iter().filter(|c| c.y < hole_vertex.y).count();
                joined.push(hole_vertex);
            }
            None => {
                self.cut_map.insert(shell_vertex, vec![hole_vertex]);
            }
        }
        self.cut_map
            .entry(hole_vertex)
            .or_insert_with(|| vec![hole_vertex]);

        self.shell_coords
            .iter()
            .enumerate()
            .filter(|(_, c)| c.equals_2d_with_tolerance(&shell_vertex, EPS))
            .nth(num_skip)
            .map(|(i, _)| i)
            .ok_or_else(|| PlanaraError::EarClipping {
                message: "join vertex is not in the shell".into(),
                coordinate: shell_vertex,
            })
    }

    fn add_hole_to_shell(
        &mut self,
        shell_index: usize,
        hole_coords: &[Coordinate],
        hole_index: usize,
    ) {
        let num_pts = hole_coords.len() - 1;
        let mut new_coords = Vec::with_capacity(num_pts + 2);
        new_coords.push(self.shell_coords[shell_index]);
        new_coords.extend((0..num_pts).map(|i| hole_coords[(hole_index + i) % num_pts]));
        new_coords.push(hole_coords[hole_index]);

        log::trace!(
            "Joining hole vertex {} to shell vertex {}",
            hole_coords[hole_index],
            self.shell_coords[shell_index]
        );

        self.ordered_coords.extend(new_coords.iter().copied());
        let tail = self.shell_coords.split_off(shell_index);
        self.shell_coords.extend(new_coords);
        self.shell_coords.extend(tail);
    }
}

/// Indices of the vertices with the smallest x ordinate, excluding the closing point.
fn leftmost_vertices(ring: &LinearRing) -> Vec<usize> {
    let coords = ring.coords();
    let Some(open) = coords.len().checked_sub(1) else {
        return vec![];
    };
    let min_x = ring.envelope().min_x();
    (0..open)
        .filter(|i| (coords[*i].x - min_x).abs() < EPS)
        .collect()
}

fn blocks_cut(
    li: &mut LineIntersector,
    p0: &Coordinate,
    p1: &Coordinate,
    segment: &Segment,
) -> bool {
    li.compute_intersection(p0, p1, &segment.p0, &segment.p1);
    if li.is_proper() {
        return true;
    }
    // A ring vertex or cut end on the cut.
    if is_in_segment_interior(&segment.p0, p0, p1)
        || is_in_segment_interior(&segment.p1, p0, p1)
    {
        return true;
    }
    // Collinear overlap with a cut end point inside the segment.
    let collinear = [p0, p1]
        .iter()
        .all(|p| Orientation::index(&segment.p0, &segment.p1, p) == Orientation::Collinear);
    collinear
        && (is_in_segment_interior(p0, &segment.p0, &segment.p1)
            || is_in_segment_interior(p1, &segment.p0, &segment.p1))
}

fn is_in_segment_interior(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> bool {
    !p.equals_2d(a)
        && !p.equals_2d(b)
        && Orientation::index(a, b, p) == Orientation::Collinear
        && Envelope::from_points([a, b]).intersects_coord(p)
}

fn no_join_vertex(coordinate: Coordinate) -> PlanaraError {
    PlanaraError::EarClipping {
        message: "unable to find a shell vertex to join the hole to".into(),
        coordinate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|p| Coordinate::from(*p)).collect()
    }

    fn polygon(shell: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> Polygon {
        let mut polygon = Polygon::new(
            LinearRing::new(coords(shell)),
            holes.iter().map(|h| LinearRing::new(coords(h))).collect(),
        );
        polygon.normalize();
        polygon
    }

    const SQUARE: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];

    #[test]
    fn no_holes() {
        let polygon = polygon(SQUARE, &[]);
        let joined = PolygonHoleJoiner::join(&polygon).expect("joined");
        assert_eq!(joined, polygon.exterior().coords());
    }

    #[test]
    fn single_hole() {
        let hole: &[(f64, f64)] = &[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)];
        let polygon = polygon(SQUARE, &[hole]);
        let joined = PolygonHoleJoiner::join(&polygon).expect("joined");

        let expected = coords(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (2.0, 2.0),
            (4.0, 2.0),
            (4.0, 4.0),
            (2.0, 4.0),
            (2.0, 2.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ]);
        assert_eq!(joined, expected);
    }

    #[test]
    fn cut_does_not_pass_through_other_holes() {
        // The vertical cut up from the lower hole would run through the upper hole's vertex.
        let polygon = polygon(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
            &[
                &[(5.0, 2.0), (6.0, 2.0), (6.0, 3.0), (5.0, 2.0)],
                &[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)],
            ],
        );
        let joined = PolygonHoleJoiner::join(&polygon).expect("joined");

        let expected = coords(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (5.0, 2.0),
            (6.0, 2.0),
            (6.0, 3.0),
            (5.0, 2.0),
            (5.0, 5.0),
            (6.0, 5.0),
            (6.0, 6.0),
            (5.0, 5.0),
            (5.0, 2.0),
            (0.0, 10.0),
            (5.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ]);
        assert_eq!(joined, expected);
    }

    #[test]
    fn every_hole_vertex_is_in_the_ring() {
        let holes: Vec<Vec<(f64, f64)>> = (0..3)
            .map(|i| {
                let x = 1.0 + 3.0 * i as f64;
                vec![(x, 1.0), (x + 1.0, 1.0), (x + 1.0, 2.0), (x, 2.0), (x, 1.0)]
            })
            .collect();
        let hole_refs: Vec<&[(f64, f64)]> = holes.iter().map(Vec::as_slice).collect();
        let polygon = polygon(SQUARE, &hole_refs);
        let joined = PolygonHoleJoiner::join(&polygon).expect("joined");

        // Every hole adds its vertices plus two cut vertices.
        assert_eq!(joined.len(), 5 + 3 * (4 + 2));
        assert_eq!(joined.first(), joined.last());
        for hole in polygon.interiors() {
            assert!(hole.coords().iter().all(|c| joined.contains(c)));
        }
    }
}
