use planara_types::algorithm::is_in_circle_robust;
use planara_types::{Coordinate, Orientation};

use super::tri::{self, Tri, TriId};

/// Upper bound on the number of passes over the triangles.
const MAX_ITERATION: usize = 200;

/// Improves a triangulation towards a constrained Delaunay triangulation by flipping the
/// diagonals of quads that violate the empty circumcircle condition.
///
/// Only edges shared by two triangles are flipped, so the boundary of the triangulation is kept.
/// Triangles must be oriented clockwise and linked to their neighbours.
pub fn improve(tris: &mut [Tri]) {
    for pass in 0..MAX_ITERATION {
        let flips = improve_scan(tris);
        log::trace!("Delaunay improvement pass {pass} flipped {flips} edges");
        if flips == 0 {
            return;
        }
    }
    log::debug!("Delaunay improvement stopped after {MAX_ITERATION} passes");
}

fn improve_scan(tris: &mut [Tri]) -> usize {
    let mut flips = 0;
    for id in 0..tris.len() {
        for edge in 0..3 {
            if improve_non_delaunay(tris, id, edge) {
                flips += 1;
            }
        }
    }
    flips
}

fn improve_non_delaunay(tris: &mut [Tri], id: TriId, edge: usize) -> bool {
    let this = &tris[id];
    let Some(other) = this.adjacent(edge) else {
        return false;
    };
    let Some(other_edge) = tris[other].index_of_adjacent(id) else {
        return false;
    };

    let adj0 = this.coordinate(edge);
    let adj1 = this.coordinate(tri::next(edge));
    let opp0 = this.coordinate(tri::opposite_vertex(edge));
    let opp1 = tris[other].coordinate(tri::opposite_vertex(other_edge));

    if !is_convex(&adj0, &adj1, &opp0, &opp1) || is_delaunay(&adj0, &adj1, &opp0, &opp1) {
        return false;
    }
    tri::flip(tris, id, edge);
    true
}

/// Whether the quad formed by the two triangles is convex, so that its diagonal can be flipped.
fn is_convex(adj0: &Coordinate, adj1: &Coordinate, opp0: &Coordinate, opp1: &Coordinate) -> bool {
    Orientation::index(opp0, adj0, opp1) == Orientation::index(opp1, adj1, opp0)
}

fn is_delaunay(adj0: &Coordinate, adj1: &Coordinate, opp0: &Coordinate, opp1: &Coordinate) -> bool {
    !is_in_circle(adj0, adj1, opp0, opp1) && !is_in_circle(adj1, adj0, opp1, opp0)
}

// The predicate expects a counterclockwise triangle, the triangles here are clockwise.
fn is_in_circle(a: &Coordinate, b: &Coordinate, c: &Coordinate, p: &Coordinate) -> bool {
    is_in_circle_robust(a, c, b, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulate::tri::{find_invalid_adjacency, TriangulationBuilder};

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn flips_thin_triangles() {
        // A flat rhombus split along its long diagonal.
        let mut tris = vec![
            Tri::new(c(0.0, 0.0), c(5.0, 1.0), c(10.0, 0.0)),
            Tri::new(c(0.0, 0.0), c(10.0, 0.0), c(5.0, -1.0)),
        ];
        TriangulationBuilder::build(&mut tris);
        improve(&mut tris);

        let short_diagonal = [c(5.0, 1.0), c(5.0, -1.0)];
        for tri in &tris {
            assert!(short_diagonal.iter().all(|p| tri.index_of(p).is_some()));
        }
        assert_eq!(find_invalid_adjacency(&tris), None);
    }

    #[test]
    fn keeps_delaunay_triangles() {
        let mut tris = vec![
            Tri::new(c(5.0, 1.0), c(10.0, 0.0), c(5.0, -1.0)),
            Tri::new(c(5.0, 1.0), c(5.0, -1.0), c(0.0, 0.0)),
        ];
        TriangulationBuilder::build(&mut tris);
        let before = tris.clone();
        improve(&mut tris);
        assert_eq!(tris, before);
    }

    #[test]
    fn does_not_flip_concave_quads() {
        // The quad (0,0) (4,4) (5,0) (4,1) is concave at (4,1).
        let mut tris = vec![
            Tri::new(c(0.0, 0.0), c(4.0, 4.0), c(4.0, 1.0)),
            Tri::new(c(4.0, 1.0), c(4.0, 4.0), c(5.0, 0.0)),
        ];
        TriangulationBuilder::build(&mut tris);
        assert!(tris[0].is_adjacent(1));
        let before = tris.clone();
        improve(&mut tris);
        assert_eq!(tris, before);
    }
}
