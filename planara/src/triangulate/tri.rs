use ahash::AHashMap;
use planara_types::algorithm::triangle;
use planara_types::{Coordinate, GeometryFactory, LinearRing, Polygon};

/// Index of a triangle in a triangulation.
pub type TriId = usize;

/// A triangle of a triangulation.
///
/// Edge `i` of a triangle runs from vertex `i` to vertex `i + 1` (modulo 3). Every edge may be
/// shared with one adjacent triangle of the same triangulation, referenced by its index.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tri {
    pts: [Coordinate; 3],
    adjacent: [Option<TriId>; 3],
}

impl Tri {
    /// Creates a triangle without adjacent triangles.
    pub fn new(p0: Coordinate, p1: Coordinate, p2: Coordinate) -> Self {
        Self {
            pts: [p0, p1, p2],
            adjacent: [None; 3],
        }
    }

    /// Vertex with the given index.
    pub fn coordinate(&self, index: usize) -> Coordinate {
        self.pts[index]
    }

    /// All three vertices.
    pub fn coordinates(&self) -> &[Coordinate; 3] {
        &self.pts
    }

    /// Index of the vertex equal to the point.
    pub fn index_of(&self, p: &Coordinate) -> Option<usize> {
        self.pts.iter().position(|v| v.equals_2d(p))
    }

    /// Triangle adjacent across the edge.
    pub fn adjacent(&self, edge_index: usize) -> Option<TriId> {
        self.adjacent[edge_index]
    }

    /// Index of the edge shared with the given triangle.
    pub fn index_of_adjacent(&self, tri: TriId) -> Option<usize> {
        self.adjacent.iter().position(|adj| *adj == Some(tri))
    }

    /// Number of edges shared with other triangles.
    pub fn num_adjacent(&self) -> usize {
        self.adjacent.iter().filter(|adj| adj.is_some()).count()
    }

    /// Whether the triangle is adjacent to the given one.
    pub fn is_adjacent(&self, tri: TriId) -> bool {
        self.index_of_adjacent(tri).is_some()
    }

    /// Whether any edge is on the border of the triangulation.
    pub fn is_border(&self) -> bool {
        self.num_adjacent() < 3
    }

    /// Middle point of the edge.
    pub fn midpoint(&self, edge_index: usize) -> Coordinate {
        let p0 = self.pts[edge_index];
        let p1 = self.pts[next(edge_index)];
        Coordinate::new((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0)
    }

    /// Area of the triangle.
    pub fn area(&self) -> f64 {
        triangle::area(&self.pts[0], &self.pts[1], &self.pts[2])
    }

    /// Perimeter of the triangle.
    pub fn length(&self) -> f64 {
        (0..3)
            .map(|i| self.pts[i].distance(&self.pts[next(i)]))
            .sum()
    }

    /// The triangle as a polygon.
    pub fn to_polygon(&self, factory: &GeometryFactory) -> Polygon {
        let [p0, p1, p2] = self.pts;
        factory.create_polygon(LinearRing::new(vec![p0, p1, p2, p0]), vec![])
    }

    pub(crate) fn set_coordinates(&mut self, p0: Coordinate, p1: Coordinate, p2: Coordinate) {
        self.pts = [p0, p1, p2];
    }

    pub(crate) fn set_adjacent(&mut self, edge_index: usize, tri: Option<TriId>) {
        self.adjacent[edge_index] = tri;
    }

    fn replace_adjacent(&mut self, old: TriId, new: TriId) {
        for adj in &mut self.adjacent {
            if *adj == Some(old) {
                *adj = Some(new);
            }
        }
    }

    /// Shifts the adjacency references by `offset`, used when triangulations are concatenated.
    pub(crate) fn offset_adjacent(&mut self, offset: usize) {
        for adj in self.adjacent.iter_mut().flatten() {
            *adj += offset;
        }
    }
}

/// Index of the next vertex or edge.
pub fn next(index: usize) -> usize {
    (index + 1) % 3
}

/// Index of the previous vertex or edge.
pub fn prev(index: usize) -> usize {
    (index + 2) % 3
}

/// Index of the vertex opposite to the edge.
pub fn opposite_vertex(edge_index: usize) -> usize {
    prev(edge_index)
}

/// Index of the edge opposite to the vertex.
pub fn opposite_edge(vertex_index: usize) -> usize {
    next(vertex_index)
}

/// Flips the edge shared by the triangle and its neighbour, replacing the diagonal of the quad
/// they form with the other one.
///
/// Both triangles keep their orientation and their indices. Adjacency of the triangles around
/// the quad is updated. Does nothing if there is no neighbour across the edge.
pub fn flip(tris: &mut [Tri], tri: TriId, edge_index: usize) {
    let Some(other) = tris[tri].adjacent(edge_index) else {
        return;
    };
    let Some(other_index) = tris[other].index_of_adjacent(tri) else {
        return;
    };

    let this = tris[tri];
    let that = tris[other];
    let adj0 = this.coordinate(edge_index);
    let adj1 = this.coordinate(next(edge_index));
    let opp0 = this.coordinate(opposite_vertex(edge_index));
    let opp1 = that.coordinate(opposite_vertex(other_index));

    // Neighbours of the quad, counterclockwise from the edge after the shared one.
    let around = [
        this.adjacent(prev(edge_index)),
        this.adjacent(next(edge_index)),
        that.adjacent(next(other_index)),
        that.adjacent(prev(other_index)),
    ];

    let t = &mut tris[tri];
    t.set_coordinates(opp1, opp0, adj0);
    t.adjacent = [Some(other), around[0], around[2]];
    if let Some(adj) = around[2] {
        tris[adj].replace_adjacent(other, tri);
    }

    let t = &mut tris[other];
    t.set_coordinates(opp0, opp1, adj1);
    t.adjacent = [Some(tri), around[3], around[1]];
    if let Some(adj) = around[1] {
        tris[adj].replace_adjacent(tri, other);
    }
}

/// Checks that the adjacency of the triangles is symmetric and that adjacent triangles share
/// the edge. Returns the first triangle violating it.
pub fn find_invalid_adjacency(tris: &[Tri]) -> Option<TriId> {
    tris.iter().enumerate().find_map(|(id, tri)| {
        (0..3)
            .filter_map(|e| tri.adjacent(e).map(|adj| (e, adj)))
            .any(|(e, adj)| {
                let Some(other) = tris.get(adj) else {
                    return true;
                };
                let shares_edge = other.index_of(&tri.coordinate(e)).is_some()
                    && other.index_of(&tri.coordinate(next(e))).is_some();
                !other.is_adjacent(id) || !shares_edge
            })
            .then_some(id)
    })
}

/// Links the triangles of a triangulation to their neighbours by shared edges.
#[derive(Debug, Default)]
pub struct TriangulationBuilder {
    edges: AHashMap<(Coordinate, Coordinate), TriId>,
}

impl TriangulationBuilder {
    /// Sets the adjacency of all triangles. Edges are matched by the positions of their
    /// endpoints.
    pub fn build(tris: &mut [Tri]) {
        let mut builder = Self::default();
        for id in 0..tris.len() {
            builder.add(tris, id);
        }
    }

    fn add(&mut self, tris: &mut [Tri], id: TriId) {
        for e in 0..3 {
            let p0 = tris[id].coordinate(e);
            let p1 = tris[id].coordinate(next(e));
            let key = edge_key(p0, p1);

            match self.edges.get(&key).copied() {
                Some(adj) => {
                    tris[id].set_adjacent(e, Some(adj));
                    // The neighbour runs along the edge in the opposite direction.
                    if let Some(adj_edge) = tris[adj].index_of(&p1) {
                        tris[adj].set_adjacent(adj_edge, Some(id));
                    }
                }
                None => {
                    tris[id].set_adjacent(e, None);
                    self.edges.insert(key, id);
                }
            }
        }
    }
}

fn edge_key(p0: Coordinate, p1: Coordinate) -> (Coordinate, Coordinate) {
    if p0 <= p1 {
        (p0, p1)
    } else {
        (p1, p0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    /// Two clockwise triangles forming the unit square, split by the (0,0)-(1,1) diagonal.
    fn square() -> Vec<Tri> {
        let mut tris = vec![
            Tri::new(c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)),
            Tri::new(c(0.0, 0.0), c(1.0, 1.0), c(1.0, 0.0)),
        ];
        TriangulationBuilder::build(&mut tris);
        tris
    }

    #[test]
    fn builder_links_shared_edges() {
        let tris = square();
        assert_eq!(tris[0].adjacent(2), Some(1));
        assert_eq!(tris[1].adjacent(0), Some(0));
        assert_eq!(tris[0].num_adjacent(), 1);
        assert!(tris[0].is_border());
        assert_eq!(find_invalid_adjacency(&tris), None);
    }

    #[test]
    fn flip_swaps_diagonal() {
        let mut tris = square();
        flip(&mut tris, 0, 2);

        let diagonal = [c(0.0, 1.0), c(1.0, 0.0)];
        for tri in &tris {
            assert!(diagonal.iter().all(|p| tri.index_of(p).is_some()));
            assert_abs_diff_eq!(tri.area(), 0.5);
        }
        assert_eq!(find_invalid_adjacency(&tris), None);

        flip(&mut tris, 0, 0);
        let diagonal = [c(0.0, 0.0), c(1.0, 1.0)];
        for tri in &tris {
            assert!(diagonal.iter().all(|p| tri.index_of(p).is_some()));
        }
    }

    #[test]
    fn flip_updates_outer_neighbours() {
        // A third triangle below the square, sharing the (0,0)-(1,0) edge.
        let mut tris = square();
        tris.push(Tri::new(c(0.0, 0.0), c(1.0, 0.0), c(0.5, -1.0)));
        TriangulationBuilder::build(&mut tris);
        assert!(tris[2].is_adjacent(1));

        flip(&mut tris, 0, 2);
        assert_eq!(find_invalid_adjacency(&tris), None);
        let below = tris[2].adjacent(0).expect("still linked");
        assert!(tris[below].index_of(&c(0.0, 0.0)).is_some());
        assert!(tris[below].index_of(&c(1.0, 0.0)).is_some());
    }

    #[test]
    fn measures() {
        let tri = Tri::new(c(0.0, 0.0), c(0.0, 3.0), c(4.0, 0.0));
        assert_abs_diff_eq!(tri.area(), 6.0);
        assert_abs_diff_eq!(tri.length(), 12.0);
        assert_eq!(tri.midpoint(1), c(2.0, 1.5));
        let polygon = tri.to_polygon(&GeometryFactory::default());
        assert_abs_diff_eq!(polygon.area(), 6.0);
    }
}
