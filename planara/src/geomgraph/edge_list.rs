use ahash::AHashMap;
use planara_types::Coordinate;

use super::edge::Edge;
use super::EdgeId;

/// A list of edges with lookup of edges by their points in either direction.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    index: AHashMap<Vec<Coordinate>, EdgeId>,
}

/// The points in the direction that compares lower, so that an edge and its reverse share the key.
fn oriented_key(pts: &[Coordinate]) -> Vec<Coordinate> {
    if pts.iter().rev().lt(pts.iter()) {
        pts.iter().rev().copied().collect()
    } else {
        pts.to_vec()
    }
}

impl EdgeList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge to the list.
    pub fn add(&mut self, edge: Edge) -> EdgeId {
        let id = self.edges.len();
        self.index.entry(oriented_key(edge.coords())).or_insert(id);
        self.edges.push(edge);
        id
    }

    /// Finds an edge with the same points as the given one, in the same or the opposite
    /// direction.
    pub fn find_equal_edge(&self, edge: &Edge) -> Option<EdgeId> {
        self.index.get(&oriented_key(edge.coords())).copied()
    }

    /// Edge with the given id.
    pub fn get(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub(crate) fn get_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Takes the edges out of the list.
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
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
    fn finds_edges_in_both_directions() {
        let mut list = EdgeList::new();
        let id = list.add(edge(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]));
        list.add(edge(&[(5.0, 5.0), (6.0, 6.0)]));

        assert_eq!(
            list.find_equal_edge(&edge(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])),
            Some(id)
        );
        assert_eq!(
            list.find_equal_edge(&edge(&[(2.0, 0.0), (1.0, 1.0), (0.0, 0.0)])),
            Some(id)
        );
        assert_eq!(
            list.find_equal_edge(&edge(&[(0.0, 0.0), (1.0, 2.0), (2.0, 0.0)])),
            None
        );
        assert_eq!(list.len(), 2);
    }
}
