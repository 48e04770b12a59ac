use planara_types::algorithm::ring::is_in_ring;
use planara_types::{Coordinate, LinearRing};
use serde::{Deserialize, Serialize};

use super::find_point_not_node;
use crate::error::PlanaraError;
use crate::geomgraph::GeometryGraph;
use crate::index::quadtree::Quadtree;
use crate::index::strtree::StrTree;

/// How candidate pairs of rings are found when looking for nested rings.
///
/// All strategies give the same answer. Indexed strategies are faster for polygons with many
/// holes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NestedRingStrategy {
    /// Tests all pairs of rings with intersecting envelopes.
    Simple,
    /// Finds candidate rings with a quadtree.
    Quadtree,
    /// Finds candidate rings with an STR tree.
    #[default]
    StrTree,
}

/// Finds a ring lying inside another ring of the set.
///
/// The rings are expected to touch only at nodes of the geometry graph, so a single point of a
/// ring that is not a node tells whether the ring is inside another one.
#[derive(Debug)]
pub struct NestedRingTester<'a, 'g> {
    graph: &'g GeometryGraph<'a>,
    strategy: NestedRingStrategy,
    rings: Vec<&'a LinearRing>,
}

impl<'a, 'g> NestedRingTester<'a, 'g> {
    /// Creates a tester for the rings of the graph.
    pub fn new(graph: &'g GeometryGraph<'a>, strategy: NestedRingStrategy) -> Self {
        Self {
            graph,
            strategy,
            rings: vec![],
        }
    }

    /// Adds a ring to test. The ring must be a part of the geometry of the graph.
    pub fn add(&mut self, ring: &'a LinearRing) {
        self.rings.push(ring);
    }

    /// A point of a ring that is inside another ring, or `None` if no ring is nested.
    pub fn find_nested_point(&self) -> Result<Option<Coordinate>, PlanaraError> {
        let candidates = self.candidate_pairs()?;
        for (inner, search) in candidates {
            if let Some(pt) = self.nested_point(inner, search)? {
                return Ok(Some(pt));
            }
        }
        Ok(None)
    }

    /// Pairs of `(inner, search)` ring indices with intersecting envelopes, ordered by the inner
    /// ring.
    fn candidate_pairs(&self) -> Result<Vec<(usize, usize)>, PlanaraError> {
        let envelopes: Vec<_> = self.rings.iter().map(|ring| ring.envelope()).collect();
        let mut pairs = vec![];

        match self.strategy {
            NestedRingStrategy::Simple => {
                for (i, env) in envelopes.iter().enumerate() {
                    for (j, other) in envelopes.iter().enumerate() {
                        if i != j && env.intersects(other) {
                            pairs.push((i, j));
                        }
                    }
                }
            }
            NestedRingStrategy::Quadtree => {
                let mut tree = Quadtree::new();
                for (i, env) in envelopes.iter().enumerate() {
                    tree.insert(env, i)?;
                }
                for (i, env) in envelopes.iter().enumerate() {
                    let mut found: Vec<usize> = tree.query(env).into_iter().copied().collect();
                    found.sort_unstable();
                    pairs.extend(
                        found
                            .into_iter()
                            .filter(|j| *j != i && env.intersects(&envelopes[*j]))
                            .map(|j| (i, j)),
                    );
                }
            }
            NestedRingStrategy::StrTree => {
                let mut tree = StrTree::new();
                for (i, env) in envelopes.iter().enumerate() {
                    tree.insert(env, i)?;
                }
                for (i, env) in envelopes.iter().enumerate() {
                    let mut found: Vec<usize> = tree.query(env).into_iter().copied().collect();
                    found.sort_unstable();
                    pairs.extend(found.into_iter().filter(|j| *j != i).map(|j| (i, j)));
                }
            }
        }

        Ok(pairs)
    }

    fn nested_point(&self, inner: usize, search: usize) -> Result<Option<Coordinate>, PlanaraError> {
        let inner_ring = self.rings[inner];
        let search_ring = self.rings[search];

        let inner_pt = find_point_not_node(inner_ring.coords(), search_ring, self.graph)
            .ok_or_else(|| {
                PlanaraError::Assertion(
                    "unable to find a ring point not a node of the search ring".into(),
                )
            })?;

        Ok(is_in_ring(&inner_pt, search_ring.coords()).then_some(inner_pt))
    }
}

#[cfg(test)]
mod tests {
    use planara_types::{Geometry, Polygon};

    use super::*;
    use crate::operation::valid::ConsistentAreaTester;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> LinearRing {
        LinearRing::new(vec![
            Coordinate::new(x0, y0),
            Coordinate::new(x1, y0),
            Coordinate::new(x1, y1),
            Coordinate::new(x0, y1),
            Coordinate::new(x0, y0),
        ])
    }

    fn nested_point(holes: Vec<LinearRing>, strategy: NestedRingStrategy) -> Option<Coordinate> {
        let geometry: Geometry = Polygon::new(square(0.0, 0.0, 100.0, 100.0), holes).into();
        let Geometry::Polygon(polygon) = &geometry else {
            unreachable!()
        };
        let mut graph = GeometryGraph::new(0, &geometry);
        ConsistentAreaTester::new(&mut graph)
            .is_node_consistent_area()
            .expect("noding");

        let mut tester = NestedRingTester::new(&graph, strategy);
        for hole in polygon.interiors() {
            tester.add(hole);
        }
        tester.find_nested_point().expect("no assertion")
    }

    #[test]
    fn strategies_agree() {
        let strategies = [
            NestedRingStrategy::Simple,
            NestedRingStrategy::Quadtree,
            NestedRingStrategy::StrTree,
        ];

        let separate: Vec<_> = (0..9)
            .map(|i| {
                let x = 5.0 + 10.0 * i as f64;
                square(x, 5.0, x + 5.0, 10.0)
            })
            .collect();
        for strategy in strategies {
            assert_eq!(nested_point(separate.clone(), strategy), None, "{strategy:?}");
        }

        let mut nested = separate;
        nested.push(square(56.0, 6.0, 57.0, 7.0));
        for strategy in strategies {
            assert_eq!(
                nested_point(nested.clone(), strategy),
                Some(Coordinate::new(56.0, 6.0)),
                "{strategy:?}"
            );
        }
    }

    #[test]
    fn touching_rings_are_not_nested() {
        // The second hole touches the first one at a vertex.
        let holes = vec![
            square(10.0, 10.0, 20.0, 20.0),
            LinearRing::new(vec![
                Coordinate::new(20.0, 20.0),
                Coordinate::new(30.0, 20.0),
                Coordinate::new(30.0, 30.0),
                Coordinate::new(20.0, 20.0),
            ]),
        ];
        assert_eq!(nested_point(holes, NestedRingStrategy::Simple), None);
    }
}
