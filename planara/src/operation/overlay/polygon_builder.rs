use planara_types::{GeometryFactory, Polygon};

use crate::error::PlanaraError;
use crate::geomgraph::{EdgeRings, PlanarGraph, RingId, RingKind};

/// Builds the result polygons from the directed edges marked as in the result.
///
/// Result edges are first linked into maximal rings. A maximal ring that touches itself is split
/// into minimal rings, at most one of which may be a shell. Holes that are not a part of such a
/// ring are assigned to the innermost shell containing them.
#[derive(Debug)]
pub struct PolygonBuilder {
    factory: GeometryFactory,
    rings: EdgeRings,
    shells: Vec<RingId>,
}

impl PolygonBuilder {
    /// Creates a builder producing polygons with the factory.
    pub fn new(factory: GeometryFactory) -> Self {
        Self {
            factory,
            rings: EdgeRings::new(),
            shells: vec![],
        }
    }

    /// Adds the result rings of the graph.
    pub fn add(&mut self, graph: &mut PlanarGraph) -> Result<(), PlanaraError> {
        graph.link_result_directed_edges()?;
        let max_rings = self.build_maximal_rings(graph)?;

        let mut free_holes = vec![];
        for ring in max_rings {
            if self.rings.max_node_degree(graph, ring) > 2 {
                self.rings.link_directed_edges_for_minimal_rings(graph, ring)?;
                let min_rings = self.rings.build_minimal_rings(graph, ring)?;
                match self.find_shell(&min_rings)? {
                    Some(shell) => {
                        let holes: Vec<RingId> = min_rings
                            .iter()
                            .copied()
                            .filter(|r| self.rings.get(*r).is_hole())
                            .collect();
                        for hole in holes {
                            self.rings.set_shell(hole, shell);
                        }
                        self.shells.push(shell);
                    }
                    None => free_holes.extend(min_rings),
                }
            } else if self.rings.get(ring).is_hole() {
                free_holes.push(ring);
            } else {
                self.shells.push(ring);
            }
        }

        self.place_free_holes(&free_holes)
    }

    fn build_maximal_rings(&mut self, graph: &mut PlanarGraph) -> Result<Vec<RingId>, PlanaraError> {
        let mut max_rings = vec![];
        for de in 0..graph.dir_edges().len() {
            let dir_edge = graph.dir_edge(de);
            if dir_edge.is_in_result()
                && dir_edge.label().is_area()
                && dir_edge.edge_ring().is_none()
            {
                let ring = self.rings.build(graph, de, RingKind::Maximal)?;
                self.rings.set_in_result(graph, ring);
                max_rings.push(ring);
            }
        }
        Ok(max_rings)
    }

    fn find_shell(&self, min_rings: &[RingId]) -> Result<Option<RingId>, PlanaraError> {
        let mut shells = min_rings
            .iter()
            .copied()
            .filter(|ring| self.rings.get(*ring).is_shell());
        let shell = shells.next();
        if shells.next().is_some() {
            return Err(PlanaraError::Assertion(
                "found two shells in a minimal edge ring list".into(),
            ));
        }
        Ok(shell)
    }

    fn place_free_holes(&mut self, free_holes: &[RingId]) -> Result<(), PlanaraError> {
        for hole in free_holes {
            if self.rings.get(*hole).shell().is_some() {
                continue;
            }

            let shell = self
                .rings
                .find_containing_shell(*hole, &self.shells)
                .ok_or_else(|| {
                    PlanaraError::topology(
                        "unable to assign hole to a shell",
                        self.rings.get(*hole).coords().first().copied(),
                    )
                })?;
            self.rings.set_shell(*hole, shell);
        }
        Ok(())
    }

    /// Polygons built from the shells and their holes.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.shells
            .iter()
            .map(|shell| self.rings.to_polygon(*shell, &self.factory))
            .collect()
    }
}
