//! Polygon triangulation.
//!
//! Polygons are triangulated by joining their holes to the shell with
//! [`PolygonHoleJoiner`] and clipping ears off the resulting ring with [`PolygonEarClipper`].
//! The triangles can then be improved towards a constrained Delaunay triangulation by edge
//! flips, which gives better shaped triangles with the same vertices and boundary.
//!
//! ```
//! use planara::triangulate::PolygonTriangulator;
//! use planara::types::{Coordinate, Geometry, LinearRing, Polygon};
//!
//! let shell = LinearRing::new(
//!     [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]
//!         .into_iter()
//!         .map(Coordinate::from)
//!         .collect(),
//! );
//! let polygon: Geometry = Polygon::new(shell, vec![]).into();
//!
//! let tris = PolygonTriangulator::new().triangles(&polygon).unwrap();
//! assert_eq!(tris.len(), 2);
//! ```

use planara_types::{Geometry, GeometryFactory, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::PlanaraError;

pub mod delaunay_improver;
mod ear_clipper;
mod hole_joiner;
pub mod tri;

pub use ear_clipper::PolygonEarClipper;
pub use hole_joiner::PolygonHoleJoiner;
pub use tri::{Tri, TriId, TriangulationBuilder};

/// Triangulates polygons by ear clipping.
///
/// Accepts polygons, multipolygons and collections containing them; other geometries are
/// ignored. Polygons must be valid. Triangles of all polygons are returned in a single list,
/// with triangles of the same polygon linked to their neighbours.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonTriangulator {
    improve_delaunay: bool,
    skip_flat_corners: bool,
    factory: GeometryFactory,
}

impl PolygonTriangulator {
    /// Creates a triangulator producing plain ear clipping triangulations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the triangulation is improved towards a constrained Delaunay triangulation.
    pub fn with_delaunay_improvement(mut self, improve: bool) -> Self {
        self.improve_delaunay = improve;
        self
    }

    /// Whether collinear corners of the rings are dropped. See
    /// [`PolygonEarClipper::with_skip_flat_corners`].
    pub fn with_skip_flat_corners(mut self, skip: bool) -> Self {
        self.skip_flat_corners = skip;
        self
    }

    /// Sets the factory used to create the output geometries.
    pub fn with_factory(mut self, factory: GeometryFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Triangulates the polygons of the geometry, returning a collection of triangle polygons.
    pub fn triangulate(&self, geometry: &Geometry) -> Result<Geometry, PlanaraError> {
        let polygons: Vec<Geometry> = self
            .triangles(geometry)?
            .iter()
            .map(|tri| tri.to_polygon(&self.factory).into())
            .collect();
        Ok(self.factory.create_geometry_collection(polygons).into())
    }

    /// Triangulates the polygons of the geometry.
    pub fn triangles(&self, geometry: &Geometry) -> Result<Vec<Tri>, PlanaraError> {
        let mut polygons = vec![];
        extract_polygons(geometry, &mut polygons);

        let mut tris = vec![];
        for polygon in polygons.into_iter().filter(|p| !p.is_empty()) {
            let offset = tris.len();
            tris.extend(self.triangulate_polygon(polygon)?.into_iter().map(|mut tri| {
                tri.offset_adjacent(offset);
                tri
            }));
        }

        log::debug!("Triangulated {} into {} triangles", geometry.geometry_type(), tris.len());
        Ok(tris)
    }

    /// Triangulates a single polygon.
    ///
    /// Holes are joined to the shell by cuts that avoid the polygon boundary. A hole that no
    /// shell vertex can be cut to without touching another ring (possible for valid polygons with
    /// many holes crowded on vertical lines) makes the triangulation fail with
    /// [`PlanaraError::EarClipping`].
    pub fn triangulate_polygon(&self, polygon: &Polygon) -> Result<Vec<Tri>, PlanaraError> {
        let mut normalized = polygon.clone();
        normalized.normalize();

        let ring = PolygonHoleJoiner::join(&normalized)?;
        let mut tris = PolygonEarClipper::new(ring)
            .with_skip_flat_corners(self.skip_flat_corners)
            .compute()?;

        TriangulationBuilder::build(&mut tris);
        if self.improve_delaunay {
            delaunay_improver::improve(&mut tris);
        }
        Ok(tris)
    }
}

/// Triangulates polygons into constrained Delaunay triangulations: ear clipping followed by
/// Delaunay improvement.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstrainedDelaunayTriangulator {
    inner: PolygonTriangulator,
}

impl Default for ConstrainedDelaunayTriangulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstrainedDelaunayTriangulator {
    /// Creates a triangulator.
    pub fn new() -> Self {
        Self {
            inner: PolygonTriangulator::new().with_delaunay_improvement(true),
        }
    }

    /// Sets the factory used to create the output geometries.
    pub fn with_factory(self, factory: GeometryFactory) -> Self {
        Self {
            inner: self.inner.with_factory(factory),
        }
    }

    /// Triangulates the polygons of the geometry, returning a collection of triangle polygons.
    pub fn triangulate(&self, geometry: &Geometry) -> Result<Geometry, PlanaraError> {
        self.inner.triangulate(geometry)
    }

    /// Triangulates the polygons of the geometry.
    pub fn triangles(&self, geometry: &Geometry) -> Result<Vec<Tri>, PlanaraError> {
        self.inner.triangles(geometry)
    }
}

fn extract_polygons<'a>(geometry: &'a Geometry, out: &mut Vec<&'a Polygon>) {
    match geometry {
        Geometry::Polygon(polygon) => out.push(polygon),
        Geometry::MultiPolygon(polygons) => out.extend(polygons.parts()),
        Geometry::GeometryCollection(collection) => {
            for part in collection.parts() {
                extract_polygons(part, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use planara_types::{Coordinate, GeometryCollection, LinearRing, MultiPolygon, Point};

    use super::tri::find_invalid_adjacency;
    use super::*;
    use crate::operation::valid::IsValidOp;

    fn ring(points: &[(f64, f64)]) -> LinearRing {
        LinearRing::new(points.iter().map(|p| Coordinate::from(*p)).collect())
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> LinearRing {
        ring(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)])
    }

    fn expected_count(polygon: &Polygon) -> usize {
        let vertices = |r: &LinearRing| r.coords().len() - 1;
        let holes = polygon.interiors();
        vertices(polygon.exterior()) + holes.iter().map(vertices).sum::<usize>() + 2 * holes.len()
            - 2
    }

    fn check_coverage(polygon: Polygon, triangulator: PolygonTriangulator) {
        let expected = expected_count(&polygon);
        let area = polygon.area();
        let tris = triangulator
            .triangles(&polygon.into())
            .expect("triangulated");

        assert_eq!(tris.len(), expected);
        assert_abs_diff_eq!(tris.iter().map(Tri::area).sum::<f64>(), area, epsilon = 1e-9);
        assert_eq!(find_invalid_adjacency(&tris), None);
    }

    fn polygon_with_holes() -> Polygon {
        Polygon::new(
            square(0.0, 0.0, 100.0, 100.0),
            vec![
                square(10.0, 10.0, 20.0, 30.0),
                ring(&[(40.0, 40.0), (60.0, 45.0), (50.0, 70.0), (40.0, 40.0)]),
                square(70.0, 10.0, 90.0, 20.0),
                square(72.0, 60.0, 80.0, 90.0),
            ],
        )
    }

    #[test]
    fn simple_polygon() {
        let polygon = Polygon::new(
            ring(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (6.0, 4.0),
                (4.0, 8.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        check_coverage(polygon, PolygonTriangulator::new());
    }

    #[test]
    fn holes() {
        check_coverage(polygon_with_holes(), PolygonTriangulator::new());
    }

    #[test]
    fn holes_with_delaunay_improvement() {
        check_coverage(
            polygon_with_holes(),
            PolygonTriangulator::new().with_delaunay_improvement(true),
        );
    }

    #[test]
    fn hole_vertex_below_shell_vertex() {
        // The cut from the hole runs vertically up to the roof vertex.
        let polygon = Polygon::new(
            ring(&[
                (0.0, 0.0),
                (20.0, 0.0),
                (20.0, 20.0),
                (5.0, 25.0),
                (0.0, 20.0),
                (0.0, 0.0),
            ]),
            vec![ring(&[(5.0, 10.0), (10.0, 5.0), (15.0, 10.0), (10.0, 15.0), (5.0, 10.0)])],
        );
        check_coverage(polygon, PolygonTriangulator::new());
    }

    #[test]
    fn holes_on_one_vertical_line() {
        let polygon = Polygon::new(
            ring(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (5.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![
                ring(&[(5.0, 2.0), (6.0, 2.0), (6.0, 3.0), (5.0, 2.0)]),
                ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]),
            ],
        );
        check_coverage(polygon.clone(), PolygonTriangulator::new());
        check_coverage(polygon, PolygonTriangulator::new().with_delaunay_improvement(true));
    }

    #[test]
    fn delaunay_improvement_keeps_vertices() {
        let polygon = polygon_with_holes();
        let plain = PolygonTriangulator::new()
            .triangles(&polygon.clone().into())
            .expect("triangulated");
        let improved = ConstrainedDelaunayTriangulator::new()
            .triangles(&polygon.into())
            .expect("triangulated");

        let vertices = |tris: &[Tri]| {
            let mut v: Vec<Coordinate> = tris.iter().flat_map(|t| *t.coordinates()).collect();
            v.sort();
            v.dedup();
            v
        };
        assert_eq!(vertices(&plain), vertices(&improved));
        assert_eq!(plain.len(), improved.len());
    }

    #[test]
    fn multipolygon_and_collections() {
        let geometry: Geometry = GeometryCollection::new(vec![
            MultiPolygon::new(vec![
                Polygon::new(square(0.0, 0.0, 10.0, 10.0), vec![]),
                Polygon::new(square(20.0, 0.0, 30.0, 10.0), vec![square(22.0, 2.0, 28.0, 8.0)]),
            ])
            .into(),
            Point::new(Coordinate::new(50.0, 50.0)).into(),
        ])
        .into();

        let tris = PolygonTriangulator::new()
            .triangles(&geometry)
            .expect("triangulated");
        assert_eq!(tris.len(), 2 + 8);
        assert_eq!(find_invalid_adjacency(&tris), None);
        // Triangles of different polygons are never linked.
        for (id, tri) in tris.iter().enumerate() {
            for edge in 0..3 {
                if let Some(adj) = tri.adjacent(edge) {
                    assert_eq!(id < 2, adj < 2);
                }
            }
        }

        let Geometry::GeometryCollection(result) = PolygonTriangulator::new()
            .triangulate(&geometry)
            .expect("triangulated")
        else {
            panic!("collection expected");
        };
        assert_eq!(result.parts().len(), 10);
        assert_abs_diff_eq!(result.parts().iter().map(Geometry::area).sum::<f64>(), 164.0);
        for part in result.parts() {
            assert!(IsValidOp::new(part).is_valid().expect("checked"));
        }
    }

    #[test]
    fn empty_input() {
        let tris = PolygonTriangulator::new()
            .triangles(&Geometry::default())
            .expect("triangulated");
        assert!(tris.is_empty());
    }
}
