//! Location of points relative to geometries.

use crate::algorithm::ring;
use crate::geometry::{Geometry, LineString, LinearRing, Point, Polygon};
use crate::{Coordinate, Envelope, Location};

/// Computes the topological location of a point relative to any geometry.
///
/// The boundary of lines and collections follows the mod-2 rule: a point is on the boundary if
/// it is an endpoint of an odd number of non-closed lines. Polygons in a collection are assumed
/// not to overlap.
#[derive(Debug, Default)]
pub struct PointLocator {
    is_in: bool,
    num_boundaries: usize,
}

impl PointLocator {
    /// Creates a new locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the point relative to the geometry.
    pub fn locate(&mut self, p: &Coordinate, geom: &Geometry) -> Location {
        if geom.is_empty() {
            return Location::Exterior;
        }

        match geom {
            Geometry::LineString(line) => return locate_on_line(p, line.coords(), line.is_closed()),
            Geometry::LinearRing(ring) => return locate_on_line(p, ring.coords(), true),
            Geometry::Polygon(polygon) => return locate_in_polygon(p, polygon),
            _ => {}
        }

        self.is_in = false;
        self.num_boundaries = 0;
        self.compute_location(p, geom);

        if self.num_boundaries % 2 == 1 {
            Location::Boundary
        } else if self.num_boundaries > 0 || self.is_in {
            Location::Interior
        } else {
            Location::Exterior
        }
    }

    /// Tests whether the point is in the interior or on the boundary of the geometry.
    pub fn intersects(&mut self, p: &Coordinate, geom: &Geometry) -> bool {
        self.locate(p, geom) != Location::Exterior
    }

    fn compute_location(&mut self, p: &Coordinate, geom: &Geometry) {
        match geom {
            Geometry::Point(point) => self.update(locate_on_point(p, point)),
            Geometry::LineString(line) => {
                self.update(locate_on_line(p, line.coords(), line.is_closed()))
            }
            Geometry::LinearRing(ring) => self.update(locate_on_line(p, ring.coords(), true)),
            Geometry::Polygon(polygon) => self.update(locate_in_polygon(p, polygon)),
            Geometry::MultiPoint(points) => {
                for point in points.parts() {
                    self.update(locate_on_point(p, point));
                }
            }
            Geometry::MultiLineString(lines) => {
                for line in lines.parts() {
                    self.update(locate_on_line(p, line.coords(), line.is_closed()));
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons.parts() {
                    self.update(locate_in_polygon(p, polygon));
                }
            }
            Geometry::GeometryCollection(collection) => {
                for g in collection.parts() {
                    self.compute_location(p, g);
                }
            }
        }
    }

    fn update(&mut self, location: Location) {
        match location {
            Location::Interior => self.is_in = true,
            Location::Boundary => self.num_boundaries += 1,
            Location::Exterior => {}
        }
    }
}

fn locate_on_point(p: &Coordinate, point: &Point) -> Location {
    match point.coord() {
        Some(c) if c.equals_2d(p) => Location::Interior,
        _ => Location::Exterior,
    }
}

fn locate_on_line(p: &Coordinate, coords: &[Coordinate], is_closed: bool) -> Location {
    if coords.is_empty() || !Envelope::from_points(coords).contains_coord(p) {
        return Location::Exterior;
    }

    if !is_closed {
        if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
            if p.equals_2d(first) || p.equals_2d(last) {
                return Location::Boundary;
            }
        }
    }

    if ring::is_on_line(p, coords) {
        Location::Interior
    } else {
        Location::Exterior
    }
}

fn locate_in_polygon_ring(p: &Coordinate, ring: &LinearRing) -> Location {
    if !ring.envelope().contains_coord(p) {
        return Location::Exterior;
    }
    ring::locate_point_in_ring(p, ring.coords())
}

/// Location of a point relative to a polygon.
pub fn locate_in_polygon(p: &Coordinate, polygon: &Polygon) -> Location {
    if polygon.is_empty() {
        return Location::Exterior;
    }

    match locate_in_polygon_ring(p, polygon.exterior()) {
        Location::Interior => {}
        other => return other,
    }

    for hole in polygon.interiors() {
        match locate_in_polygon_ring(p, hole) {
            Location::Interior => return Location::Exterior,
            Location::Boundary => return Location::Boundary,
            Location::Exterior => {}
        }
    }

    Location::Interior
}

/// Location of a point relative to the polygonal parts of the geometry. Non-polygonal parts are
/// ignored.
pub fn locate_in_area(p: &Coordinate, geom: &Geometry) -> Location {
    if geom.is_empty() || !geom.envelope().contains_coord(p) {
        return Location::Exterior;
    }
    locate_in_area_parts(p, geom)
}

fn locate_in_area_parts(p: &Coordinate, geom: &Geometry) -> Location {
    match geom {
        Geometry::Polygon(polygon) => locate_in_polygon(p, polygon),
        Geometry::MultiPolygon(polygons) => polygons
            .parts()
            .iter()
            .map(|polygon| locate_in_polygon(p, polygon))
            .find(|loc| *loc != Location::Exterior)
            .unwrap_or(Location::Exterior),
        Geometry::GeometryCollection(collection) => collection
            .parts()
            .iter()
            .map(|g| locate_in_area_parts(p, g))
            .find(|loc| *loc != Location::Exterior)
            .unwrap_or(Location::Exterior),
        _ => Location::Exterior,
    }
}

/// Location of the point relative to a single line. Exposed for use by graph builders.
pub fn locate_on_line_string(p: &Coordinate, line: &LineString) -> Location {
    locate_on_line(p, line.coords(), line.is_closed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryCollection, MultiLineString};

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn square_with_hole() -> Polygon {
        let shell = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];
        let hole = [(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)];
        Polygon::new(
            LinearRing::new(shell.iter().map(|&(x, y)| c(x, y)).collect()),
            vec![LinearRing::new(hole.iter().map(|&(x, y)| c(x, y)).collect())],
        )
    }

    #[test]
    fn locate_in_polygon_with_hole() {
        let g = Geometry::from(square_with_hole());
        let mut locator = PointLocator::new();
        assert_eq!(locator.locate(&c(1.0, 1.0), &g), Location::Interior);
        assert_eq!(locator.locate(&c(5.0, 5.0), &g), Location::Exterior);
        assert_eq!(locator.locate(&c(4.0, 5.0), &g), Location::Boundary);
        assert_eq!(locator.locate(&c(0.0, 5.0), &g), Location::Boundary);
        assert_eq!(locator.locate(&c(20.0, 5.0), &g), Location::Exterior);
        assert_eq!(locate_in_area(&c(1.0, 1.0), &g), Location::Interior);
    }

    #[test]
    fn mod2_boundary_rule() {
        let lines = Geometry::from(MultiLineString::new(vec![
            LineString::new(vec![c(0.0, 0.0), c(5.0, 0.0)]),
            LineString::new(vec![c(5.0, 0.0), c(10.0, 0.0)]),
        ]));
        let mut locator = PointLocator::new();
        assert_eq!(locator.locate(&c(5.0, 0.0), &lines), Location::Interior);
        assert_eq!(locator.locate(&c(0.0, 0.0), &lines), Location::Boundary);
        assert_eq!(locator.locate(&c(2.0, 0.0), &lines), Location::Interior);
        assert_eq!(locator.locate(&c(2.0, 1.0), &lines), Location::Exterior);
    }

    #[test]
    fn area_locator_ignores_lines() {
        let g = Geometry::from(GeometryCollection::new(vec![
            LineString::new(vec![c(20.0, 0.0), c(30.0, 0.0)]).into(),
            square_with_hole().into(),
        ]));
        assert_eq!(locate_in_area(&c(25.0, 0.0), &g), Location::Exterior);
        assert_eq!(locate_in_area(&c(1.0, 1.0), &g), Location::Interior);
    }
}
