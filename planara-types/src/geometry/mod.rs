//! The OGC Simple Features geometry model.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Coordinate, Envelope};

mod collection;
mod line_string;
mod point;
mod polygon;

pub use collection::{GeometryCollection, MultiLineString, MultiPoint, MultiPolygon};
pub use line_string::{LineString, LinearRing};
pub use point::Point;
pub use polygon::Polygon;

/// Type tag of a geometry.
///
/// The order of variants is the order used when comparing geometries of different types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryType {
    /// [`Point`]
    Point,
    /// [`MultiPoint`]
    MultiPoint,
    /// [`LineString`]
    LineString,
    /// [`LinearRing`]
    LinearRing,
    /// [`MultiLineString`]
    MultiLineString,
    /// [`Polygon`]
    Polygon,
    /// [`MultiPolygon`]
    MultiPolygon,
    /// [`GeometryCollection`]
    GeometryCollection,
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GeometryType::Point => "Point",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::LineString => "LineString",
            GeometryType::LinearRing => "LinearRing",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        };
        f.write_str(name)
    }
}

/// Topological dimension of a geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    /// Points.
    Point = 0,
    /// Curves.
    Line = 1,
    /// Surfaces.
    Area = 2,
}

/// Any geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Point
    Point(Point),
    /// Line string
    LineString(LineString),
    /// Linear ring
    LinearRing(LinearRing),
    /// Polygon
    Polygon(Polygon),
    /// Multi point
    MultiPoint(MultiPoint),
    /// Multi line string
    MultiLineString(MultiLineString),
    /// Multi polygon
    MultiPolygon(MultiPolygon),
    /// Collection of any geometries
    GeometryCollection(GeometryCollection),
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::GeometryCollection(GeometryCollection::default())
    }
}

impl Geometry {
    /// Type tag of the geometry.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::LinearRing(_) => GeometryType::LinearRing,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    /// Topological dimension. `None` for an empty geometry collection.
    ///
    /// The dimension of a collection is the largest dimension of its members.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(Dimension::Point),
            Geometry::LineString(_) | Geometry::LinearRing(_) | Geometry::MultiLineString(_) => {
                Some(Dimension::Line)
            }
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Some(Dimension::Area),
            Geometry::GeometryCollection(c) => {
                c.parts().iter().filter_map(Geometry::dimension).max()
            }
        }
    }

    /// Whether the geometry contains no points.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(v) => v.is_empty(),
            Geometry::LineString(v) => v.is_empty(),
            Geometry::LinearRing(v) => v.is_empty(),
            Geometry::Polygon(v) => v.is_empty(),
            Geometry::MultiPoint(v) => v.is_empty(),
            Geometry::MultiLineString(v) => v.is_empty(),
            Geometry::MultiPolygon(v) => v.is_empty(),
            Geometry::GeometryCollection(v) => v.is_empty(),
        }
    }

    /// Bounding box. Null for empty geometries.
    pub fn envelope(&self) -> Envelope {
        match self {
            Geometry::Point(v) => v.envelope(),
            Geometry::LineString(v) => v.envelope(),
            Geometry::LinearRing(v) => v.envelope(),
            Geometry::Polygon(v) => v.envelope(),
            Geometry::MultiPoint(v) => v.envelope(),
            Geometry::MultiLineString(v) => v.envelope(),
            Geometry::MultiPolygon(v) => v.envelope(),
            Geometry::GeometryCollection(v) => v.envelope(),
        }
    }

    /// Area of the polygonal parts.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Polygon(v) => v.area(),
            Geometry::MultiPolygon(v) => v.area(),
            Geometry::GeometryCollection(v) => v.parts().iter().map(Geometry::area).sum(),
            _ => 0.0,
        }
    }

    /// Length of the linear parts and perimeter of the polygonal parts.
    pub fn length(&self) -> f64 {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
            Geometry::LineString(v) => v.length(),
            Geometry::LinearRing(v) => v.length(),
            Geometry::Polygon(v) => v.length(),
            Geometry::MultiLineString(v) => v.length(),
            Geometry::MultiPolygon(v) => v.length(),
            Geometry::GeometryCollection(v) => v.parts().iter().map(Geometry::length).sum(),
        }
    }

    /// All coordinates of the geometry in traversal order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut coords = vec![];
        self.for_each_coord(&mut |c| coords.push(*c));
        coords
    }

    /// Total number of points.
    pub fn num_points(&self) -> usize {
        let mut count = 0;
        self.for_each_coord(&mut |_| count += 1);
        count
    }

    /// Number of direct members of a collection, `1` for non-collection geometries.
    pub fn num_geometries(&self) -> usize {
        match self {
            Geometry::MultiPoint(v) => v.parts().len(),
            Geometry::MultiLineString(v) => v.parts().len(),
            Geometry::MultiPolygon(v) => v.parts().len(),
            Geometry::GeometryCollection(v) => v.parts().len(),
            _ => 1,
        }
    }

    /// Calls the closure for every coordinate of the geometry.
    pub fn for_each_coord(&self, f: &mut impl FnMut(&Coordinate)) {
        match self {
            Geometry::Point(v) => {
                if let Some(c) = v.coord() {
                    f(c);
                }
            }
            Geometry::LineString(v) => v.coords().iter().for_each(f),
            Geometry::LinearRing(v) => v.coords().iter().for_each(f),
            Geometry::Polygon(v) => v.rings().flat_map(|r| r.coords()).for_each(f),
            Geometry::MultiPoint(v) => v.parts().iter().filter_map(Point::coord).for_each(f),
            Geometry::MultiLineString(v) => v.parts().iter().flat_map(|l| l.coords()).for_each(f),
            Geometry::MultiPolygon(v) => v
                .parts()
                .iter()
                .flat_map(|p| p.rings())
                .flat_map(|r| r.coords())
                .for_each(f),
            Geometry::GeometryCollection(v) => {
                for g in v.parts() {
                    g.for_each_coord(f);
                }
            }
        }
    }

    /// Applies the in-place transformation to every coordinate of the geometry.
    ///
    /// The closure is allowed to mutate the coordinate it receives. Derived values (such as
    /// closure of rings) are the caller's responsibility.
    pub fn apply_coords_mut(&mut self, f: &mut impl FnMut(&mut Coordinate)) {
        match self {
            Geometry::Point(v) => {
                if let Some(c) = v.coord_mut() {
                    f(c);
                }
            }
            Geometry::LineString(v) => v.coords_mut().iter_mut().for_each(f),
            Geometry::LinearRing(v) => v.coords_mut().iter_mut().for_each(f),
            Geometry::Polygon(v) => v.rings_mut().flat_map(|r| r.coords_mut()).for_each(f),
            Geometry::MultiPoint(v) => v
                .parts_mut()
                .iter_mut()
                .filter_map(Point::coord_mut)
                .for_each(f),
            Geometry::MultiLineString(v) => v
                .parts_mut()
                .iter_mut()
                .flat_map(|l| l.coords_mut())
                .for_each(f),
            Geometry::MultiPolygon(v) => v
                .parts_mut()
                .iter_mut()
                .flat_map(|p| p.rings_mut())
                .flat_map(|r| r.coords_mut())
                .for_each(f),
            Geometry::GeometryCollection(v) => {
                for g in v.parts_mut() {
                    g.apply_coords_mut(f);
                }
            }
        }
    }

    /// Converts the geometry to its normal form: polygon shells clockwise, holes
    /// counterclockwise, rings start at their minimum coordinate, lines start at their smaller
    /// end and members of collections are sorted.
    ///
    /// Two geometries with the same normal form are topologically equal.
    pub fn normalize(&mut self) {
        match self {
            Geometry::Point(_) => {}
            Geometry::LineString(v) => v.normalize(),
            Geometry::LinearRing(v) => v.normalize(true),
            Geometry::Polygon(v) => v.normalize(),
            Geometry::MultiPoint(v) => {
                v.parts_mut().sort_by(|a, b| a.coord().cmp(&b.coord()));
            }
            Geometry::MultiLineString(v) => {
                for line in v.parts_mut().iter_mut() {
                    line.normalize();
                }
                v.parts_mut()
                    .sort_by(|a, b| compare_coords(a.coords(), b.coords()));
            }
            Geometry::MultiPolygon(v) => {
                for polygon in v.parts_mut().iter_mut() {
                    polygon.normalize();
                }
                v.parts_mut().sort_by(compare_polygons);
            }
            Geometry::GeometryCollection(v) => {
                for g in v.parts_mut().iter_mut() {
                    g.normalize();
                }
                v.parts_mut().sort_by(Geometry::compare);
            }
        }
    }

    /// Returns the normalized copy of the geometry.
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.normalize();
        copy
    }

    /// Total order of geometries: first by type, then by coordinates.
    pub fn compare(&self, other: &Geometry) -> Ordering {
        self.geometry_type()
            .cmp(&other.geometry_type())
            .then_with(|| match (self, other) {
                (Geometry::Polygon(a), Geometry::Polygon(b)) => compare_polygons(a, b),
                (Geometry::MultiPolygon(a), Geometry::MultiPolygon(b)) => {
                    compare_seq(a.parts(), b.parts(), compare_polygons)
                }
                (Geometry::GeometryCollection(a), Geometry::GeometryCollection(b)) => {
                    compare_seq(a.parts(), b.parts(), Geometry::compare)
                }
                _ => compare_coords(&self.coordinates(), &other.coordinates()),
            })
    }
}

/// Lexicographic comparison of coordinate sequences.
pub(crate) fn compare_coords(a: &[Coordinate], b: &[Coordinate]) -> Ordering {
    compare_seq(a, b, Coordinate::compare_xy)
}

fn compare_polygons(a: &Polygon, b: &Polygon) -> Ordering {
    compare_coords(a.exterior().coords(), b.exterior().coords()).then_with(|| {
        compare_seq(a.interiors(), b.interiors(), |x, y| {
            compare_coords(x.coords(), y.coords())
        })
    })
}

fn compare_seq<T>(a: &[T], b: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

macro_rules! impl_from_geometry {
    ($($name:ident),*) => {
        $(
            impl From<$name> for Geometry {
                fn from(value: $name) -> Self {
                    Geometry::$name(value)
                }
            }
        )*
    };
}

impl_from_geometry!(
    Point,
    LineString,
    LinearRing,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection
);

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn ring(v: &[(f64, f64)]) -> LinearRing {
        LinearRing::new(v.iter().map(|&(x, y)| Coordinate::new(x, y)).collect())
    }

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::new(
            ring(&[
                (x, y),
                (x + size, y),
                (x + size, y + size),
                (x, y + size),
                (x, y),
            ]),
            vec![],
        )
    }

    #[test]
    fn dimension() {
        assert_eq!(
            Geometry::from(Point::empty()).dimension(),
            Some(Dimension::Point)
        );
        assert_eq!(Geometry::default().dimension(), None);
        let collection = Geometry::from(GeometryCollection::new(vec![
            Point::new(Coordinate::new(0.0, 0.0)).into(),
            square(0.0, 0.0, 1.0).into(),
        ]));
        assert_eq!(collection.dimension(), Some(Dimension::Area));
    }

    #[test]
    fn measures() {
        let g = Geometry::from(MultiPolygon::new(vec![
            square(0.0, 0.0, 1.0),
            square(5.0, 5.0, 2.0),
        ]));
        assert_abs_diff_eq!(g.area(), 5.0);
        assert_abs_diff_eq!(g.length(), 12.0);
        assert_eq!(g.num_points(), 10);
        assert_eq!(g.envelope(), Envelope::new(0.0, 7.0, 0.0, 7.0));
    }

    #[test]
    fn normalized_forms_are_equal() {
        let a = Geometry::from(MultiPolygon::new(vec![
            square(5.0, 5.0, 2.0),
            square(0.0, 0.0, 1.0),
        ]));
        let mut reversed = square(0.0, 0.0, 1.0);
        reversed.normalize();
        let b = Geometry::from(MultiPolygon::new(vec![reversed, square(5.0, 5.0, 2.0)]));

        assert_ne!(a, b);
        assert_eq!(a.normalized(), b.normalized());
    }

    #[test]
    fn apply_coords_in_place() {
        let mut g = Geometry::from(square(0.0, 0.0, 1.0));
        g.apply_coords_mut(&mut |c| c.x += 10.0);
        assert_eq!(g.envelope(), Envelope::new(10.0, 11.0, 0.0, 1.0));
    }
}
